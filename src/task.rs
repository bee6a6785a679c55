use chrono::Local;
use serde::{Deserialize, Serialize};

/// One to-do item. The store keeps these in a flat JSON array; a task's
/// position in that array is its only identifier.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Task {
    #[serde(default)]
    pub title: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub due_date: String,
    #[serde(default = "default_priority")]
    pub priority: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub created_at: String,
}

fn default_category() -> String {
    "General".to_string()
}

fn default_priority() -> String {
    "Low".to_string()
}

impl Task {
    /// Builds a task from raw form input. Blank category falls back to
    /// "General", priority is capitalized and falls back to "Low", the due
    /// date is kept verbatim. The caller rejects empty titles before this.
    pub fn create(title: &str, category: &str, due_date: &str, priority: &str) -> Self {
        let category = category.trim();
        let priority = capitalize(priority.trim());
        Task {
            title: title.trim().to_string(),
            category: if category.is_empty() {
                default_category()
            } else {
                category.to_string()
            },
            due_date: due_date.trim().to_string(),
            priority: if priority.is_empty() {
                default_priority()
            } else {
                priority
            },
            completed: false,
            created_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

// First character uppercased, the rest lowercased ("hIGH" -> "High").
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.as_str().to_lowercase().chars())
            .collect(),
        None => String::new(),
    }
}

/// Row descriptor produced at render time. `index` is the 0-based position
/// the Complete/Delete actions dispatch with; `display_index` is what the
/// user sees.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRow {
    pub index: usize,
    pub display_index: usize,
    pub marker: &'static str,
    pub title: String,
    pub category: String,
    pub due: String,
    pub priority: String,
    pub completed: bool,
}

pub fn task_rows(tasks: &[Task]) -> Vec<TaskRow> {
    tasks
        .iter()
        .enumerate()
        .map(|(i, t)| TaskRow {
            index: i,
            display_index: i + 1,
            marker: if t.completed { "[✓]" } else { "[ ]" },
            title: t.title.clone(),
            category: t.category.clone(),
            due: if t.due_date.is_empty() {
                "N/A".to_string()
            } else {
                t.due_date.clone()
            },
            priority: t.priority.clone(),
            completed: t.completed,
        })
        .collect()
}
