use crate::task::Task;
use anyhow::Result;
use chrono::Local;
use std::path::{Path, PathBuf};

pub const CSV_HEADER: [&str; 6] = [
    "title",
    "category",
    "due_date",
    "priority",
    "completed",
    "created_at",
];

/// Writes `tasks_export_YYYYMMDD_HHMMSS.csv` into `dir` and returns the
/// path. Rows follow store order; the writer applies standard CSV quoting
/// and nothing else.
pub fn export_csv(dir: &Path, tasks: &[Task]) -> Result<PathBuf> {
    let filename = format!("tasks_export_{}.csv", Local::now().format("%Y%m%d_%H%M%S"));
    let path = dir.join(filename);
    let mut writer = csv::Writer::from_path(&path)?;
    writer.write_record(CSV_HEADER)?;
    for task in tasks {
        let completed = task.completed.to_string();
        writer.write_record([
            task.title.as_str(),
            task.category.as_str(),
            task.due_date.as_str(),
            task.priority.as_str(),
            completed.as_str(),
            task.created_at.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(path)
}
