use crate::export;
use crate::store::TaskStore;
use crate::task::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// Payload for the modal popups: a title, a body and whether the popup
/// reports a failure. The CLI prints the same notices as plain lines.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn info(title: &str, message: impl Into<String>) -> Self {
        Notice {
            kind: NoticeKind::Info,
            title: title.to_string(),
            message: message.into(),
        }
    }

    pub fn error(title: &str, message: impl Into<String>) -> Self {
        Notice {
            kind: NoticeKind::Error,
            title: title.to_string(),
            message: message.into(),
        }
    }
}

/// Raw form input as typed; normalization happens in `Task::create`.
#[derive(Debug, Default, Clone)]
pub struct TaskForm {
    pub title: String,
    pub category: String,
    pub due_date: String,
    pub priority: String,
}

/// `Err` carries the failure notice; `Ok(Some(..))` a confirmation one.
pub type ActionResult = Result<Option<Notice>, Notice>;

fn save_or_notice(store: &TaskStore, tasks: &[Task]) -> Result<(), Notice> {
    store
        .save(tasks)
        .map_err(|err| Notice::error("Error", format!("Failed to save tasks: {err:#}")))
}

/// Appends a task built from the form. An all-whitespace title aborts with
/// a validation notice and no store change.
pub fn add_task(store: &TaskStore, form: &TaskForm) -> ActionResult {
    if form.title.trim().is_empty() {
        return Err(Notice::error("Error", "Title cannot be empty."));
    }
    let mut tasks = store.load();
    tasks.push(Task::create(
        &form.title,
        &form.category,
        &form.due_date,
        &form.priority,
    ));
    save_or_notice(store, &tasks)?;
    Ok(None)
}

/// Marks the task at `index` completed. The index was captured at render
/// time, so it is re-checked against a fresh load before anything mutates.
pub fn complete_task(store: &TaskStore, index: usize) -> ActionResult {
    let mut tasks = store.load();
    if index >= tasks.len() {
        return Err(Notice::error("Error", "Invalid task index."));
    }
    tasks[index].completed = true;
    save_or_notice(store, &tasks)?;
    Ok(None)
}

/// Removes the task at `index`, confirming with the removed title.
pub fn delete_task(store: &TaskStore, index: usize) -> ActionResult {
    let mut tasks = store.load();
    if index >= tasks.len() {
        return Err(Notice::error("Error", "Invalid task index."));
    }
    let removed = tasks.remove(index);
    save_or_notice(store, &tasks)?;
    Ok(Some(Notice::info(
        "Deleted",
        format!("Removed: {}", removed.title),
    )))
}

/// Writes a timestamped CSV beside the store file. An empty store is an
/// informational no-op; a write failure surfaces the underlying error.
pub fn export_tasks(store: &TaskStore) -> ActionResult {
    let tasks = store.load();
    if tasks.is_empty() {
        return Ok(Some(Notice::info("Export", "No tasks to export.")));
    }
    match export::export_csv(&store.dir(), &tasks) {
        Ok(path) => Ok(Some(Notice::info(
            "Export",
            format!("Exported to {}", path.display()),
        ))),
        Err(err) => Err(Notice::error("Export Failed", format!("{err:#}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> TaskStore {
        let store = TaskStore::new(dir.path().join("tasks.json"));
        store.ensure_exists().unwrap();
        store
    }

    fn form(title: &str, category: &str, due: &str, priority: &str) -> TaskForm {
        TaskForm {
            title: title.into(),
            category: category.into(),
            due_date: due.into(),
            priority: priority.into(),
        }
    }

    fn csv_files(dir: &TempDir) -> Vec<String> {
        fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(".csv"))
            .collect()
    }

    #[test]
    fn add_then_complete_then_delete_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        add_task(&store, &form("Buy milk", "", "", "")).unwrap();
        let tasks = store.load();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Buy milk");
        assert_eq!(tasks[0].category, "General");
        assert_eq!(tasks[0].priority, "Low");
        assert_eq!(tasks[0].due_date, "");
        assert!(!tasks[0].completed);

        complete_task(&store, 0).unwrap();
        assert!(store.load()[0].completed);

        let notice = delete_task(&store, 0).unwrap().unwrap();
        assert_eq!(notice.kind, NoticeKind::Info);
        assert_eq!(notice.message, "Removed: Buy milk");
        assert!(store.load().is_empty());
    }

    #[test]
    fn whitespace_title_is_rejected_without_touching_the_store() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let notice = add_task(&store, &form("   ", "Work", "", "")).unwrap_err();
        assert_eq!(notice.kind, NoticeKind::Error);
        assert_eq!(notice.message, "Title cannot be empty.");
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "[]");
    }

    #[test]
    fn out_of_range_complete_leaves_the_file_untouched() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        add_task(&store, &form("only", "", "", "")).unwrap();
        let before = fs::read_to_string(store.path()).unwrap();

        let notice = complete_task(&store, 5).unwrap_err();
        assert_eq!(notice.message, "Invalid task index.");
        assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
    }

    #[test]
    fn out_of_range_delete_leaves_the_file_untouched() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        add_task(&store, &form("only", "", "", "")).unwrap();
        let before = fs::read_to_string(store.path()).unwrap();

        let notice = delete_task(&store, 1).unwrap_err();
        assert_eq!(notice.message, "Invalid task index.");
        assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
    }

    #[test]
    fn delete_preserves_relative_order() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        for title in ["a", "b", "c"] {
            add_task(&store, &form(title, "", "", "")).unwrap();
        }
        delete_task(&store, 1).unwrap();
        let titles: Vec<String> = store.load().into_iter().map(|t| t.title).collect();
        assert_eq!(titles, ["a", "c"]);
    }

    #[test]
    fn complete_does_not_touch_other_tasks() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        add_task(&store, &form("a", "", "", "")).unwrap();
        add_task(&store, &form("b", "", "", "")).unwrap();
        let before = store.load();

        complete_task(&store, 0).unwrap();
        let after = store.load();
        assert!(after[0].completed);
        assert_eq!(after[0].created_at, before[0].created_at);
        assert_eq!(after[1], before[1]);
    }

    #[test]
    fn export_of_empty_store_writes_no_file() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let notice = export_tasks(&store).unwrap().unwrap();
        assert_eq!(notice.message, "No tasks to export.");
        assert!(csv_files(&dir).is_empty());
    }

    #[test]
    fn export_writes_beside_the_store_and_names_the_file() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        add_task(&store, &form("a", "", "", "")).unwrap();
        add_task(&store, &form("b", "", "", "")).unwrap();

        let notice = export_tasks(&store).unwrap().unwrap();
        assert!(notice.message.starts_with("Exported to "));

        let files = csv_files(&dir);
        assert_eq!(files.len(), 1);
        assert!(notice.message.ends_with(&files[0]));

        let content = fs::read_to_string(dir.path().join(&files[0])).unwrap();
        assert_eq!(content.lines().count(), 3);
    }

    #[test]
    fn save_failure_surfaces_as_an_error_notice() {
        let dir = TempDir::new().unwrap();
        // A directory at the store path makes every write fail.
        let store = TaskStore::new(dir.path().join("blocked"));
        fs::create_dir(dir.path().join("blocked")).unwrap();

        let notice = add_task(&store, &form("x", "", "", "")).unwrap_err();
        assert_eq!(notice.kind, NoticeKind::Error);
        assert!(notice.message.starts_with("Failed to save tasks:"));
    }
}
