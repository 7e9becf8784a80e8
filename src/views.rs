//! Per-column views over the task list, recomputed on every frame.

use crate::task::{Task, TaskStatus};

/// Search-filtered tasks split by status. Each sequence keeps the insertion
/// order of the underlying list.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BoardViews<'a> {
    pub todo: Vec<&'a Task>,
    pub in_progress: Vec<&'a Task>,
    pub done: Vec<&'a Task>,
}

impl<'a> BoardViews<'a> {
    pub fn column(&self, status: TaskStatus) -> &[&'a Task] {
        match status {
            TaskStatus::Todo => &self.todo,
            TaskStatus::InProgress => &self.in_progress,
            TaskStatus::Done => &self.done,
        }
    }
}

/// Case-insensitive substring match; an empty query matches everything.
pub fn matches_query(task: &Task, query: &str) -> bool {
    query.is_empty() || task.text.to_lowercase().contains(&query.to_lowercase())
}

pub fn derive_views<'a>(tasks: &'a [Task], query: &str) -> BoardViews<'a> {
    let mut views = BoardViews::default();
    for task in tasks.iter().filter(|t| matches_query(t, query)) {
        match task.status {
            TaskStatus::Todo => views.todo.push(task),
            TaskStatus::InProgress => views.in_progress.push(task),
            TaskStatus::Done => views.done.push(task),
        }
    }
    views
}
