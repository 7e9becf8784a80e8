use crate::error::BoardError;
use crate::id_gen::{IdGenerator, TimestampIdGenerator};
use crate::task::{Task, TaskId, TaskPriority, TaskStatus};
use crate::views::{derive_views, BoardViews};

/// Attempts made to draw a fresh id before giving up on an add.
const MAX_ID_ATTEMPTS: usize = 16;

/// The authoritative task list. Columns are never stored; they are derived
/// from each task's status by [`KanbanBoard::views`].
#[derive(Debug)]
pub struct KanbanBoard<G = TimestampIdGenerator> {
    tasks: Vec<Task>,
    ids: G,
}

impl<G: IdGenerator> KanbanBoard<G> {
    pub fn with_ids(ids: G) -> Self {
        Self {
            tasks: Vec::new(),
            ids,
        }
    }

    /// Seeds the board with tasks read back from storage.
    pub fn from_tasks(tasks: Vec<Task>, ids: G) -> Self {
        Self { tasks, ids }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Appends a new `todo` task. Blank text is rejected and nothing changes.
    pub fn add_task(&mut self, text: &str, priority: TaskPriority) -> Result<&Task, BoardError> {
        if text.trim().is_empty() {
            return Err(BoardError::EmptyText);
        }

        let id = self.fresh_id()?;
        tracing::debug!(task_id = %id, %priority, "adding task");
        self.tasks.push(Task {
            id,
            text: text.to_string(),
            status: TaskStatus::Todo,
            priority,
        });
        let index = self.tasks.len() - 1;
        Ok(&self.tasks[index])
    }

    /// Removes the task with `id`. Absent ids are a no-op.
    pub fn delete_task(&mut self, id: &TaskId) -> Option<Task> {
        let index = self.tasks.iter().position(|t| &t.id == id)?;
        tracing::debug!(task_id = %id, "deleting task");
        Some(self.tasks.remove(index))
    }

    /// Sets the status of the task with `id`. Returns `false` when absent.
    pub fn move_task(&mut self, id: &TaskId, status: TaskStatus) -> bool {
        match self.tasks.iter_mut().find(|t| &t.id == id) {
            Some(task) => {
                tracing::debug!(task_id = %id, from = %task.status, to = %status, "moving task");
                task.status = status;
                true
            }
            None => false,
        }
    }

    /// Replaces the text of the task with `id`. Blank text is discarded and
    /// the original kept. Returns whether the text changed hands.
    pub fn edit_task(&mut self, id: &TaskId, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        match self.tasks.iter_mut().find(|t| &t.id == id) {
            Some(task) => {
                tracing::debug!(task_id = %id, "editing task");
                task.text = text.to_string();
                true
            }
            None => false,
        }
    }

    pub fn views(&self, query: &str) -> BoardViews<'_> {
        derive_views(&self.tasks, query)
    }

    fn fresh_id(&mut self) -> Result<TaskId, BoardError> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = self.ids.next_id();
            if self.get(&id).is_none() {
                return Ok(id);
            }
            tracing::warn!(task_id = %id, "generated id already in use");
        }
        Err(BoardError::IdCollision {
            attempts: MAX_ID_ATTEMPTS,
        })
    }
}
