//! Drag-and-drop between columns.
//!
//! The tracker turns mouse presses and releases into a [`DragEnd`] using the
//! card and column rectangles of the last drawn frame; [`handle_drag_end`]
//! turns that into a store move.

use ratatui::layout::{Position, Rect};

use crate::id_gen::IdGenerator;
use crate::kanban_board::KanbanBoard;
use crate::task::{TaskId, TaskStatus};

/// Completion of one drag gesture: the dragged card and the droppable it was
/// released over, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragEnd {
    pub dragged: TaskId,
    pub over: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    Moved { from: TaskStatus, to: TaskStatus },
    NoTarget,
    Rejected(String),
    UnknownTask,
}

/// Applies a drop. The target id is only trusted once it parses as one of
/// the board's statuses.
pub fn handle_drag_end<G: IdGenerator>(
    board: &mut KanbanBoard<G>,
    event: DragEnd,
) -> DropOutcome {
    let Some(over) = event.over else {
        tracing::debug!(task_id = %event.dragged, "drag released outside any column");
        return DropOutcome::NoTarget;
    };
    let to = match over.parse::<TaskStatus>() {
        Ok(status) => status,
        Err(err) => {
            tracing::warn!(task_id = %event.dragged, %err, "rejecting drop");
            return DropOutcome::Rejected(over);
        }
    };
    let Some(from) = board.get(&event.dragged).map(|t| t.status) else {
        return DropOutcome::UnknownTask;
    };
    board.move_task(&event.dragged, to);
    DropOutcome::Moved { from, to }
}

/// Hit regions of the last frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardLayout {
    pub columns: Vec<(TaskStatus, Rect)>,
    pub cards: Vec<(TaskId, Rect)>,
}

impl BoardLayout {
    pub fn card_at(&self, x: u16, y: u16) -> Option<&TaskId> {
        let pos = Position::new(x, y);
        self.cards
            .iter()
            .find(|(_, area)| area.contains(pos))
            .map(|(id, _)| id)
    }

    pub fn column_at(&self, x: u16, y: u16) -> Option<TaskStatus> {
        let pos = Position::new(x, y);
        self.columns
            .iter()
            .find(|(_, area)| area.contains(pos))
            .map(|(status, _)| *status)
    }
}

#[derive(Debug, Default)]
pub struct DragTracker {
    dragging: Option<TaskId>,
}

impl DragTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dragging(&self) -> Option<&TaskId> {
        self.dragging.as_ref()
    }

    /// Starts a drag when the press lands on a card.
    pub fn press(&mut self, x: u16, y: u16, layout: &BoardLayout) -> Option<&TaskId> {
        self.dragging = layout.card_at(x, y).cloned();
        self.dragging.as_ref()
    }

    pub fn release(&mut self, x: u16, y: u16, layout: &BoardLayout) -> Option<DragEnd> {
        let dragged = self.dragging.take()?;
        let over = layout.column_at(x, y).map(|s| s.as_str().to_string());
        Some(DragEnd { dragged, over })
    }

    pub fn cancel(&mut self) {
        self.dragging = None;
    }
}
