use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};

use crate::drag::{handle_drag_end, BoardLayout, DragEnd, DragTracker, DropOutcome};
use crate::error::StorageError;
use crate::id_gen::{IdGenerator, TimestampIdGenerator};
use crate::kanban_board::KanbanBoard;
use crate::storage::{BlobStore, TaskRepository};
use crate::task::{Task, TaskId, TaskPriority, TaskStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Adding,
    Searching,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditState {
    pub id: TaskId,
    pub buffer: String,
}

/// Everything the board screen needs between two events: the store, where
/// it is persisted, and the transient input state around it.
pub struct App<S, G = TimestampIdGenerator> {
    board: KanbanBoard<G>,
    repo: TaskRepository<S>,
    pub mode: InputMode,
    pub draft: String,
    pub draft_priority: TaskPriority,
    pub search: String,
    pub edit: Option<EditState>,
    pub selected_column: TaskStatus,
    pub selected_row: usize,
    pub message: Option<String>,
    /// Hit regions recorded by the last draw.
    pub layout: BoardLayout,
    drag: DragTracker,
}

impl<S: BlobStore, G: IdGenerator> App<S, G> {
    pub fn new(board: KanbanBoard<G>, repo: TaskRepository<S>) -> Self {
        Self {
            board,
            repo,
            mode: InputMode::Normal,
            draft: String::new(),
            draft_priority: TaskPriority::default(),
            search: String::new(),
            edit: None,
            selected_column: TaskStatus::Todo,
            selected_row: 0,
            message: None,
            layout: BoardLayout::default(),
            drag: DragTracker::new(),
        }
    }

    /// Seeds the board from storage. An unreadable blob is set aside and the
    /// board starts empty with a notice.
    pub fn open(mut repo: TaskRepository<S>, ids: G) -> Result<Self, StorageError> {
        let report = repo.load_or_recover()?;
        let mut app = Self::new(KanbanBoard::from_tasks(report.tasks, ids), repo);
        if let Some(backup) = report.backup_key {
            app.message = Some(format!(
                "Stored tasks were unreadable; a copy was kept under '{backup}'"
            ));
        }
        Ok(app)
    }

    pub fn board(&self) -> &KanbanBoard<G> {
        &self.board
    }

    pub fn repository(&self) -> &TaskRepository<S> {
        &self.repo
    }

    pub fn dragging(&self) -> Option<&TaskId> {
        self.drag.dragging()
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.board
            .views(&self.search)
            .column(self.selected_column)
            .get(self.selected_row)
            .copied()
    }

    pub fn handle_event(&mut self, event: Event) -> Action {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            Event::Mouse(mouse) => {
                self.handle_mouse(mouse);
                Action::Continue
            }
            _ => Action::Continue,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Action::Quit;
        }
        self.message = None;
        let action = match self.mode {
            InputMode::Normal => self.handle_normal_key(key),
            InputMode::Adding => {
                self.handle_adding_key(key);
                Action::Continue
            }
            InputMode::Searching => {
                self.handle_search_key(key);
                Action::Continue
            }
            InputMode::Editing => {
                self.handle_edit_key(key);
                Action::Continue
            }
        };
        // Mouse events are ignored outside Normal mode, so a press held
        // across a mode change would never see its release.
        if self.mode != InputMode::Normal {
            self.drag.cancel();
        }
        action
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Char('q') => return Action::Quit,
            KeyCode::Left | KeyCode::Char('h') => self.select_column(-1),
            KeyCode::Right | KeyCode::Char('l') => self.select_column(1),
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected_row = self.selected_row.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected_row += 1;
                self.clamp_selection();
            }
            KeyCode::Char('a') => self.mode = InputMode::Adding,
            KeyCode::Char('/') => self.mode = InputMode::Searching,
            KeyCode::Enter | KeyCode::Char('e') => self.begin_edit(),
            KeyCode::Char('d') | KeyCode::Delete => self.delete_selected(),
            KeyCode::Char('1') => self.move_selected(0),
            KeyCode::Char('2') => self.move_selected(1),
            KeyCode::Esc => {
                self.search.clear();
                self.clamp_selection();
            }
            _ => {}
        }
        Action::Continue
    }

    fn handle_adding_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.submit_draft(),
            KeyCode::Esc => {
                self.draft.clear();
                self.draft_priority = TaskPriority::default();
                self.mode = InputMode::Normal;
            }
            KeyCode::Tab => self.draft_priority = self.draft_priority.next(),
            KeyCode::Backspace => {
                self.draft.pop();
            }
            KeyCode::Char(c) => self.draft.push(c),
            _ => {}
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.mode = InputMode::Normal,
            KeyCode::Esc => {
                self.search.clear();
                self.mode = InputMode::Normal;
            }
            KeyCode::Backspace => {
                self.search.pop();
            }
            KeyCode::Char(c) => self.search.push(c),
            _ => {}
        }
        self.clamp_selection();
    }

    fn handle_edit_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.commit_edit(),
            KeyCode::Esc => {
                self.edit = None;
                self.mode = InputMode::Normal;
            }
            KeyCode::Backspace => {
                if let Some(edit) = self.edit.as_mut() {
                    edit.buffer.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(edit) = self.edit.as_mut() {
                    edit.buffer.push(c);
                }
            }
            _ => {}
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.mode != InputMode::Normal {
            return;
        }
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(id) = self.drag.press(mouse.column, mouse.row, &self.layout).cloned() {
                    self.select_task(&id);
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if let Some(end) = self.drag.release(mouse.column, mouse.row, &self.layout) {
                    self.drop_task(end);
                }
            }
            _ => {}
        }
    }

    /// Adds the pending draft. Blank drafts keep the add bar open with a
    /// validation message.
    pub fn submit_draft(&mut self) {
        match self.board.add_task(&self.draft, self.draft_priority) {
            Ok(task) => {
                let id = task.id.clone();
                self.draft.clear();
                self.draft_priority = TaskPriority::default();
                self.mode = InputMode::Normal;
                self.persist();
                self.select_task(&id);
            }
            Err(err) => self.message = Some(err.to_string()),
        }
    }

    pub fn begin_edit(&mut self) {
        if let Some(task) = self.selected_task() {
            self.edit = Some(EditState {
                id: task.id.clone(),
                buffer: task.text.clone(),
            });
            self.mode = InputMode::Editing;
        }
    }

    /// Blank text keeps the editor open and changes nothing.
    pub fn commit_edit(&mut self) {
        let Some(edit) = self.edit.as_ref() else {
            self.mode = InputMode::Normal;
            return;
        };
        if edit.buffer.trim().is_empty() {
            return;
        }
        if self.board.edit_task(&edit.id, &edit.buffer) {
            self.persist();
        }
        self.edit = None;
        self.mode = InputMode::Normal;
    }

    pub fn delete_selected(&mut self) {
        let Some(id) = self.selected_task().map(|t| t.id.clone()) else {
            return;
        };
        if self.board.delete_task(&id).is_some() {
            self.persist();
        }
        self.clamp_selection();
    }

    /// Applies the `option`-th of the selected task's two move actions.
    pub fn move_selected(&mut self, option: usize) {
        let Some((id, to)) = self
            .selected_task()
            .and_then(|t| Some((t.id.clone(), *t.status.move_options().get(option)?)))
        else {
            return;
        };
        if self.board.move_task(&id, to) {
            self.persist();
        }
        self.clamp_selection();
    }

    pub fn drop_task(&mut self, end: DragEnd) {
        let id = end.dragged.clone();
        match handle_drag_end(&mut self.board, end) {
            DropOutcome::Moved { .. } => {
                self.persist();
                self.select_task(&id);
            }
            DropOutcome::Rejected(target) => {
                self.message = Some(format!("Cannot drop on '{target}'"));
            }
            DropOutcome::NoTarget | DropOutcome::UnknownTask => {}
        }
    }

    fn select_column(&mut self, delta: isize) {
        let index = (self.selected_column.index() as isize + delta)
            .clamp(0, TaskStatus::ALL.len() as isize - 1) as usize;
        self.selected_column = TaskStatus::ALL[index];
        self.clamp_selection();
    }

    /// Points the selection at `id` if it is visible under the current search.
    pub fn select_task(&mut self, id: &TaskId) {
        let views = self.board.views(&self.search);
        for status in TaskStatus::ALL {
            if let Some(row) = views.column(status).iter().position(|t| &t.id == id) {
                self.selected_column = status;
                self.selected_row = row;
                return;
            }
        }
    }

    fn clamp_selection(&mut self) {
        let len = self
            .board
            .views(&self.search)
            .column(self.selected_column)
            .len();
        self.selected_row = self.selected_row.min(len.saturating_sub(1));
    }

    /// Writes the whole list after a mutation. Failures are logged and shown
    /// but never stop the board.
    fn persist(&mut self) {
        if let Err(err) = self.repo.save(self.board.tasks()) {
            tracing::error!(error = %err, "failed to save tasks");
            self.message = Some(format!("Save failed: {err}"));
        }
    }
}
