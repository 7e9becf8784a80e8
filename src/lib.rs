pub mod app;
pub mod cli;
pub mod config;
pub mod drag;
pub mod error;
pub mod id_gen;
pub mod kanban_board;
pub mod logging;
pub mod storage;
pub mod task;
pub mod ui;
pub mod views;

pub use app::App;
pub use kanban_board::KanbanBoard;
pub use task::{Task, TaskId, TaskPriority, TaskStatus};
