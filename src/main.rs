use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

use kanban::cli::Args;
use kanban::error::AppError;
use kanban::id_gen::TimestampIdGenerator;
use kanban::storage::{FileBlobStore, TaskRepository};
use kanban::{config, logging, ui, App};

fn main() {
    let exit = match real_main() {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{err}");
            err.exit_code()
        }
    };
    std::process::exit(exit);
}

fn real_main() -> Result<(), AppError> {
    let args = Args::parse();
    let mut cfg = config::load(args.config.as_deref())?;
    args.apply(&mut cfg);

    let _log_guard = logging::init_tracing(&cfg.logging, &cfg.log_dir()).map_err(AppError::Logging)?;

    let data_dir = cfg.data_dir();
    let repo = TaskRepository::with_key(FileBlobStore::new(&data_dir), cfg.storage.key.clone());
    tracing::info!(data_dir = %data_dir.display(), key = %repo.key(), "starting board");
    let mut app = App::open(repo, TimestampIdGenerator::new())?;

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = ui::run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    tracing::info!(count = app.board().len(), "exiting");
    result.map_err(AppError::from)
}
