use std::path::PathBuf;

use clap::Parser;

use crate::config::AppConfig;

/// Three-column kanban board for the terminal.
#[derive(Parser, Debug, Default)]
#[command(name = "kanban", version, about)]
pub struct Args {
    /// Config file. Defaults to `<config dir>/kanban/config.toml` when present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory holding the task blob.
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "kanban=trace". RUST_LOG still wins.
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Args {
    /// Flags take precedence over the config file.
    pub fn apply(&self, cfg: &mut AppConfig) {
        if let Some(dir) = &self.data_dir {
            cfg.storage.data_dir = Some(dir.clone());
        }
        if let Some(level) = &self.log_level {
            cfg.logging.level = level.clone();
        }
    }
}
