use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

pub const LOG_FILE: &str = "kanban.log";

/// Resolves the filter: a non-empty `RUST_LOG` wins over the configured level.
pub fn build_filter(level: &str) -> Result<EnvFilter, String> {
    match std::env::var("RUST_LOG") {
        Ok(v) if !v.trim().is_empty() => Ok(EnvFilter::from_default_env()),
        _ => EnvFilter::try_new(level).map_err(|e| e.to_string()),
    }
}

/// Installs a file-only subscriber; the TUI owns stdout and stderr. The
/// returned guard must outlive the UI so buffered lines get flushed.
pub fn init_tracing(logging: &LoggingConfig, dir: &Path) -> Result<Option<WorkerGuard>, String> {
    if !logging.enabled {
        return Ok(None);
    }

    let filter = build_filter(&logging.level)?;

    std::fs::create_dir_all(dir).map_err(|e| format!("create log dir failed: {e}"))?;
    let appender = tracing_appender::rolling::never(dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        )
        .try_init()
        .map_err(|e| e.to_string())?;

    Ok(Some(guard))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_logging_installs_nothing() {
        let cfg = LoggingConfig {
            enabled: false,
            ..LoggingConfig::default()
        };
        let dir = tempfile::tempdir().unwrap();

        assert!(init_tracing(&cfg, &dir.path().join("logs")).unwrap().is_none());
        assert!(!dir.path().join("logs").exists());
    }

    #[test]
    fn invalid_level_is_rejected() {
        if std::env::var("RUST_LOG").is_ok_and(|v| !v.trim().is_empty()) {
            return;
        }
        assert!(build_filter("kanban=notalevel").is_err());
    }
}
