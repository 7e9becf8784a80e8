use std::path::PathBuf;

use thiserror::Error;

/// Rejections raised by the task store before any mutation is applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("Please enter a task!")]
    EmptyText,
    #[error("could not generate a unique task id after {attempts} attempts")]
    IdCollision { attempts: usize },
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("stored blob '{key}' is malformed: {source}")]
    Malformed {
        key: String,
        raw: Vec<u8>,
        source: serde_json::Error,
    },
    #[error("failed to encode tasks: {0}")]
    Encode(#[source] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("logging error: {0}")]
    Logging(String),
    #[error("terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}

impl AppError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 11,
            Self::Storage(_) => 20,
            Self::Logging(_) => 12,
            Self::Terminal(_) => 30,
        }
    }
}
