//! Persistence of the task list as one JSON blob under a fixed key.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::error::StorageError;
use crate::task::Task;

pub const STORAGE_KEY: &str = "kanbanTasks";

/// Suffix of the key a malformed blob is copied to before the board resets.
const CORRUPT_SUFFIX: &str = ".corrupt";

/// Key-value store holding opaque byte blobs. Bytes, not strings, so a
/// damaged blob can still be read back and set aside.
pub trait BlobStore {
    /// Returns `None` when nothing is stored under `key`.
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    fn write(&mut self, key: &str, blob: &[u8]) -> Result<(), StorageError>;
}

/// One `<key>.json` file per key inside a data directory.
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    dir: PathBuf,
}

impl FileBlobStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl BlobStore for FileBlobStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let path = self.path_for(key);
        match fs::read(&path) {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    fn write(&mut self, key: &str, blob: &[u8]) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(|source| StorageError::Io {
            path: self.dir.clone(),
            source,
        })?;

        // Write-then-rename so a crash never leaves a half-written blob.
        let path = self.path_for(key);
        let tmp = self.dir.join(format!("{key}.json.tmp"));
        fs::write(&tmp, blob).map_err(|source| StorageError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| StorageError::Io { path, source })
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blobs: HashMap<String, Vec<u8>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(key: &str, blob: impl Into<Vec<u8>>) -> Self {
        let mut store = Self::new();
        store.blobs.insert(key.to_string(), blob.into());
        store
    }

    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.blobs.get(key).map(Vec::as_slice)
    }
}

impl BlobStore for MemoryBlobStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.blobs.get(key).cloned())
    }

    fn write(&mut self, key: &str, blob: &[u8]) -> Result<(), StorageError> {
        self.blobs.insert(key.to_string(), blob.to_vec());
        Ok(())
    }
}

/// What startup found in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub tasks: Vec<Task>,
    /// Set when the stored blob was unreadable and has been copied aside.
    pub backup_key: Option<String>,
}

/// Reads and writes the whole task list under one key.
#[derive(Debug)]
pub struct TaskRepository<S> {
    store: S,
    key: String,
}

impl<S: BlobStore> TaskRepository<S> {
    pub fn new(store: S) -> Self {
        Self::with_key(store, STORAGE_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Absent key yields an empty list.
    pub fn load(&self) -> Result<Vec<Task>, StorageError> {
        let Some(raw) = self.store.read(&self.key)? else {
            return Ok(Vec::new());
        };
        serde_json::from_slice(&raw).map_err(|source| StorageError::Malformed {
            key: self.key.clone(),
            raw,
            source,
        })
    }

    /// Like [`load`](Self::load), but a malformed blob is copied to the first
    /// free key of `<key>.corrupt`, `<key>.corrupt.1`, ... and the board
    /// starts empty instead of failing. Earlier backups are never overwritten.
    pub fn load_or_recover(&mut self) -> Result<LoadReport, StorageError> {
        match self.load() {
            Ok(tasks) => {
                tracing::info!(key = %self.key, count = tasks.len(), "loaded tasks");
                Ok(LoadReport {
                    tasks,
                    backup_key: None,
                })
            }
            Err(StorageError::Malformed { key, raw, source }) => {
                let backup_key = self.free_backup_key(&key)?;
                tracing::warn!(%key, %backup_key, error = %source, "stored tasks are malformed, starting empty");
                self.store.write(&backup_key, &raw)?;
                Ok(LoadReport {
                    tasks: Vec::new(),
                    backup_key: Some(backup_key),
                })
            }
            Err(err) => Err(err),
        }
    }

    pub fn save(&mut self, tasks: &[Task]) -> Result<(), StorageError> {
        let blob = serde_json::to_vec_pretty(tasks).map_err(StorageError::Encode)?;
        self.store.write(&self.key, &blob)?;
        tracing::debug!(key = %self.key, count = tasks.len(), "saved tasks");
        Ok(())
    }

    fn free_backup_key(&self, key: &str) -> Result<String, StorageError> {
        let base = format!("{key}{CORRUPT_SUFFIX}");
        if self.store.read(&base)?.is_none() {
            return Ok(base);
        }
        let mut n = 1u32;
        loop {
            let candidate = format!("{base}.{n}");
            if self.store.read(&candidate)?.is_none() {
                return Ok(candidate);
            }
            n += 1;
        }
    }
}
