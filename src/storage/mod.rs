//! Lifetime Stats Storage
//!
//! A store holds one opaque JSON document. Parsing and recovery from a
//! corrupt document belong to [`crate::game::stats`]; a store only moves
//! bytes.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing::debug;

/// Persistent slot for the lifetime stats record.
pub trait StatsStore: Send + Sync {
    /// Stored document, or `None` if nothing was ever saved.
    fn load(&self) -> Result<Option<String>, StorageError>;

    /// Replace the stored document.
    fn save(&self, document: &str) -> Result<(), StorageError>;
}

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem failure.
    #[error("stats file {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The in-memory store's lock was poisoned by a panicking writer.
    #[error("stats store lock poisoned")]
    Poisoned,
}

// =============================================================================
// FILE STORE
// =============================================================================

/// Stats kept in a single JSON file.
///
/// Writes go to a sibling temp file first and are renamed over the
/// target, so a crash mid-write leaves the previous record intact.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store backed by `path`. Nothing is touched until the first call.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Target file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl StatsStore for JsonFileStore {
    fn load(&self) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn save(&self, document: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let temp = self.temp_path();
        let mut file = std::fs::File::create(&temp).map_err(|e| self.io_error(e))?;
        file.write_all(document.as_bytes())
            .and_then(|_| file.sync_all())
            .map_err(|e| self.io_error(e))?;
        drop(file);

        std::fs::rename(&temp, &self.path).map_err(|e| self.io_error(e))?;
        debug!(path = %self.path.display(), bytes = document.len(), "Stats saved");
        Ok(())
    }
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// Process-local store, for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    document: Mutex<Option<String>>,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with `document`.
    pub fn with_document(document: impl Into<String>) -> Self {
        Self {
            document: Mutex::new(Some(document.into())),
        }
    }
}

impl StatsStore for MemoryStore {
    fn load(&self) -> Result<Option<String>, StorageError> {
        let guard = self.document.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(guard.clone())
    }

    fn save(&self, document: &str) -> Result<(), StorageError> {
        let mut guard = self.document.lock().map_err(|_| StorageError::Poisoned)?;
        *guard = Some(document.to_string());
        Ok(())
    }
}

impl<T: StatsStore + ?Sized> StatsStore for std::sync::Arc<T> {
    fn load(&self) -> Result<Option<String>, StorageError> {
        (**self).load()
    }

    fn save(&self, document: &str) -> Result<(), StorageError> {
        (**self).save(document)
    }
}
