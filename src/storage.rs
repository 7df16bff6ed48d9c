//! Persistent key-value backing for session and preference state.
//!
//! The stores never talk to a storage medium directly; they go through the
//! [`KeyValueStore`] port so they stay testable without a real disk. Two
//! backends ship with the crate: an in-memory map and a single-file JSON
//! document written atomically.
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to write storage file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize storage document: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The backing mutex was poisoned by a panicking writer.
    #[error("Storage backing is unavailable")]
    Unavailable,
}

// ============================================================================
// KeyValueStore Port
// ============================================================================

/// Synchronous string-keyed storage that survives restarts (for the file
/// backend) within one profile directory.
///
/// Contract: `get` returns `None` for absent *or unreadable* entries — a
/// degraded medium must look like an empty one, never like an error. Writes
/// may fail; callers treat a failed write as a lost persistence opportunity,
/// not a failed operation.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Key under which the serialized session (user + token) lives.
pub const SESSION_KEY: &str = "auth-session";
/// Key under which the serialized theme preference lives.
pub const THEME_KEY: &str = "theme-preference";

// ============================================================================
// MemoryStore
// ============================================================================

/// Volatile backend: a mutex-guarded map. Default for tests and for runs
/// where the user has opted out of on-disk persistence.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Unavailable)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Unavailable)?;
        entries.remove(key);
        Ok(())
    }
}

// ============================================================================
// FileStore
// ============================================================================

/// Durable backend: the whole keyspace is one JSON object on disk.
///
/// Reads happen once at open; the in-memory map is authoritative afterward
/// and every mutation rewrites the file. A corrupt or unreadable file
/// degrades to an empty map with a warning — losing a saved session is
/// recoverable, refusing to start is not.
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileStore {
    /// Maximum storage file size (1 MB). Anything larger is treated as
    /// corrupt rather than read into memory.
    const MAX_FILE_SIZE: u64 = 1_048_576;

    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = Self::read_document(&path);
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    fn read_document(path: &Path) -> HashMap<String, String> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                tracing::warn!(
                    path = %path.display(),
                    size = meta.len(),
                    "Storage file exceeds size limit, starting empty"
                );
                return HashMap::new();
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No storage file found, starting empty");
                return HashMap::new();
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Storage file unreadable, starting empty");
                return HashMap::new();
            }
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Storage file unreadable, starting empty");
                return HashMap::new();
            }
        };

        match serde_json::from_str(&content) {
            Ok(map) => map,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Storage file corrupt, starting empty");
                HashMap::new()
            }
        }
    }

    /// Write the document via temp-file-then-rename so the file on disk is
    /// never observed half-written.
    fn write_document(&self, entries: &HashMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(entries)?;

        // Randomized temp name so concurrent writers cannot collide on it.
        use std::time::{SystemTime, UNIX_EPOCH};
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let temp_path = self.path.with_extension(format!("tmp.{:016x}", suffix));

        std::fs::write(&temp_path, json.as_bytes())?;
        if let Err(e) = std::fs::rename(&temp_path, &self.path) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(StorageError::Io(e));
        }
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Unavailable)?;
        entries.insert(key.to_string(), value.to_string());
        self.write_document(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Unavailable)?;
        entries.remove(key);
        self.write_document(&entries)
    }
}

// ============================================================================
// Tests
// ============================================================================
