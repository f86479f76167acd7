//! Durable Storage Module
//!
//! Key/value storage of JSON text that survives the in-memory store being
//! dropped and rebuilt. Every operation returns a `Result`; the cache store
//! collapses failures into a miss or a no-op.

use std::collections::HashMap;
use std::fmt::Debug;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use directories::ProjectDirs;
use sha2::{Digest, Sha256};

use crate::error::DurableError;

/// Result type for durable storage operations.
pub type DurableResult<T> = std::result::Result<T, DurableError>;

// == Durable Storage Trait ==
/// Persistent key -> JSON text storage.
pub trait DurableStorage: Debug + Send + Sync {
    /// Reads the text stored under `key`, `Ok(None)` if there is none.
    fn get_item(&self, key: &str) -> DurableResult<Option<String>>;

    /// Stores `text` under `key`, replacing any previous text.
    fn set_item(&self, key: &str, text: &str) -> DurableResult<()>;

    /// Removes `key`. Removing a missing key succeeds.
    fn remove_item(&self, key: &str) -> DurableResult<()>;
}

// == Memory Durable ==
/// In-process durable storage.
///
/// Clones share the same map, so a store rebuilt over a clone sees what the
/// previous store persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryDurable {
    items: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryDurable {
    /// Creates an empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored items.
    pub fn len(&self) -> usize {
        self.items.lock().map(|items| items.len()).unwrap_or(0)
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> DurableResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.items
            .lock()
            .map_err(|e| DurableError::Unavailable(e.to_string()))
    }
}

impl DurableStorage for MemoryDurable {
    fn get_item(&self, key: &str) -> DurableResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, text: &str) -> DurableResult<()> {
        self.lock()?.insert(key.to_string(), text.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> DurableResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

// == File Durable ==
/// One `<sha256(key)>.json` file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileDurable {
    dir: PathBuf,
}

impl FileDurable {
    /// Uses the XDG cache directory (`~/.cache/fetch_cache/` on Linux).
    ///
    /// Returns `None` if no home directory can be determined.
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "fetch_cache")?;
        Some(Self::with_dir(project_dirs.cache_dir().to_path_buf()))
    }

    /// Uses a custom directory. It is created on first write.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn item_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(key)))
    }

    fn io_error(key: &str, source: std::io::Error) -> DurableError {
        DurableError::Io {
            key: key.to_string(),
            source,
        }
    }
}

impl DurableStorage for FileDurable {
    fn get_item(&self, key: &str) -> DurableResult<Option<String>> {
        match fs::read_to_string(self.item_path(key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::io_error(key, e)),
        }
    }

    fn set_item(&self, key: &str, text: &str) -> DurableResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| Self::io_error(key, e))?;
        fs::write(self.item_path(key), text).map_err(|e| Self::io_error(key, e))
    }

    fn remove_item(&self, key: &str) -> DurableResult<()> {
        match fs::remove_file(self.item_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_error(key, e)),
        }
    }
}

/// Maps a key to a fixed-length file stem (hex SHA-256 of the key).
fn file_stem(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}
