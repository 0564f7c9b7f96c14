//! Durable client-side key-value storage.
//!
//! The browser build of Cafecraft kept everything in `localStorage`; the
//! native shells get the same contract here: string keys, JSON string values,
//! survives process restart. One file per key keeps the format inspectable
//! and lets keys be wiped independently.

use std::collections::HashMap;
use std::path::PathBuf;

use parking_lot::Mutex;

use crate::error::StorageError;

/// Fixed storage keys shared by the state layer.
pub mod keys {
    /// Bearer token attached to outbound API requests.
    pub const ACCESS_TOKEN: &str = "access_token";

    /// Refresh token; cleared together with the access token, never read
    /// by the state layer itself.
    pub const REFRESH_TOKEN: &str = "refresh_token";

    /// Cached user profile for the signed-in owner.
    pub const USER: &str = "user";

    /// Persisted cart contents.
    pub const CART: &str = "cart-storage";
}

/// Storage abstraction over durable key-value state.
///
/// Values are already-serialized JSON strings; serialization lives with the
/// owning store so each store controls its own format.
pub trait StorageBackend: Send + Sync {
    /// Get a value by key. Absent keys are `Ok(None)`, not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Set a value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the backing store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a value. Removing an absent key is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the backing store cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// File-backed storage: one JSON file per key under a fixed directory.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open (creating if needed) a storage directory.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl StorageBackend for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        std::fs::write(self.path(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory storage for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStorage {
    map: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.map.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.map.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.map.lock().remove(key);
        Ok(())
    }
}
