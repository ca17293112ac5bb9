//! Durable key-value slots for the cart.
//!
//! The cart is written as one serialized JSON array under a fixed key. Two
//! backends are provided:
//!
//! - [`MemoryStorage`] - in-process map, lost on exit
//! - [`FileStorage`] - one `<key>.json` file per slot under a directory

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Key of the slot holding the cart's line items.
pub const CART_STORAGE_KEY: &str = "cart";

/// Errors that can occur reading or writing a storage slot.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The slot key cannot be used as a file name.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
}

/// A durable string slot addressed by key.
///
/// Reads return `Ok(None)` when the slot has never been written.
pub trait CartStorage: Send {
    /// Read the slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the slot's contents.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn write(&mut self, key: &str, payload: &str) -> Result<(), StorageError>;
}

// =============================================================================
// Memory Storage
// =============================================================================

/// Storage that lives only as long as the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: HashMap<String, String>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage with one slot pre-populated.
    #[must_use]
    pub fn with_slot(key: &str, payload: impl Into<String>) -> Self {
        let mut slots = HashMap::new();
        slots.insert(key.to_owned(), payload.into());
        Self { slots }
    }

    /// Current contents of a slot.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.slots.get(key).map(String::as_str)
    }
}

impl CartStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.slots.get(key).cloned())
    }

    fn write(&mut self, key: &str, payload: &str) -> Result<(), StorageError> {
        self.slots.insert(key.to_owned(), payload.to_owned());
        Ok(())
    }
}

// =============================================================================
// File Storage
// =============================================================================

/// Storage backed by JSON files in a directory.
///
/// The directory is created on first write. Writes go to a temporary sibling
/// file which is then renamed over the slot, so a slot is never observed
/// half-written.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidKey`] if the key is empty or contains
    /// path separators.
    pub fn slot_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'));
        if !valid {
            return Err(StorageError::InvalidKey(key.to_owned()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl CartStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.slot_path(key)?;
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    fn write(&mut self, key: &str, payload: &str) -> Result<(), StorageError> {
        let path = self.slot_path(key)?;
        std::fs::create_dir_all(&self.dir).map_err(|source| StorageError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, payload).map_err(|source| StorageError::Io {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &path)
            .map_err(|source| StorageError::Io { path, source })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_roundtrip() {
        let mut storage = MemoryStorage::new();
        assert!(storage.read(CART_STORAGE_KEY).unwrap().is_none());

        storage.write(CART_STORAGE_KEY, "[]").unwrap();
        let stored = storage.read(CART_STORAGE_KEY).unwrap();
        assert_eq!(stored.as_deref(), Some("[]"));
    }

    #[test]
    fn test_file_storage_missing_slot_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        assert!(storage.read(CART_STORAGE_KEY).unwrap().is_none());
    }

    #[test]
    fn test_file_storage_creates_dir_and_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path().join("nested"));

        storage.write(CART_STORAGE_KEY, r#"[{"id":1}]"#).unwrap();
        assert_eq!(
            storage.read(CART_STORAGE_KEY).unwrap().as_deref(),
            Some(r#"[{"id":1}]"#)
        );
        assert!(dir.path().join("nested/cart.json").exists());
        assert!(!dir.path().join("nested/cart.json.tmp").exists());
    }

    #[test]
    fn test_file_storage_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path());

        storage.write(CART_STORAGE_KEY, "[1]").unwrap();
        storage.write(CART_STORAGE_KEY, "[2]").unwrap();
        let stored = storage.read(CART_STORAGE_KEY).unwrap();
        assert_eq!(stored.as_deref(), Some("[2]"));
    }

    #[test]
    fn test_file_storage_rejects_path_keys() {
        let storage = FileStorage::new("/tmp");
        assert!(matches!(
            storage.slot_path("../etc/passwd"),
            Err(StorageError::InvalidKey(_))
        ));
        let empty = storage.slot_path("");
        assert!(matches!(empty, Err(StorageError::InvalidKey(_))));
    }
}
