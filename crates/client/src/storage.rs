//! Durable local documents.
//!
//! A [`LocalStore`] keeps small JSON documents by key, the way a browser
//! keeps `localStorage` entries. [`FileStore`] writes one file per key under a
//! directory; [`MemoryStore`] is for tests and throwaway sessions.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::error::ClientError;

/// Key/value document storage.
pub trait LocalStore: Send + Sync {
    /// Read a document. `None` if the key was never written or was removed.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Io` if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, ClientError>;

    /// Write a document, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Io` if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), ClientError>;

    /// Delete a document. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Io` if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), ClientError>;
}

/// One `{key}.json` file per document.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Store documents under `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the documents.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl LocalStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, ClientError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ClientError> {
        std::fs::create_dir_all(&self.dir)?;

        // Write-then-rename so a crash never leaves half a document
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ClientError> {
        match std::fs::remove_file(self.path_for(key)) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// Process-local documents.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, ClientError> {
        let docs = self.docs.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(docs.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ClientError> {
        let mut docs = self.docs.lock().unwrap_or_else(PoisonError::into_inner);
        docs.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ClientError> {
        let mut docs = self.docs.lock().unwrap_or_else(PoisonError::into_inner);
        docs.remove(key);
        Ok(())
    }
}

impl<T: LocalStore + ?Sized> LocalStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, ClientError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ClientError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), ClientError> {
        (**self).remove(key)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested"));

        assert_eq!(store.get("cartItems").unwrap(), None);
        store.set("cartItems", "[]").unwrap();
        assert_eq!(store.get("cartItems").unwrap().as_deref(), Some("[]"));

        store.remove("cartItems").unwrap();
        assert_eq!(store.get("cartItems").unwrap(), None);
        // Removing twice is fine
        store.remove("cartItems").unwrap();
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        FileStore::new(dir.path()).set("wishlist", "[1]").unwrap();

        let reopened = FileStore::new(dir.path());
        assert_eq!(reopened.get("wishlist").unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn test_memory_store_overwrites() {
        let store = MemoryStore::new();
        store.set("user", "a").unwrap();
        store.set("user", "b").unwrap();
        assert_eq!(store.get("user").unwrap().as_deref(), Some("b"));
    }
}
