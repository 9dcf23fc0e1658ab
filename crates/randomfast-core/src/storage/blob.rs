//! The persistence seam.
//!
//! Stores read their blob once at startup and write it back after every
//! mutation. Anything that can `load` and `save` a string by key will do.

use std::cell::RefCell;
use std::collections::HashMap;

use super::Database;
use crate::error::Result;

/// Key-value blob storage used by the stores.
pub trait BlobStore {
    /// Read the blob stored under `key`, if any.
    fn load(&self, key: &str) -> Result<Option<String>>;

    /// Replace the blob stored under `key`.
    fn save(&self, key: &str, blob: &str) -> Result<()>;
}

impl BlobStore for Database {
    fn load(&self, key: &str) -> Result<Option<String>> {
        self.kv_get(key)
    }

    fn save(&self, key: &str, blob: &str) -> Result<()> {
        self.kv_set(key, blob)
    }
}

impl<T: BlobStore + ?Sized> BlobStore for &T {
    fn load(&self, key: &str) -> Result<Option<String>> {
        (**self).load(key)
    }

    fn save(&self, key: &str, blob: &str) -> Result<()> {
        (**self).save(key, blob)
    }
}

/// In-process blob storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: RefCell<HashMap<String, String>>,
    writes: RefCell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a blob without counting it as a write.
    pub fn with_blob(self, key: &str, blob: &str) -> Self {
        self.blobs
            .borrow_mut()
            .insert(key.to_string(), blob.to_string());
        self
    }

    /// Raw blob currently stored under `key`.
    pub fn get(&self, key: &str) -> Option<String> {
        self.blobs.borrow().get(key).cloned()
    }

    /// Number of `save` calls so far.
    pub fn write_count(&self) -> usize {
        *self.writes.borrow()
    }
}

impl BlobStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.get(key))
    }

    fn save(&self, key: &str, blob: &str) -> Result<()> {
        self.blobs
            .borrow_mut()
            .insert(key.to_string(), blob.to_string());
        *self.writes.borrow_mut() += 1;
        Ok(())
    }
}
