//! Durable key/value storage behind a capability trait.
//!
//! Filter stores only ever see [`StorageProvider`]; the concrete backend is
//! picked at the composition root (a JSON file for the CLI, memory in tests).

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use std::rc::Rc;
use std::sync::Arc;

use crate::errors::StorageResult;

/// Get/set access to a durable string store.
///
/// Either call may fail; callers are expected to recover from every error.
/// Writes are last-write-wins with no versioning.
pub trait StorageProvider {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
}

impl<T: StorageProvider + ?Sized> StorageProvider for &T {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }
}

impl<T: StorageProvider + ?Sized> StorageProvider for Rc<T> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }
}

impl<T: StorageProvider + ?Sized> StorageProvider for Arc<T> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }
}
