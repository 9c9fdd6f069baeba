use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use super::StorageProvider;
use crate::errors::{StorageError, StorageResult};

/// Process-local storage. Nothing survives the process; useful for tests and
/// for sessions that should not touch disk.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a storage pre-populated with the given records.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: RwLock::new(entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect()),
        }
    }

    /// Number of stored records. A poisoned lock still reports its contents.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StorageProvider for MemoryStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| StorageError::unavailable("memory storage lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StorageError::unavailable("memory storage lock poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_write_wins() {
        let storage = MemoryStorage::new();
        storage.set("selectedMonth", "4").unwrap();
        storage.set("selectedMonth", "9").unwrap();
        assert_eq!(storage.get("selectedMonth").unwrap().as_deref(), Some("9"));
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn missing_key_reads_as_none() {
        let storage = MemoryStorage::with_entries([("selectedYear", "2024")]);
        assert_eq!(storage.get("selectedMonth").unwrap(), None);
        assert_eq!(storage.get("selectedYear").unwrap().as_deref(), Some("2024"));
    }

    #[test]
    fn poisoned_lock_still_counts_entries() {
        let storage = MemoryStorage::with_entries([("selectedMonth", "6"), ("selectedYear", "2024")]);
        let outcome = std::thread::scope(|scope| {
            scope
                .spawn(|| {
                    let _guard = storage.entries.write().unwrap();
                    panic!("writer died holding the lock");
                })
                .join()
        });
        assert!(outcome.is_err());

        assert_eq!(storage.len(), 2);
        assert!(!storage.is_empty());
        assert!(matches!(storage.get("selectedMonth"), Err(StorageError::Unavailable { .. })));
    }
}
