use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use super::StorageProvider;
use crate::errors::{StorageError, StorageResult};

/// Durable storage kept as a single JSON object on disk.
///
/// Every call goes to the file so values written by another process are seen
/// on the next read. Writes replace the file through a uniquely named sibling
/// temp file, so concurrent writers never share a staging path. A file that no
/// longer parses is replaced on the next write.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> StorageResult<BTreeMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn store(&self, entries: &BTreeMap<String, String>) -> StorageResult<()> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;

        let mut staging = NamedTempFile::new_in(parent)?;
        staging.write_all(&serde_json::to_vec_pretty(entries)?)?;
        staging.as_file().sync_all()?;
        staging.persist(&self.path).map_err(|err| err.error)?;
        Ok(())
    }
}

impl StorageProvider for FileStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut entries = match self.load() {
            Ok(entries) => entries,
            Err(StorageError::Corrupt(err)) => {
                log::warn!("{} is not valid JSON ({err}); rewriting it", self.path.display());
                BTreeMap::new()
            }
            Err(err) => return Err(err),
        };
        entries.insert(key.to_string(), value.to_string());
        log::debug!("writing {key}={value} to {}", self.path.display());
        self.store(&entries)
    }
}
