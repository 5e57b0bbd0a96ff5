//! Durable JSON index store.
//!
//! The store is a single JSON file mapping document title to its ordered
//! sentence records. All operations are whole-store read-modify-write;
//! `merge` and `remove` hold the store mutex across the full
//! load-modify-save cycle so two concurrent writers cannot lose each other's
//! titles. Saves go through a temp file in the same directory followed by a
//! rename, so a concurrent `load` never observes a half-written file.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{DocumentIndex, SentenceRecord};

pub struct IndexStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl IndexStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the whole index. A store that has never been saved is an empty
    /// map; a store that no longer parses is [`Error::CorruptStore`].
    pub fn load(&self) -> Result<DocumentIndex> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(DocumentIndex::new())
            }
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(DocumentIndex::new());
        }
        serde_json::from_str(&raw).map_err(|source| Error::CorruptStore {
            path: self.path.clone(),
            source,
        })
    }

    /// Overwrite the durable representation. The index is written to a temp
    /// file next to the target and renamed into place.
    pub fn save(&self, index: &DocumentIndex) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                fs::create_dir_all(parent)?;
                parent
            }
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, index).map_err(|e| Error::Io(e.into()))?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }

    /// Insert or overwrite `title`'s records (last write wins), then save.
    pub fn merge(&self, title: &str, records: Vec<SentenceRecord>) -> Result<()> {
        let _guard = self.lock();
        let mut index = self.load()?;
        index.insert(title.to_string(), records);
        self.save(&index)?;
        debug!(title, "merged fragment into index store");
        Ok(())
    }

    /// Delete `title` and report the remaining titles. Removing an absent
    /// title is [`Error::NotFound`] and leaves the store untouched.
    pub fn remove(&self, title: &str) -> Result<Vec<String>> {
        let _guard = self.lock();
        let mut index = self.load()?;
        if index.remove(title).is_none() {
            return Err(Error::NotFound(format!("'{}' is not in the index", title)));
        }
        self.save(&index)?;
        Ok(index.keys().cloned().collect())
    }

    pub fn contains(&self, title: &str) -> Result<bool> {
        Ok(self.load()?.contains_key(title))
    }

    /// True when the store is absent or holds no titles.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.load()?.is_empty())
    }

    pub fn titles(&self) -> Result<Vec<String>> {
        Ok(self.load()?.keys().cloned().collect())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ()> {
        // A poisoned lock only means another writer panicked; the file on
        // disk is still a complete snapshot, so continue.
        self.write_lock.lock().unwrap_or_else(|e| e.into_inner())
    }
}
