//! The secondary knowledge base.
//!
//! An append-only JSON list of problem/solution entries kept alongside the
//! document index and searched with the same keyword contract. The field
//! names in the persisted file are fixed by the existing data format, so the
//! serde renames below are part of the wire contract.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Problem Description")]
    pub problem_description: String,
    #[serde(rename = "Solution")]
    pub solution: String,
    #[serde(rename = "Chapter")]
    pub chapter: String,
    #[serde(rename = "Chapter Page")]
    pub chapter_page: String,
}

pub struct KnowledgeBase {
    path: PathBuf,
}

impl KnowledgeBase {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All entries in insertion order. An absent file is an empty base.
    pub fn load(&self) -> Result<Vec<KnowledgeEntry>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&raw).map_err(|source| Error::CorruptStore {
            path: self.path.clone(),
            source,
        })
    }

    /// Append one entry and persist the whole list atomically.
    pub fn append(&self, entry: KnowledgeEntry) -> Result<()> {
        let mut entries = self.load()?;
        entries.push(entry);
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                fs::create_dir_all(parent)?;
                parent
            }
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, &entries).map_err(|e| Error::Io(e.into()))?;
        tmp.persist(&self.path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }
}
