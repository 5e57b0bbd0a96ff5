//! Document ingestion and removal.
//!
//! `add_document` is the upload path: sanitize the filename into a title,
//! reject duplicates before any extraction work, copy the file into the
//! library directory, build the fragment in parallel, and merge it into the
//! store. `remove_document` deletes both the index entry and the library
//! copy. Titles resolve back to files by exact filename match under the
//! library root.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::extract::PdfDocument;
use crate::indexer::build_index;
use crate::models::PageFailure;
use crate::progress::ProgressObserver;
use crate::store::IndexStore;

/// Summary of one successful ingest.
#[derive(Debug)]
pub struct AddOutcome {
    pub title: String,
    pub pages: usize,
    pub sentences: usize,
    pub failures: Vec<PageFailure>,
}

/// Summary of one removal.
#[derive(Debug)]
pub struct RemoveOutcome {
    pub title: String,
    pub remaining: Vec<String>,
}

/// Derive a title from a filename: keep ASCII alphanumerics, `-`, `_` and
/// `.`, map interior whitespace runs to a single `_`, drop everything else.
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_sep = false;
    for c in name.chars() {
        if c.is_whitespace() {
            pending_sep = !out.is_empty();
            continue;
        }
        if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
            if pending_sep {
                out.push('_');
                pending_sep = false;
            }
            out.push(c);
        }
    }
    out
}

/// Index one PDF and merge it into the store under its sanitized title.
pub async fn add_document(
    config: &Config,
    path: &Path,
    observer: &dyn ProgressObserver,
) -> Result<AddOutcome> {
    if !path.is_file() {
        return Err(Error::NotFound(format!("no such file: {}", path.display())));
    }
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::UnsupportedFile(path.to_path_buf()))?;
    let title = sanitize_filename(file_name);
    if !title.to_lowercase().ends_with(".pdf") {
        return Err(Error::UnsupportedFile(path.to_path_buf()));
    }

    let store = IndexStore::open(&config.storage.index_path);
    if store.contains(&title)? {
        return Err(Error::DuplicateTitle(title));
    }

    let doc = Arc::new(PdfDocument::open(path)?);

    // Copy into the library before indexing so the title resolves afterwards.
    fs::create_dir_all(&config.storage.library_dir)?;
    let dest = config.storage.library_dir.join(&title);
    let already_in_library =
        dest.exists() && fs::canonicalize(&dest).ok() == fs::canonicalize(path).ok();
    if !already_in_library {
        fs::copy(path, &dest)?;
    }

    let pages = doc.page_count();
    let fragment = build_index(doc, &config.indexing, observer).await?;
    let sentences = fragment.records.len();
    store.merge(&title, fragment.records)?;
    info!(title = %title, pages, sentences, "document indexed");

    Ok(AddOutcome {
        title,
        pages,
        sentences,
        failures: fragment.failures,
    })
}

/// Remove a title from the index and delete its library copy.
pub fn remove_document(config: &Config, title: &str) -> Result<RemoveOutcome> {
    let store = IndexStore::open(&config.storage.index_path);
    let remaining = store.remove(title)?;

    // Deleting the file is best effort: the index entry is already gone.
    match resolve_title(&config.storage.library_dir, title) {
        Ok(path) => fs::remove_file(&path)?,
        Err(Error::NotFound(_)) => {
            warn!(title, "no library file to delete for removed title");
        }
        Err(e) => return Err(e),
    }

    Ok(RemoveOutcome {
        title: title.to_string(),
        remaining,
    })
}

/// Resolve a title back to its file by exact filename match under
/// `library_dir`. The title must carry the `.pdf` extension.
pub fn resolve_title(library_dir: &Path, title: &str) -> Result<PathBuf> {
    if !title.to_lowercase().ends_with(".pdf") {
        return Err(Error::InvalidTitle(title.to_string()));
    }
    if !library_dir.is_dir() {
        return Err(Error::NotFound(format!(
            "library directory {}",
            library_dir.display()
        )));
    }
    for entry in WalkDir::new(library_dir) {
        let entry = entry.map_err(|e| Error::Io(e.into()))?;
        if entry.file_type().is_file() && entry.file_name().to_string_lossy() == title {
            return Ok(entry.into_path());
        }
    }
    Err(Error::NotFound(format!(
        "no file named '{}' in the library",
        title
    )))
}
