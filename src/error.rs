//! Typed errors for the indexing and search engine.
//!
//! Every variant is recoverable at the CLI boundary and maps to a structured,
//! human-readable message — except [`Error::CorruptStore`]: a persisted index
//! that no longer parses cannot be repaired automatically.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The document could not be opened or parsed at all. Aborts the whole
    /// build for that title; nothing is persisted.
    #[error("failed to open document {path}: {source}")]
    FatalExtraction {
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },

    /// A single page's text could not be extracted. Callers record this as a
    /// per-page failure and continue with the remaining pages.
    #[error("failed to extract page {page} of {path}: {source}")]
    PageExtraction {
        page: u32,
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },

    /// Search was attempted before any document was indexed. Distinct from a
    /// successful search with zero matches.
    #[error("index is empty; add a document before searching")]
    EmptyIndex,

    /// The title is already present in the store. Rejected before any
    /// extraction work begins.
    #[error("'{0}' has already been indexed")]
    DuplicateTitle(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// A title passed to the resolver without the `.pdf` extension.
    #[error("title '{0}' must include the .pdf extension")]
    InvalidTitle(String),

    /// A file the extractor does not handle.
    #[error("unsupported file type: {}", .0.display())]
    UnsupportedFile(PathBuf),

    /// The persisted store no longer parses. Unrecoverable for that store.
    #[error("store {path} is corrupt: {source}")]
    CorruptStore {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
