//! PDF page extraction.
//!
//! Wraps a parsed [`lopdf::Document`] behind the small surface the indexer
//! needs: a page count and per-page text. Failure to open or parse the file
//! is fatal for the whole build; a per-page extraction error is reported by
//! the page unit that hit it and does not abort the others.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// An opened document. Cheap to share across worker threads behind an `Arc`;
/// all accessors take `&self`.
pub struct PdfDocument {
    doc: lopdf::Document,
    path: PathBuf,
    /// 1-based page numbers in document order, as lopdf reports them.
    page_order: Vec<u32>,
    /// Page object id → 1-based page number, for destination resolution.
    page_ids: HashMap<lopdf::ObjectId, u32>,
}

impl PdfDocument {
    pub fn open(path: &Path) -> Result<Self> {
        let doc = lopdf::Document::load(path).map_err(|source| Error::FatalExtraction {
            path: path.to_path_buf(),
            source,
        })?;
        let pages = doc.get_pages();
        let page_order: Vec<u32> = pages.keys().copied().collect();
        let page_ids: HashMap<lopdf::ObjectId, u32> =
            pages.iter().map(|(number, id)| (*id, *number)).collect();
        Ok(Self {
            doc,
            path: path.to_path_buf(),
            page_order,
            page_ids,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn page_count(&self) -> usize {
        self.page_order.len()
    }

    /// Raw text of the page at `index` (0-based).
    pub fn page_text(&self, index: usize) -> Result<String> {
        let page_number = self.page_order.get(index).copied().ok_or_else(|| {
            Error::NotFound(format!("page {} of {}", index, self.path.display()))
        })?;
        self.doc
            .extract_text(&[page_number])
            .map_err(|source| Error::PageExtraction {
                page: page_number,
                path: self.path.clone(),
                source,
            })
    }

    pub(crate) fn raw(&self) -> &lopdf::Document {
        &self.doc
    }

    /// 1-based page number of a page object, if the id names a page.
    pub(crate) fn page_number_for(&self, id: lopdf::ObjectId) -> Option<u32> {
        self.page_ids.get(&id).copied()
    }
}
