//! Table-of-contents extraction from the PDF outline tree.
//!
//! Walks the First/Next sibling chains under the catalog's `/Outlines` entry,
//! resolves each item's destination to a 1-based page number, and keeps only
//! entries whose title starts with a chapter numeral ("1 Introduction" but
//! not "1.2 Details" or "Appendix"). Best effort: items without a resolvable
//! page are skipped, and a document without an outline yields an empty list.
//! TOC entries are derived on demand for navigation; they are never indexed
//! or persisted.

use std::collections::HashSet;

use lopdf::{Dictionary, Object, ObjectId};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::error::Result;
use crate::extract::PdfDocument;

/// One outline entry that passed the numeral filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    pub level: u32,
    pub title: String,
    pub page: u32,
}

static CHAPTER_NUMERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\s|^\d+[^.\d]").expect("valid chapter pattern"));

pub fn extract_toc(doc: &PdfDocument) -> Result<Vec<TocEntry>> {
    let raw = doc.raw();
    let mut entries = Vec::new();

    let first = raw
        .catalog()
        .ok()
        .and_then(|catalog| catalog.get(b"Outlines").ok())
        .and_then(|outlines| outlines.as_reference().ok())
        .and_then(|id| raw.get_dictionary(id).ok())
        .and_then(|outlines| dict_ref(outlines, b"First"));

    let mut seen = HashSet::new();
    walk(doc, first, 1, &mut seen, &mut entries);
    Ok(entries)
}

/// Depth-first walk over an item and its siblings. `seen` guards against
/// cycles in malformed outline trees.
fn walk(
    doc: &PdfDocument,
    node: Option<ObjectId>,
    level: u32,
    seen: &mut HashSet<ObjectId>,
    entries: &mut Vec<TocEntry>,
) {
    let raw = doc.raw();
    let mut current = node;
    while let Some(id) = current {
        if !seen.insert(id) {
            return;
        }
        let dict = match raw.get_dictionary(id) {
            Ok(dict) => dict,
            Err(_) => return,
        };
        if let (Some(title), Some(page)) = (item_title(dict), destination_page(doc, dict)) {
            if CHAPTER_NUMERAL.is_match(&title) {
                entries.push(TocEntry { level, title, page });
            }
        }
        walk(doc, dict_ref(dict, b"First"), level + 1, seen, entries);
        current = dict_ref(dict, b"Next");
    }
}

fn dict_ref(dict: &Dictionary, key: &[u8]) -> Option<ObjectId> {
    dict.get(key).ok().and_then(|obj| obj.as_reference().ok())
}

fn resolve<'a>(raw: &'a lopdf::Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => raw.get_object(*id).ok(),
        other => Some(other),
    }
}

fn item_title(dict: &Dictionary) -> Option<String> {
    match dict.get(b"Title").ok()? {
        Object::String(bytes, _) => Some(decode_text(bytes)),
        _ => None,
    }
}

/// Resolve an item's destination — a direct `/Dest` array or the `/D` array
/// of a GoTo action — to a 1-based page number. Named destinations are not
/// resolved.
fn destination_page(doc: &PdfDocument, dict: &Dictionary) -> Option<u32> {
    let raw = doc.raw();
    let dest = dict
        .get(b"Dest")
        .ok()
        .or_else(|| {
            let action = resolve(raw, dict.get(b"A").ok()?)?.as_dict().ok()?;
            action.get(b"D").ok()
        })?;
    let array = resolve(raw, dest)?.as_array().ok()?;
    let page_ref = array.first()?.as_reference().ok()?;
    doc.page_number_for(page_ref)
}

/// PDF text strings are UTF-16BE when they carry a BOM, otherwise a
/// latin-1-compatible single-byte encoding.
fn decode_text(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&utf16)
    } else {
        bytes.iter().map(|&b| b as char).collect()
    }
}
