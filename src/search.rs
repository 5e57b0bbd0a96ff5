//! Keyword search over the document index and the knowledge base.
//!
//! Matching is a case-insensitive substring test; a sentence matching several
//! keywords produces one result per keyword, not one merged entry. Matched
//! spans are wrapped in `<em>…</em>` with the original casing preserved.
//! The reported duration covers the primary index load and scan only.

use std::time::Instant;

use tracing::debug;

use crate::error::{Error, Result};
use crate::knowledge::{KnowledgeBase, KnowledgeEntry};
use crate::models::{
    DocumentIndex, DocumentMatch, KnowledgeField, KnowledgeMatch, SearchOutcome,
};
use crate::store::IndexStore;

/// Wrap every case-insensitive occurrence of `keyword` in `<em>…</em>`,
/// preserving the matched span's casing. Matches are non-overlapping, left to
/// right. An empty keyword returns the text unchanged.
pub fn highlight(text: &str, keyword: &str) -> String {
    if keyword.is_empty() {
        return text.to_string();
    }
    let needle = keyword.to_lowercase();

    // Lowercased haystack plus a per-byte map back to the start of the
    // original character that produced each lowered byte.
    let mut lower = String::with_capacity(text.len());
    let mut map: Vec<usize> = Vec::with_capacity(text.len() + 1);
    for (orig_idx, ch) in text.char_indices() {
        for lowered in ch.to_lowercase() {
            for _ in 0..lowered.len_utf8() {
                map.push(orig_idx);
            }
            lower.push(lowered);
        }
    }
    map.push(text.len());

    let mut out = String::with_capacity(text.len() + 16);
    let mut copied = 0usize; // byte position in `text`
    let mut pos = 0usize; // byte position in `lower`
    while let Some(found) = lower[pos..].find(&needle) {
        let start = pos + found;
        let end = start + needle.len();
        let orig_start = map[start];
        let mut orig_end = map[end];
        if orig_end <= orig_start {
            // The match ended inside a character that expanded when lowered
            // (e.g. 'İ'); wrap the whole original character.
            orig_end = text[orig_start..]
                .chars()
                .next()
                .map(|c| orig_start + c.len_utf8())
                .unwrap_or(text.len());
        }
        if orig_start >= copied {
            out.push_str(&text[copied..orig_start]);
            out.push_str("<em>");
            out.push_str(&text[orig_start..orig_end]);
            out.push_str("</em>");
            copied = orig_end;
        }
        pos = end;
    }
    out.push_str(&text[copied..]);
    out
}

fn contains_ci(text: &str, keyword: &str) -> bool {
    !keyword.is_empty() && text.to_lowercase().contains(&keyword.to_lowercase())
}

/// Scan the primary index: every (title, record) pair — optionally restricted
/// to one title — against every keyword.
pub fn search_index(
    index: &DocumentIndex,
    keywords: &[String],
    title_filter: Option<&str>,
) -> Vec<DocumentMatch> {
    let mut matches = Vec::new();
    for (title, records) in index {
        if let Some(filter) = title_filter {
            if title != filter {
                continue;
            }
        }
        for record in records {
            for keyword in keywords {
                if contains_ci(&record.text, keyword) {
                    matches.push(DocumentMatch {
                        keyword: keyword.clone(),
                        page_number: record.page_number,
                        title: title.clone(),
                        sentence: highlight(&record.text, keyword),
                    });
                }
            }
        }
    }
    matches
}

/// Scan the knowledge base: one match per entry, keyword, and matched field.
pub fn search_knowledge(entries: &[KnowledgeEntry], keywords: &[String]) -> Vec<KnowledgeMatch> {
    let mut matches = Vec::new();
    for entry in entries {
        for keyword in keywords {
            let fields = [
                (KnowledgeField::ProblemDescription, &entry.problem_description),
                (KnowledgeField::Solution, &entry.solution),
            ];
            for (field, text) in fields {
                if contains_ci(text, keyword) {
                    matches.push(KnowledgeMatch {
                        name: entry.name.clone(),
                        keyword: keyword.clone(),
                        field,
                        text: text.clone(),
                        highlighted: highlight(text, keyword),
                        chapter: entry.chapter.clone(),
                        chapter_page: entry.chapter_page.clone(),
                    });
                }
            }
        }
    }
    matches
}

/// Run a full search against the store and the knowledge base.
///
/// Fails with [`Error::EmptyIndex`] when nothing has been indexed yet, so
/// callers can tell "no index" apart from "no matches".
pub fn search(
    store: &IndexStore,
    knowledge: &KnowledgeBase,
    keywords: &[String],
    title_filter: Option<&str>,
) -> Result<SearchOutcome> {
    let start = Instant::now();
    let index = store.load()?;
    if index.is_empty() {
        return Err(Error::EmptyIndex);
    }
    let document_matches = search_index(&index, keywords, title_filter);
    let elapsed = start.elapsed();

    let knowledge_matches = search_knowledge(&knowledge.load()?, keywords);
    debug!(
        documents = document_matches.len(),
        knowledge = knowledge_matches.len(),
        ?elapsed,
        "search complete"
    );
    Ok(SearchOutcome {
        document_matches,
        knowledge_matches,
        elapsed,
    })
}
