//! Core data types for the indexing and search pipeline.
//!
//! These types represent the sentence records that flow from extraction into
//! the store and the match records that flow back out of search.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// One page-numbered sentence unit in the index. Immutable once created.
///
/// Page numbers are 1-based: extraction works with 0-based page indices
/// internally and the record externalizes the human-facing number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentenceRecord {
    pub page_number: u32,
    pub text: String,
}

/// Durable mapping from document title to its ordered sentence records.
///
/// Per-title order is ascending page number, stable within a page. A `BTreeMap`
/// keeps titles sorted so the persisted JSON is deterministic.
pub type DocumentIndex = BTreeMap<String, Vec<SentenceRecord>>;

/// One page unit that failed during a parallel build.
#[derive(Debug, Clone)]
pub struct PageFailure {
    pub page_number: u32,
    pub reason: String,
}

/// The per-title slice of a [`DocumentIndex`] produced by one build, plus the
/// pages that failed instead of being silently dropped.
#[derive(Debug, Clone)]
pub struct IndexFragment {
    pub records: Vec<SentenceRecord>,
    pub failures: Vec<PageFailure>,
}

/// A match from the primary document index.
///
/// `keyword` preserves the caller's casing; `sentence` carries `<em>` markers
/// around every case-insensitive occurrence of the keyword.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentMatch {
    pub keyword: String,
    pub page_number: u32,
    pub title: String,
    pub sentence: String,
}

/// Which knowledge-base field a keyword matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KnowledgeField {
    ProblemDescription,
    Solution,
}

impl std::fmt::Display for KnowledgeField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KnowledgeField::ProblemDescription => write!(f, "problem"),
            KnowledgeField::Solution => write!(f, "solution"),
        }
    }
}

/// A match from the secondary knowledge base: one per entry, keyword, and
/// matched field, carrying both the original and the highlighted text.
#[derive(Debug, Clone, Serialize)]
pub struct KnowledgeMatch {
    pub name: String,
    pub keyword: String,
    pub field: KnowledgeField,
    pub text: String,
    pub highlighted: String,
    pub chapter: String,
    pub chapter_page: String,
}

/// Everything a search returns: matches from both sources plus the time spent
/// loading and scanning the primary index.
#[derive(Debug)]
pub struct SearchOutcome {
    pub document_matches: Vec<DocumentMatch>,
    pub knowledge_matches: Vec<KnowledgeMatch>,
    pub elapsed: Duration,
}

impl SearchOutcome {
    /// Total result count across both sources.
    pub fn total(&self) -> usize {
        self.document_matches.len() + self.knowledge_matches.len()
    }
}
