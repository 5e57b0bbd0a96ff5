//! # docdex
//!
//! A per-page sentence index and keyword search engine for PDF manuals,
//! with a secondary problem/solution knowledge base searched alongside it.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────┐   ┌───────────┐   ┌──────────┐   ┌───────────┐
//! │   PDF    │──▶│ Extract +  │──▶│ Parallel  │──▶│ JSON index │
//! │  (lopdf) │   │ Segment    │   │ Indexer   │   │   store    │
//! └──────────┘   └───────────┘   └──────────┘   └─────┬─────┘
//!                                                     │
//!                               ┌──────────────┐      ▼
//!                               │ Knowledge DB  │──▶ Search
//!                               └──────────────┘
//! ```
//!
//! A document is opened ([`extract::PdfDocument`]), each page's text is split
//! into sentences ([`segment`]), page units run concurrently and are
//! re-ordered by page number ([`indexer`]), and the resulting fragment is
//! merged into a durable JSON store keyed by document title ([`store`]).
//! Searches ([`search`]) scan the store and the knowledge base
//! ([`knowledge`]) with case-insensitive substring matching and
//! case-preserving `<em>` highlighting.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`error`] | Error taxonomy |
//! | [`extract`] | PDF page extraction |
//! | [`segment`] | Sentence segmentation |
//! | [`indexer`] | Parallel index building |
//! | [`store`] | Durable JSON index store |
//! | [`knowledge`] | Secondary knowledge base |
//! | [`search`] | Keyword search and highlighting |
//! | [`toc`] | Table-of-contents extraction |
//! | [`ingest`] | Add/remove orchestration |
//! | [`progress`] | Build progress reporting |

pub mod config;
pub mod error;
pub mod extract;
pub mod indexer;
pub mod ingest;
pub mod knowledge;
pub mod models;
pub mod progress;
pub mod search;
pub mod segment;
pub mod store;
pub mod toc;
