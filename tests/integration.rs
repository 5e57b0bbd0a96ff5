//! End-to-end tests over generated PDF fixtures.
//!
//! Each test builds a real PDF with `lopdf`, then drives the ingest / search /
//! remove lifecycle against stores in a temp directory and checks the ordering
//! and coverage invariants of the built index.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use tempfile::TempDir;

use docdex::config::{Config, IndexingConfig, StorageConfig};
use docdex::error::Error;
use docdex::extract::PdfDocument;
use docdex::indexer::build_index;
use docdex::ingest;
use docdex::knowledge::{KnowledgeBase, KnowledgeEntry};
use docdex::progress::NoProgress;
use docdex::search;
use docdex::store::IndexStore;
use docdex::toc;

/// Write a PDF with one text run per page.
fn write_pdf(path: &Path, pages: &[&str]) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode page content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).expect("save pdf");
}

/// Write a three-page PDF carrying an outline with chapter, subsection, and
/// prose entries.
fn write_pdf_with_outline(path: &Path) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut page_ids = Vec::new();
    let mut kids: Vec<Object> = Vec::new();
    for text in ["Intro body.", "Detail body.", "Closing body."] {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode page content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        page_ids.push(page_id);
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let outlines_id = doc.new_object_id();
    let chapter_id = doc.new_object_id();
    let subsection_id = doc.new_object_id();
    let prose_id = doc.new_object_id();

    doc.objects.insert(
        chapter_id,
        Object::Dictionary(dictionary! {
            "Title" => Object::string_literal("1 Introduction"),
            "Parent" => outlines_id,
            "Next" => prose_id,
            "First" => subsection_id,
            "Last" => subsection_id,
            "Dest" => vec![page_ids[0].into(), "XYZ".into(), Object::Null, Object::Null, Object::Null],
        }),
    );
    doc.objects.insert(
        subsection_id,
        Object::Dictionary(dictionary! {
            "Title" => Object::string_literal("1.2 Details"),
            "Parent" => chapter_id,
            "Dest" => vec![page_ids[1].into(), "XYZ".into(), Object::Null, Object::Null, Object::Null],
        }),
    );
    doc.objects.insert(
        prose_id,
        Object::Dictionary(dictionary! {
            "Title" => Object::string_literal("Closing Remarks"),
            "Parent" => outlines_id,
            "Dest" => vec![page_ids[2].into(), "XYZ".into(), Object::Null, Object::Null, Object::Null],
        }),
    );
    doc.objects.insert(
        outlines_id,
        Object::Dictionary(dictionary! {
            "Type" => "Outlines",
            "First" => chapter_id,
            "Last" => prose_id,
            "Count" => 3,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
        "Outlines" => outlines_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).expect("save pdf");
}

fn test_config(root: &Path) -> Config {
    Config {
        storage: StorageConfig {
            index_path: root.join("index.json"),
            library_dir: root.join("library"),
            knowledge_path: root.join("knowledge.json"),
        },
        indexing: IndexingConfig {
            workers: 2,
            page_timeout_secs: 30,
        },
    }
}

#[tokio::test]
async fn build_covers_every_page_in_order() {
    let tmp = TempDir::new().unwrap();
    let pdf_path = tmp.path().join("manual.pdf");
    write_pdf(
        &pdf_path,
        &[
            "Page one start. Page one end.",
            "Page two only.",
            "Page three start. Page three end.",
            "Page four only.",
        ],
    );

    let doc = Arc::new(PdfDocument::open(&pdf_path).unwrap());
    assert_eq!(doc.page_count(), 4);

    let opts = IndexingConfig {
        workers: 4,
        page_timeout_secs: 30,
    };
    let fragment = build_index(doc, &opts, &NoProgress).await.unwrap();
    assert!(fragment.failures.is_empty());

    // Non-decreasing page numbers covering exactly 1..=4, none outside.
    let numbers: Vec<u32> = fragment.records.iter().map(|r| r.page_number).collect();
    assert!(numbers.windows(2).all(|w| w[0] <= w[1]));
    let distinct: BTreeSet<u32> = numbers.iter().copied().collect();
    assert_eq!(distinct, (1..=4).collect::<BTreeSet<u32>>());

    // In-page order is extraction order: "start" sentences precede "end".
    let page_one: Vec<&str> = fragment
        .records
        .iter()
        .filter(|r| r.page_number == 1)
        .map(|r| r.text.as_str())
        .collect();
    let start = page_one.iter().position(|t| t.contains("one start"));
    let end = page_one.iter().position(|t| t.contains("one end"));
    assert!(start.unwrap() < end.unwrap());
}

#[tokio::test]
async fn add_search_remove_lifecycle() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(tmp.path());
    let pdf_path = tmp.path().join("manual.pdf");
    write_pdf(
        &pdf_path,
        &[
            "Nothing of note here.",
            "Still nothing.",
            "The Alpha unit requires calibration.",
        ],
    );

    let outcome = ingest::add_document(&cfg, &pdf_path, &NoProgress)
        .await
        .unwrap();
    assert_eq!(outcome.title, "manual.pdf");
    assert_eq!(outcome.pages, 3);
    assert!(outcome.failures.is_empty());
    assert!(cfg.storage.library_dir.join("manual.pdf").is_file());

    // One match on page 3 with the span highlighted.
    let store = IndexStore::open(&cfg.storage.index_path);
    let kb = KnowledgeBase::open(&cfg.storage.knowledge_path);
    let found = search::search(&store, &kb, &["alpha".to_string()], None).unwrap();
    assert_eq!(found.total(), 1);
    let m = &found.document_matches[0];
    assert_eq!(m.keyword, "alpha");
    assert_eq!(m.page_number, 3);
    assert_eq!(m.title, "manual.pdf");
    assert!(
        m.sentence.contains("The <em>Alpha</em> unit requires calibration."),
        "unexpected highlight: {}",
        m.sentence
    );

    // Title filter that matches nothing is a zero-result success.
    let none = search::search(&store, &kb, &["alpha".to_string()], Some("other.pdf")).unwrap();
    assert_eq!(none.total(), 0);

    // Removal deletes both the entry and the library copy.
    let removed = ingest::remove_document(&cfg, "manual.pdf").unwrap();
    assert!(removed.remaining.is_empty());
    assert!(store.is_empty().unwrap());
    assert!(!cfg.storage.library_dir.join("manual.pdf").exists());

    // The store is now empty again: search is a precondition failure.
    let err = search::search(&store, &kb, &["alpha".to_string()], None);
    assert!(matches!(err, Err(Error::EmptyIndex)));
}

#[tokio::test]
async fn duplicate_upload_is_rejected_before_indexing() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(tmp.path());
    let pdf_path = tmp.path().join("manual.pdf");
    write_pdf(&pdf_path, &["Only page."]);

    ingest::add_document(&cfg, &pdf_path, &NoProgress)
        .await
        .unwrap();
    let store = IndexStore::open(&cfg.storage.index_path);
    let before = store.load().unwrap();

    let err = ingest::add_document(&cfg, &pdf_path, &NoProgress).await;
    assert!(matches!(err, Err(Error::DuplicateTitle(ref t)) if t == "manual.pdf"));
    assert_eq!(store.load().unwrap(), before, "store must be unchanged");
}

#[tokio::test]
async fn missing_file_is_not_found() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(tmp.path());

    let err = ingest::add_document(&cfg, &tmp.path().join("ghost.pdf"), &NoProgress).await;
    assert!(matches!(err, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn unparseable_pdf_is_fatal() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(tmp.path());
    let bad = tmp.path().join("bad.pdf");
    std::fs::write(&bad, b"not a pdf at all").unwrap();

    let err = ingest::add_document(&cfg, &bad, &NoProgress).await;
    assert!(matches!(err, Err(Error::FatalExtraction { .. })));

    // Nothing was persisted for that title.
    let store = IndexStore::open(&cfg.storage.index_path);
    assert!(store.is_empty().unwrap());
}

#[tokio::test]
async fn non_pdf_extension_is_unsupported() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(tmp.path());
    let txt = tmp.path().join("notes.txt");
    std::fs::write(&txt, b"plain text").unwrap();

    let err = ingest::add_document(&cfg, &txt, &NoProgress).await;
    assert!(matches!(err, Err(Error::UnsupportedFile(_))));
}

#[tokio::test]
async fn two_documents_search_and_filter() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(tmp.path());

    let first = tmp.path().join("pump.pdf");
    write_pdf(&first, &["The impeller turns freely."]);
    let second = tmp.path().join("valve.pdf");
    write_pdf(&second, &["The impeller housing is sealed."]);

    ingest::add_document(&cfg, &first, &NoProgress).await.unwrap();
    ingest::add_document(&cfg, &second, &NoProgress).await.unwrap();

    let store = IndexStore::open(&cfg.storage.index_path);
    assert_eq!(
        store.titles().unwrap(),
        vec!["pump.pdf".to_string(), "valve.pdf".to_string()]
    );

    let kb = KnowledgeBase::open(&cfg.storage.knowledge_path);
    let all = search::search(&store, &kb, &["impeller".to_string()], None).unwrap();
    assert_eq!(all.total(), 2);

    let only = search::search(&store, &kb, &["impeller".to_string()], Some("pump.pdf")).unwrap();
    assert_eq!(only.total(), 1);
    assert_eq!(only.document_matches[0].title, "pump.pdf");

    // Removing one title leaves the other searchable.
    ingest::remove_document(&cfg, "pump.pdf").unwrap();
    let after = search::search(&store, &kb, &["impeller".to_string()], None).unwrap();
    assert_eq!(after.total(), 1);
    assert_eq!(after.document_matches[0].title, "valve.pdf");
}

#[tokio::test]
async fn knowledge_entries_are_searched_alongside_documents() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(tmp.path());
    let pdf_path = tmp.path().join("manual.pdf");
    write_pdf(&pdf_path, &["Grease the bearing every month."]);

    ingest::add_document(&cfg, &pdf_path, &NoProgress)
        .await
        .unwrap();

    let kb = KnowledgeBase::open(&cfg.storage.knowledge_path);
    kb.append(KnowledgeEntry {
        name: "field tech".to_string(),
        problem_description: "Bearing squeals at startup.".to_string(),
        solution: "Replace the bearing and re-grease.".to_string(),
        chapter: "4 Maintenance".to_string(),
        chapter_page: "37".to_string(),
    })
    .unwrap();

    let store = IndexStore::open(&cfg.storage.index_path);
    let found = search::search(&store, &kb, &["bearing".to_string()], None).unwrap();
    // One sentence match plus one knowledge match per matched field.
    assert_eq!(found.document_matches.len(), 1);
    assert_eq!(found.knowledge_matches.len(), 2);
    assert_eq!(found.total(), 3);
    assert!(found.knowledge_matches[0]
        .highlighted
        .contains("<em>Bearing</em>"));
}

#[test]
fn outline_toc_is_filtered_to_chapter_numerals() {
    let tmp = TempDir::new().unwrap();
    let pdf_path = tmp.path().join("manual.pdf");
    write_pdf_with_outline(&pdf_path);

    let doc = PdfDocument::open(&pdf_path).unwrap();
    let entries = toc::extract_toc(&doc).unwrap();

    // "1.2 Details" and "Closing Remarks" fail the numeral filter.
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].title, "1 Introduction");
    assert_eq!(entries[0].level, 1);
    assert_eq!(entries[0].page, 1);
}

#[test]
fn pdf_without_outline_has_empty_toc() {
    let tmp = TempDir::new().unwrap();
    let pdf_path = tmp.path().join("plain.pdf");
    write_pdf(&pdf_path, &["No outline here."]);

    let doc = PdfDocument::open(&pdf_path).unwrap();
    assert!(toc::extract_toc(&doc).unwrap().is_empty());
}
