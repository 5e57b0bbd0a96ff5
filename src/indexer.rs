//! Parallel per-page index building.
//!
//! One unit of work per page — extraction composed with segmentation — runs
//! on the blocking thread pool, bounded by a semaphore sized to the
//! configured worker count. Units share no mutable state and complete in
//! arbitrary order; the final stable sort by page number is what restores
//! the index ordering invariant. A failed or timed-out page is logged and
//! recorded on the fragment instead of aborting the build, so the caller
//! sees exactly which pages are missing.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::config::IndexingConfig;
use crate::error::Result;
use crate::extract::PdfDocument;
use crate::models::{IndexFragment, PageFailure, SentenceRecord};
use crate::progress::ProgressObserver;
use crate::segment::segment;

type PageOutcome = (u32, std::result::Result<Vec<SentenceRecord>, String>);

/// Build the index fragment for one document.
///
/// Blocks the calling flow until every dispatched unit has completed, failed,
/// or timed out; cancellation mid-build is not supported. A timed-out unit
/// keeps its blocking thread until it returns on its own — the build merely
/// stops waiting for it.
pub async fn build_index(
    doc: Arc<PdfDocument>,
    opts: &IndexingConfig,
    observer: &dyn ProgressObserver,
) -> Result<IndexFragment> {
    let total = doc.page_count();
    if total == 0 {
        return Ok(IndexFragment {
            records: Vec::new(),
            failures: Vec::new(),
        });
    }

    let semaphore = Arc::new(Semaphore::new(opts.effective_workers()));
    let timeout = Duration::from_secs(opts.page_timeout_secs);
    let mut units: JoinSet<PageOutcome> = JoinSet::new();

    for index in 0..total {
        let doc = Arc::clone(&doc);
        let semaphore = Arc::clone(&semaphore);
        let page_number = (index + 1) as u32;
        units.spawn(async move {
            // The semaphore is never closed, so acquisition only waits.
            let _permit = semaphore.acquire_owned().await.ok();
            let unit = tokio::task::spawn_blocking(move || {
                doc.page_text(index).map(|text| segment(page_number, &text))
            });
            let outcome = match tokio::time::timeout(timeout, unit).await {
                Ok(Ok(Ok(records))) => Ok(records),
                Ok(Ok(Err(e))) => Err(e.to_string()),
                Ok(Err(join_err)) => Err(format!("page unit crashed: {}", join_err)),
                Err(_) => Err(format!("page unit timed out after {}s", timeout.as_secs())),
            };
            (page_number, outcome)
        });
    }

    let mut records: Vec<SentenceRecord> = Vec::new();
    let mut failures: Vec<PageFailure> = Vec::new();
    let mut completed = 0usize;
    while let Some(joined) = units.join_next().await {
        completed += 1;
        match joined {
            Ok((_, Ok(page_records))) => records.extend(page_records),
            Ok((page_number, Err(reason))) => {
                warn!(page = page_number, %reason, "page unit failed; continuing build");
                failures.push(PageFailure {
                    page_number,
                    reason,
                });
            }
            // Only reachable if a unit task is aborted externally.
            Err(join_err) => warn!(error = %join_err, "lost a page unit"),
        }
        observer.report(completed as f64 / total as f64);
    }

    // Completion order is non-deterministic; this sort is what guarantees the
    // ascending-page invariant. It is stable, so in-page order survives.
    records.sort_by_key(|r| r.page_number);
    failures.sort_by_key(|f| f.page_number);

    debug!(
        pages = total,
        sentences = records.len(),
        failed = failures.len(),
        "index build complete"
    );
    Ok(IndexFragment { records, failures })
}
