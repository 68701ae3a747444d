//! Main orchestration logic for mirroring submissions into the index.

use crate::destination::{DocumentStore, ElasticClient};
use crate::error::SyncError;
use crate::resume::find_start_page;
use crate::source::{GatherClient, SubmissionSource};
use crate::transform::IndexedDocument;
use crate::types::{Submission, SyncConfig, SyncReport};
use indicatif::ProgressBar;
use std::collections::HashSet;
use tracing::{info, warn};

/// Builds the HTTP clients from `config` and runs a full sync.
///
/// # Arguments
///
/// * `config` - Endpoints, credentials and page size
/// * `start_page` - Page to start from; `None` estimates it from the index
/// * `pb` - Progress indicator, `ProgressBar::hidden()` for none
///
/// # Example
///
/// ```no_run
/// use gathersync::{sync, SyncConfig};
/// use indicatif::ProgressBar;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = SyncConfig::from_file("config.json")?;
/// let report = sync(&config, None, &ProgressBar::hidden()).await?;
/// println!("indexed {} documents", report.upserted);
/// # Ok(())
/// # }
/// ```
pub async fn sync(
    config: &SyncConfig,
    start_page: Option<u64>,
    pb: &ProgressBar,
) -> Result<SyncReport, SyncError> {
    config.validate()?;
    let source = GatherClient::new(&config.gather, config.request_timeout)?;
    let store = ElasticClient::new(&config.elasticsearch, config.request_timeout)?;
    run_sync(&source, &store, config.page_size, start_page, pb).await
}

/// Estimates the resume page (unless `start_page` is given) and syncs from there.
pub async fn run_sync<S, D>(
    source: &S,
    store: &D,
    page_size: u64,
    start_page: Option<u64>,
    pb: &ProgressBar,
) -> Result<SyncReport, SyncError>
where
    S: SubmissionSource + ?Sized,
    D: DocumentStore + ?Sized,
{
    let start_page = match start_page {
        Some(page) => {
            info!("Starting from requested page: {}", page);
            page.max(1)
        }
        None => find_start_page(store, page_size).await?,
    };
    sync_from_page(source, store, start_page, pb).await
}

/// Follows the source's pagination from `start_page` until a page has no `next`.
///
/// Pages and the submissions within them are processed strictly in order, one
/// request at a time. A failed page fetch stops the run; a rejected document is
/// logged and counted, then the next one is attempted.
pub async fn sync_from_page<S, D>(
    source: &S,
    store: &D,
    start_page: u64,
    pb: &ProgressBar,
) -> Result<SyncReport, SyncError>
where
    S: SubmissionSource + ?Sized,
    D: DocumentStore + ?Sized,
{
    let mut report = SyncReport {
        start_page,
        ..SyncReport::default()
    };
    let mut visited = HashSet::new();
    let mut current = Some(source.page_url(start_page));

    while let Some(url) = current.take() {
        if !visited.insert(url.clone()) {
            return Err(SyncError::fetch(
                &url,
                "next cursor points back to a page already synced in this run",
            ));
        }

        info!("Grabbing submission page... : {}", url);
        pb.set_message(format!("| page {} | {}", report.pages + 1, url));

        let page = source.fetch_page(&url).await?;
        report.pages += 1;
        info!(
            "Got {} submissions, posting submissions to index...",
            page.results.len()
        );

        for submission in &page.results {
            sync_submission(store, submission, &mut report).await?;
            pb.inc(1);
        }

        current = page.next.filter(|next| !next.is_empty());
    }

    info!(
        "All done! {} pages, {} documents indexed, {} failed",
        report.pages, report.upserted, report.failed
    );
    Ok(report)
}

/// Transforms and writes one submission, updating `report`.
///
/// Only fatal errors are returned.
async fn sync_submission<D>(
    store: &D,
    submission: &Submission,
    report: &mut SyncReport,
) -> Result<(), SyncError>
where
    D: DocumentStore + ?Sized,
{
    let Some(doc) = IndexedDocument::from_submission(submission) else {
        warn!("Skipping submission without meta.instanceID");
        report.failed += 1;
        return Ok(());
    };

    match store.upsert(&doc).await {
        Ok(status) => {
            info!("Posted {}. Status: {}", doc.instance_id, status);
            report.upserted += 1;
            Ok(())
        }
        Err(e) if !e.is_fatal() => {
            warn!("Posting {} failed: {}", doc.instance_id, e);
            report.failed += 1;
            Ok(())
        }
        Err(e) => Err(e),
    }
}
