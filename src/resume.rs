//! Estimating the source page to resume from.

use crate::destination::DocumentStore;
use crate::error::SyncError;
use tracing::info;

/// Converts an index document count into a 1-based source page.
///
/// Returns `max(1, ceil(count / page_size))`. The last, possibly partial,
/// page gets fetched again; its documents are overwritten in place.
pub fn page_for_count(count: u64, page_size: u64) -> u64 {
    count.div_ceil(page_size.max(1)).max(1)
}

/// Reads the index document count and returns the page to start from.
pub async fn find_start_page<D: DocumentStore + ?Sized>(
    store: &D,
    page_size: u64,
) -> Result<u64, SyncError> {
    info!("Finding start page...");
    let count = store.document_count().await?;
    let page = page_for_count(count, page_size);
    info!("Index holds {} documents, starting from page: {}", count, page);
    Ok(page)
}
