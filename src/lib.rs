//! GatherSync - Incremental mirror of Gather survey submissions into Elasticsearch
//!
//! This library pages through the Gather submissions API, strips ODK form
//! metadata from each submission and writes it to an Elasticsearch index keyed
//! by the submission's instance id.
//!
//! # Features
//!
//! - **Resumable Runs**: The start page is estimated from the index document count
//! - **Idempotent Writes**: Documents are upserted by id, so reprocessed pages are harmless
//! - **Cursor Pagination**: Follows the source's `next` links until the last page
//! - **Failure Isolation**: A rejected document is logged and the run carries on
//!
//! # Example
//!
//! ```no_run
//! use gathersync::{sync, SyncConfig};
//! use indicatif::ProgressBar;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SyncConfig::from_file("config.json")?;
//! sync(&config, None, &ProgressBar::hidden()).await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod destination;
mod error;
mod http;
mod invoke;
mod orchestrator;
mod resume;
mod source;
mod transform;
mod types;

#[cfg(test)]
mod testing;

pub use config::DEFAULT_PAGE_SIZE;
pub use destination::{DocumentStore, ElasticClient};
pub use error::SyncError;
pub use invoke::{invoke, invoke_with, InvocationResponse, SUCCESS_MESSAGE};
pub use orchestrator::{run_sync, sync, sync_from_page};
pub use resume::{find_start_page, page_for_count};
pub use source::{GatherClient, SubmissionSource};
pub use transform::{document_id, strip_metadata, IndexedDocument, METADATA_KEYS};
pub use types::{
    ElasticConfig, GatherConfig, Submission, SubmissionMeta, SubmissionPage, SyncConfig,
    SyncReport,
};
