//! Adapter for trigger-driven invocation.
//!
//! A trigger hands over an opaque event and expects a response it can always
//! accept: failures are reported inside the message, never as an error.

use crate::destination::DocumentStore;
use crate::error::SyncError;
use crate::orchestrator::{run_sync, sync};
use crate::source::SubmissionSource;
use crate::types::{SyncConfig, SyncReport};
use indicatif::ProgressBar;
use serde::Serialize;
use serde_json::Value;
use tracing::error;

pub const SUCCESS_MESSAGE: &str = "Finished successfully!";

/// What the invocation reports back to its trigger.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct InvocationResponse {
    pub message: String,
    /// The triggering event, echoed back unchanged.
    pub event: Value,
}

impl InvocationResponse {
    fn from_result(result: Result<SyncReport, SyncError>, event: Value) -> Self {
        let message = match result {
            Ok(_) => SUCCESS_MESSAGE.to_string(),
            Err(e) => {
                error!("Sync failed: {}", e);
                format!("Error: {}", e)
            }
        };
        Self { message, event }
    }
}

/// Runs a full sync against the configured endpoints for a trigger `event`.
pub async fn invoke(event: Value, config: &SyncConfig) -> InvocationResponse {
    let result = sync(config, None, &ProgressBar::hidden()).await;
    InvocationResponse::from_result(result, event)
}

/// Same as [`invoke`] with caller-supplied source and store.
pub async fn invoke_with<S, D>(
    event: Value,
    source: &S,
    store: &D,
    page_size: u64,
) -> InvocationResponse
where
    S: SubmissionSource + ?Sized,
    D: DocumentStore + ?Sized,
{
    let result = run_sync(source, store, page_size, None, &ProgressBar::hidden()).await;
    InvocationResponse::from_result(result, event)
}
