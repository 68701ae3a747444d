//! Shared HTTP plumbing for the source and destination clients.

use crate::error::SyncError;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Builds the reqwest client used for every request of a run.
pub(crate) fn build_client(timeout: Option<Duration>) -> Result<reqwest::Client, SyncError> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| SyncError::Config(format!("Failed to build HTTP client: {}", e)))
}

/// Joins a base URL and a path with exactly one `/` between them.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Sends a GET request and decodes the JSON body.
///
/// Transport failures, non-2xx statuses and undecodable bodies all surface as
/// [`SyncError::Fetch`].
pub(crate) async fn get_json<T: DeserializeOwned>(
    request: RequestBuilder,
    url: &str,
) -> Result<T, SyncError> {
    debug!("GET {}", url);

    let response = request.send().await.map_err(|e| SyncError::fetch(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(SyncError::fetch(url, format!("HTTP {}", status)));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| SyncError::fetch(url, format!("Invalid JSON response: {}", e)))
}
