//! Reading submission pages from the Gather API.

use crate::error::SyncError;
use crate::http::{build_client, get_json, join_url};
use crate::types::{GatherConfig, SubmissionPage};
use async_trait::async_trait;
use std::time::Duration;

/// A paginated source of submissions.
#[async_trait]
pub trait SubmissionSource: Send + Sync {
    /// URL of the given 1-based page.
    fn page_url(&self, page: u64) -> String;

    /// Fetches one page, either built by [`page_url`](Self::page_url) or
    /// taken from a previous page's `next` cursor.
    async fn fetch_page(&self, url: &str) -> Result<SubmissionPage, SyncError>;
}

/// HTTP client for `GET {base}/submissions/?page=N`.
#[derive(Debug, Clone)]
pub struct GatherClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl GatherClient {
    pub fn new(config: &GatherConfig, timeout: Option<Duration>) -> Result<Self, SyncError> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: config.url.clone(),
            token: config.token.clone(),
        })
    }
}

#[async_trait]
impl SubmissionSource for GatherClient {
    fn page_url(&self, page: u64) -> String {
        join_url(&self.base_url, &format!("submissions/?page={}", page))
    }

    async fn fetch_page(&self, url: &str) -> Result<SubmissionPage, SyncError> {
        let request = self
            .client
            .get(url)
            .header(reqwest::header::AUTHORIZATION, format!("Token {}", self.token));
        get_json(request, url).await
    }
}
