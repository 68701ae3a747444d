//! Writing documents to the Elasticsearch index.

use crate::error::SyncError;
use crate::http::{build_client, get_json};
use crate::transform::IndexedDocument;
use crate::types::ElasticConfig;
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// A store that indexes documents by id.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Total number of documents currently indexed.
    async fn document_count(&self) -> Result<u64, SyncError>;

    /// Writes or replaces the document with `doc.id`.
    ///
    /// Returns the HTTP status on success. A rejected write is
    /// [`SyncError::Upsert`].
    async fn upsert(&self, doc: &IndexedDocument) -> Result<u16, SyncError>;
}

/// `hits.total` is a bare integer before Elasticsearch 7 and an object after.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum TotalHits {
    Count(u64),
    Object {
        value: u64,
        #[serde(default)]
        relation: Option<String>,
    },
}

#[derive(Deserialize, Debug)]
struct Hits {
    total: TotalHits,
}

#[derive(Deserialize, Debug)]
struct SearchResponse {
    hits: Hits,
}

impl SearchResponse {
    fn total(&self) -> u64 {
        match self.hits.total {
            TotalHits::Count(n) | TotalHits::Object { value: n, .. } => n,
        }
    }

    /// Elasticsearch stops counting at `track_total_hits` (10000 by default)
    /// and reports `"relation": "gte"`.
    fn is_lower_bound(&self) -> bool {
        matches!(
            &self.hits.total,
            TotalHits::Object { relation: Some(relation), .. } if relation == "gte"
        )
    }
}

/// HTTP client for one Elasticsearch index, authenticating with basic auth.
#[derive(Debug, Clone)]
pub struct ElasticClient {
    client: reqwest::Client,
    base_url: Url,
    index: String,
    username: String,
    password: String,
    pipeline: Option<String>,
}

impl ElasticClient {
    pub fn new(config: &ElasticConfig, timeout: Option<Duration>) -> Result<Self, SyncError> {
        let base_url = Url::parse(&config.url).map_err(|e| {
            SyncError::Config(format!("Invalid elasticsearch.url {}: {}", config.url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(SyncError::Config(format!(
                "elasticsearch.url {} cannot carry a path",
                config.url
            )));
        }

        Ok(Self {
            client: build_client(timeout)?,
            base_url,
            index: config.index.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            pipeline: config.pipeline.clone(),
        })
    }

    /// Appends percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Never fails: `new` rejects cannot-be-a-base URLs.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn search_url(&self) -> Url {
        self.endpoint(&[self.index.as_str(), "_search"])
    }

    fn document_url(&self, id: &str) -> Url {
        let mut url = self.endpoint(&[self.index.as_str(), "_doc", id]);
        if let Some(pipeline) = &self.pipeline {
            url.query_pairs_mut().append_pair("pipeline", pipeline);
        }
        url
    }
}

#[async_trait]
impl DocumentStore for ElasticClient {
    async fn document_count(&self) -> Result<u64, SyncError> {
        let url = self.search_url();
        let request = self
            .client
            .get(url.clone())
            .basic_auth(&self.username, Some(&self.password));
        let response: SearchResponse = get_json(request, url.as_str()).await?;

        let total = response.total();
        if response.is_lower_bound() {
            warn!(
                "Index reports at least {} documents (count is capped); resuming from an earlier page than needed",
                total
            );
        }
        Ok(total)
    }

    async fn upsert(&self, doc: &IndexedDocument) -> Result<u16, SyncError> {
        let url = self.document_url(&doc.id);
        debug!("PUT {}", url);

        let response = self
            .client
            .put(url)
            .basic_auth(&self.username, Some(&self.password))
            .json(&doc.body)
            .send()
            .await
            .map_err(|e| SyncError::Upsert {
                id: doc.id.clone(),
                status: None,
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Upsert {
                id: doc.id.clone(),
                status: Some(status.as_u16()),
                reason: format!("HTTP {}", status),
            });
        }
        Ok(status.as_u16())
    }
}
