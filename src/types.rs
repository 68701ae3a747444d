//! Data structures for sync operations.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

/// Connection settings for the Gather submission API.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct GatherConfig {
    /// Base URL of the API (e.g., `<https://gather.example.org/api/>`)
    pub url: String,
    /// API token, sent as `Authorization: Token <token>`.
    pub token: String,
}

/// Connection settings for the Elasticsearch index receiving documents.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ElasticConfig {
    /// Base URL of the cluster (e.g., `<https://es.example.org:9200/>`)
    pub url: String,
    /// Target index name.
    pub index: String,
    pub username: String,
    pub password: String,
    /// Ingest pipeline applied at write time. Passed through untouched.
    #[serde(default)]
    pub pipeline: Option<String>,
}

/// Configuration for a sync run.
///
/// # Example
///
/// ```
/// use gathersync::{ElasticConfig, GatherConfig, SyncConfig};
///
/// let config = SyncConfig {
///     gather: GatherConfig {
///         url: "https://gather.example.org/api".to_string(),
///         token: "secret".to_string(),
///     },
///     elasticsearch: ElasticConfig {
///         url: "https://es.example.org:9200".to_string(),
///         index: "submissions".to_string(),
///         username: "elastic".to_string(),
///         password: "changeme".to_string(),
///         pipeline: Some("flatten".to_string()),
///     },
///     page_size: 30,
///     request_timeout: None,
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SyncConfig {
    pub gather: GatherConfig,
    pub elasticsearch: ElasticConfig,
    /// Number of submissions the source returns per page (default: 30).
    ///
    /// Only used to turn the index document count into a resume page, so it
    /// must match the source's actual page size.
    #[serde(default = "crate::config::default_page_size")]
    pub page_size: u64,
    /// Optional per-request timeout, written as a humantime string (`"30s"`).
    #[serde(
        default,
        with = "crate::config::humantime_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub request_timeout: Option<Duration>,
}

/// The `meta` block of a submission envelope.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct SubmissionMeta {
    #[serde(rename = "instanceID", default)]
    pub instance_id: Option<String>,
}

/// A single submission as returned by the source.
///
/// Only the payload and the identifier are kept; everything else in the
/// envelope is dropped on deserialization.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Submission {
    pub payload: Map<String, Value>,
    #[serde(default)]
    pub meta: Option<SubmissionMeta>,
}

impl Submission {
    /// The submission's instance identifier, still carrying its `uuid:` prefix.
    ///
    /// Read from the envelope's `meta` block, falling back to the payload's own
    /// `meta.instanceID`.
    pub fn instance_id(&self) -> Option<&str> {
        self.meta
            .as_ref()
            .and_then(|m| m.instance_id.as_deref())
            .or_else(|| {
                self.payload
                    .get("meta")
                    .and_then(|m| m.get("instanceID"))
                    .and_then(Value::as_str)
            })
    }
}

/// One page of submissions plus the cursor to the next page.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SubmissionPage {
    pub results: Vec<Submission>,
    /// URL of the next page. Absent or `null` on the last page.
    #[serde(default)]
    pub next: Option<String>,
}

/// Counters collected over one run.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// 1-based page the run started from.
    pub start_page: u64,
    /// Pages fetched.
    pub pages: usize,
    /// Documents accepted by the index.
    pub upserted: usize,
    /// Documents rejected or skipped.
    pub failed: usize,
}
