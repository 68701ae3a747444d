//! Loading and validating the sync configuration.

use crate::error::SyncError;
use crate::types::SyncConfig;
use std::path::Path;
use tracing::info;

/// Submissions per page served by the Gather API.
pub const DEFAULT_PAGE_SIZE: u64 = 30;

pub(crate) fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

impl SyncConfig {
    /// Reads a JSON configuration file and validates it.
    ///
    /// The file has the shape
    /// `{ "gather": { "url", "token" }, "elasticsearch": { "url", "index", "username", "password", "pipeline" } }`
    /// with optional top-level `page_size` and `request_timeout`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SyncError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config: SyncConfig = serde_json::from_str(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Checks that every endpoint needed for a run is present.
    pub fn validate(&self) -> Result<(), SyncError> {
        if self.gather.url.trim().is_empty() {
            return Err(SyncError::Config("gather.url is required".to_string()));
        }
        if self.elasticsearch.url.trim().is_empty() {
            return Err(SyncError::Config("elasticsearch.url is required".to_string()));
        }
        if self.elasticsearch.index.trim().is_empty() {
            return Err(SyncError::Config(
                "elasticsearch.index is required".to_string(),
            ));
        }
        if self.page_size == 0 {
            return Err(SyncError::Config(
                "page_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Serde adapter for `Option<Duration>` written as humantime strings.
pub(crate) mod humantime_opt {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => s.serialize_str(&humantime::format_duration(*d).to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        raw.map(|s| humantime::parse_duration(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}
