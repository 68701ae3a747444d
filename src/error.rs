//! Error types for sync operations.

use std::io;
use thiserror::Error;

/// Errors that can occur while mirroring submissions.
#[derive(Error, Debug)]
pub enum SyncError {
    /// I/O error while reading configuration.
    #[error(transparent)]
    IoError(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error(transparent)]
    SerdeJsonError(#[from] serde_json::Error),

    /// A page or count lookup could not be retrieved or parsed.
    ///
    /// Halts the whole run.
    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// A single document write was rejected or never reached the index.
    #[error("Failed to index document {id}: {reason}")]
    Upsert {
        id: String,
        status: Option<u16>,
        reason: String,
    },

    /// Missing or invalid configuration value.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl SyncError {
    pub(crate) fn fetch(url: &str, reason: impl ToString) -> Self {
        SyncError::Fetch {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Whether this error stops the run. Only rejected document writes are survivable.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, SyncError::Upsert { .. })
    }
}
