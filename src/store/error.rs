//! Storage error types

use std::path::PathBuf;
use thiserror::Error;

/// Failures while reading or writing a collection
#[derive(Error, Debug)]
pub enum StoreError {
    /// Local file could not be read or written.
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Request to the contents API failed before a status arrived.
    #[error("contents API request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Contents API answered a read with a non-success status.
    #[error("Failed to read {path}: {status}")]
    RemoteRead { path: String, status: u16 },

    /// Contents API rejected a write.
    #[error("Failed to write {path}: {status} {body}")]
    RemoteWrite {
        path: String,
        status: u16,
        body: String,
    },

    /// The stored version moved on since it was read.
    #[error("Write conflict on {path}: content changed since it was read")]
    Conflict { path: String },

    /// Stored content could not be decoded for transport.
    #[error("Failed to decode {path}: {message}")]
    Decode { path: String, message: String },

    /// Records could not be serialized.
    #[error("Failed to encode records: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}
