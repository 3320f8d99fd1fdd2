//! Error types for the mediagate-store crate

use thiserror::Error;

/// Result type alias using `StoreError`
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur while reading from an object store
#[derive(Error, Debug)]
pub enum StoreError {
    /// Requested range starts at or beyond the end of the object
    #[error("range not satisfiable: offset {offset} for object of {size} bytes")]
    RangeNotSatisfiable { offset: u64, size: u64 },

    /// Key cannot be mapped onto the backend
    #[error("invalid object key: {0}")]
    InvalidKey(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP transport error
    #[error("http error: {0}")]
    Http(String),

    /// Connection error
    #[error("connection error: {0}")]
    Connection(String),

    /// Timeout error
    #[error("operation timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// Upstream bucket answered with an unexpected status
    #[error("upstream returned status {status}")]
    Upstream { status: u16 },

    /// Sidecar or upstream metadata could not be read
    #[error("metadata error: {0}")]
    Metadata(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            StoreError::Connection(err.to_string())
        } else {
            StoreError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Metadata(err.to_string())
    }
}
