//! Store adapter errors.

use thiserror::Error;

/// Errors that can occur when talking to a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A unique constraint rejected the write.
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    /// The store rejected the API key.
    #[error("Unauthorized: store rejected the API key")]
    Unauthorized,

    /// Store returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to build a request or parse a response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
