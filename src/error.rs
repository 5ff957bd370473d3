//! Error types for price_sync

use std::error::Error as _;

use thiserror::Error;

/// Unified error type for synchronization operations
#[derive(Debug, Error)]
pub enum SyncError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP error status code
    #[error("HTTP error: {0}")]
    HttpStatus(reqwest::StatusCode),
    /// Failed to parse JSON response
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// Malformed XML product document
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
    /// Config or token file I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// OAuth provider rejected the request with an error code
    #[error("Authorization error: {0}")]
    Auth(String),
    /// Offer price could not be parsed as a decimal amount
    #[error("Invalid price value: {0}")]
    InvalidPrice(String),
    /// Response body did not contain an expected field or element
    #[error("Missing field in response: {0}")]
    MissingField(&'static str),
    /// Update response did not echo the expected id and price
    #[error("Update verification failed for product {product_id}")]
    Verification { product_id: String },
    /// Building or sending a mail message failed
    #[error("Mail error: {0}")]
    Mail(String),
}

/// Result alias for synchronization operations
pub type SyncResult<T> = Result<T, SyncError>;

/// True when the transport error was a dropped connection, the one
/// failure signature worth a single retry while resolving offers.
pub fn is_connection_reset(err: &reqwest::Error) -> bool {
    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            if io.kind() == std::io::ErrorKind::ConnectionReset {
                return true;
            }
        }
        source = cause.source();
    }
    false
}
