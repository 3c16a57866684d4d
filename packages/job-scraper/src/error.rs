//! Typed errors for the ingestion pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`). Failures that only
//! affect a single listing (missing fields, a failed detail page, a URL that
//! is already stored) are not errors here: they are recorded as data in the
//! scan report.

use thiserror::Error;

/// Errors raised while fetching a listing or detail page.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure (DNS, connection reset, TLS, body read)
    #[error("HTTP error fetching {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Server answered with a status of 500 or above
    #[error("server error {status} fetching {url}")]
    Status { url: String, status: u16 },

    /// Request timed out
    #[error("timeout fetching {url}")]
    Timeout { url: String },

    /// Portal kept answering 403 after the backoff and retry
    #[error("rate limited by portal: {url}")]
    RateLimited { url: String },

    /// URL could not be parsed or resolved
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    Client(String),
}

impl FetchError {
    /// Whether the portal signalled rate limiting.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, FetchError::RateLimited { .. })
    }
}

/// A detail page could not be read. Affects only the one listing.
#[derive(Debug, Error)]
pub enum DetailFetchError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Detail page answered with a non-2xx status
    #[error("detail page {url} returned {status}")]
    Status { url: String, status: u16 },
}

/// Errors raised by a listing store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database query failed
    #[error("database error: {0}")]
    Database(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Stored value could not be (de)serialized
    #[error("serialization error: {0}")]
    Serialization(String),

    /// An in-process lock was poisoned by a panicking writer
    #[error("store lock poisoned")]
    Poisoned,
}

/// Errors that abort a scan before any portal is processed.
///
/// Failures during a scan are confined to the (role, portal) pair they
/// happen in and end up in its report instead.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Configuration error
    #[error("config error: {0}")]
    Config(String),
}

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Result type alias for scan operations.
pub type ScanResult<T> = std::result::Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_detection() {
        let err = FetchError::RateLimited {
            url: "https://www.stepstone.de/jobs".into(),
        };
        assert!(err.is_rate_limited());
        assert!(!FetchError::Timeout { url: "x".into() }.is_rate_limited());
    }

    #[test]
    fn test_error_messages() {
        let err = ScanError::Config("batch_size must be > 0".into());
        assert_eq!(err.to_string(), "config error: batch_size must be > 0");
        assert_eq!(StoreError::Poisoned.to_string(), "store lock poisoned");
    }
}
