//! Error types for parts_sync

use crate::woo::BatchKind;

/// Unified error type for parts_sync operations
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Reading the local parts catalog failed
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    /// HTTP request failed (network error, timeout, etc.)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    /// Failed to parse JSON response
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// A product page request returned a non-retryable status
    #[error("Woo product listing error on page {page} ({status}): {body}")]
    PageFetch {
        page: u32,
        status: reqwest::StatusCode,
        body: String,
    },
    /// Every attempt for a batch chunk was rate limited
    #[error("Woo batch {kind} failed after {attempts} attempts (429s)")]
    RateLimitExhausted { kind: BatchKind, attempts: u32 },
    /// A batch chunk was rejected with a non-retryable status
    #[error("Woo batch {kind} error {status}: {body}")]
    BatchRejected {
        kind: BatchKind,
        status: reqwest::StatusCode,
        body: String,
    },
    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
    /// Dispatch aborted after the remote had already applied some chunks
    #[error(
        "{kind} phase aborted, remote catalog left partially synced \
         (created={created}, updated={updated}): {source}"
    )]
    PartialSync {
        kind: BatchKind,
        created: usize,
        updated: usize,
        #[source]
        source: Box<SyncError>,
    },
}

/// Result alias for parts_sync operations
pub type Result<T> = std::result::Result<T, SyncError>;
