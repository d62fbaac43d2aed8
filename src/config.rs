//! Run configuration
//!
//! Built once in `main` and passed by reference into every component.

use crate::error::{Result, SyncError};
use std::path::PathBuf;
use std::time::Duration;

/// Products per batch request (WooCommerce accepts at most 100)
pub const DEFAULT_BATCH_SIZE: usize = 100;
/// Products per listing page
pub const DEFAULT_PAGE_SIZE: usize = 100;
/// Pause after a 429 response
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(2);
/// Attempts per batch chunk before giving up on 429s
pub const DEFAULT_MAX_WRITE_ATTEMPTS: u32 = 3;

/// WooCommerce REST API key pair, sent as HTTP Basic auth
#[derive(Debug, Clone)]
pub struct WooCredentials {
    pub consumer_key: String,
    pub consumer_secret: String,
}

/// Everything a sync run needs to know about its environment
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// REST root, e.g. `https://shop.example/wp-json/wc/v3`
    pub base_url: String,
    pub credentials: WooCredentials,
    /// Path to the SQLite parts database
    pub database: PathBuf,
    pub batch_size: usize,
    pub page_size: usize,
    pub backoff: Duration,
    pub max_write_attempts: u32,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    /// Drop matched parts whose fingerprint is unchanged since the last run
    pub skip_unchanged: bool,
}

impl SyncConfig {
    /// Create a config with default tuning for the given store and database
    pub fn new(base_url: &str, credentials: WooCredentials, database: PathBuf) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            database,
            batch_size: DEFAULT_BATCH_SIZE,
            page_size: DEFAULT_PAGE_SIZE,
            backoff: DEFAULT_BACKOFF,
            max_write_attempts: DEFAULT_MAX_WRITE_ATTEMPTS,
            read_timeout: Duration::from_secs(60),
            write_timeout: Duration::from_secs(120),
            skip_unchanged: false,
        }
    }

    /// Reject configurations that could never complete a run
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(SyncError::Config("base URL is empty".to_string()));
        }
        if self.credentials.consumer_key.is_empty() || self.credentials.consumer_secret.is_empty()
        {
            return Err(SyncError::Config(
                "consumer key and secret are required".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(SyncError::Config("batch size must be positive".to_string()));
        }
        if self.page_size == 0 {
            return Err(SyncError::Config("page size must be positive".to_string()));
        }
        if self.max_write_attempts == 0 {
            return Err(SyncError::Config(
                "write attempts must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Returns the default database path: ~/.local/share/parts_sync/parts.db
pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("parts_sync")
        .join("parts.db")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SyncConfig {
        SyncConfig::new(
            "https://shop.example/wp-json/wc/v3/",
            WooCredentials {
                consumer_key: "ck_test".to_string(),
                consumer_secret: "cs_test".to_string(),
            },
            PathBuf::from("parts.db"),
        )
    }

    #[test]
    fn new_trims_trailing_slash_and_sets_defaults() {
        let config = test_config();
        assert_eq!(config.base_url, "https://shop.example/wp-json/wc/v3");
        assert_eq!(config.batch_size, 100);
        assert_eq!(config.page_size, 100);
        assert_eq!(config.backoff, Duration::from_secs(2));
        assert_eq!(config.max_write_attempts, 3);
        assert!(!config.skip_unchanged);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_missing_credentials() {
        let mut config = test_config();
        config.credentials.consumer_secret.clear();
        assert!(matches!(config.validate(), Err(SyncError::Config(_))));
    }

    #[test]
    fn validate_rejects_zero_batch_size() {
        let mut config = test_config();
        config.batch_size = 0;
        assert!(matches!(config.validate(), Err(SyncError::Config(_))));
    }

    #[test]
    fn default_db_path_ends_with_file_name() {
        assert!(default_db_path().ends_with("parts_sync/parts.db"));
    }
}
