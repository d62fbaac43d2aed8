//! WooCommerce REST client for the product catalog.
//!
//! Only two endpoints are used: the paged product listing (to learn which
//! SKUs already exist) and the batch endpoint (to create and update them).
//! Every request is awaited before the next one is issued.

mod batch;
mod products;

use std::fmt;
use std::time::Duration;

use reqwest::{Client, RequestBuilder};

use crate::config::{SyncConfig, WooCredentials};

pub use batch::{chunk_count, BatchReport, DispatchError};
pub use products::RemoteIndex;

/// Which half of the batch endpoint a chunk targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchKind {
    Create,
    Update,
}

impl BatchKind {
    /// JSON key used in both the request and the response body
    pub fn key(self) -> &'static str {
        match self {
            BatchKind::Create => "create",
            BatchKind::Update => "update",
        }
    }
}

impl fmt::Display for BatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// WooCommerce API client for listing and batch-writing products.
pub struct WooClient {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    credentials: WooCredentials,
    page_size: usize,
    batch_size: usize,
    backoff: Duration,
    max_write_attempts: u32,
    read_timeout: Duration,
    write_timeout: Duration,
}

impl WooClient {
    /// Creates a client from the run configuration.
    pub fn new(config: &SyncConfig) -> Self {
        log::debug!("Creating Woo client for {}", config.base_url);
        Self {
            client: Client::new(),
            base_url: config.base_url.clone(),
            credentials: config.credentials.clone(),
            page_size: config.page_size,
            batch_size: config.batch_size,
            backoff: config.backoff,
            max_write_attempts: config.max_write_attempts,
            read_timeout: config.read_timeout,
            write_timeout: config.write_timeout,
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .basic_auth(
                &self.credentials.consumer_key,
                Some(&self.credentials.consumer_secret),
            )
            .header("User-Agent", "parts_sync/1.0")
    }
}

#[cfg(test)]
#[path = "tests/mod.rs"]
mod tests;
