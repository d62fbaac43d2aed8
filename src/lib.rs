//! Parts Sync - local parts catalog to WooCommerce
//!
//! Pushes every priced part from the SQLite parts database to a WooCommerce
//! store: products whose SKU already exists are updated, the rest are created.

pub mod config;
pub mod error;
pub mod fingerprint;
pub mod payload;
pub mod reconcile;
pub mod source;
pub mod sync;
pub mod woo;

pub use config::{SyncConfig, WooCredentials};
pub use error::{Result, SyncError};
pub use fingerprint::{fingerprint, SignatureStore, SqliteSignatureStore};
pub use payload::{to_payload, StockStatus, SyncPayload};
pub use reconcile::{reconcile, reconcile_skipping_unchanged, SyncPlan};
pub use source::{init_schema, PartRecord, PartSource, SqlitePartSource};
pub use sync::{RunSummary, SyncRun};
pub use woo::{BatchKind, BatchReport, RemoteIndex, WooClient};
