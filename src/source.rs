//! Local parts catalog
//!
//! Uses parameterized queries exclusively (no SQL string concatenation).
//! A connection is opened per fetch and closed before the remote phase starts.

use crate::error::Result;
use rusqlite::{params, Connection, OpenFlags};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// One priced part from the local catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartRecord {
    /// Manufacturer part number, used as the remote SKU
    pub mpn: String,
    pub name: String,
    /// Price rounded to 2 decimals, e.g. "4.50"
    pub price: String,
    pub stock_qty: u64,
}

/// Anything that can produce the ordered list of parts to sync
pub trait PartSource {
    /// Fetch priced parts ordered by `mpn`; `limit` of `None` or `Some(0)` means all
    fn fetch_parts(&self, limit: Option<usize>) -> Result<Vec<PartRecord>>;
}

/// Initialize the database schema
///
/// Creates tables if they don't exist:
/// - `parts`: the authoritative local catalog
/// - `sync_signatures`: fingerprints of parts last confirmed by the store
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS parts (
            mpn TEXT PRIMARY KEY,
            name TEXT,
            price REAL,
            stock_qty INTEGER
        );

        CREATE TABLE IF NOT EXISTS sync_signatures (
            sku TEXT PRIMARY KEY,
            signature TEXT NOT NULL,
            recorded_at TEXT NOT NULL
        );
        ",
    )?;

    log::debug!("Database schema initialized");
    Ok(())
}

/// Parts source backed by a SQLite file
pub struct SqlitePartSource {
    path: PathBuf,
}

impl SqlitePartSource {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

impl PartSource for SqlitePartSource {
    fn fetch_parts(&self, limit: Option<usize>) -> Result<Vec<PartRecord>> {
        let conn = Connection::open_with_flags(&self.path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        Ok(query_parts(&conn, limit)?)
    }
}

/// Run the catalog query on an open connection
///
/// Only rows with a numeric price are returned. Name falls back to the MPN, a
/// missing stock count becomes 0 and negative counts are clamped to 0.
/// SQLite treats `LIMIT -1` as unbounded.
pub fn query_parts(conn: &Connection, limit: Option<usize>) -> rusqlite::Result<Vec<PartRecord>> {
    let limit: i64 = match limit {
        Some(n) if n > 0 => i64::try_from(n).unwrap_or(i64::MAX),
        _ => -1,
    };

    let dropped: i64 = conn.query_row(
        "SELECT COUNT(*) FROM parts
         WHERE price IS NOT NULL AND typeof(price) NOT IN ('integer', 'real')",
        [],
        |row| row.get(0),
    )?;
    if dropped > 0 {
        log::warn!("Skipping {} parts with a non-numeric price", dropped);
    }

    let mut stmt = conn.prepare(
        "SELECT mpn,
                COALESCE(name, mpn) AS name,
                printf('%.2f', price) AS price,
                MAX(CAST(COALESCE(stock_qty, 0) AS INTEGER), 0) AS stock_qty
         FROM parts
         WHERE typeof(price) IN ('integer', 'real')
         ORDER BY mpn
         LIMIT ?1",
    )?;

    let results: rusqlite::Result<Vec<PartRecord>> = stmt
        .query_map(params![limit], |row| {
            let stock_qty: i64 = row.get(3)?;
            Ok(PartRecord {
                mpn: row.get(0)?,
                name: row.get(1)?,
                price: row.get(2)?,
                stock_qty: u64::try_from(stock_qty).unwrap_or(0),
            })
        })?
        .collect();
    results
}
