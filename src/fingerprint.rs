//! Content fingerprints of parts and the store that remembers them between runs

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection};
use sha1::{Digest, Sha1};

use crate::error::Result;
use crate::source::{init_schema, PartRecord};

/// SHA-1 hex digest of the fields that end up in the remote product
pub fn fingerprint(part: &PartRecord) -> String {
    let joined = format!(
        "{}|{}|{}|{}",
        part.mpn, part.name, part.price, part.stock_qty
    );
    hex::encode(Sha1::digest(joined.as_bytes()))
}

/// Fingerprints recorded for SKUs the store last confirmed
pub trait SignatureStore {
    /// All recorded signatures keyed by SKU
    fn load(&self) -> Result<HashMap<String, String>>;

    /// Insert or replace signatures for the given `(sku, signature)` pairs
    fn record(&mut self, entries: &[(String, String)]) -> Result<()>;
}

impl SignatureStore for HashMap<String, String> {
    fn load(&self) -> Result<HashMap<String, String>> {
        Ok(self.clone())
    }

    fn record(&mut self, entries: &[(String, String)]) -> Result<()> {
        self.extend(entries.iter().cloned());
        Ok(())
    }
}

/// Signature store kept in the `sync_signatures` table of the parts database
pub struct SqliteSignatureStore {
    path: PathBuf,
}

impl SqliteSignatureStore {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    fn open(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)?;
        init_schema(&conn)?;
        Ok(conn)
    }
}

impl SignatureStore for SqliteSignatureStore {
    fn load(&self) -> Result<HashMap<String, String>> {
        let conn = self.open()?;
        let mut stmt = conn.prepare("SELECT sku, signature FROM sync_signatures")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<HashMap<String, String>>>()?;
        Ok(rows)
    }

    fn record(&mut self, entries: &[(String, String)]) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut conn = self.open()?;
        let recorded_at = chrono::Utc::now().to_rfc3339();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT OR REPLACE INTO sync_signatures (sku, signature, recorded_at)
                 VALUES (?1, ?2, ?3)",
            )?;
            for (sku, signature) in entries {
                stmt.execute(params![sku, signature, &recorded_at])?;
            }
        }
        tx.commit()?;

        log::debug!("Recorded {} signatures", entries.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(price: &str, stock_qty: u64) -> PartRecord {
        PartRecord {
            mpn: "NE555".to_string(),
            name: "Timer".to_string(),
            price: price.to_string(),
            stock_qty,
        }
    }

    #[test]
    fn fingerprint_is_sha1_of_joined_fields() {
        assert_eq!(
            fingerprint(&part("0.40", 7)),
            "7a03a497da1180d1ad5e573d6faa307d1b4dfe16"
        );
    }

    #[test]
    fn fingerprint_changes_with_price_or_stock() {
        let base = fingerprint(&part("0.40", 7));
        assert_ne!(base, fingerprint(&part("0.41", 7)));
        assert_ne!(base, fingerprint(&part("0.40", 0)));
    }

    #[test]
    fn sqlite_store_round_trips_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SqliteSignatureStore::new(&dir.path().join("parts.db"));

        assert!(store.load().unwrap().is_empty());

        store
            .record(&[
                ("A1".to_string(), "aaa".to_string()),
                ("A2".to_string(), "bbb".to_string()),
            ])
            .unwrap();
        store
            .record(&[("A1".to_string(), "ccc".to_string())])
            .unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded["A1"], "ccc");
        assert_eq!(loaded["A2"], "bbb");
    }
}
