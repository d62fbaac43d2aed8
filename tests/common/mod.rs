//! Shared helpers for the sync run tests

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use parts_sync::{
    PartRecord, PartSource, SignatureStore, SyncConfig, SyncError, WooCredentials,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// In-memory parts source
pub struct StaticParts(pub Vec<PartRecord>);

impl PartSource for StaticParts {
    fn fetch_parts(&self, limit: Option<usize>) -> parts_sync::Result<Vec<PartRecord>> {
        let take = limit.filter(|n| *n > 0).unwrap_or(self.0.len());
        Ok(self.0.iter().take(take).cloned().collect())
    }
}

/// Parts source that always fails like an unreachable database
pub struct BrokenSource;

impl PartSource for BrokenSource {
    fn fetch_parts(&self, _limit: Option<usize>) -> parts_sync::Result<Vec<PartRecord>> {
        Err(SyncError::Database(rusqlite::Error::InvalidQuery))
    }
}

/// Signature store whose writes always fail
pub struct FailingStore;

impl SignatureStore for FailingStore {
    fn load(&self) -> parts_sync::Result<HashMap<String, String>> {
        Ok(HashMap::new())
    }

    fn record(&mut self, _entries: &[(String, String)]) -> parts_sync::Result<()> {
        Err(SyncError::Database(rusqlite::Error::InvalidQuery))
    }
}

/// Signature store that keeps every `record` call
#[derive(Default)]
pub struct RecordingStore {
    pub calls: Vec<Vec<String>>,
}

impl SignatureStore for RecordingStore {
    fn load(&self) -> parts_sync::Result<HashMap<String, String>> {
        Ok(HashMap::new())
    }

    fn record(&mut self, entries: &[(String, String)]) -> parts_sync::Result<()> {
        self.calls.push(entries.iter().map(|(sku, _)| sku.clone()).collect());
        Ok(())
    }
}

pub fn part(mpn: &str, price: &str, stock_qty: u64) -> PartRecord {
    PartRecord {
        mpn: mpn.to_string(),
        name: format!("Part {}", mpn),
        price: price.to_string(),
        stock_qty,
    }
}

pub fn test_config(mock_uri: &str) -> SyncConfig {
    let mut config = SyncConfig::new(
        mock_uri,
        WooCredentials {
            consumer_key: "ck_test".to_string(),
            consumer_secret: "cs_test".to_string(),
        },
        PathBuf::from("unused.db"),
    );
    config.backoff = Duration::from_millis(5);
    config
}

/// Serve the given `(sku, id)` pairs as a single listing page
pub async fn mount_listing(server: &MockServer, products: &[(&str, u64)]) {
    let rows: Vec<serde_json::Value> = products
        .iter()
        .map(|(sku, id)| serde_json::json!({ "id": id, "sku": sku }))
        .collect();

    Mock::given(method("GET"))
        .and(path("/products"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rows))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(server)
        .await;
}

/// Answers a batch request by listing back every entry it was sent
pub struct EchoBatch;

impl Respond for EchoBatch {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: serde_json::Value = request.body_json().unwrap();
        let mut reply = serde_json::Map::new();
        for key in ["create", "update"] {
            if let Some(entries) = body.get(key).and_then(|v| v.as_array()) {
                let listed: Vec<serde_json::Value> = entries
                    .iter()
                    .enumerate()
                    .map(|(i, e)| {
                        serde_json::json!({
                            "id": e.get("id").cloned().unwrap_or(serde_json::json!(2000 + i)),
                            "sku": e["sku"],
                        })
                    })
                    .collect();
                reply.insert(key.to_string(), serde_json::Value::Array(listed));
            }
        }
        ResponseTemplate::new(200).set_body_json(serde_json::Value::Object(reply))
    }
}

/// Bodies of every batch POST the server received, in order
pub async fn batch_bodies(server: &MockServer) -> Vec<serde_json::Value> {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.method.as_str() == "POST")
        .map(|r| r.body_json().unwrap())
        .collect()
}
