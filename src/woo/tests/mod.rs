//! Unit tests for the Woo client module.


use std::path::PathBuf;
use std::time::Duration;

use wiremock::{Request, Respond, ResponseTemplate};

use crate::config::{SyncConfig, WooCredentials};
use crate::payload::{to_payload, SyncPayload};
use crate::source::PartRecord;
use crate::woo::WooClient;

fn test_config(mock_uri: &str) -> SyncConfig {
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

fn client_with_mock(mock_uri: &str) -> WooClient {
    WooClient::new(&test_config(mock_uri))
}

fn payloads(count: usize) -> Vec<SyncPayload> {
    (0..count)
        .map(|i| {
            to_payload(&PartRecord {
                mpn: format!("MPN-{:04}", i),
                name: format!("Part {}", i),
                price: "1.00".to_string(),
                stock_qty: (i % 3) as u64,
            })
        })
        .collect()
}

/// Answers a batch request by listing back every entry it was sent
struct EchoBatch;

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
                            "id": e.get("id").cloned().unwrap_or(serde_json::json!(1000 + i)),
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
