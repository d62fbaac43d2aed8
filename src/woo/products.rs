//! SKU index built from the paged product listing

use std::collections::HashMap;

use reqwest::StatusCode;
use serde::Deserialize;

use super::WooClient;
use crate::error::{Result, SyncError};

/// The two fields of a listed product the sync cares about
#[derive(Debug, Deserialize)]
struct ListedProduct {
    id: u64,
    #[serde(default)]
    sku: Option<String>,
}

/// SKU -> remote product ID for every product seen in this run's listing
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RemoteIndex {
    ids: HashMap<String, u64>,
}

impl RemoteIndex {
    /// Look up the remote product ID for a SKU
    pub fn get(&self, sku: &str) -> Option<u64> {
        self.ids.get(sku).copied()
    }

    pub fn contains(&self, sku: &str) -> bool {
        self.ids.contains_key(sku)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    fn insert(&mut self, sku: String, id: u64) {
        if let Some(previous) = self.ids.insert(sku.clone(), id) {
            log::warn!("SKU {} listed on products {} and {}, using {}", sku, previous, id, id);
        }
    }
}

impl FromIterator<(String, u64)> for RemoteIndex {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

impl WooClient {
    /// Walk every product page (any status) and index products by SKU.
    ///
    /// Stops at the first empty page. A 429 retries the same page after the
    /// backoff with no attempt cap; any other failure status aborts the walk.
    pub async fn build_sku_index(&self) -> Result<RemoteIndex> {
        let url = format!("{}/products", self.base_url);
        let per_page = self.page_size.to_string();
        let mut index = RemoteIndex::default();
        let mut page: u32 = 1;

        loop {
            log::debug!("Fetching product page {}", page);
            let page_param = page.to_string();
            let response = self
                .authorized(self.client.get(&url))
                .query(&[
                    ("per_page", per_page.as_str()),
                    ("page", page_param.as_str()),
                    ("status", "any"),
                ])
                .timeout(self.read_timeout)
                .send()
                .await?;

            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                log::warn!("Rate limited on product page {}, retrying in {:?}", page, self.backoff);
                tokio::time::sleep(self.backoff).await;
                continue;
            }
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(SyncError::PageFetch { page, status, body });
            }

            let rows: Vec<ListedProduct> = serde_json::from_str(&response.text().await?)?;
            if rows.is_empty() {
                break;
            }

            for row in rows {
                match row.sku {
                    Some(sku) if !sku.is_empty() => index.insert(sku, row.id),
                    _ => log::debug!("Product {} has no SKU, skipping", row.id),
                }
            }
            page += 1;
        }

        log::info!("Indexed {} remote products by SKU ({} pages)", index.len(), page - 1);
        Ok(index)
    }
}
