//! Chunked writes to `POST /products/batch`

use reqwest::StatusCode;
use serde::Deserialize;

use super::{BatchKind, WooClient};
use crate::error::SyncError;
use crate::payload::SyncPayload;

/// Per-item error object the batch endpoint embeds for rejected entries
#[derive(Debug, Default, Deserialize)]
struct ItemError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// One entry of the batch response, as much of it as the sync reads
#[derive(Debug, Deserialize)]
struct BatchItem {
    #[serde(default)]
    id: u64,
    #[serde(default)]
    sku: Option<String>,
    #[serde(default)]
    error: Option<ItemError>,
}

#[derive(Debug, Default, Deserialize)]
struct BatchResponse {
    #[serde(default)]
    create: Vec<BatchItem>,
    #[serde(default)]
    update: Vec<BatchItem>,
}

impl BatchResponse {
    fn take(self, kind: BatchKind) -> Vec<BatchItem> {
        match kind {
            BatchKind::Create => self.create,
            BatchKind::Update => self.update,
        }
    }
}

/// Totals for one dispatched kind
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchReport {
    /// Payloads sent
    pub requested: usize,
    /// Entries the remote listed back under the kind's key
    pub confirmed: usize,
    /// Listed entries that carried an error object
    pub item_errors: usize,
    /// Chunks that completed
    pub chunks: usize,
    /// SKUs of listed entries without an error
    pub confirmed_skus: Vec<String>,
}

impl BatchReport {
    /// Payloads sent but not listed back by the remote
    pub fn shortfall(&self) -> usize {
        self.requested.saturating_sub(self.confirmed)
    }
}

/// A dispatch that stopped on a fatal chunk
///
/// `report` covers the chunks that completed before the failure.
#[derive(Debug, thiserror::Error)]
#[error("batch {kind} aborted after {} confirmed entries: {source}", .report.confirmed)]
pub struct DispatchError {
    pub kind: BatchKind,
    pub report: BatchReport,
    #[source]
    pub source: SyncError,
}

/// Number of chunks needed for `len` payloads; 0 when `chunk_size` is 0
pub fn chunk_count(len: usize, chunk_size: usize) -> usize {
    if chunk_size == 0 {
        return 0;
    }
    len.div_ceil(chunk_size)
}

impl WooClient {
    /// Send `payloads` in consecutive chunks of at most `batch_size`.
    ///
    /// Chunks go out strictly in order; the first fatal chunk stops the
    /// dispatch and the chunks already applied stay applied.
    pub async fn dispatch(
        &self,
        payloads: &[SyncPayload],
        kind: BatchKind,
    ) -> Result<BatchReport, DispatchError> {
        self.dispatch_each(payloads, kind, |_| {}).await
    }

    /// Like [`WooClient::dispatch`], calling `on_chunk` with the SKUs each
    /// completed chunk confirmed before the next chunk is sent
    pub async fn dispatch_each<F>(
        &self,
        payloads: &[SyncPayload],
        kind: BatchKind,
        mut on_chunk: F,
    ) -> Result<BatchReport, DispatchError>
    where
        F: FnMut(&[String]),
    {
        let total = payloads.len();
        let mut report = BatchReport::default();

        if self.batch_size == 0 {
            return Err(DispatchError {
                kind,
                report,
                source: SyncError::Config("batch size must be positive".to_string()),
            });
        }

        for (index, chunk) in payloads.chunks(self.batch_size).enumerate() {
            log::debug!(
                "Sending {} chunk {}/{} ({} entries)",
                kind,
                index + 1,
                chunk_count(total, self.batch_size),
                chunk.len()
            );

            let items = match self.push_chunk(kind, chunk).await {
                Ok(items) => items,
                Err(source) => {
                    return Err(DispatchError {
                        kind,
                        report,
                        source,
                    })
                }
            };

            if items.len() != chunk.len() {
                log::warn!(
                    "Woo listed {} of {} {} entries in chunk {}",
                    items.len(),
                    chunk.len(),
                    kind,
                    index + 1
                );
            }

            report.requested += chunk.len();
            report.confirmed += items.len();
            report.chunks += 1;
            let mut chunk_skus = Vec::new();
            for item in items {
                match item.error {
                    Some(err) => {
                        report.item_errors += 1;
                        log::warn!(
                            "Woo rejected {} entry {} (id {}): {} {}",
                            kind,
                            item.sku.as_deref().unwrap_or("?"),
                            item.id,
                            err.code,
                            err.message
                        );
                    }
                    None => {
                        if let Some(sku) = item.sku.filter(|s| !s.is_empty()) {
                            chunk_skus.push(sku);
                        }
                    }
                }
            }
            on_chunk(&chunk_skus);
            report.confirmed_skus.extend(chunk_skus);

            log::info!("[{}] {}/{}", kind, report.confirmed, total);
        }

        Ok(report)
    }

    /// POST one chunk, retrying only on 429 and at most `max_write_attempts` times
    async fn push_chunk(
        &self,
        kind: BatchKind,
        chunk: &[SyncPayload],
    ) -> Result<Vec<BatchItem>, SyncError> {
        let url = format!("{}/products/batch", self.base_url);
        let mut body = serde_json::Map::new();
        body.insert(kind.key().to_string(), serde_json::to_value(chunk)?);

        for attempt in 1..=self.max_write_attempts {
            let response = self
                .authorized(self.client.post(&url))
                .json(&body)
                .timeout(self.write_timeout)
                .send()
                .await?;

            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                log::warn!(
                    "Rate limited on {} batch (attempt {}/{})",
                    kind,
                    attempt,
                    self.max_write_attempts
                );
                if attempt < self.max_write_attempts {
                    tokio::time::sleep(self.backoff).await;
                }
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(SyncError::BatchRejected { kind, status, body });
            }

            let parsed: BatchResponse = serde_json::from_str(&response.text().await?)?;
            return Ok(parsed.take(kind));
        }

        Err(SyncError::RateLimitExhausted {
            kind,
            attempts: self.max_write_attempts,
        })
    }
}
