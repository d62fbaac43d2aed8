//! One run of the parts -> WooCommerce sync
//!
//! fetch parts -> index remote SKUs -> plan -> create chunks -> update chunks.
//! Creates finish (or abort the run) before the first update chunk is sent.

use std::collections::HashMap;

use serde::Serialize;

use crate::config::SyncConfig;
use crate::error::{Result, SyncError};
use crate::fingerprint::{fingerprint, SignatureStore};
use crate::payload::SyncPayload;
use crate::reconcile::{reconcile, reconcile_skipping_unchanged, SyncPlan};
use crate::source::{PartRecord, PartSource};
use crate::woo::{BatchKind, BatchReport, DispatchError, RemoteIndex, WooClient};

/// Payloads of each kind shown in a dry run
const SAMPLE_SIZE: usize = 2;

/// Outcome of a run
///
/// `created` and `updated` are the counts the store listed back, not the
/// number of payloads sent. In a dry run they are the planned counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub created: usize,
    pub updated: usize,
    pub dry_run: bool,
    pub skipped_unchanged: usize,
    pub create_shortfall: usize,
    pub update_shortfall: usize,
    pub item_errors: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub create_sample: Vec<SyncPayload>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub update_sample: Vec<SyncPayload>,
}

/// Sequences the sync components for a single run
pub struct SyncRun<'a> {
    config: &'a SyncConfig,
    source: &'a dyn PartSource,
    woo: &'a WooClient,
    signatures: Option<&'a mut dyn SignatureStore>,
}

impl<'a> SyncRun<'a> {
    pub fn new(config: &'a SyncConfig, source: &'a dyn PartSource, woo: &'a WooClient) -> Self {
        Self {
            config,
            source,
            woo,
            signatures: None,
        }
    }

    /// Attach the store used when `skip_unchanged` is enabled
    pub fn with_signature_store(mut self, store: &'a mut dyn SignatureStore) -> Self {
        self.signatures = Some(store);
        self
    }

    fn tracks_signatures(&self) -> bool {
        self.config.skip_unchanged && self.signatures.is_some()
    }

    /// Run the sync. With `dry_run` nothing is written to Woo.
    pub async fn run(&mut self, limit: Option<usize>, dry_run: bool) -> Result<RunSummary> {
        let parts = self.source.fetch_parts(limit)?;
        log::info!("[sync] fetched {} rows from the parts database", parts.len());

        let index = self.woo.build_sku_index().await?;
        log::info!("[sync] fetched {} existing Woo products", index.len());

        let plan = self.plan(&parts, &index)?;
        log::info!(
            "[plan] create={} update={} unchanged={} (batch size {})",
            plan.create.len(),
            plan.update.len(),
            plan.unchanged,
            self.woo.batch_size()
        );

        if dry_run {
            log::info!("[dry-run] not calling Woo");
            return Ok(RunSummary {
                created: plan.create.len(),
                updated: plan.update.len(),
                dry_run: true,
                skipped_unchanged: plan.unchanged,
                create_sample: plan.create.iter().take(SAMPLE_SIZE).cloned().collect(),
                update_sample: plan.update.iter().take(SAMPLE_SIZE).cloned().collect(),
                ..RunSummary::default()
            });
        }

        let created = self
            .dispatch_kind(&parts, &plan.create, BatchKind::Create, 0)
            .await?;
        let updated = self
            .dispatch_kind(&parts, &plan.update, BatchKind::Update, created.confirmed)
            .await?;

        let summary = RunSummary {
            created: created.confirmed,
            updated: updated.confirmed,
            dry_run: false,
            skipped_unchanged: plan.unchanged,
            create_shortfall: created.shortfall(),
            update_shortfall: updated.shortfall(),
            item_errors: created.item_errors + updated.item_errors,
            ..RunSummary::default()
        };

        if summary.create_shortfall > 0 || summary.update_shortfall > 0 {
            log::warn!(
                "Woo confirmed fewer entries than sent (create short by {}, update short by {})",
                summary.create_shortfall,
                summary.update_shortfall
            );
        }

        Ok(summary)
    }

    fn plan(&self, parts: &[PartRecord], index: &RemoteIndex) -> Result<SyncPlan> {
        if !self.config.skip_unchanged {
            return Ok(reconcile(parts, index));
        }

        match self.signatures.as_deref() {
            Some(store) => {
                let recorded = store.load()?;
                log::debug!("Loaded {} recorded signatures", recorded.len());
                Ok(reconcile_skipping_unchanged(parts, index, &recorded))
            }
            None => {
                log::warn!("skip_unchanged is set but no signature store is attached");
                Ok(reconcile(parts, index))
            }
        }
    }

    /// Dispatch one kind. A failure after any confirmed write becomes
    /// [`SyncError::PartialSync`].
    ///
    /// Fingerprints are recorded after every chunk. A failing signature store
    /// is logged and never stops the dispatch, since the chunk is already
    /// applied remotely.
    async fn dispatch_kind(
        &mut self,
        parts: &[PartRecord],
        payloads: &[SyncPayload],
        kind: BatchKind,
        created_so_far: usize,
    ) -> Result<BatchReport> {
        let woo = self.woo;
        let mut store = if self.tracks_signatures() {
            self.signatures.as_deref_mut()
        } else {
            None
        };
        let by_mpn: HashMap<&str, &PartRecord> =
            parts.iter().map(|p| (p.mpn.as_str(), p)).collect();

        let dispatched = woo
            .dispatch_each(payloads, kind, |skus| {
                if let Some(store) = store.as_deref_mut() {
                    if let Err(e) = record_signatures(store, &by_mpn, skus) {
                        log::error!("Failed to record {} signatures: {}", kind, e);
                    }
                }
            })
            .await;

        match dispatched {
            Ok(report) => Ok(report),
            Err(DispatchError {
                kind,
                report,
                source,
            }) => {
                let (created, updated) = match kind {
                    BatchKind::Create => (report.confirmed, 0),
                    BatchKind::Update => (created_so_far, report.confirmed),
                };
                if created == 0 && updated == 0 {
                    return Err(source);
                }
                Err(SyncError::PartialSync {
                    kind,
                    created,
                    updated,
                    source: Box::new(source),
                })
            }
        }
    }
}

/// Record fingerprints for the SKUs the store confirmed
fn record_signatures(
    store: &mut dyn SignatureStore,
    by_mpn: &HashMap<&str, &PartRecord>,
    skus: &[String],
) -> Result<()> {
    let entries: Vec<(String, String)> = skus
        .iter()
        .filter_map(|sku| by_mpn.get(sku.as_str()))
        .map(|part| (part.mpn.clone(), fingerprint(part)))
        .collect();
    if entries.is_empty() {
        return Ok(());
    }
    store.record(&entries)
}
