//! Split local parts into create and update payloads against the remote index

use std::collections::HashMap;

use crate::fingerprint::fingerprint;
use crate::payload::{to_payload, SyncPayload};
use crate::source::PartRecord;
use crate::woo::RemoteIndex;

/// Planned work for one run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncPlan {
    /// Parts with no remote product, in input order
    pub create: Vec<SyncPayload>,
    /// Parts matched by SKU, stamped with the remote ID, in input order
    pub update: Vec<SyncPayload>,
    /// Matched parts left out because their fingerprint was unchanged
    pub unchanged: usize,
}

/// Route every part to `create` or `update`.
///
/// Matched parts are always updated, whether or not anything changed.
pub fn reconcile(parts: &[PartRecord], index: &RemoteIndex) -> SyncPlan {
    partition(parts, index, None)
}

/// Like [`reconcile`], but drops matched parts whose fingerprint equals the
/// one in `recorded`
pub fn reconcile_skipping_unchanged(
    parts: &[PartRecord],
    index: &RemoteIndex,
    recorded: &HashMap<String, String>,
) -> SyncPlan {
    partition(parts, index, Some(recorded))
}

fn partition(
    parts: &[PartRecord],
    index: &RemoteIndex,
    recorded: Option<&HashMap<String, String>>,
) -> SyncPlan {
    let mut plan = SyncPlan::default();

    for part in parts {
        let mut payload = to_payload(part);
        match index.get(&part.mpn) {
            Some(id) => {
                let unchanged = recorded
                    .and_then(|r| r.get(&part.mpn))
                    .is_some_and(|sig| *sig == fingerprint(part));
                if unchanged {
                    plan.unchanged += 1;
                    continue;
                }
                payload.id = Some(id);
                plan.update.push(payload);
            }
            None => plan.create.push(payload),
        }
    }

    plan
}
