//! Deterministic reconciliation of local and cloud entry sets.

use ledgerx_types::LedgerEntry;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Merges a local entry set and a cloud entry set into one canonical set.
///
/// The cloud is the default source of truth: the result is seeded with every
/// cloud entry. Local entries then apply on top under a single conflict
/// rule:
///
/// - A local entry whose id the cloud has never seen is inserted as-is
///   (a pending local action the cloud hasn't received yet).
/// - A locally-`pending` status wins over a non-pending cloud status for
///   the same id, with `updated_at` set to the larger of the two stamps, so
///   a just-made local mutation is not clobbered by a stale cloud snapshot.
/// - In every other case the cloud entry stands.
///
/// The result is sorted newest-first by `created_at` (ties broken by id for
/// determinism). The function is pure: neither input is mutated.
#[must_use]
pub fn merge(local: &[LedgerEntry], cloud: &[LedgerEntry]) -> Vec<LedgerEntry> {
    let mut by_id: HashMap<&str, LedgerEntry> = cloud
        .iter()
        .map(|entry| (entry.id.as_str(), entry.clone()))
        .collect();

    for local_entry in local {
        match by_id.entry(local_entry.id.as_str()) {
            Entry::Vacant(slot) => {
                slot.insert(local_entry.clone());
            }
            Entry::Occupied(mut slot) => {
                let current = slot.get_mut();
                if local_entry.is_pending() && !current.is_pending() {
                    current.status = local_entry.status;
                    current.updated_at = current.updated_at.max(local_entry.updated_at);
                }
            }
        }
    }

    let mut merged: Vec<LedgerEntry> = by_id.into_values().collect();
    merged.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
    merged
}
