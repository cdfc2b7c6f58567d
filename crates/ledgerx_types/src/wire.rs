//! JSON envelopes for the remote sync endpoint.

use crate::entry::LedgerEntry;
use serde::{Deserialize, Serialize};

/// Request body for a batch push to the remote sync endpoint.
///
/// The remote system expects the batch under the `_entries` key:
///
/// ```json
/// { "_entries": [ { "id": "...", "user_id": "...", "type": "...", ... } ] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushRequest {
    /// The batch of entries, bounded by the engine's batch size.
    #[serde(rename = "_entries")]
    pub entries: Vec<LedgerEntry>,
}

impl PushRequest {
    /// Wraps a batch of entries for the wire.
    #[must_use]
    pub fn new(entries: Vec<LedgerEntry>) -> Self {
        Self { entries }
    }

    /// Number of entries in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the batch carries no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Response body of the remote reconciliation read.
///
/// Carries the canonical entry set for one user in the same envelope shape
/// as [`PushRequest`]. A stub collaborator may always return an empty set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullResponse {
    /// The canonical entries for the requested user.
    #[serde(rename = "_entries", default)]
    pub entries: Vec<LedgerEntry>,
}

impl PullResponse {
    /// Wraps a canonical entry set.
    #[must_use]
    pub fn new(entries: Vec<LedgerEntry>) -> Self {
        Self { entries }
    }
}
