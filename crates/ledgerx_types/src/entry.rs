//! The ledger entry data model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reserved `type` tag for records that must never be transmitted remotely.
///
/// Entries carrying this tag are excluded from every sync batch regardless of
/// status and therefore stay `Pending` (and counted as pending) indefinitely.
pub const LOCAL_ONLY_TYPE: &str = "local_only";

/// Lifecycle states of a [`LedgerEntry`].
///
/// `Pending` and `Synced` are the two states the sync engine itself moves
/// entries between; the remaining states are domain outcomes reached through
/// explicit local mutations (`mark_status`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    /// Recorded locally, not yet confirmed by the remote system.
    Pending,
    /// Confirmed accepted by the remote system.
    Synced,
    /// Cancelled by the user.
    Cancelled,
    /// Fulfilled.
    Completed,
    /// Moved to a different slot.
    Rescheduled,
    /// Return flow opened.
    ReturnRequested,
    /// Return accepted by support.
    ReturnApproved,
    /// Return declined by support.
    ReturnRejected,
    /// Goods received back.
    Returned,
    /// Money returned to the user.
    Refunded,
}

impl EntryStatus {
    /// Returns the wire representation of this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Pending => "pending",
            EntryStatus::Synced => "synced",
            EntryStatus::Cancelled => "cancelled",
            EntryStatus::Completed => "completed",
            EntryStatus::Rescheduled => "rescheduled",
            EntryStatus::ReturnRequested => "return_requested",
            EntryStatus::ReturnApproved => "return_approved",
            EntryStatus::ReturnRejected => "return_rejected",
            EntryStatus::Returned => "returned",
            EntryStatus::Refunded => "refunded",
        }
    }

    /// Returns true if this entry still awaits remote confirmation.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, EntryStatus::Pending)
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One durably-recorded user action awaiting (or having completed) remote
/// confirmation.
///
/// The `payload` is opaque to the engine: it is carried, persisted, and
/// transmitted verbatim but never inspected.
///
/// Serialization matches the remote wire shape directly: `entry_type` maps to
/// the JSON field `type`, timestamps serialize as ISO-8601 strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique identifier. Assigned at creation, immutable thereafter.
    pub id: String,
    /// Owning account identifier, or a transient guest/device tag.
    pub user_id: String,
    /// Kind of recorded action ("booking", "order", "draft_cart", ...).
    #[serde(rename = "type")]
    pub entry_type: String,
    /// Opaque action description; never inspected by the engine.
    pub payload: serde_json::Value,
    /// Current lifecycle state.
    pub status: EntryStatus,
    /// Originating device/client, for diagnostics and dedup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    /// Short opaque token for integrity/dedup bookkeeping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    /// When the entry was first written.
    pub created_at: DateTime<Utc>,
    /// When the entry was last written. Never earlier than `created_at`.
    pub updated_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Creates a new `Pending` entry stamped with the current time.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        user_id: impl Into<String>,
        entry_type: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            user_id: user_id.into(),
            entry_type: entry_type.into(),
            payload,
            status: EntryStatus::Pending,
            device_id: None,
            checksum: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the originating device id.
    #[must_use]
    pub fn with_device_id(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }

    /// Returns true if this entry must never be transmitted remotely.
    #[must_use]
    pub fn is_local_only(&self) -> bool {
        self.entry_type == LOCAL_ONLY_TYPE
    }

    /// Returns true if this entry still awaits remote confirmation.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status.is_pending()
    }

    /// Transitions the entry to `status` and refreshes `updated_at`.
    ///
    /// `updated_at` is kept monotonically non-decreasing even if the wall
    /// clock stepped backwards between writes.
    pub fn set_status(&mut self, status: EntryStatus) {
        self.status = status;
        self.touch();
    }

    /// Refreshes `updated_at` without changing the status.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now().max(self.updated_at);
    }
}
