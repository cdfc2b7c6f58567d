//! The ledger engine: durable-first mutations and sync coordination.

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::ident::{is_account_id, new_entry_id};
use crate::merge::merge;
use crate::transport::RemoteTransport;
use chrono::{DateTime, Utc};
use ledgerx_store::LedgerStore;
use ledgerx_types::{EntryStatus, LedgerEntry, PushRequest};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Counters describing sync activity on one engine instance.
#[derive(Debug, Clone, Default)]
pub struct SyncStats {
    /// Batches accepted by the remote endpoint.
    pub batches_sent: u64,
    /// Entries confirmed synced.
    pub entries_synced: u64,
    /// Retry attempts performed.
    pub retries: u64,
    /// Most recent permanent batch failure, if any.
    pub last_error: Option<String>,
}

/// The offline-first ledger engine.
///
/// Holds an in-memory projection of one user's entries, exposes the mutation
/// API (`add`, `mark_status`) that writes durably before acknowledging, and
/// coordinates background synchronization with a remote system of record.
///
/// Instances are cheap to clone (shared state behind an `Arc`) and every
/// operation takes `&self`, so one engine can be shared across tasks. At
/// most one sync runs per instance at a time; concurrent `sync_now` callers
/// get an immediate 0 instead of queuing.
#[derive(Clone)]
pub struct LedgerEngine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    config: EngineConfig,
    store: Arc<dyn LedgerStore>,
    transport: Arc<dyn RemoteTransport>,
    entries: RwLock<Vec<LedgerEntry>>,
    is_syncing: AtomicBool,
    last_sync_at: RwLock<Option<DateTime<Utc>>>,
    stats: RwLock<SyncStats>,
}

/// Clears the `is_syncing` flag on every exit path of `sync_now`.
struct SyncingGuard<'a>(&'a AtomicBool);

impl Drop for SyncingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl LedgerEngine {
    /// Creates an engine over the injected store and transport.
    pub fn new(
        config: EngineConfig,
        store: Arc<dyn LedgerStore>,
        transport: Arc<dyn RemoteTransport>,
    ) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                config,
                store,
                transport,
                entries: RwLock::new(Vec::new()),
                is_syncing: AtomicBool::new(false),
                last_sync_at: RwLock::new(None),
                stats: RwLock::new(SyncStats::default()),
            }),
        }
    }

    /// The current user's entries, newest-first.
    #[must_use]
    pub fn entries(&self) -> Vec<LedgerEntry> {
        self.inner.entries.read().clone()
    }

    /// Number of projected entries still awaiting remote confirmation.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner
            .entries
            .read()
            .iter()
            .filter(|e| e.is_pending())
            .count()
    }

    /// Returns true while a sync is in flight on this instance.
    #[must_use]
    pub fn is_syncing(&self) -> bool {
        self.inner.is_syncing.load(Ordering::SeqCst)
    }

    /// When the last sync pass finished, if any.
    #[must_use]
    pub fn last_sync_at(&self) -> Option<DateTime<Utc>> {
        *self.inner.last_sync_at.read()
    }

    /// Sync activity counters.
    #[must_use]
    pub fn stats(&self) -> SyncStats {
        self.inner.stats.read().clone()
    }

    /// Rebuilds the in-memory projection for `user_id`.
    ///
    /// `None` models the not-yet-known user (e.g. session still resolving):
    /// state is left untouched. This is a waiting state, not an error.
    pub fn load(&self, user_id: Option<&str>) {
        let Some(user_id) = user_id else {
            tracing::debug!("load called without a user, leaving projection untouched");
            return;
        };
        self.project(user_id);
    }

    /// Records a new action durably and schedules a best-effort background
    /// sync.
    ///
    /// The entry is written to the local store before this returns
    /// (durability before acknowledgment); the optimistic projection update
    /// and the background sync happen only after the durable write. The
    /// background sync is fire-and-forget: its outcome never affects this
    /// call's result.
    ///
    /// # Errors
    ///
    /// Returns an error if the local store rejects the write — an action
    /// that cannot be durably recorded must surface as a failure.
    pub async fn add(
        &self,
        user_id: &str,
        entry_type: &str,
        payload: serde_json::Value,
    ) -> EngineResult<LedgerEntry> {
        let entry = LedgerEntry::new(new_entry_id(), user_id, entry_type, payload)
            .with_device_id(self.inner.config.device_id.clone());

        self.inner.store.put(&entry)?;
        self.inner.entries.write().insert(0, entry.clone());
        tracing::debug!(id = %entry.id, entry_type = %entry.entry_type, "recorded ledger entry");

        if is_account_id(user_id) && self.inner.transport.is_online() {
            let engine = self.clone();
            let user_id = user_id.to_string();
            let delay = self.inner.config.sync_delay;
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                let synced = engine.sync_now(&user_id).await;
                tracing::debug!(user_id = %user_id, synced, "background sync finished");
            });
        }

        Ok(entry)
    }

    /// Updates the status of a stored entry and republishes the projection.
    ///
    /// An unknown id is a logged no-op. Local-only entries refuse the
    /// `Synced` status (they are never confirmed remotely).
    ///
    /// # Errors
    ///
    /// Returns an error if the updated entry cannot be durably recorded.
    pub fn mark_status(&self, id: &str, status: EntryStatus) -> EngineResult<()> {
        let found = match self.inner.store.get(id) {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(id, error = %e, "mark_status: store read failed");
                return Ok(());
            }
        };
        let Some(mut entry) = found else {
            tracing::warn!(id, "mark_status: entry not found");
            return Ok(());
        };
        if entry.is_local_only() && status == EntryStatus::Synced {
            tracing::warn!(id, "mark_status: local-only entries never become synced");
            return Ok(());
        }

        entry.set_status(status);
        self.inner.store.put(&entry)?;
        self.project(&entry.user_id);
        Ok(())
    }

    /// Convenience wrapper: sync unless the environment reports offline.
    pub async fn sync_pending(&self, user_id: &str) -> usize {
        if !self.inner.transport.is_online() {
            tracing::debug!("offline, skipping sync");
            return 0;
        }
        self.sync_now(user_id).await
    }

    /// Pushes this user's pending entries to the remote system in bounded
    /// batches and reconciles the canonical set back. Returns the number of
    /// entries confirmed synced.
    ///
    /// Guards: guests (non-account user ids) never sync, and at most one
    /// sync runs per instance — a second caller gets an immediate 0.
    /// Batches are processed strictly in sequence; a batch that exhausts
    /// its retries is logged and left pending for a later pass.
    pub async fn sync_now(&self, user_id: &str) -> usize {
        if !is_account_id(user_id) {
            tracing::debug!(user_id, "guest user, entries stay local-only");
            return 0;
        }
        if self
            .inner
            .is_syncing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!("sync already in flight, skipping");
            return 0;
        }
        let _guard = SyncingGuard(&self.inner.is_syncing);

        let mut eligible: Vec<LedgerEntry> = self
            .read_all_softly()
            .into_iter()
            .filter(|e| e.user_id == user_id && e.is_pending() && !e.is_local_only())
            .collect();
        if eligible.is_empty() {
            *self.inner.last_sync_at.write() = Some(Utc::now());
            return 0;
        }
        // Oldest first so the remote sees actions in the order they
        // happened.
        eligible.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));

        let mut synced_total = 0usize;
        for batch in eligible.chunks(self.inner.config.batch_size) {
            if self.push_with_retry(batch).await {
                synced_total += self.mark_batch_synced(batch);
                self.reconcile(user_id).await;
            }
        }

        self.project(user_id);
        *self.inner.last_sync_at.write() = Some(Utc::now());
        tracing::info!(user_id, synced = synced_total, "sync pass finished");
        synced_total
    }

    /// Pushes one batch, retrying with exponential backoff. Returns true on
    /// acceptance.
    async fn push_with_retry(&self, batch: &[LedgerEntry]) -> bool {
        let request = PushRequest::new(batch.to_vec());
        let retry = &self.inner.config.retry;
        let mut failures = 0u32;

        loop {
            let outcome = tokio::time::timeout(
                self.inner.config.request_timeout,
                self.inner.transport.push_batch(&request),
            )
            .await;

            let error = match outcome {
                Ok(Ok(())) => {
                    self.inner.stats.write().batches_sent += 1;
                    return true;
                }
                Ok(Err(e)) => e,
                Err(_) => EngineError::Timeout,
            };

            failures += 1;
            tracing::warn!(
                attempt = failures,
                batch_len = batch.len(),
                error = %error,
                "batch push failed"
            );

            if failures >= retry.max_attempts || !error.is_retryable() {
                tracing::error!(
                    batch_len = batch.len(),
                    attempts = failures,
                    "batch push failed permanently, entries stay pending"
                );
                self.inner.stats.write().last_error = Some(error.to_string());
                return false;
            }

            self.inner.stats.write().retries += 1;
            tokio::time::sleep(retry.delay_for_attempt(failures)).await;
        }
    }

    /// Marks an accepted batch as synced in the store. A write fault leaves
    /// that entry pending for the next pass.
    fn mark_batch_synced(&self, batch: &[LedgerEntry]) -> usize {
        let mut marked = 0usize;
        for entry in batch {
            let mut updated = entry.clone();
            updated.set_status(EntryStatus::Synced);
            match self.inner.store.put(&updated) {
                Ok(()) => marked += 1,
                Err(e) => {
                    tracing::warn!(id = %entry.id, error = %e, "failed to mark entry synced");
                }
            }
        }
        self.inner.stats.write().entries_synced += marked as u64;
        marked
    }

    /// Pulls the canonical entry set and merges it into the local store.
    /// Failures are logged, never fatal.
    async fn reconcile(&self, user_id: &str) {
        let outcome = tokio::time::timeout(
            self.inner.config.request_timeout,
            self.inner.transport.fetch_entries(user_id),
        )
        .await;

        let cloud = match outcome {
            Ok(Ok(cloud)) => cloud,
            Ok(Err(e)) => {
                tracing::warn!(user_id, error = %e, "reconciliation pull failed");
                return;
            }
            Err(_) => {
                tracing::warn!(user_id, "reconciliation pull timed out");
                return;
            }
        };

        let local: Vec<LedgerEntry> = self
            .read_all_softly()
            .into_iter()
            .filter(|e| e.user_id == user_id)
            .collect();
        let merged = merge(&local, &cloud);
        for entry in &merged {
            if let Err(e) = self.inner.store.put(entry) {
                tracing::warn!(id = %entry.id, error = %e, "failed to persist reconciled entry");
            }
        }
        tracing::debug!(user_id, merged = merged.len(), "reconciliation merged");
    }

    /// Reads the whole store, softening read faults to an empty set.
    fn read_all_softly(&self) -> Vec<LedgerEntry> {
        match self.inner.store.get_all() {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, "local store read failed, treating as empty");
                Vec::new()
            }
        }
    }

    /// Republishes the projection for `user_id` from the store,
    /// newest-first.
    fn project(&self, user_id: &str) {
        let mut entries: Vec<LedgerEntry> = self
            .read_all_softly()
            .into_iter()
            .filter(|e| e.user_id == user_id)
            .collect();
        entries.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        *self.inner.entries.write() = entries;
    }
}
