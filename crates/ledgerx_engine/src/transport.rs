//! Transport layer abstraction for remote sync.

use crate::error::{EngineError, EngineResult};
use async_trait::async_trait;
use ledgerx_types::{LedgerEntry, PushRequest};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// A remote transport carries batches to the system of record and reads the
/// canonical entry set back.
///
/// This trait abstracts the network layer, allowing different
/// implementations (HTTP, in-process loopback, mock for testing).
#[async_trait]
pub trait RemoteTransport: Send + Sync {
    /// Pushes one batch to the remote write endpoint.
    ///
    /// A non-success response must surface as an error; the engine treats
    /// any error here as batch failure and enters its retry path.
    async fn push_batch(&self, request: &PushRequest) -> EngineResult<()>;

    /// Reads the canonical entry set for one user from the system of
    /// record.
    ///
    /// A stub collaborator may return an empty set; the merge rule then
    /// keeps every local entry.
    async fn fetch_entries(&self, user_id: &str) -> EngineResult<Vec<LedgerEntry>>;

    /// Reports whether the environment currently has network connectivity.
    fn is_online(&self) -> bool;
}

/// A mock transport for testing.
///
/// Records every pushed batch and supports scripted failures, artificial
/// latency, an offline toggle, and a canned cloud snapshot for
/// reconciliation reads.
#[derive(Debug)]
pub struct MockTransport {
    online: AtomicBool,
    latency: Mutex<Option<Duration>>,
    fail_next_pushes: AtomicUsize,
    fail_fetches: AtomicBool,
    push_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
    pushed: Mutex<Vec<PushRequest>>,
    cloud: Mutex<Vec<LedgerEntry>>,
}

impl MockTransport {
    /// Creates a new mock transport, online and failure-free.
    #[must_use]
    pub fn new() -> Self {
        Self {
            online: AtomicBool::new(true),
            latency: Mutex::new(None),
            fail_next_pushes: AtomicUsize::new(0),
            fail_fetches: AtomicBool::new(false),
            push_calls: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
            pushed: Mutex::new(Vec::new()),
            cloud: Mutex::new(Vec::new()),
        }
    }

    /// Toggles reported connectivity.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// Makes the next `n` push attempts fail with a retryable transport
    /// error.
    pub fn fail_next_pushes(&self, n: usize) {
        self.fail_next_pushes.store(n, Ordering::SeqCst);
    }

    /// Makes every reconciliation read fail.
    pub fn fail_fetches(&self, fail: bool) {
        self.fail_fetches.store(fail, Ordering::SeqCst);
    }

    /// Adds artificial latency to every push and fetch.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock() = Some(latency);
    }

    /// Sets the canned cloud snapshot returned by `fetch_entries`.
    pub fn set_cloud_entries(&self, entries: Vec<LedgerEntry>) {
        *self.cloud.lock() = entries;
    }

    /// Number of push attempts seen (including failed ones).
    #[must_use]
    pub fn push_calls(&self) -> usize {
        self.push_calls.load(Ordering::SeqCst)
    }

    /// Number of reconciliation reads seen.
    #[must_use]
    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// Every batch accepted so far, in push order.
    #[must_use]
    pub fn pushed_batches(&self) -> Vec<PushRequest> {
        self.pushed.lock().clone()
    }

    async fn apply_latency(&self) {
        let latency = *self.latency.lock();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn take_scripted_failure(&self) -> bool {
        self.fail_next_pushes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl RemoteTransport for MockTransport {
    async fn push_batch(&self, request: &PushRequest) -> EngineResult<()> {
        self.push_calls.fetch_add(1, Ordering::SeqCst);
        self.apply_latency().await;

        if self.take_scripted_failure() {
            return Err(EngineError::transport_retryable("scripted push failure"));
        }

        self.pushed.lock().push(request.clone());
        Ok(())
    }

    async fn fetch_entries(&self, user_id: &str) -> EngineResult<Vec<LedgerEntry>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.apply_latency().await;

        if self.fail_fetches.load(Ordering::SeqCst) {
            return Err(EngineError::transport_retryable("scripted fetch failure"));
        }

        Ok(self
            .cloud
            .lock()
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect())
    }

    fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}
