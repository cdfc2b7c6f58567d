//! In-memory store backend for testing.

use crate::error::StoreResult;
use crate::store::LedgerStore;
use ledgerx_types::LedgerEntry;
use parking_lot::RwLock;
use std::collections::HashMap;

/// An in-memory ledger store.
///
/// This backend keeps all entries in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral ledgers that don't need persistence
///
/// # Thread Safety
///
/// This backend is thread-safe and can be shared across tasks.
///
/// # Example
///
/// ```rust
/// use ledgerx_store::{LedgerStore, MemoryStore};
/// use ledgerx_types::LedgerEntry;
///
/// let store = MemoryStore::new();
/// let entry = LedgerEntry::new("e-1", "u-1", "booking", serde_json::json!({}));
/// store.put(&entry).unwrap();
/// assert_eq!(store.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, LedgerEntry>>,
}

impl MemoryStore {
    /// Creates a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with entries.
    ///
    /// Useful for testing load and merge scenarios.
    #[must_use]
    pub fn with_entries(entries: impl IntoIterator<Item = LedgerEntry>) -> Self {
        let map = entries.into_iter().map(|e| (e.id.clone(), e)).collect();
        Self {
            entries: RwLock::new(map),
        }
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Returns true if an entry with `id` is stored.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries.read().contains_key(id)
    }

    /// Removes every stored entry.
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

impl LedgerStore for MemoryStore {
    fn put(&self, entry: &LedgerEntry) -> StoreResult<()> {
        self.entries
            .write()
            .insert(entry.id.clone(), entry.clone());
        Ok(())
    }

    fn get_all(&self) -> StoreResult<Vec<LedgerEntry>> {
        Ok(self.entries.read().values().cloned().collect())
    }

    fn get(&self, id: &str) -> StoreResult<Option<LedgerEntry>> {
        Ok(self.entries.read().get(id).cloned())
    }
}
