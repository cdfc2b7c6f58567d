//! Store trait definition.

use crate::error::StoreResult;
use ledgerx_types::LedgerEntry;

/// A durable local store of ledger entries, keyed by entry id.
///
/// This is the only shared mutable resource of the ledger core. The engine
/// writes every user action here before acknowledging it, and rebuilds its
/// in-memory projection from `get_all`.
///
/// # Invariants
///
/// - `put` upserts by `entry.id` and is durable before it returns
/// - `get_all` returns every stored entry in unspecified order
/// - Implementations must be `Send + Sync`
///
/// # Fault policy
///
/// Write faults propagate: an action that cannot be durably recorded must
/// surface as a failure to the caller. Read faults are softened by the
/// engine (treated as an empty result set and logged), so implementations
/// should report them honestly rather than papering over them.
pub trait LedgerStore: Send + Sync {
    /// Upserts an entry by id. Durable before returning.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry could not be durably recorded.
    fn put(&self, entry: &LedgerEntry) -> StoreResult<()>;

    /// Returns every stored entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn get_all(&self) -> StoreResult<Vec<LedgerEntry>>;

    /// Returns the entry with the given id, if present.
    ///
    /// The default implementation scans `get_all`; backends with keyed
    /// access should override it.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn get(&self, id: &str) -> StoreResult<Option<LedgerEntry>> {
        Ok(self.get_all()?.into_iter().find(|e| e.id == id))
    }
}
