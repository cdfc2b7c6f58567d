//! # LedgerX Store
//!
//! Durable local store backends for the LedgerX offline ledger.
//!
//! The store is a persistent key-value collection of ledger entries keyed by
//! entry id, surviving process restarts. The engine only requires two
//! operations from it: `put` (upsert, durable before returning) and
//! `get_all`.
//!
//! ## Design Principles
//!
//! - Backends store whole [`ledgerx_types::LedgerEntry`] values; they do not
//!   interpret payloads or statuses
//! - `put` must be durable before it returns — the engine acknowledges a
//!   user action only after the store accepted it
//! - Must be `Send + Sync` for shared access from engine tasks
//! - Single-writer: two processes mutating one physical store race
//!   last-writer-wins; arbitration is a deployment concern
//!
//! ## Available Backends
//!
//! - [`MemoryStore`] - For testing and ephemeral ledgers
//! - [`FileStore`] - A durable JSON snapshot using atomic file replacement

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod file;
mod memory;
mod store;

pub use error::{StoreError, StoreResult};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use store::LedgerStore;
