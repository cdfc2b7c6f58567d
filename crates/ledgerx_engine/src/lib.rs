//! # LedgerX Engine
//!
//! Offline-first ledger engine with batched sync, retry, and deterministic
//! merge.
//!
//! This crate provides:
//! - [`LedgerEngine`] - durable-first mutation API and sync coordinator
//! - Bounded-size batch push with per-call timeout
//! - Retry with exponential backoff ([`RetryPolicy`])
//! - Deterministic local/cloud reconciliation ([`merge`])
//! - Two-tier collision-resistant id generation
//! - Transport abstraction with mock and HTTP implementations
//!
//! ## Architecture
//!
//! The engine implements a **local-first** model:
//! 1. Every mutation is written durably to the local store before the call
//!    returns (durability before acknowledgment)
//! 2. The in-memory projection is updated optimistically
//! 3. Synchronization is a background concern; its failures never surface
//!    to the original caller
//!
//! ## Key Invariants
//!
//! - At most one sync runs per engine instance at a time
//! - Batches within a sync are processed strictly in sequence
//! - Guest (non-account) users never trigger network I/O
//! - Local-only entries are never transmitted remotely
//! - A locally-pending status always wins over a non-pending cloud status
//!   for the same id; in every other case cloud wins

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod engine;
mod error;
mod http;
mod ident;
mod merge;
mod transport;

pub use config::{EngineConfig, RetryPolicy};
pub use engine::{LedgerEngine, SyncStats};
pub use error::{EngineError, EngineResult};
pub use http::{HttpClient, HttpResponse, HttpTransport};
#[cfg(feature = "reqwest")]
pub use http::ReqwestClient;
pub use ident::{is_account_id, new_entry_id};
pub use merge::merge;
pub use transport::{MockTransport, RemoteTransport};
