//! # LedgerX Types
//!
//! Data model and wire types for the LedgerX offline ledger.
//!
//! This crate is the leaf of the workspace: it defines [`LedgerEntry`] (the
//! only persisted entity), the [`EntryStatus`] lifecycle, the reserved
//! [`LOCAL_ONLY_TYPE`] tag for records that must never leave the device, and
//! the JSON envelopes ([`PushRequest`], [`PullResponse`]) exchanged with the
//! remote system of record.
//!
//! ## Key Invariants
//!
//! - `id` is unique within a user's entry set and immutable after creation
//! - `updated_at >= created_at` always
//! - An entry whose type is [`LOCAL_ONLY_TYPE`] never becomes `Synced`
//! - Entries are never hard-deleted by this core

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod entry;
mod wire;

pub use entry::{EntryStatus, LedgerEntry, LOCAL_ONLY_TYPE};
pub use wire::{PullResponse, PushRequest};
