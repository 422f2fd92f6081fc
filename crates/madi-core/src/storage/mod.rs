//! # Storage Module
//!
//! Disk-backed analytics storage using redb.
//!
//! Uses the redb embedded database for:
//! - ACID transactions
//! - Crash safety (copy-on-write B-trees)
//! - MVCC (concurrent readers, single writer)

mod events;

pub use events::{EventStore, StoreError};
