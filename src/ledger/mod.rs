//! Seen-order ledger: the durable set of order ids already handled.
//!
//! The ledger is the single arbiter of "already announced". It is append-only:
//! records are created the first time an order is observed and never updated
//! or removed.

mod memory;
mod mysql;

pub use memory::MemoryLedger;
pub use mysql::{MySqlLedger, MySqlLedgerConfig};

use crate::order::OrderId;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger store error: {0}")]
    Store(#[from] sqlx::Error),
    #[error("ledger {operation} timed out after {elapsed:?}")]
    Timeout {
        operation: &'static str,
        elapsed: Duration,
    },
    #[error("invalid ledger address {0:?}")]
    InvalidAddress(String),
    /// The store can't be reached at all (pool closed or exhausted).
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

/// Result of a single insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// The id was already recorded; nothing was written.
    AlreadyPresent,
}

#[async_trait]
pub trait Ledger: Send + Sync {
    /// True iff `id` has been recorded before.
    async fn has(&self, id: OrderId) -> Result<bool, LedgerError>;

    /// Record `id`. Duplicates are rejected as [`InsertOutcome::AlreadyPresent`], never overwritten.
    async fn insert(&self, id: OrderId) -> Result<InsertOutcome, LedgerError>;
}
