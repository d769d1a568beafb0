//! Persistence contract consumed by the transfer orchestrator
//!
//! [`LedgerStore`] hands out scoped transaction handles. A handle that is
//! dropped without [`LedgerTx::commit`] rolls back; no partial writes ever
//! become visible. Two implementations exist: [`postgres::PgLedgerStore`]
//! for the real store and [`memory::MemLedgerStore`], which models row
//! locking with per-account mutexes and backs the concurrency tests.

pub mod memory;
pub mod postgres;

use crate::account::{Account, NewAccount};
use crate::ledger::{Entry, EntryKind, Transfer};
use async_trait::async_trait;
use thiserror::Error;

pub use memory::MemLedgerStore;
pub use postgres::PgLedgerStore;

/// Store-level failures
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("account not found: {0}")]
    AccountNotFound(i64),

    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Operations available inside one transactional scope.
///
/// All writes issued through a handle commit or roll back as a single
/// outcome. `add_balance` is the only blocking point: it serializes
/// concurrent writers on the account row.
#[async_trait]
pub trait LedgerTx: Send {
    async fn get_account(&mut self, id: i64) -> Result<Option<Account>, StoreError>;

    async fn create_transfer(
        &mut self,
        from_account_id: i64,
        to_account_id: i64,
        amount: i64,
    ) -> Result<Transfer, StoreError>;

    async fn create_entry(
        &mut self,
        account_id: i64,
        amount: i64,
        kind: EntryKind,
    ) -> Result<Entry, StoreError>;

    /// Atomically add a signed delta to an account balance and return the
    /// updated account. Acquires the row lock; the lock is held until the
    /// handle commits or drops.
    async fn add_balance(&mut self, account_id: i64, delta: i64) -> Result<Account, StoreError>;

    /// Commit every write issued through this handle
    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}

/// Handle to the system of record
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn create_account(&self, params: NewAccount) -> Result<Account, StoreError>;

    async fn get_account(&self, id: i64) -> Result<Option<Account>, StoreError>;

    /// Open a transactional scope
    async fn begin(&self) -> Result<Box<dyn LedgerTx>, StoreError>;
}
