//! PostgreSQL implementation of the ledger store contract
//!
//! Transactions come from the sqlx pool; dropping an uncommitted
//! [`sqlx::Transaction`] rolls it back on every exit path, including
//! cancellation of the calling future.

use super::{LedgerStore, LedgerTx, StoreError};
use crate::account::{Account, AccountRepository, NewAccount};
use crate::ledger::{Entry, EntryKind, EntryLog, Transfer, TransferLog};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

const FOREIGN_KEY_VIOLATION: &str = "23503";
const UNIQUE_VIOLATION: &str = "23505";

/// Classify a sqlx error: uniqueness and foreign-key breaches are client
/// faults, everything else is a store failure.
fn classify(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if let Some(code) = db_err.code() {
            if code == FOREIGN_KEY_VIOLATION || code == UNIQUE_VIOLATION {
                return StoreError::Constraint(db_err.message().to_string());
            }
        }
    }
    StoreError::Database(err)
}

/// Ledger store backed by a PostgreSQL connection pool
pub struct PgLedgerStore {
    pool: PgPool,
}

impl PgLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    async fn create_account(&self, params: NewAccount) -> Result<Account, StoreError> {
        AccountRepository::create(&self.pool, &params)
            .await
            .map_err(classify)
    }

    async fn get_account(&self, id: i64) -> Result<Option<Account>, StoreError> {
        AccountRepository::get(&self.pool, id).await.map_err(classify)
    }

    async fn begin(&self) -> Result<Box<dyn LedgerTx>, StoreError> {
        let tx = self.pool.begin().await.map_err(classify)?;
        Ok(Box::new(PgLedgerTx { tx }))
    }
}

/// One open transaction against PostgreSQL
pub struct PgLedgerTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl LedgerTx for PgLedgerTx {
    async fn get_account(&mut self, id: i64) -> Result<Option<Account>, StoreError> {
        AccountRepository::get(&mut *self.tx, id).await.map_err(classify)
    }

    async fn create_transfer(
        &mut self,
        from_account_id: i64,
        to_account_id: i64,
        amount: i64,
    ) -> Result<Transfer, StoreError> {
        TransferLog::create(&mut *self.tx, from_account_id, to_account_id, amount)
            .await
            .map_err(classify)
    }

    async fn create_entry(
        &mut self,
        account_id: i64,
        amount: i64,
        kind: EntryKind,
    ) -> Result<Entry, StoreError> {
        EntryLog::create(&mut *self.tx, account_id, amount, kind)
            .await
            .map_err(classify)
    }

    async fn add_balance(&mut self, account_id: i64, delta: i64) -> Result<Account, StoreError> {
        AccountRepository::add_balance(&mut *self.tx, account_id, delta)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => StoreError::AccountNotFound(account_id),
                other => classify(other),
            })
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await.map_err(classify)
    }
}
