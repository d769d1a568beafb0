//! In-memory implementation of the ledger store contract
//!
//! Faithful to the locking behavior of the real store: `add_balance` takes
//! a per-account mutex and holds it until the transaction commits or drops,
//! so a caller that updated two accounts in request order instead of
//! identifier order would deadlock here exactly as it would on row locks.
//! Dropping an uncommitted handle undoes its balance deltas and discards
//! its buffered rows.

use super::{LedgerStore, LedgerTx, StoreError};
use crate::account::{Account, NewAccount};
use crate::ledger::{Entry, EntryKind, Transfer};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::{Mutex, OwnedMutexGuard};

struct Inner {
    accounts: DashMap<i64, Arc<Mutex<Account>>>,
    entries: Mutex<Vec<Entry>>,
    transfers: Mutex<Vec<Transfer>>,
    next_account_id: AtomicI64,
    next_entry_id: AtomicI64,
    next_transfer_id: AtomicI64,
}

/// Ledger store held entirely in process memory
pub struct MemLedgerStore {
    inner: Arc<Inner>,
}

impl Default for MemLedgerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemLedgerStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                accounts: DashMap::new(),
                entries: Mutex::new(Vec::new()),
                transfers: Mutex::new(Vec::new()),
                next_account_id: AtomicI64::new(1),
                next_entry_id: AtomicI64::new(1),
                next_transfer_id: AtomicI64::new(1),
            }),
        }
    }

    /// Snapshot of all committed ledger entries
    pub async fn entries(&self) -> Vec<Entry> {
        self.inner.entries.lock().await.clone()
    }

    /// Snapshot of all committed transfer records
    pub async fn transfers(&self) -> Vec<Transfer> {
        self.inner.transfers.lock().await.clone()
    }
}

#[async_trait]
impl LedgerStore for MemLedgerStore {
    async fn create_account(&self, params: NewAccount) -> Result<Account, StoreError> {
        let id = self.inner.next_account_id.fetch_add(1, Ordering::SeqCst);
        let account = Account {
            id,
            user_id: params.user_id,
            account_number: params.account_number,
            status: params.status,
            balance: params.balance,
            currency_code: params.currency_code,
            created_at: Utc::now(),
        };
        self.inner
            .accounts
            .insert(id, Arc::new(Mutex::new(account.clone())));
        Ok(account)
    }

    async fn get_account(&self, id: i64) -> Result<Option<Account>, StoreError> {
        let cell = match self.inner.accounts.get(&id) {
            Some(entry) => Arc::clone(entry.value()),
            None => return Ok(None),
        };
        let account = cell.lock().await.clone();
        Ok(Some(account))
    }

    async fn begin(&self) -> Result<Box<dyn LedgerTx>, StoreError> {
        Ok(Box::new(MemLedgerTx {
            inner: Arc::clone(&self.inner),
            locks: BTreeMap::new(),
            applied: Vec::new(),
            transfers: Vec::new(),
            entries: Vec::new(),
            committed: false,
        }))
    }
}

/// One open transaction against the in-memory store.
///
/// Balance mutations apply immediately under the held account lock and are
/// recorded for undo; inserted rows stay buffered until commit.
pub struct MemLedgerTx {
    inner: Arc<Inner>,
    locks: BTreeMap<i64, OwnedMutexGuard<Account>>,
    applied: Vec<(i64, i64)>,
    transfers: Vec<Transfer>,
    entries: Vec<Entry>,
    committed: bool,
}

impl MemLedgerTx {
    fn account_exists(&self, id: i64) -> bool {
        self.inner.accounts.contains_key(&id)
    }
}

#[async_trait]
impl LedgerTx for MemLedgerTx {
    async fn get_account(&mut self, id: i64) -> Result<Option<Account>, StoreError> {
        // Own writes are visible through the held guard
        if let Some(guard) = self.locks.get(&id) {
            return Ok(Some((**guard).clone()));
        }
        let cell = match self.inner.accounts.get(&id) {
            Some(entry) => Arc::clone(entry.value()),
            None => return Ok(None),
        };
        let account = cell.lock().await.clone();
        Ok(Some(account))
    }

    async fn create_transfer(
        &mut self,
        from_account_id: i64,
        to_account_id: i64,
        amount: i64,
    ) -> Result<Transfer, StoreError> {
        if !self.account_exists(from_account_id) {
            return Err(StoreError::Constraint(format!(
                "transfers.from_account_id references missing account {from_account_id}"
            )));
        }
        if !self.account_exists(to_account_id) {
            return Err(StoreError::Constraint(format!(
                "transfers.to_account_id references missing account {to_account_id}"
            )));
        }
        let transfer = Transfer {
            id: self.inner.next_transfer_id.fetch_add(1, Ordering::SeqCst),
            from_account_id,
            to_account_id,
            amount,
            created_at: Utc::now(),
        };
        self.transfers.push(transfer.clone());
        Ok(transfer)
    }

    async fn create_entry(
        &mut self,
        account_id: i64,
        amount: i64,
        kind: EntryKind,
    ) -> Result<Entry, StoreError> {
        if !self.account_exists(account_id) {
            return Err(StoreError::Constraint(format!(
                "entries.account_id references missing account {account_id}"
            )));
        }
        let entry = Entry {
            id: self.inner.next_entry_id.fetch_add(1, Ordering::SeqCst),
            account_id,
            amount,
            debit_credit: kind,
            created_at: Utc::now(),
        };
        self.entries.push(entry.clone());
        Ok(entry)
    }

    async fn add_balance(&mut self, account_id: i64, delta: i64) -> Result<Account, StoreError> {
        if !self.locks.contains_key(&account_id) {
            let cell = self
                .inner
                .accounts
                .get(&account_id)
                .map(|entry| Arc::clone(entry.value()))
                .ok_or(StoreError::AccountNotFound(account_id))?;
            // Blocks while another transaction holds this account's lock
            let guard = cell.lock_owned().await;
            self.locks.insert(account_id, guard);
        }
        let guard = match self.locks.get_mut(&account_id) {
            Some(guard) => guard,
            None => return Err(StoreError::AccountNotFound(account_id)),
        };
        guard.balance += delta;
        self.applied.push((account_id, delta));
        Ok((**guard).clone())
    }

    async fn commit(mut self: Box<Self>) -> Result<(), StoreError> {
        self.inner
            .transfers
            .lock()
            .await
            .append(&mut self.transfers);
        self.inner.entries.lock().await.append(&mut self.entries);
        self.applied.clear();
        self.committed = true;
        Ok(())
    }
}

impl Drop for MemLedgerTx {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        // Undo uncommitted deltas through the still-held guards
        for (account_id, delta) in self.applied.drain(..) {
            if let Some(guard) = self.locks.get_mut(&account_id) {
                guard.balance -= delta;
            }
        }
    }
}
