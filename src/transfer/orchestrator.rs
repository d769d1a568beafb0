//! Transfer orchestration: one funds movement as one atomic unit of work
//!
//! The orchestrator writes the transfer record, both ledger entries, and
//! both balance increments inside a single transactional scope. Balance
//! increments always run in ascending account-id order, whichever account
//! is semantically the source. That total lock-acquisition order is the
//! deadlock-avoidance mechanism: opposite-direction transfers between the
//! same pair contend for the lower-id row first, so no waiter cycle can
//! form. There is no retry-on-deadlock loop.

use super::error::TransferError;
use crate::account::Account;
use crate::ledger::{Entry, EntryKind, Transfer};
use crate::store::LedgerStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Input of one transfer
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TransferParams {
    pub from_account_id: i64,
    pub to_account_id: i64,
    /// Minor currency units, must be positive
    pub amount: i64,
}

/// Everything a successful transfer produced
#[derive(Debug, Clone, Serialize)]
pub struct TransferOutcome {
    pub transfer: Transfer,
    pub from_account: Account,
    pub to_account: Account,
    pub from_entry: Entry,
    pub to_entry: Entry,
}

/// Executes funds movements against an injected ledger store
pub struct TransferOrchestrator {
    store: Arc<dyn LedgerStore>,
}

impl TransferOrchestrator {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Move `amount` from one account to another.
    ///
    /// All-or-nothing: on any error the transaction handle is dropped and
    /// the store rolls back every write, so no partial state is visible.
    /// Cancelling the returned future before commit rolls back the same
    /// way. The from-account balance may not go negative; the check runs
    /// inside the same atomic unit as the increments, not as a separate
    /// unlocked pre-read.
    pub async fn transfer(&self, params: TransferParams) -> Result<TransferOutcome, TransferError> {
        if params.amount <= 0 {
            return Err(TransferError::InvalidAmount);
        }
        if params.from_account_id == params.to_account_id {
            return Err(TransferError::SameAccount);
        }

        debug!(
            from_account_id = params.from_account_id,
            to_account_id = params.to_account_id,
            amount = params.amount,
            "executing transfer"
        );

        let mut tx = self.store.begin().await?;

        for id in [params.from_account_id, params.to_account_id] {
            if tx.get_account(id).await?.is_none() {
                return Err(TransferError::AccountNotFound(id));
            }
        }

        let transfer = tx
            .create_transfer(params.from_account_id, params.to_account_id, params.amount)
            .await?;
        let from_entry = tx
            .create_entry(params.from_account_id, -params.amount, EntryKind::Debit)
            .await?;
        let to_entry = tx
            .create_entry(params.to_account_id, params.amount, EntryKind::Credit)
            .await?;

        // Canonical lock order: lower account id first, regardless of
        // which side is the source.
        let (from_account, to_account) = if params.from_account_id < params.to_account_id {
            let from_account = tx.add_balance(params.from_account_id, -params.amount).await?;
            let to_account = tx.add_balance(params.to_account_id, params.amount).await?;
            (from_account, to_account)
        } else {
            let to_account = tx.add_balance(params.to_account_id, params.amount).await?;
            let from_account = tx.add_balance(params.from_account_id, -params.amount).await?;
            (from_account, to_account)
        };

        if from_account.balance < 0 {
            warn!(
                from_account_id = params.from_account_id,
                amount = params.amount,
                "transfer rejected: insufficient balance"
            );
            return Err(TransferError::InsufficientBalance {
                account_id: params.from_account_id,
                available: from_account.balance + params.amount,
                requested: params.amount,
            });
        }

        tx.commit().await?;

        debug!(
            transfer_id = transfer.id,
            from_balance = from_account.balance,
            to_balance = to_account.balance,
            "transfer committed"
        );

        Ok(TransferOutcome {
            transfer,
            from_account,
            to_account,
            from_entry,
            to_entry,
        })
    }
}
