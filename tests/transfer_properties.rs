//! Concurrency and conservation properties of the transfer orchestrator.
//!
//! Runs against the in-memory store, whose per-account locks are held
//! until commit exactly like row locks, so lost updates and lock-order
//! deadlocks would surface here.

use corebank::account::{AccountStatus, NewAccount, random_account_number};
use corebank::ledger::EntryKind;
use corebank::store::{LedgerStore, MemLedgerStore};
use corebank::transfer::{TransferError, TransferOrchestrator, TransferParams};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;

async fn create_account(store: &MemLedgerStore, balance: i64) -> corebank::Account {
    store
        .create_account(NewAccount {
            user_id: 1,
            account_number: random_account_number(),
            status: AccountStatus::Active,
            balance,
            currency_code: "USD".to_string(),
        })
        .await
        .expect("Should create account")
}

#[tokio::test]
async fn test_single_transfer_arithmetic() {
    let store = Arc::new(MemLedgerStore::new());
    let a = create_account(&store, 100).await;
    let b = create_account(&store, 50).await;
    let orchestrator = TransferOrchestrator::new(store.clone());

    let outcome = orchestrator
        .transfer(TransferParams {
            from_account_id: a.id,
            to_account_id: b.id,
            amount: 30,
        })
        .await
        .expect("Transfer should succeed");

    assert_eq!(outcome.from_account.balance, 70);
    assert_eq!(outcome.to_account.balance, 80);

    assert_eq!(outcome.transfer.from_account_id, a.id);
    assert_eq!(outcome.transfer.to_account_id, b.id);
    assert_eq!(outcome.transfer.amount, 30);

    assert_eq!(outcome.from_entry.account_id, a.id);
    assert_eq!(outcome.from_entry.amount, -30);
    assert_eq!(outcome.from_entry.debit_credit, EntryKind::Debit);
    assert_eq!(outcome.to_entry.account_id, b.id);
    assert_eq!(outcome.to_entry.amount, 30);
    assert_eq!(outcome.to_entry.debit_credit, EntryKind::Credit);

    // Committed store state matches the returned outcome
    assert_eq!(store.get_account(a.id).await.unwrap().unwrap().balance, 70);
    assert_eq!(store.get_account(b.id).await.unwrap().unwrap().balance, 80);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_transfers_lose_no_update() {
    let store = Arc::new(MemLedgerStore::new());
    let a = create_account(&store, 1000).await;
    let b = create_account(&store, 1000).await;
    let orchestrator = Arc::new(TransferOrchestrator::new(store.clone()));

    let n = 5;
    let amount = 10;

    let handles: Vec<_> = (0..n)
        .map(|_| {
            let orchestrator = Arc::clone(&orchestrator);
            let (from, to) = (a.id, b.id);
            tokio::spawn(async move {
                orchestrator
                    .transfer(TransferParams {
                        from_account_id: from,
                        to_account_id: to,
                        amount,
                    })
                    .await
            })
        })
        .collect();

    for handle in join_all(handles).await {
        handle.expect("Task should not panic").expect("Transfer should succeed");
    }

    let final_a = store.get_account(a.id).await.unwrap().unwrap();
    let final_b = store.get_account(b.id).await.unwrap().unwrap();
    assert_eq!(final_a.balance, 1000 - n * amount);
    assert_eq!(final_b.balance, 1000 + n * amount);

    assert_eq!(store.transfers().await.len(), n as usize);
    assert_eq!(store.entries().await.len(), 2 * n as usize);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_alternating_directions_do_not_deadlock() {
    let store = Arc::new(MemLedgerStore::new());
    let a = create_account(&store, 1000).await;
    let b = create_account(&store, 1000).await;
    let orchestrator = Arc::new(TransferOrchestrator::new(store.clone()));

    let n = 10;
    let amount = 10;

    let handles: Vec<_> = (0..n)
        .map(|i| {
            let orchestrator = Arc::clone(&orchestrator);
            // Half the transfers run in the opposite direction
            let (from, to) = if i % 2 == 0 { (a.id, b.id) } else { (b.id, a.id) };
            tokio::spawn(async move {
                orchestrator
                    .transfer(TransferParams {
                        from_account_id: from,
                        to_account_id: to,
                        amount,
                    })
                    .await
            })
        })
        .collect();

    // A lock-order bug would leave the tasks waiting on each other forever
    let results = tokio::time::timeout(Duration::from_secs(10), join_all(handles))
        .await
        .expect("Transfers deadlocked");

    for handle in results {
        handle.expect("Task should not panic").expect("Transfer should succeed");
    }

    // Directions net to zero
    let final_a = store.get_account(a.id).await.unwrap().unwrap();
    let final_b = store.get_account(b.id).await.unwrap().unwrap();
    assert_eq!(final_a.balance, 1000);
    assert_eq!(final_b.balance, 1000);
}

#[tokio::test]
async fn test_every_transfer_yields_one_record_and_two_inverse_entries() {
    let store = Arc::new(MemLedgerStore::new());
    let a = create_account(&store, 500).await;
    let b = create_account(&store, 500).await;
    let orchestrator = TransferOrchestrator::new(store.clone());

    for amount in [10, 25, 40] {
        orchestrator
            .transfer(TransferParams {
                from_account_id: a.id,
                to_account_id: b.id,
                amount,
            })
            .await
            .expect("Transfer should succeed");
    }

    let transfers = store.transfers().await;
    let entries = store.entries().await;
    assert_eq!(transfers.len(), 3);
    assert_eq!(entries.len(), 6);

    for transfer in &transfers {
        let debit = entries
            .iter()
            .find(|e| e.account_id == transfer.from_account_id && -e.amount == transfer.amount)
            .expect("Debit entry should exist");
        let credit = entries
            .iter()
            .find(|e| e.account_id == transfer.to_account_id && e.amount == transfer.amount)
            .expect("Credit entry should exist");
        assert_eq!(debit.amount + credit.amount, 0);
        assert_eq!(debit.debit_credit, EntryKind::Debit);
        assert_eq!(credit.debit_credit, EntryKind::Credit);
    }

    // The entry log alone reconstructs each account's balance delta
    let sum_a: i64 = entries.iter().filter(|e| e.account_id == a.id).map(|e| e.amount).sum();
    let sum_b: i64 = entries.iter().filter(|e| e.account_id == b.id).map(|e| e.amount).sum();
    let final_a = store.get_account(a.id).await.unwrap().unwrap();
    let final_b = store.get_account(b.id).await.unwrap().unwrap();
    assert_eq!(final_a.balance, 500 + sum_a);
    assert_eq!(final_b.balance, 500 + sum_b);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_overdraft_attempts_admit_exact_count() {
    // 100 covers exactly three transfers of 30. The sufficiency check runs
    // under the row lock, so precisely three of five contenders succeed no
    // matter the interleaving.
    let store = Arc::new(MemLedgerStore::new());
    let a = create_account(&store, 100).await;
    let b = create_account(&store, 0).await;
    let orchestrator = Arc::new(TransferOrchestrator::new(store.clone()));

    let handles: Vec<_> = (0..5)
        .map(|_| {
            let orchestrator = Arc::clone(&orchestrator);
            let (from, to) = (a.id, b.id);
            tokio::spawn(async move {
                orchestrator
                    .transfer(TransferParams {
                        from_account_id: from,
                        to_account_id: to,
                        amount: 30,
                    })
                    .await
            })
        })
        .collect();

    let mut successes = 0;
    let mut insufficient = 0;
    for handle in join_all(handles).await {
        match handle.expect("Task should not panic") {
            Ok(_) => successes += 1,
            Err(TransferError::InsufficientBalance { .. }) => insufficient += 1,
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }
    assert_eq!(successes, 3);
    assert_eq!(insufficient, 2);

    let final_a = store.get_account(a.id).await.unwrap().unwrap();
    let final_b = store.get_account(b.id).await.unwrap().unwrap();
    assert_eq!(final_a.balance, 10);
    assert_eq!(final_b.balance, 90);

    // Failed attempts left no trace in the audit trail
    assert_eq!(store.transfers().await.len(), 3);
    assert_eq!(store.entries().await.len(), 6);
}
