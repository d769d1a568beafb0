//! corebank - Atomic funds-transfer core with a double-entry audit ledger
//!
//! Moves funds between account balances atomically and safely under
//! unbounded concurrency, while keeping an immutable audit trail of every
//! balance-affecting event.
//!
//! # Modules
//!
//! - [`config`] - YAML application configuration
//! - [`logging`] - tracing subscriber setup with rolling file output
//! - [`db`] - PostgreSQL connection pool management
//! - [`account`] - Account model and repository (CRUD + atomic balance increment)
//! - [`ledger`] - Append-only entry and transfer audit tables
//! - [`store`] - Transactional store contract with Postgres and in-memory backends
//! - [`transfer`] - The transfer orchestrator and its canonical lock order

pub mod account;
pub mod config;
pub mod db;
pub mod ledger;
pub mod logging;
pub mod store;
pub mod transfer;

// Convenient re-exports at crate root
pub use account::{Account, AccountRepository, AccountStatus, NewAccount};
pub use db::Database;
pub use ledger::{Entry, EntryKind, EntryLog, Transfer, TransferLog};
pub use store::{LedgerStore, LedgerTx, MemLedgerStore, PgLedgerStore, StoreError};
pub use transfer::{TransferError, TransferOrchestrator, TransferOutcome, TransferParams};
