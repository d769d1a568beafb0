//! Immutable audit trail: ledger entries and transfer records
//!
//! Both tables are append-only. The entry log is the independent audit
//! trail: summing an account's entries reconstructs its balance delta
//! without trusting the balance column.

pub mod log;
pub mod models;

pub use log::{EntryLog, TransferLog};
pub use models::{Entry, EntryKind, ParseEntryKindError, Transfer};
