//! Immutable ledger row types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Debit/credit tag on a ledger entry, stored as text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Debit,
    Credit,
}

#[derive(Debug, Error)]
#[error("invalid entry kind: {0}")]
pub struct ParseEntryKindError(pub String);

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Debit => write!(f, "debit"),
            EntryKind::Credit => write!(f, "credit"),
        }
    }
}

impl FromStr for EntryKind {
    type Err = ParseEntryKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debit" => Ok(EntryKind::Debit),
            "credit" => Ok(EntryKind::Credit),
            _ => Err(ParseEntryKindError(s.to_string())),
        }
    }
}

/// One signed ledger line tied to one account.
///
/// `amount` is negative for debits and positive for credits. Rows are
/// write-once; the entry log is the audit trail from which any account
/// balance can be reconstructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub id: i64,
    pub account_id: i64,
    pub amount: i64,
    pub debit_credit: EntryKind,
    pub created_at: DateTime<Utc>,
}

/// One funds movement between two accounts. Write-once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transfer {
    pub id: i64,
    pub from_account_id: i64,
    pub to_account_id: i64,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}
