//! Data models for account management

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Account lifecycle status, stored as text in the `accounts` table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Inactive,
}

#[derive(Debug, Error)]
#[error("invalid account status: {0}")]
pub struct ParseStatusError(pub String);

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountStatus::Active => write!(f, "active"),
            AccountStatus::Inactive => write!(f, "inactive"),
        }
    }
}

impl FromStr for AccountStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(AccountStatus::Active),
            "inactive" => Ok(AccountStatus::Inactive),
            _ => Err(ParseStatusError(s.to_string())),
        }
    }
}

/// One balance-holding account in a single currency.
///
/// `balance` is a signed integer in minor currency units. It is mutated only
/// through `AccountRepository::add_balance`, never via read-then-write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub user_id: i64,
    pub account_number: i64,
    pub status: AccountStatus,
    pub balance: i64,
    pub currency_code: String,
    pub created_at: DateTime<Utc>,
}

/// Parameters for opening an account
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub user_id: i64,
    pub account_number: i64,
    pub status: AccountStatus,
    pub balance: i64,
    pub currency_code: String,
}

/// Generate a random 10-digit account number
pub fn random_account_number() -> i64 {
    rand::thread_rng().gen_range(1_000_000_000..10_000_000_000)
}
