//! Account management module
//!
//! PostgreSQL-backed storage for balance-holding accounts. The balance
//! column is only ever mutated through the atomic increment in
//! [`repository::AccountRepository::add_balance`].

pub mod models;
pub mod repository;

pub use models::{Account, AccountStatus, NewAccount, ParseStatusError, random_account_number};
pub use repository::AccountRepository;
