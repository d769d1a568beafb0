//! Atomic funds movement between two accounts

pub mod error;
pub mod orchestrator;

pub use error::TransferError;
pub use orchestrator::{TransferOrchestrator, TransferOutcome, TransferParams};
