//! `ledgerd-core` — domain kernel for the banking ledger.
//!
//! This crate contains **pure domain** types (no infrastructure concerns):
//! account records, transaction value objects and statement views.

pub mod account;
pub mod transaction;

pub use account::{Account, AccountId, RECENT_HISTORY_CAP};
pub use transaction::{Statement, StatementBalance, Transaction, TransactionKind};
