//! Keyed account storage boundary.
//!
//! This module defines the store abstraction the ledger engine runs on: point
//! lookups plus a single atomic conditional-update primitive, without making
//! any storage assumptions beyond that primitive.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryAccountStore;
pub use postgres::PostgresAccountStore;
pub use r#trait::{AccountStore, BalanceChange, LedgerUpdate, StoreError};
