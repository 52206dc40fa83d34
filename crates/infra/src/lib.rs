//! Infrastructure layer: account store implementations.

pub mod account_store;

pub use account_store::{
    AccountStore, BalanceChange, InMemoryAccountStore, LedgerUpdate, PostgresAccountStore,
    StoreError,
};
