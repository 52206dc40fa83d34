use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use ledgerd_core::{Account, AccountId};

use super::r#trait::{AccountStore, LedgerUpdate, StoreError};

/// In-memory account store.
///
/// Intended for tests/dev. The whole map sits behind one `RwLock`; taking the
/// write lock for `apply_update` serializes concurrent updates, which is the
/// atomicity the trait asks for (coarser than per-record, but correct).
#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    accounts: RwLock<HashMap<AccountId, Account>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provisioning hook for tests/dev; the ledger itself never creates
    /// accounts.
    pub fn seed(&self, account: Account) {
        self.accounts
            .write()
            .expect("account map lock poisoned")
            .insert(account.id, account);
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn get(&self, id: AccountId) -> Result<Account, StoreError> {
        let accounts = self
            .accounts
            .read()
            .map_err(|_| StoreError::Backend("account map lock poisoned".to_string()))?;

        accounts.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn apply_update(&self, id: AccountId, update: LedgerUpdate) -> Result<Account, StoreError> {
        let mut accounts = self
            .accounts
            .write()
            .map_err(|_| StoreError::Backend("account map lock poisoned".to_string()))?;

        let account = accounts.get_mut(&id).ok_or(StoreError::NotFound)?;

        let (balance, recent) = update.evaluate(account);
        account.balance = balance;
        account.recent_transactions = recent;

        Ok(account.clone())
    }
}
