use async_trait::async_trait;
use thiserror::Error;

use ledgerd_core::{Account, AccountId, RECENT_HISTORY_CAP, Transaction, TransactionKind};

/// Storage-level failure.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No account with the requested id.
    #[error("account not found")]
    NotFound,

    /// The backend failed or was unreachable.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// How the balance moves when an update is applied.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BalanceChange {
    /// Added unconditionally.
    Credit(i64),
    /// Subtracted only while `balance - value >= -limit` holds for the stored
    /// balance at apply time; otherwise the balance is left untouched.
    DebitWithinLimit(i64),
}

/// Declarative update expression, applied atomically by
/// [`AccountStore::apply_update`].
///
/// The expression is a pure function of the account's *current* stored fields;
/// the store evaluates it against whatever is current at apply time, never
/// against a snapshot the caller read earlier. The store itself interprets no
/// business rules beyond what is encoded here.
#[derive(Debug, Clone)]
pub struct LedgerUpdate {
    pub transaction: Transaction,
    pub change: BalanceChange,
}

impl LedgerUpdate {
    /// Build the update for a validated transaction: credits apply
    /// unconditionally, debits only within the overdraft limit.
    pub fn for_transaction(transaction: Transaction) -> Self {
        let change = match transaction.kind {
            TransactionKind::Credit => BalanceChange::Credit(transaction.value),
            TransactionKind::Debit => BalanceChange::DebitWithinLimit(transaction.value),
        };
        Self { transaction, change }
    }

    /// Evaluate "current fields -> new fields".
    ///
    /// In-memory stores run this under their write lock; the Postgres store
    /// mirrors the same rules inside a single `UPDATE` statement. The
    /// transaction is prepended to the history regardless of whether the
    /// balance moved, and the history is truncated to [`RECENT_HISTORY_CAP`].
    pub fn evaluate(&self, current: &Account) -> (i64, Vec<Transaction>) {
        let balance = match self.change {
            BalanceChange::Credit(value) => current.balance + value,
            BalanceChange::DebitWithinLimit(value) => {
                if current.balance - value >= -current.limit {
                    current.balance - value
                } else {
                    current.balance
                }
            }
        };

        let mut recent = Vec::with_capacity((current.recent_transactions.len() + 1).min(RECENT_HISTORY_CAP));
        recent.push(self.transaction.clone());
        recent.extend(
            current
                .recent_transactions
                .iter()
                .take(RECENT_HISTORY_CAP - 1)
                .cloned(),
        );

        (balance, recent)
    }
}

/// Keyed durable storage for account records.
///
/// `apply_update` is the single synchronization primitive the ledger relies
/// on: two concurrent calls against the same id must serialize so that each
/// evaluation observes either the other's pre-state or its fully applied
/// post-state, never a partial or stale intermediate. Accounts are provisioned
/// externally; implementations never create or delete them.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Point lookup by id. No side effects.
    async fn get(&self, id: AccountId) -> Result<Account, StoreError>;

    /// Atomically read the current record, evaluate `update` against it, write
    /// the result and return the post-update record.
    async fn apply_update(&self, id: AccountId, update: LedgerUpdate) -> Result<Account, StoreError>;
}
