//! Client-facing error taxonomy for ledger operations.

use thiserror::Error;

use ledgerd_core::AccountId;
use ledgerd_infra::StoreError;

/// Result type used across the engine.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Everything a ledger operation can fail with.
///
/// The validation variants are client-input errors and are never worth
/// retrying; `Storage` may be transient, but retrying a non-idempotent write
/// can double-apply a transaction.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("account {0} not found")]
    AccountNotFound(AccountId),

    /// `type` was not one of the known movement codes (`"d"`/`"c"`).
    #[error("invalid transaction type")]
    InvalidTransactionType,

    /// `value` must be a positive integer amount in minor units.
    #[error("invalid transaction value")]
    InvalidTransactionValue,

    /// `description` must be 1 to 10 characters.
    #[error("invalid transaction description")]
    InvalidTransactionDescription,

    /// The debit would push the balance past the overdraft limit.
    #[error("insufficient funds")]
    InsufficientFunds,

    /// The backing store failed; tagged with the operation that hit it.
    #[error("storage failure during {operation} for account {id}: {source}")]
    Storage {
        id: AccountId,
        operation: &'static str,
        #[source]
        source: StoreError,
    },
}

impl LedgerError {
    /// Stable machine-readable code; the transport layer keys its status
    /// mapping on this.
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::AccountNotFound(_) => "account_not_found",
            LedgerError::InvalidTransactionType => "invalid_transaction_type",
            LedgerError::InvalidTransactionValue => "invalid_transaction_value",
            LedgerError::InvalidTransactionDescription => "invalid_transaction_description",
            LedgerError::InsufficientFunds => "insufficient_funds",
            LedgerError::Storage { .. } => "storage_error",
        }
    }

    /// Lift a store failure into the ledger taxonomy, keeping the operation
    /// context. A missing account is a domain condition, not a storage fault.
    pub(crate) fn from_store(id: AccountId, operation: &'static str, err: StoreError) -> Self {
        match err {
            StoreError::NotFound => LedgerError::AccountNotFound(id),
            source => LedgerError::Storage {
                id,
                operation,
                source,
            },
        }
    }
}
