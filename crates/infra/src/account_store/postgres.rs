//! Postgres-backed account store.
//!
//! Each `apply_update` is one `UPDATE ... RETURNING` statement. Postgres
//! row-locks the account and evaluates the SET expressions against the current
//! tuple, so concurrent updates to the same account serialize on the row lock
//! and each sees the other's committed state. That gives the trait's atomic
//! read-evaluate-write contract natively, with no explicit transaction,
//! advisory lock or compare-and-swap loop.
//!
//! ## Error Mapping
//!
//! | SQLx outcome | StoreError |
//! |---|---|
//! | `RowNotFound` / zero rows updated | `NotFound` |
//! | anything else | `Backend` (tagged with the failing operation) |

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::instrument;

use ledgerd_core::{Account, AccountId, Transaction};

use super::r#trait::{AccountStore, BalanceChange, LedgerUpdate, StoreError};

/// Account store over a shared Postgres pool.
///
/// `Send + Sync`; clone freely, the pool is shared.
#[derive(Debug, Clone)]
pub struct PostgresAccountStore {
    pool: Arc<PgPool>,
}

impl PostgresAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

const SELECT_ACCOUNT_SQL: &str = r#"
SELECT balance, overdraft_limit, recent_transactions
FROM accounts
WHERE id = $1
"#;

// The jsonpath slice `$[0 to 9]` keeps the ten most recent entries, matching
// the in-memory evaluation of the same update expression.
const CREDIT_UPDATE_SQL: &str = r#"
UPDATE accounts
SET balance = balance + $2,
    recent_transactions = jsonb_path_query_array($3::jsonb || recent_transactions, '$[0 to 9]')
WHERE id = $1
RETURNING balance, overdraft_limit, recent_transactions
"#;

const DEBIT_UPDATE_SQL: &str = r#"
UPDATE accounts
SET balance = CASE
        WHEN balance - $2 >= -overdraft_limit THEN balance - $2
        ELSE balance
    END,
    recent_transactions = jsonb_path_query_array($3::jsonb || recent_transactions, '$[0 to 9]')
WHERE id = $1
RETURNING balance, overdraft_limit, recent_transactions
"#;

#[async_trait]
impl AccountStore for PostgresAccountStore {
    #[instrument(skip(self), fields(account_id = %id), err)]
    async fn get(&self, id: AccountId) -> Result<Account, StoreError> {
        let row = sqlx::query(SELECT_ACCOUNT_SQL)
            .bind(id.as_i64())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_account", e))?;

        match row {
            Some(row) => row_to_account(id, &row),
            None => Err(StoreError::NotFound),
        }
    }

    #[instrument(skip(self, update), fields(account_id = %id, kind = %update.transaction.kind), err)]
    async fn apply_update(&self, id: AccountId, update: LedgerUpdate) -> Result<Account, StoreError> {
        // Encoded as a one-element array so `||` prepends it to the stored
        // history.
        let entry = serde_json::to_value([&update.transaction])
            .map_err(|e| StoreError::Backend(format!("encode transaction: {e}")))?;

        let (sql, amount) = match update.change {
            BalanceChange::Credit(value) => (CREDIT_UPDATE_SQL, value),
            BalanceChange::DebitWithinLimit(value) => (DEBIT_UPDATE_SQL, value),
        };

        let row = sqlx::query(sql)
            .bind(id.as_i64())
            .bind(amount)
            .bind(entry)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("apply_update", e))?;

        match row {
            Some(row) => row_to_account(id, &row),
            None => Err(StoreError::NotFound),
        }
    }
}

fn row_to_account(id: AccountId, row: &sqlx::postgres::PgRow) -> Result<Account, StoreError> {
    let balance: i64 = row
        .try_get("balance")
        .map_err(|e| StoreError::Backend(format!("read balance: {e}")))?;
    let limit: i64 = row
        .try_get("overdraft_limit")
        .map_err(|e| StoreError::Backend(format!("read overdraft_limit: {e}")))?;
    let recent: serde_json::Value = row
        .try_get("recent_transactions")
        .map_err(|e| StoreError::Backend(format!("read recent_transactions: {e}")))?;

    let recent_transactions: Vec<Transaction> = serde_json::from_value(recent)
        .map_err(|e| StoreError::Backend(format!("decode recent_transactions: {e}")))?;

    Ok(Account {
        id,
        balance,
        limit,
        recent_transactions,
    })
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::RowNotFound => StoreError::NotFound,
        other => StoreError::Backend(format!("{operation}: {other}")),
    }
}
