use std::sync::Arc;

use chrono::Utc;
use tracing::instrument;

use ledgerd_core::{Account, AccountId, Statement, StatementBalance, Transaction, TransactionKind};
use ledgerd_infra::{AccountStore, LedgerUpdate};

use crate::error::{LedgerError, LedgerResult};

/// Maximum description length, in characters.
const MAX_DESCRIPTION_CHARS: usize = 10;

/// A submitted movement, exactly as it arrives from the transport layer.
///
/// `kind` stays the raw wire code here so that validation (and its ordering)
/// happens in one place, inside the engine.
#[derive(Debug, Clone)]
pub struct TransactionRequest {
    pub kind: String,
    pub value: i64,
    pub description: String,
}

/// What an accepted transaction reports back: the account's overdraft limit
/// and the balance after the atomic apply.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TransactionOutcome {
    pub limit: i64,
    pub balance: i64,
}

/// Statement reads and the two-phase transaction protocol over an
/// [`AccountStore`].
///
/// A snapshot read first produces precise client-facing rejections, then the
/// store gets a declarative update whose overdraft re-check runs against live
/// state inside the atomic apply; under concurrent submissions the store's
/// serialization, not the snapshot, decides what lands. The engine holds no
/// locks and no shared state between the two steps.
#[derive(Clone)]
pub struct LedgerEngine {
    store: Arc<dyn AccountStore>,
}

impl LedgerEngine {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    /// Current balance, limit and recent history for one account. Read-only.
    #[instrument(skip(self), fields(account_id = %id))]
    pub async fn get_statement(&self, id: AccountId) -> LedgerResult<Statement> {
        let account = self
            .store
            .get(id)
            .await
            .map_err(|e| LedgerError::from_store(id, "get_statement", e))?;

        Ok(Statement {
            balance: StatementBalance {
                total: account.balance,
                extract_date: Utc::now(),
                limit: account.limit,
            },
            last_transactions: account.recent_transactions,
        })
    }

    /// Validate against a fresh snapshot, then submit the atomic update.
    ///
    /// A debit that passes validation here can still find the balance moved
    /// by the time the store applies it; in that case the store leaves the
    /// balance untouched while the transaction is recorded in the history,
    /// and the returned balance is the caller's only signal. Validation
    /// failures never reach the store.
    #[instrument(skip(self, request), fields(account_id = %id, kind = %request.kind))]
    pub async fn apply_transaction(
        &self,
        id: AccountId,
        request: TransactionRequest,
    ) -> LedgerResult<TransactionOutcome> {
        // Snapshot read + fail-fast validation.
        let account = self
            .store
            .get(id)
            .await
            .map_err(|e| LedgerError::from_store(id, "apply_transaction", e))?;
        let kind = validate(&request, &account)?;

        // Authoritative atomic apply against live stored state.
        let transaction = Transaction {
            value: request.value,
            kind,
            description: request.description,
            occurred_at: Utc::now(),
        };
        let updated = self
            .store
            .apply_update(id, LedgerUpdate::for_transaction(transaction))
            .await
            .map_err(|e| LedgerError::from_store(id, "apply_transaction", e))?;

        Ok(TransactionOutcome {
            limit: account.limit,
            balance: updated.balance,
        })
    }
}

/// First violation wins: type, then value, then description, then funds.
fn validate(request: &TransactionRequest, account: &Account) -> LedgerResult<TransactionKind> {
    let kind =
        TransactionKind::from_code(&request.kind).ok_or(LedgerError::InvalidTransactionType)?;

    if request.value < 1 {
        return Err(LedgerError::InvalidTransactionValue);
    }

    let chars = request.description.chars().count();
    if chars == 0 || chars > MAX_DESCRIPTION_CHARS {
        return Err(LedgerError::InvalidTransactionDescription);
    }

    if kind == TransactionKind::Debit && account.balance - request.value < -account.limit {
        return Err(LedgerError::InsufficientFunds);
    }

    Ok(kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerd_infra::InMemoryAccountStore;
    use proptest::prelude::*;

    fn engine_with(accounts: Vec<Account>) -> LedgerEngine {
        let store = Arc::new(InMemoryAccountStore::new());
        for account in accounts {
            store.seed(account);
        }
        LedgerEngine::new(store)
    }

    fn account(id: i64, balance: i64, limit: i64) -> Account {
        Account {
            id: AccountId::new(id),
            balance,
            limit,
            recent_transactions: Vec::new(),
        }
    }

    fn request(kind: &str, value: i64, description: &str) -> TransactionRequest {
        TransactionRequest {
            kind: kind.to_string(),
            value,
            description: description.to_string(),
        }
    }

    #[tokio::test]
    async fn statement_for_unknown_account_is_not_found() {
        let engine = engine_with(vec![]);
        let err = engine.get_statement(AccountId::new(9)).await.unwrap_err();
        assert!(matches!(err, LedgerError::AccountNotFound(_)));
        assert_eq!(err.code(), "account_not_found");
    }

    #[tokio::test]
    async fn transaction_for_unknown_account_is_not_found() {
        let engine = engine_with(vec![]);
        let err = engine
            .apply_transaction(AccountId::new(9), request("c", 10, "x"))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::AccountNotFound(_)));
    }

    #[tokio::test]
    async fn debit_within_limit_is_applied() {
        let engine = engine_with(vec![account(1, 0, 1000)]);

        let outcome = engine
            .apply_transaction(AccountId::new(1), request("d", 100, "food"))
            .await
            .unwrap();
        assert_eq!(outcome, TransactionOutcome { limit: 1000, balance: -100 });

        let statement = engine.get_statement(AccountId::new(1)).await.unwrap();
        assert_eq!(statement.balance.total, -100);
        assert_eq!(statement.balance.limit, 1000);
        assert_eq!(statement.last_transactions.len(), 1);
        assert_eq!(statement.last_transactions[0].value, 100);
        assert_eq!(statement.last_transactions[0].kind, TransactionKind::Debit);
        assert_eq!(statement.last_transactions[0].description, "food");
    }

    #[tokio::test]
    async fn overdrawing_debit_is_rejected_and_leaves_balance() {
        let engine = engine_with(vec![account(1, -100, 1000)]);

        let err = engine
            .apply_transaction(AccountId::new(1), request("d", 2000, "x"))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientFunds));

        let statement = engine.get_statement(AccountId::new(1)).await.unwrap();
        assert_eq!(statement.balance.total, -100);
        assert!(statement.last_transactions.is_empty());
    }

    #[tokio::test]
    async fn debit_to_the_exact_floor_is_accepted() {
        let engine = engine_with(vec![account(1, 0, 1000)]);
        let outcome = engine
            .apply_transaction(AccountId::new(1), request("d", 1000, "all"))
            .await
            .unwrap();
        assert_eq!(outcome.balance, -1000);
    }

    #[tokio::test]
    async fn credit_applies_even_at_the_overdraft_floor() {
        let engine = engine_with(vec![account(1, -1000, 1000)]);
        let outcome = engine
            .apply_transaction(AccountId::new(1), request("c", 50, "salary"))
            .await
            .unwrap();
        assert_eq!(outcome.balance, -950);
    }

    #[tokio::test]
    async fn unknown_type_wins_over_bad_value() {
        let engine = engine_with(vec![account(1, 0, 0)]);
        let err = engine
            .apply_transaction(AccountId::new(1), request("x", -5, "y"))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidTransactionType));
    }

    #[tokio::test]
    async fn nonpositive_value_is_rejected_before_description() {
        let engine = engine_with(vec![account(1, 0, 0)]);
        for value in [0, -1] {
            let err = engine
                .apply_transaction(AccountId::new(1), request("c", value, ""))
                .await
                .unwrap_err();
            assert!(matches!(err, LedgerError::InvalidTransactionValue));
        }
    }

    #[tokio::test]
    async fn empty_description_is_rejected() {
        let engine = engine_with(vec![account(1, 0, 0)]);
        let err = engine
            .apply_transaction(AccountId::new(1), request("c", 50, ""))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidTransactionDescription));
    }

    #[tokio::test]
    async fn eleven_char_description_is_rejected() {
        let engine = engine_with(vec![account(1, 0, 0)]);
        let err = engine
            .apply_transaction(AccountId::new(1), request("c", 50, "elevenchars"))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidTransactionDescription));

        let ok = engine
            .apply_transaction(AccountId::new(1), request("c", 50, "tencharsok"))
            .await;
        assert!(ok.is_ok());
    }

    #[tokio::test]
    async fn history_keeps_the_ten_most_recent() {
        let engine = engine_with(vec![account(1, 0, 0)]);

        for i in 1..=12 {
            engine
                .apply_transaction(AccountId::new(1), request("c", i, "dep"))
                .await
                .unwrap();
        }

        let statement = engine.get_statement(AccountId::new(1)).await.unwrap();
        assert_eq!(statement.last_transactions.len(), 10);
        // Most-recent-first: the last applied value leads, the first two are gone.
        assert_eq!(statement.last_transactions[0].value, 12);
        assert_eq!(statement.last_transactions[9].value, 3);
    }

    #[tokio::test]
    async fn statement_reads_are_idempotent() {
        let engine = engine_with(vec![account(1, 700, 300)]);
        engine
            .apply_transaction(AccountId::new(1), request("d", 200, "coffee"))
            .await
            .unwrap();

        let first = engine.get_statement(AccountId::new(1)).await.unwrap();
        let second = engine.get_statement(AccountId::new(1)).await.unwrap();
        assert_eq!(first.balance.total, second.balance.total);
        assert_eq!(first.balance.limit, second.balance.limit);
        assert_eq!(first.last_transactions, second.last_transactions);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_debits_never_breach_the_limit() {
        let engine = engine_with(vec![account(1, 1000, 0)]);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let engine = engine.clone();
            handles.push(tokio::spawn(async move {
                engine
                    .apply_transaction(AccountId::new(1), request("d", 300, "spend"))
                    .await
            }));
        }
        for handle in handles {
            // InsufficientFunds is a legitimate outcome under contention.
            let _ = handle.await.unwrap();
        }

        let statement = engine.get_statement(AccountId::new(1)).await.unwrap();
        assert!(statement.balance.total >= 0);
        // Whatever landed, the balance moved in whole debits.
        assert_eq!((1000 - statement.balance.total) % 300, 0);
    }

    proptest! {
        /// For any sequence of submitted movements the applied balance always
        /// stays within the overdraft limit, the history stays bounded, and
        /// every accepted call reports the balance the model predicts.
        #[test]
        fn balance_never_breaches_limit(
            ops in proptest::collection::vec((any::<bool>(), 1i64..500), 1..40),
            limit in 0i64..1000,
        ) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .build()
                .expect("failed to build runtime");

            let ops_clone = ops.clone();
            let (results, statement) = rt.block_on(async move {
                let engine = engine_with(vec![account(1, 0, limit)]);
                let mut results = Vec::new();
                for (is_credit, value) in ops_clone {
                    let kind = if is_credit { "c" } else { "d" };
                    let outcome = engine
                        .apply_transaction(AccountId::new(1), request(kind, value, "op"))
                        .await;
                    results.push(outcome.map(|o| o.balance).map_err(|e| e.code()));
                }
                let statement = engine.get_statement(AccountId::new(1)).await.unwrap();
                (results, statement)
            });

            let mut model = 0i64;
            for ((is_credit, value), result) in ops.iter().zip(results) {
                match result {
                    Ok(balance) => {
                        model += if *is_credit { *value } else { -*value };
                        prop_assert_eq!(balance, model);
                    }
                    Err(code) => {
                        // Sequential execution: the only rejection is the funds check.
                        prop_assert_eq!(code, "insufficient_funds");
                        prop_assert!(!*is_credit);
                    }
                }
                prop_assert!(model >= -limit);
            }

            prop_assert_eq!(statement.balance.total, model);
            prop_assert!(statement.last_transactions.len() <= 10);
        }
    }
}
