//! Transaction value objects and statement views.
//!
//! Wire and storage names are fixed: a transaction serializes as
//! `{value, type, description, realized_in}` with `type` one of `"d"`/`"c"`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Direction of a ledger movement.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Decreases the balance, bounded by the overdraft limit.
    #[serde(rename = "d")]
    Debit,
    /// Increases the balance, unconditionally.
    #[serde(rename = "c")]
    Credit,
}

impl TransactionKind {
    /// Parse the one-letter wire code. Anything but `"d"`/`"c"` is `None`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "d" => Some(TransactionKind::Debit),
            "c" => Some(TransactionKind::Credit),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            TransactionKind::Debit => "d",
            TransactionKind::Credit => "c",
        }
    }
}

impl core::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

/// A single applied movement, embedded in the account history.
///
/// Never persisted or addressed on its own; `occurred_at` is stamped by the
/// ledger engine at processing time, not supplied by clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub value: i64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub description: String,
    #[serde(rename = "realized_in")]
    pub occurred_at: DateTime<Utc>,
}

/// Point-in-time view of an account, as returned by statement reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statement {
    pub balance: StatementBalance,
    pub last_transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatementBalance {
    pub total: i64,
    pub extract_date: DateTime<Utc>,
    pub limit: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_codes_round_trip() {
        assert_eq!(TransactionKind::from_code("d"), Some(TransactionKind::Debit));
        assert_eq!(TransactionKind::from_code("c"), Some(TransactionKind::Credit));
        assert_eq!(TransactionKind::from_code("x"), None);
        assert_eq!(TransactionKind::from_code(""), None);
        assert_eq!(TransactionKind::Debit.code(), "d");
        assert_eq!(TransactionKind::Credit.code(), "c");
    }

    #[test]
    fn transaction_serializes_with_wire_names() {
        let tx = Transaction {
            value: 100,
            kind: TransactionKind::Debit,
            description: "food".to_string(),
            occurred_at: "2024-01-15T12:00:00Z".parse().unwrap(),
        };

        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["value"], 100);
        assert_eq!(json["type"], "d");
        assert_eq!(json["description"], "food");
        assert_eq!(json["realized_in"], "2024-01-15T12:00:00Z");

        let back: Transaction = serde_json::from_value(json).unwrap();
        assert_eq!(back, tx);
    }
}
