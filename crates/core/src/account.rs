//! Account records as stored and read by the ledger.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::transaction::Transaction;

/// How many recent transactions an account keeps (most-recent-first).
pub const RECENT_HISTORY_CAP: usize = 10;

/// Strongly-typed account identifier.
///
/// Ids are assigned by an external provisioning process; this system never
/// mints one.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(i64);

impl AccountId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl core::fmt::Display for AccountId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<i64> for AccountId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<AccountId> for i64 {
    fn from(value: AccountId) -> Self {
        value.0
    }
}

impl FromStr for AccountId {
    type Err = core::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>().map(Self)
    }
}

/// One account record: balance in minor currency units, overdraft limit and
/// the bounded recent-transaction history.
///
/// `limit` is the maximum overdraft magnitude (`balance` may go down to
/// `-limit`) and is never mutated by a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub balance: i64,
    pub limit: i64,
    pub recent_transactions: Vec<Transaction>,
}
