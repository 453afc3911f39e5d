use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{deposits, transaction_status::TransactionStatus, withdrawals};

/// Which way funds move, and therefore which table a ledger row lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Deposit,
    Withdrawal,
}

impl Direction {
    pub const fn table_name(&self) -> &'static str {
        match self {
            Direction::Deposit => "deposits",
            Direction::Withdrawal => "withdrawals",
        }
    }
}

/// A deposit or withdrawal row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub direction: Direction,
    pub id: Uuid,
    pub user_id: Uuid,
    pub currency_id: Uuid,
    /// Minor units of `currency_id`, always > 0
    pub amount: i64,
    pub status: TransactionStatus,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl From<deposits::Model> for LedgerEntry {
    fn from(row: deposits::Model) -> Self {
        Self {
            direction: Direction::Deposit,
            id: row.id,
            user_id: row.user_id,
            currency_id: row.currency_id,
            amount: row.amount,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<withdrawals::Model> for LedgerEntry {
    fn from(row: withdrawals::Model) -> Self {
        Self {
            direction: Direction::Withdrawal,
            id: row.id,
            user_id: row.user_id,
            currency_id: row.currency_id,
            amount: row.amount,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Input for recording a ledger row. Without an explicit status the row starts as `CREATED`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLedgerEntry {
    pub user_id: Uuid,
    pub currency_id: Uuid,
    pub amount: i64,
    #[serde(default)]
    pub status: Option<TransactionStatus>,
}

impl NewLedgerEntry {
    pub fn new(user_id: Uuid, currency_id: Uuid, amount: i64) -> Self {
        Self {
            user_id,
            currency_id,
            amount,
            status: None,
        }
    }

    pub fn with_status(mut self, status: TransactionStatus) -> Self {
        self.status = Some(status);
        self
    }
}
