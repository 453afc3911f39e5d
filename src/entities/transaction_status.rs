//! Lifecycle status shared by deposits and withdrawals
//!
//! `CREATED -> PENDING -> COMPLETED`, with `FAILED` reachable from `CREATED` or `PENDING`.
//! `COMPLETED` and `FAILED` are terminal.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transaction_status")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    #[default]
    #[sea_orm(string_value = "CREATED")]
    Created,
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
    #[sea_orm(string_value = "FAILED")]
    Failed,
}

impl TransactionStatus {
    /// All members, in lifecycle order
    pub const ALL: [TransactionStatus; 4] = [
        TransactionStatus::Created,
        TransactionStatus::Pending,
        TransactionStatus::Completed,
        TransactionStatus::Failed,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Created => "CREATED",
            TransactionStatus::Pending => "PENDING",
            TransactionStatus::Completed => "COMPLETED",
            TransactionStatus::Failed => "FAILED",
        }
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self, TransactionStatus::Completed | TransactionStatus::Failed)
    }

    /// Whether a record in `self` may move to `next`
    pub const fn can_transition_to(&self, next: TransactionStatus) -> bool {
        use TransactionStatus::*;

        matches!(
            (*self, next),
            (Created, Pending) | (Pending, Completed) | (Created, Failed) | (Pending, Failed)
        )
    }
}
