use sea_orm::{DbErr, SqlErr};
use thiserror::Error;
use uuid::Uuid;

use crate::entities::transaction_status::TransactionStatus;
use crate::models::ledger::Direction;

/// Failures at the ledger storage boundary.
///
/// Database errors the ledger cannot classify are carried unchanged in `Database`.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("amount must be a positive number of minor units, got {0}")]
    NonPositiveAmount(i64),

    #[error("{direction:?} {id} not found")]
    NotFound { direction: Direction, id: Uuid },

    #[error("referenced user or currency does not exist: {0}")]
    UnknownReference(String),

    #[error("cannot move from {} to {}", .from.as_str(), .to.as_str())]
    InvalidTransition {
        from: TransactionStatus,
        to: TransactionStatus,
    },

    #[error("{direction:?} {id} is no longer {}", .expected.as_str())]
    StatusConflict {
        direction: Direction,
        id: Uuid,
        expected: TransactionStatus,
    },

    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl LedgerError {
    /// Classify a write error, keeping anything unrecognised as-is.
    pub(crate) fn from_write(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
                LedgerError::UnknownReference(detail)
            }
            _ => LedgerError::Database(err),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}
