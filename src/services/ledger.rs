//! Deposits and withdrawals storage
//!
//! Rows are validated before any I/O, inserted with a fresh v4 id and left to the database
//! for the default status and timestamps. Status changes are compare-and-set updates that
//! also advance `updated_at`; there is no delete.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::{deposits, transaction_status::TransactionStatus, withdrawals};
use crate::error::LedgerError;
use crate::models::ledger::{Direction, LedgerEntry, NewLedgerEntry};

/// Insert a deposit or withdrawal and return the stored row.
pub async fn record<C>(
    db: &C,
    direction: Direction,
    entry: NewLedgerEntry,
) -> Result<LedgerEntry, LedgerError>
where
    C: ConnectionTrait,
{
    if entry.amount <= 0 {
        return Err(LedgerError::NonPositiveAmount(entry.amount));
    }

    let id = Uuid::new_v4();
    let status = entry.status.map_or(ActiveValue::NotSet, ActiveValue::Set);

    let stored: LedgerEntry = match direction {
        Direction::Deposit => deposits::ActiveModel {
            id: Set(id),
            user_id: Set(entry.user_id),
            currency_id: Set(entry.currency_id),
            amount: Set(entry.amount),
            status,
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(LedgerError::from_write)?
        .into(),
        Direction::Withdrawal => withdrawals::ActiveModel {
            id: Set(id),
            user_id: Set(entry.user_id),
            currency_id: Set(entry.currency_id),
            amount: Set(entry.amount),
            status,
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(LedgerError::from_write)?
        .into(),
    };

    tracing::info!(
        "Recorded {} {} of {} for user {} ({})",
        direction.table_name(),
        stored.id,
        stored.amount,
        stored.user_id,
        stored.status.as_str()
    );

    Ok(stored)
}

pub async fn find<C>(db: &C, direction: Direction, id: Uuid) -> Result<LedgerEntry, LedgerError>
where
    C: ConnectionTrait,
{
    let row: Option<LedgerEntry> = match direction {
        Direction::Deposit => deposits::Entity::find_by_id(id)
            .one(db)
            .await?
            .map(Into::into),
        Direction::Withdrawal => withdrawals::Entity::find_by_id(id)
            .one(db)
            .await?
            .map(Into::into),
    };

    row.ok_or(LedgerError::NotFound { direction, id })
}

/// All rows of one direction for a user, newest first
pub async fn list_for_user<C>(
    db: &C,
    direction: Direction,
    user_id: Uuid,
) -> Result<Vec<LedgerEntry>, LedgerError>
where
    C: ConnectionTrait,
{
    let rows: Vec<LedgerEntry> = match direction {
        Direction::Deposit => deposits::Entity::find()
            .filter(deposits::Column::UserId.eq(user_id))
            .order_by_desc(deposits::Column::CreatedAt)
            .all(db)
            .await?
            .into_iter()
            .map(Into::into)
            .collect(),
        Direction::Withdrawal => withdrawals::Entity::find()
            .filter(withdrawals::Column::UserId.eq(user_id))
            .order_by_desc(withdrawals::Column::CreatedAt)
            .all(db)
            .await?
            .into_iter()
            .map(Into::into)
            .collect(),
    };

    tracing::debug!(
        "Found {} {} for user {}",
        rows.len(),
        direction.table_name(),
        user_id
    );

    Ok(rows)
}

/// Move a row to `next` and advance its `updated_at`.
///
/// The update only applies while the row still holds the status that was read, so two
/// concurrent writers cannot both move the same row.
pub async fn update_status<C>(
    db: &C,
    direction: Direction,
    id: Uuid,
    next: TransactionStatus,
) -> Result<LedgerEntry, LedgerError>
where
    C: ConnectionTrait,
{
    let current = find(db, direction, id).await?;

    if !current.status.can_transition_to(next) {
        return Err(LedgerError::InvalidTransition {
            from: current.status,
            to: next,
        });
    }

    let rows_affected = match direction {
        Direction::Deposit => {
            deposits::Entity::update_many()
                .set(deposits::ActiveModel {
                    status: Set(next),
                    ..Default::default()
                })
                .col_expr(deposits::Column::UpdatedAt, Expr::current_timestamp().into())
                .filter(deposits::Column::Id.eq(id))
                .filter(deposits::Column::Status.eq(current.status))
                .exec(db)
                .await?
                .rows_affected
        }
        Direction::Withdrawal => {
            withdrawals::Entity::update_many()
                .set(withdrawals::ActiveModel {
                    status: Set(next),
                    ..Default::default()
                })
                .col_expr(withdrawals::Column::UpdatedAt, Expr::current_timestamp().into())
                .filter(withdrawals::Column::Id.eq(id))
                .filter(withdrawals::Column::Status.eq(current.status))
                .exec(db)
                .await?
                .rows_affected
        }
    };

    if rows_affected == 0 {
        tracing::warn!(
            "{} {} changed status concurrently, expected {}",
            direction.table_name(),
            id,
            current.status.as_str()
        );
        return Err(LedgerError::StatusConflict {
            direction,
            id,
            expected: current.status,
        });
    }

    tracing::info!(
        "{} {}: {} -> {}",
        direction.table_name(),
        id,
        current.status.as_str(),
        next.as_str()
    );

    find(db, direction, id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};

    fn deposit_row(id: Uuid, status: TransactionStatus) -> deposits::Model {
        let now = Utc::now().into();
        deposits::Model {
            id,
            user_id: Uuid::new_v4(),
            currency_id: Uuid::new_v4(),
            amount: 1_000,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    fn withdrawal_row(id: Uuid, status: TransactionStatus) -> withdrawals::Model {
        let now = Utc::now().into();
        withdrawals::Model {
            id,
            user_id: Uuid::new_v4(),
            currency_id: Uuid::new_v4(),
            amount: 250,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    fn empty_db() -> DatabaseConnection {
        MockDatabase::new(DatabaseBackend::Postgres).into_connection()
    }

    #[tokio::test]
    async fn test_record_rejects_non_positive_amounts() {
        let db = empty_db();

        for amount in [0, -1, i64::MIN] {
            for direction in [Direction::Deposit, Direction::Withdrawal] {
                let entry = NewLedgerEntry::new(Uuid::new_v4(), Uuid::new_v4(), amount);
                let err = record(&db, direction, entry).await.unwrap_err();
                assert!(matches!(err, LedgerError::NonPositiveAmount(a) if a == amount));
            }
        }

        // Validation happens before any statement reaches the database
        assert!(db.into_transaction_log().is_empty());
    }

    #[tokio::test]
    async fn test_record_returns_stored_row() {
        let id = Uuid::new_v4();
        let row = deposit_row(id, TransactionStatus::Created);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row.clone()]])
            .into_connection();

        let entry = NewLedgerEntry::new(row.user_id, row.currency_id, row.amount);
        let stored = record(&db, Direction::Deposit, entry).await.unwrap();

        assert_eq!(stored, LedgerEntry::from(row));
        assert_eq!(stored.status, TransactionStatus::Created);
    }

    #[tokio::test]
    async fn test_record_leaves_status_to_database_default() {
        let row = withdrawal_row(Uuid::new_v4(), TransactionStatus::Created);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row.clone()]])
            .into_connection();

        let entry = NewLedgerEntry::new(row.user_id, row.currency_id, row.amount);
        record(&db, Direction::Withdrawal, entry).await.unwrap();

        let log = format!("{:?}", db.into_transaction_log());
        let insert = log.split("RETURNING").next().unwrap_or_default();
        assert!(insert.contains("INSERT INTO"), "{log}");
        assert!(insert.contains("withdrawals"), "{log}");
        assert!(!insert.contains("status"), "{log}");
        assert!(!insert.contains("created_at"), "{log}");
    }

    #[tokio::test]
    async fn test_find_missing_row() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<withdrawals::Model>::new()])
            .into_connection();

        let id = Uuid::new_v4();
        let err = find(&db, Direction::Withdrawal, id).await.unwrap_err();

        assert!(matches!(
            err,
            LedgerError::NotFound { direction: Direction::Withdrawal, id: missing } if missing == id
        ));
    }

    #[tokio::test]
    async fn test_list_for_user_maps_direction() {
        let rows = vec![
            withdrawal_row(Uuid::new_v4(), TransactionStatus::Pending),
            withdrawal_row(Uuid::new_v4(), TransactionStatus::Failed),
        ];
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([rows])
            .into_connection();

        let entries = list_for_user(&db, Direction::Withdrawal, Uuid::new_v4())
            .await
            .unwrap();

        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.direction == Direction::Withdrawal));
    }

    #[tokio::test]
    async fn test_update_status_moves_row() {
        let id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![deposit_row(id, TransactionStatus::Created)],
                vec![deposit_row(id, TransactionStatus::Pending)],
            ])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let updated = update_status(&db, Direction::Deposit, id, TransactionStatus::Pending)
            .await
            .unwrap();

        assert_eq!(updated.status, TransactionStatus::Pending);

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("UPDATE"), "{log}");
        assert!(log.contains("deposits"), "{log}");
        assert!(log.contains("CURRENT_TIMESTAMP"), "{log}");
    }

    #[tokio::test]
    async fn test_update_status_rejects_terminal_rows() {
        let id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![deposit_row(id, TransactionStatus::Completed)]])
            .into_connection();

        let err = update_status(&db, Direction::Deposit, id, TransactionStatus::Failed)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            LedgerError::InvalidTransition {
                from: TransactionStatus::Completed,
                to: TransactionStatus::Failed,
            }
        ));
    }

    #[tokio::test]
    async fn test_update_status_detects_concurrent_change() {
        let id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![withdrawal_row(id, TransactionStatus::Pending)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let err = update_status(&db, Direction::Withdrawal, id, TransactionStatus::Completed)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            LedgerError::StatusConflict {
                expected: TransactionStatus::Pending,
                ..
            }
        ));
    }
}
