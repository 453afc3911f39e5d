//! Deposits and withdrawals ledger tables plus the `transaction_status` enum type.
//!
//! Both tables share one shape. Amounts are integral minor units and must be positive.
//! Rows reference `users` and `currencies`; deleting a referenced row is restricted.

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{ConnectionTrait, DbBackend, Statement};
use sea_orm_migration::sea_orm::sea_query::extension::postgres::{Type, TypeCreateStatement};

use crate::m20250301_000001_create_users_and_currencies::{Currencies, Users};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // CREATE TYPE has no IF NOT EXISTS in Postgres
        if !has_status_type(manager).await? {
            manager.create_type(status_type()).await?;
        }

        manager.create_table(ledger_table(Deposits::Table)).await?;
        manager.create_table(ledger_table(Withdrawals::Table)).await?;

        for statement in ledger_indexes(Deposits::Table)
            .into_iter()
            .chain(ledger_indexes(Withdrawals::Table))
        {
            manager.create_index(statement).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Withdrawals::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Deposits::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_type(
                Type::drop()
                    .if_exists()
                    .name(TransactionStatus::Enum)
                    .to_owned(),
            )
            .await
    }
}

/// Whether the enum already exists in the schema the tables are created in
async fn has_status_type(manager: &SchemaManager<'_>) -> Result<bool, DbErr> {
    let row = manager
        .get_connection()
        .query_one(Statement::from_sql_and_values(
            DbBackend::Postgres,
            STATUS_TYPE_LOOKUP,
            [TransactionStatus::Enum.to_string().into()],
        ))
        .await?;

    Ok(row.is_some())
}

const STATUS_TYPE_LOOKUP: &str = "SELECT 1 FROM pg_type t \
     JOIN pg_namespace n ON n.oid = t.typnamespace \
     WHERE t.typname = $1 AND t.typtype = 'e' AND n.nspname = current_schema()";

fn status_type() -> TypeCreateStatement {
    Type::create()
        .as_enum(TransactionStatus::Enum)
        .values([
            TransactionStatus::Created,
            TransactionStatus::Pending,
            TransactionStatus::Completed,
            TransactionStatus::Failed,
        ])
        .to_owned()
}

/// Shared column layout for `deposits` and `withdrawals`.
fn ledger_table<T>(table: T) -> TableCreateStatement
where
    T: Iden + Clone + 'static,
{
    let name = table.to_string();

    Table::create()
        .table(table.clone())
        .if_not_exists()
        .col(
            ColumnDef::new(Ledger::Id)
                .uuid()
                .not_null()
                .primary_key()
                .default(Expr::cust("gen_random_uuid()")),
        )
        .col(ColumnDef::new(Ledger::UserId).uuid().not_null())
        .col(ColumnDef::new(Ledger::CurrencyId).uuid().not_null())
        .col(
            ColumnDef::new(Ledger::Amount)
                .big_integer()
                .not_null()
                .check(Expr::col(Ledger::Amount).gt(0)),
        )
        .col(
            ColumnDef::new(Ledger::Status)
                .custom(TransactionStatus::Enum)
                .not_null()
                .default("CREATED"),
        )
        .col(
            ColumnDef::new(Ledger::CreatedAt)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .col(
            ColumnDef::new(Ledger::UpdatedAt)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .foreign_key(
            ForeignKey::create()
                .name(format!("fk_{name}_user_id"))
                .from(table.clone(), Ledger::UserId)
                .to(Users::Table, Users::Id)
                .on_delete(ForeignKeyAction::Restrict)
                .on_update(ForeignKeyAction::Restrict),
        )
        .foreign_key(
            ForeignKey::create()
                .name(format!("fk_{name}_currency_id"))
                .from(table, Ledger::CurrencyId)
                .to(Currencies::Table, Currencies::Id)
                .on_delete(ForeignKeyAction::Restrict)
                .on_update(ForeignKeyAction::Restrict),
        )
        .to_owned()
}

fn ledger_indexes<T>(table: T) -> Vec<IndexCreateStatement>
where
    T: Iden + Clone + 'static,
{
    let name = table.to_string();

    vec![
        Index::create()
            .name(format!("idx_{name}_user_id"))
            .table(table.clone())
            .col(Ledger::UserId)
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name(format!("idx_{name}_currency_id"))
            .table(table)
            .col(Ledger::CurrencyId)
            .if_not_exists()
            .to_owned(),
    ]
}

#[derive(DeriveIden, Clone)]
enum Deposits {
    Table,
}

#[derive(DeriveIden, Clone)]
enum Withdrawals {
    Table,
}

/// Columns common to both ledger tables
#[derive(DeriveIden)]
enum Ledger {
    Id,
    UserId,
    CurrencyId,
    Amount,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum TransactionStatus {
    #[sea_orm(iden = "transaction_status")]
    Enum,
    #[sea_orm(iden = "CREATED")]
    Created,
    #[sea_orm(iden = "PENDING")]
    Pending,
    #[sea_orm(iden = "COMPLETED")]
    Completed,
    #[sea_orm(iden = "FAILED")]
    Failed,
}
