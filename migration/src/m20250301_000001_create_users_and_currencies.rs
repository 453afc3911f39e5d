//! Minimal `users` and `currencies` tables.
//!
//! Both are owned by the surrounding account and currency subsystems. They are created with
//! IF NOT EXISTS so the ledger foreign keys resolve on a fresh database, and an existing
//! schema is left alone. Tables this migration creates carry [`OWNER_COMMENT`]; `down` only
//! drops tables with that comment.

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{ConnectionTrait, DbBackend, Statement};

const OWNER_COMMENT: &str = "created by the wallet-ledger migration";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let tables = [
            (Users::Table.to_string(), users_table()),
            (Currencies::Table.to_string(), currencies_table()),
        ];

        for (name, statement) in tables {
            if has_table(manager, &name).await? {
                continue;
            }
            manager.create_table(statement).await?;
            manager
                .get_connection()
                .execute_unprepared(&owner_comment_sql(&name))
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [Currencies::Table.to_string(), Users::Table.to_string()] {
            if is_owned(manager, &name).await? {
                manager
                    .drop_table(Table::drop().table(Alias::new(name)).if_exists().to_owned())
                    .await?;
            }
        }

        Ok(())
    }
}

fn owner_comment_sql(table: &str) -> String {
    format!(r#"COMMENT ON TABLE "{table}" IS '{OWNER_COMMENT}'"#)
}

/// Whether `table` resolves on the search path, the same lookup CREATE TABLE uses
async fn has_table(manager: &SchemaManager<'_>, table: &str) -> Result<bool, DbErr> {
    let row = manager
        .get_connection()
        .query_one(Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT to_regclass($1::text) IS NOT NULL AS found",
            [table.into()],
        ))
        .await?;

    match row {
        Some(row) => row.try_get("", "found"),
        None => Ok(false),
    }
}

/// Whether `table` exists and was created by this migration
async fn is_owned(manager: &SchemaManager<'_>, table: &str) -> Result<bool, DbErr> {
    let row = manager
        .get_connection()
        .query_one(Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT COALESCE(obj_description(to_regclass($1::text), 'pg_class') = $2::text, false) AS owned",
            [table.into(), OWNER_COMMENT.into()],
        ))
        .await?;

    match row {
        Some(row) => row.try_get("", "owned"),
        None => Ok(false),
    }
}

fn users_table() -> TableCreateStatement {
    Table::create()
        .table(Users::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(Users::Id)
                .uuid()
                .not_null()
                .primary_key()
                .default(Expr::cust("gen_random_uuid()")),
        )
        .col(
            ColumnDef::new(Users::CreatedAt)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .to_owned()
}

fn currencies_table() -> TableCreateStatement {
    Table::create()
        .table(Currencies::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(Currencies::Id)
                .uuid()
                .not_null()
                .primary_key()
                .default(Expr::cust("gen_random_uuid()")),
        )
        .col(
            ColumnDef::new(Currencies::Code)
                .string_len(16)
                .not_null()
                .unique_key(),
        )
        // Digits between the major and the minor unit (2 for cents)
        .col(
            ColumnDef::new(Currencies::MinorUnitDigits)
                .small_integer()
                .not_null()
                .default(2),
        )
        .col(
            ColumnDef::new(Currencies::CreatedAt)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .to_owned()
}

#[derive(DeriveIden)]
pub(crate) enum Users {
    Table,
    Id,
    CreatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum Currencies {
    Table,
    Id,
    Code,
    MinorUnitDigits,
    CreatedAt,
}
