use sea_orm::{
    ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, DatabaseTransaction, Set,
    TransactionTrait,
};
use sea_orm_migration::MigratorTrait;
use std::env;
use tokio::sync::OnceCell;
use uuid::Uuid;

use wallet_ledger::entities::{currencies, users};

static MIGRATED: OnceCell<()> = OnceCell::const_new();

/// Set up test database connection with the ledger schema applied.
/// Uses TEST_DATABASE_URL environment variable or falls back to default
pub async fn setup_test_db() -> DatabaseConnection {
    let database_url = env::var("TEST_DATABASE_URL").unwrap_or_else(|_| {
        "postgresql://ledger_user@localhost:5432/ledger_test".to_string()
    });

    let db = Database::connect(&database_url)
        .await
        .expect("Failed to connect to test DB");

    // Tests run in parallel; only one of them may create the schema
    MIGRATED
        .get_or_init(|| async {
            migration::Migrator::up(&db, None)
                .await
                .expect("Failed to run migrations");
        })
        .await;

    db
}

/// Open a transaction whose search path is a new, empty schema.
///
/// Schema changes made through it disappear on rollback.
pub async fn isolated_schema(db: &DatabaseConnection) -> (DatabaseTransaction, String) {
    let schema = format!("ledger_test_{}", Uuid::new_v4().simple());
    let txn = db.begin().await.expect("Failed to begin transaction");

    txn.execute_unprepared(&format!(r#"CREATE SCHEMA "{schema}""#))
        .await
        .expect("Failed to create schema");
    txn.execute_unprepared(&format!(r#"SET LOCAL search_path TO "{schema}""#))
        .await
        .expect("Failed to set search_path");

    (txn, schema)
}

pub async fn create_user(db: &DatabaseConnection) -> users::Model {
    users::ActiveModel {
        id: Set(Uuid::new_v4()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert user")
}

/// Currency codes are unique, so each call gets a random one
pub async fn create_currency(db: &DatabaseConnection) -> currencies::Model {
    let code = Uuid::new_v4().simple().to_string()[..12].to_uppercase();

    currencies::ActiveModel {
        id: Set(Uuid::new_v4()),
        code: Set(code),
        minor_unit_digits: Set(2),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert currency")
}
