//! Fill a development database with random deposits and withdrawals.
//!
//! Usage: seed_ledger <AMOUNT>

use std::env;

use rand::Rng;
use sea_orm::{ActiveModelTrait, Set, TransactionTrait};
use uuid::Uuid;

use wallet_ledger::config::{self, Config};
use wallet_ledger::entities::{currencies, transaction_status::TransactionStatus, users};
use wallet_ledger::models::ledger::{Direction, NewLedgerEntry};
use wallet_ledger::services::ledger;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let amount: usize = match args.get(1).map(|a| a.parse()) {
        Some(Ok(amount)) if args.len() == 2 => amount,
        _ => {
            eprintln!("Usage: {} <AMOUNT>", args[0]);
            std::process::exit(1);
        }
    };

    let config = Config::from_env()?;
    let db = config::connect(&config).await?;
    let txn = db.begin().await?;

    let user = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let currency_id = Uuid::new_v4();
    let currency = currencies::ActiveModel {
        id: Set(currency_id),
        code: Set(seed_currency_code(&currency_id)),
        minor_unit_digits: Set(2),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    println!("direction,id,amount,status");
    for _ in 0..amount {
        let (direction, qty, status) = {
            let mut rng = rand::thread_rng();
            let direction = if rng.gen_bool(0.5) {
                Direction::Deposit
            } else {
                Direction::Withdrawal
            };
            let status = TransactionStatus::ALL[rng.gen_range(0..TransactionStatus::ALL.len())];
            (direction, rng.gen_range(1..100), status)
        };

        let entry = NewLedgerEntry::new(user.id, currency.id, qty).with_status(status);
        let stored = ledger::record(&txn, direction, entry).await?;

        println!(
            "{},{},{},{}",
            direction.table_name(),
            stored.id,
            stored.amount,
            stored.status.as_str()
        );
    }

    txn.commit().await?;
    eprintln!("✓ Seeded {} rows for user {} in {}", amount, user.id, currency.code);

    Ok(())
}

/// Currency codes are unique; derive one from the new currency's id
fn seed_currency_code(id: &Uuid) -> String {
    format!("T{}", &id.simple().to_string()[..12]).to_uppercase()
}
