// src/lib.rs

pub mod config;
pub mod error;

pub mod entities {
    pub mod prelude;
    pub mod currencies;
    pub mod deposits;
    pub mod transaction_status;
    pub mod users;
    pub mod withdrawals;
}

pub mod services {
    pub mod ledger;
}

pub mod models;
