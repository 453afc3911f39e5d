pub use super::currencies::Entity as Currencies;
pub use super::deposits::Entity as Deposits;
pub use super::transaction_status::TransactionStatus;
pub use super::users::Entity as Users;
pub use super::withdrawals::Entity as Withdrawals;
