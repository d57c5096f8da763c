pub mod account;
pub mod budget;
pub mod expense;
pub mod income;
pub mod savings_goal;
pub mod transaction;

pub use account::Account;
pub use budget::Budget;
pub use expense::Expense;
pub use income::Income;
pub use savings_goal::SavingsGoal;
pub use transaction::{Transaction, TransactionKind};
