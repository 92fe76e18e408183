//! The transaction ledger: domain types, database operations, aggregates,
//! and the ledger API.

mod db;
mod endpoints;
mod models;
mod stats;

pub use db::{
    TransactionFilter, create_transaction, create_transaction_table, delete_transaction,
    expense_totals_by_category, get_transaction, get_transactions, update_transaction,
};
pub(crate) use endpoints::{
    create_transaction_endpoint, delete_transaction_endpoint, get_transactions_endpoint,
    update_transaction_endpoint,
};
pub use models::{NewTransaction, Transaction, TransactionId, TransactionKind};
pub use stats::{CategoryExpense, MonthlySummary, monthly_summary};
pub(crate) use stats::get_summary_endpoint;
