//! Database initialization for the application's domain models.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error, budget::create_budget_tables, goal::create_goal_table,
    transaction::create_transaction_table,
};

/// Create the tables for all domain models.
///
/// The tables are created within a single SQL transaction, so either the full
/// schema exists afterwards or none of it does.
///
/// # Errors
/// Returns an error if the tables cannot be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_transaction_table(&transaction)?;
    create_budget_tables(&transaction)?;
    create_goal_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
