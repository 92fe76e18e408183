//! Database operations for the transaction ledger.

use rusqlite::{Connection, Row};

use crate::{
    Error, UserId,
    budget::Period,
    category::Category,
    transaction::models::{NewTransaction, Transaction, TransactionId, TransactionKind},
};

/// Optional filters and paging for listing transactions.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Only return transactions in this category.
    pub category: Option<Category>,
    /// Only return transactions of this kind.
    pub kind: Option<TransactionKind>,
    /// The maximum number of transactions to return. `None` returns all.
    pub limit: Option<u32>,
    /// The number of transactions to skip, for paging.
    pub offset: u32,
}

/// Create a new transaction in the database from a validated candidate.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn create_transaction(
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\" (user_id, amount, category, kind, date, description)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, user_id, amount, category, kind, date, description",
        )?
        .query_row(
            (
                new_transaction.user_id,
                new_transaction.amount,
                new_transaction.category.as_str(),
                new_transaction.kind.as_str(),
                new_transaction.date,
                new_transaction.description,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_transaction(
    id: TransactionId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(
            "SELECT id, user_id, amount, category, kind, date, description
             FROM \"transaction\" WHERE id = :id",
        )?
        .query_row(&[(":id", &id)], map_transaction_row)
        .map_err(|error| error.into())
}

/// Overwrite a transaction's fields with new validated values.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingTransaction] if `id` does not refer to a valid
///   transaction,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    update: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let rows_affected = connection.execute(
        "UPDATE \"transaction\"
         SET amount = ?1, category = ?2, kind = ?3, date = ?4, description = ?5
         WHERE id = ?6 AND user_id = ?7",
        (
            update.amount,
            update.category.as_str(),
            update.kind.as_str(),
            update.date,
            &update.description,
            id,
            update.user_id,
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingTransaction);
    }

    Ok(Transaction {
        id,
        user_id: update.user_id,
        amount: update.amount,
        category: update.category,
        kind: update.kind,
        date: update.date,
        description: update.description,
    })
}

/// Delete a transaction by ID.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingTransaction] if `id` does not refer to a valid
///   transaction,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_transaction(id: TransactionId, connection: &Connection) -> Result<(), Error> {
    let rows_affected =
        connection.execute("DELETE FROM \"transaction\" WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

/// Retrieve a user's transactions, newest first, applying the given filters.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn get_transactions(
    user_id: UserId,
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let mut query = String::from(
        "SELECT id, user_id, amount, category, kind, date, description
         FROM \"transaction\" WHERE user_id = ?1",
    );

    if let Some(category) = filter.category {
        query.push_str(&format!(" AND category = '{}'", category.as_str()));
    }

    if let Some(kind) = filter.kind {
        query.push_str(&format!(" AND kind = '{}'", kind.as_str()));
    }

    // Sort by date, and then ID to keep transaction order stable after updates.
    query.push_str(" ORDER BY date DESC, id DESC");

    if let Some(limit) = filter.limit {
        query.push_str(&format!(" LIMIT {limit} OFFSET {}", filter.offset));
    }

    connection
        .prepare(&query)?
        .query_map([user_id], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Sum a user's expense amounts per category for one period.
///
/// This is the grouped ledger scan consumed by the full-recompute path of the
/// budget reconciliation engine. Categories with no expenses in the period
/// are absent from the result.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn expense_totals_by_category(
    user_id: UserId,
    period: Period,
    connection: &Connection,
) -> Result<Vec<(Category, f64)>, Error> {
    connection
        .prepare(
            "SELECT category, SUM(amount) FROM \"transaction\"
             WHERE user_id = ?1 AND kind = 'expense' AND date BETWEEN ?2 AND ?3
             GROUP BY category",
        )?
        .query_map(
            (user_id, period.first_day(), period.last_day()),
            |row| {
                let raw_category: String = row.get(0)?;
                let total: f64 = row.get(1)?;
                Ok((raw_category, total))
            },
        )?
        .map(|maybe_row| {
            let (raw_category, total) = maybe_row.map_err(Error::from)?;
            let category = raw_category.parse::<Category>()?;
            Ok((category, total))
        })
        .collect()
}

/// Initialize the transaction table and indexes.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                amount REAL NOT NULL,
                category TEXT NOT NULL,
                kind TEXT NOT NULL,
                date TEXT NOT NULL,
                description TEXT NOT NULL
                )",
        (),
    )?;

    // Ensure the sequence starts at 1
    connection.execute(
        "INSERT OR IGNORE INTO sqlite_sequence (name, seq) VALUES ('transaction', 0)",
        (),
    )?;

    // Composite indexes used by the period scan and the filtered listing.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_owner_date ON \"transaction\"(user_id, date);",
        (),
    )?;
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_owner_category ON \"transaction\"(user_id, category);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let raw_category: String = row.get(3)?;
    let category = raw_category.parse::<Category>().map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(error))
    })?;

    let raw_kind: String = row.get(4)?;
    let kind = raw_kind.parse::<TransactionKind>().map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(error))
    })?;

    Ok(Transaction {
        id: row.get(0)?,
        user_id: row.get(1)?,
        amount: row.get(2)?,
        category,
        kind,
        date: row.get(5)?,
        description: row.get(6)?,
    })
}

#[cfg(test)]
mod transaction_db_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        budget::Period,
        category::Category,
        db::initialize,
        transaction::models::{NewTransaction, TransactionKind},
    };

    use super::{
        TransactionFilter, create_transaction, delete_transaction, expense_totals_by_category,
        get_transaction, get_transactions, update_transaction,
    };

    fn get_test_db_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");
        connection
    }

    fn expense(
        user_id: i64,
        amount: f64,
        category: Category,
        date: time::Date,
    ) -> NewTransaction {
        NewTransaction::new(user_id, amount, category, TransactionKind::Expense, date, "")
            .expect("Could not build test transaction")
    }

    #[test]
    fn create_transaction_succeeds() {
        let connection = get_test_db_connection();

        let transaction = create_transaction(
            expense(1, 12.3, Category::Food, date!(2025 - 06 - 10)),
            &connection,
        )
        .expect("Could not create transaction");

        assert!(transaction.id > 0);
        assert_eq!(transaction.amount, 12.3);
        assert_eq!(transaction.category, Category::Food);
        assert_eq!(transaction.kind, TransactionKind::Expense);
    }

    #[test]
    fn get_transaction_with_invalid_id_returns_not_found() {
        let connection = get_test_db_connection();

        let result = get_transaction(999, &connection);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn update_transaction_overwrites_fields() {
        let connection = get_test_db_connection();
        let original = create_transaction(
            expense(1, 12.3, Category::Food, date!(2025 - 06 - 10)),
            &connection,
        )
        .expect("Could not create transaction");

        let updated = update_transaction(
            original.id,
            expense(1, 99.0, Category::Transport, date!(2025 - 06 - 11)),
            &connection,
        )
        .expect("Could not update transaction");

        assert_eq!(updated.id, original.id);
        assert_eq!(updated.amount, 99.0);
        assert_eq!(updated.category, Category::Transport);

        let stored = get_transaction(original.id, &connection).expect("Could not get transaction");
        assert_eq!(stored, updated);
    }

    #[test]
    fn update_missing_transaction_fails() {
        let connection = get_test_db_connection();

        let result = update_transaction(
            999,
            expense(1, 1.0, Category::Food, date!(2025 - 06 - 10)),
            &connection,
        );

        assert_eq!(result, Err(Error::UpdateMissingTransaction));
    }

    #[test]
    fn delete_missing_transaction_fails() {
        let connection = get_test_db_connection();

        let result = delete_transaction(999, &connection);

        assert_eq!(result, Err(Error::DeleteMissingTransaction));
    }

    #[test]
    fn delete_transaction_removes_row() {
        let connection = get_test_db_connection();
        let transaction = create_transaction(
            expense(1, 12.3, Category::Food, date!(2025 - 06 - 10)),
            &connection,
        )
        .expect("Could not create transaction");

        delete_transaction(transaction.id, &connection).expect("Could not delete transaction");

        assert_eq!(get_transaction(transaction.id, &connection), Err(Error::NotFound));
    }

    #[test]
    fn get_transactions_filters_by_kind_and_pages() {
        let connection = get_test_db_connection();
        for i in 1..=5 {
            create_transaction(
                expense(1, i as f64, Category::Food, date!(2025 - 06 - 10)),
                &connection,
            )
            .expect("Could not create transaction");
        }
        create_transaction(
            NewTransaction::new(
                1,
                1000.0,
                Category::Income,
                TransactionKind::Income,
                date!(2025 - 06 - 01),
                "salary",
            )
            .unwrap(),
            &connection,
        )
        .expect("Could not create transaction");

        let filter = TransactionFilter {
            kind: Some(TransactionKind::Expense),
            limit: Some(3),
            ..Default::default()
        };
        let transactions =
            get_transactions(1, &filter, &connection).expect("Could not list transactions");

        assert_eq!(transactions.len(), 3);
        assert!(
            transactions
                .iter()
                .all(|transaction| transaction.kind == TransactionKind::Expense)
        );
    }

    #[test]
    fn get_transactions_does_not_leak_other_users() {
        let connection = get_test_db_connection();
        create_transaction(
            expense(1, 10.0, Category::Food, date!(2025 - 06 - 10)),
            &connection,
        )
        .expect("Could not create transaction");
        create_transaction(
            expense(2, 20.0, Category::Food, date!(2025 - 06 - 10)),
            &connection,
        )
        .expect("Could not create transaction");

        let transactions = get_transactions(1, &TransactionFilter::default(), &connection)
            .expect("Could not list transactions");

        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].user_id, 1);
    }

    #[test]
    fn expense_totals_group_by_category_within_period() {
        let connection = get_test_db_connection();
        let period = Period::new(6, 2025).unwrap();

        create_transaction(
            expense(1, 10.0, Category::Food, date!(2025 - 06 - 01)),
            &connection,
        )
        .unwrap();
        create_transaction(
            expense(1, 15.5, Category::Food, date!(2025 - 06 - 30)),
            &connection,
        )
        .unwrap();
        create_transaction(
            expense(1, 40.0, Category::Bills, date!(2025 - 06 - 12)),
            &connection,
        )
        .unwrap();
        // Outside the period, must be ignored.
        create_transaction(
            expense(1, 99.0, Category::Food, date!(2025 - 07 - 01)),
            &connection,
        )
        .unwrap();
        // Income never counts as an expense.
        create_transaction(
            NewTransaction::new(
                1,
                2000.0,
                Category::Income,
                TransactionKind::Income,
                date!(2025 - 06 - 15),
                "salary",
            )
            .unwrap(),
            &connection,
        )
        .unwrap();

        let mut totals = expense_totals_by_category(1, period, &connection)
            .expect("Could not sum expenses");
        totals.sort_by(|a, b| a.0.as_str().cmp(b.0.as_str()));

        assert_eq!(
            totals,
            vec![(Category::Bills, 40.0), (Category::Food, 25.5)]
        );
    }
}
