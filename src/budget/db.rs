//! Database operations for budgets.

use std::collections::BTreeMap;

use rusqlite::{Connection, Row, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error, UserId,
    budget::domain::{
        Budget, BudgetId, CategoryAllocation, NewBudget, Period, validate_amount,
    },
    category::BudgetCategory,
};

/// Persist a budget candidate and return it with its generated ID.
///
/// The budget header and all of its category allocations are written in a
/// single SQL transaction.
///
/// # Errors
/// This function will return a:
/// - [Error::DuplicatePeriod] if a budget already exists for the candidate's
///   (user, month, year). The existing budget is left unchanged.
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_budget(new_budget: NewBudget, connection: &Connection) -> Result<Budget, Error> {
    let sql_transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    let insert_result = sql_transaction.execute(
        "INSERT INTO budget (user_id, month, year, monthly_income) VALUES (?1, ?2, ?3, ?4)",
        (
            new_budget.user_id,
            new_budget.period.month_number(),
            new_budget.period.year,
            new_budget.monthly_income,
        ),
    );

    if let Err(error) = insert_result {
        return match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Err(Error::DuplicatePeriod(new_budget.period)),
            error => Err(error.into()),
        };
    }

    let budget_id = sql_transaction.last_insert_rowid();

    for category in BudgetCategory::ALL {
        let allocation = new_budget
            .categories
            .get(&category)
            .copied()
            .unwrap_or_default();

        sql_transaction.execute(
            "INSERT INTO budget_category (budget_id, category, planned, spent)
             VALUES (?1, ?2, ?3, ?4)",
            (
                budget_id,
                category.as_str(),
                allocation.planned,
                allocation.spent,
            ),
        )?;
    }

    sql_transaction.commit()?;

    Ok(Budget::from_parts(
        budget_id,
        new_budget.user_id,
        new_budget.period,
        new_budget.monthly_income,
        new_budget.categories,
    ))
}

/// Retrieve the budget for `(user_id, period)`, or `None` if the user has not
/// declared a budget for that period.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn get_budget(
    user_id: UserId,
    period: Period,
    connection: &Connection,
) -> Result<Option<Budget>, Error> {
    let header = connection
        .prepare("SELECT id, monthly_income FROM budget WHERE user_id = ?1 AND month = ?2 AND year = ?3")?
        .query_row(
            (user_id, period.month_number(), period.year),
            |row| Ok((row.get::<_, BudgetId>(0)?, row.get::<_, f64>(1)?)),
        );

    let (budget_id, monthly_income) = match header {
        Ok(parts) => parts,
        Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
        Err(error) => return Err(error.into()),
    };

    let categories = connection
        .prepare("SELECT category, planned, spent FROM budget_category WHERE budget_id = ?1")?
        .query_map([budget_id], map_allocation_row)?
        .collect::<Result<BTreeMap<_, _>, _>>()?;

    Ok(Some(Budget::from_parts(
        budget_id,
        user_id,
        period,
        monthly_income,
        categories,
    )))
}

/// Set the planned amount for one category of an existing budget.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidAmount] if `amount` is negative or not a number. The
///   budget is left untouched.
/// - [Error::BudgetNotFound] if no budget exists for `(user_id, period)`.
/// - or [Error::SqlError] if there is some other SQL error.
pub fn set_planned(
    user_id: UserId,
    period: Period,
    category: BudgetCategory,
    amount: f64,
    connection: &Connection,
) -> Result<(), Error> {
    let amount = validate_amount(amount)?;

    let rows_affected = connection.execute(
        "UPDATE budget_category SET planned = ?1
         WHERE category = ?2
           AND budget_id = (SELECT id FROM budget WHERE user_id = ?3 AND month = ?4 AND year = ?5)",
        (
            amount,
            category.as_str(),
            user_id,
            period.month_number(),
            period.year,
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::BudgetNotFound(period));
    }

    Ok(())
}

/// Add `delta` to a category's spent amount, clamping the result at zero.
///
/// The arithmetic happens inside the UPDATE statement, so concurrent callers
/// cannot lose each other's updates. Returns whether a budget row was
/// affected; `false` means the user has no budget for the period and the call
/// was a no-op.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub(crate) fn add_spent(
    user_id: UserId,
    period: Period,
    category: BudgetCategory,
    delta: f64,
    connection: &Connection,
) -> Result<bool, Error> {
    let rows_affected = connection.execute(
        "UPDATE budget_category SET spent = MAX(0.0, spent + ?1)
         WHERE category = ?2
           AND budget_id = (SELECT id FROM budget WHERE user_id = ?3 AND month = ?4 AND year = ?5)",
        (
            delta,
            category.as_str(),
            user_id,
            period.month_number(),
            period.year,
        ),
    )?;

    Ok(rows_affected > 0)
}

/// Retrieve a single category allocation, or `None` if the user has no budget
/// for the period.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub(crate) fn get_allocation(
    user_id: UserId,
    period: Period,
    category: BudgetCategory,
    connection: &Connection,
) -> Result<Option<CategoryAllocation>, Error> {
    let result = connection
        .prepare(
            "SELECT planned, spent FROM budget_category
             WHERE category = ?1
               AND budget_id = (SELECT id FROM budget WHERE user_id = ?2 AND month = ?3 AND year = ?4)",
        )?
        .query_row(
            (
                category.as_str(),
                user_id,
                period.month_number(),
                period.year,
            ),
            |row| {
                Ok(CategoryAllocation {
                    planned: row.get(0)?,
                    spent: row.get(1)?,
                })
            },
        );

    match result {
        Ok(allocation) => Ok(Some(allocation)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(error) => Err(error.into()),
    }
}

/// Overwrite every spent amount of a budget with the given grouped sums.
///
/// Categories absent from `sums` end up with zero spent. All writes happen in
/// one SQL transaction, so the budget is rewritten as a whole or not at all.
///
/// # Errors
/// This function will return a:
/// - [Error::BudgetNotFound] if no budget exists for `(user_id, period)`,
/// - or [Error::SqlError] if there is some other SQL error.
pub(crate) fn replace_spent(
    user_id: UserId,
    period: Period,
    sums: &[(BudgetCategory, f64)],
    connection: &Connection,
) -> Result<(), Error> {
    let sql_transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    let rows_affected = sql_transaction.execute(
        "UPDATE budget_category SET spent = 0.0
         WHERE budget_id = (SELECT id FROM budget WHERE user_id = ?1 AND month = ?2 AND year = ?3)",
        (user_id, period.month_number(), period.year),
    )?;

    if rows_affected == 0 {
        return Err(Error::BudgetNotFound(period));
    }

    for (category, total) in sums {
        sql_transaction.execute(
            "UPDATE budget_category SET spent = MAX(0.0, ?1)
             WHERE category = ?2
               AND budget_id = (SELECT id FROM budget WHERE user_id = ?3 AND month = ?4 AND year = ?5)",
            (
                total,
                category.as_str(),
                user_id,
                period.month_number(),
                period.year,
            ),
        )?;
    }

    sql_transaction.commit()?;

    Ok(())
}

/// Initialize the budget tables and indexes.
pub fn create_budget_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS budget (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            month INTEGER NOT NULL,
            year INTEGER NOT NULL,
            monthly_income REAL NOT NULL DEFAULT 0,
            UNIQUE(user_id, month, year)
        );

        CREATE TABLE IF NOT EXISTS budget_category (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            budget_id INTEGER NOT NULL,
            category TEXT NOT NULL,
            planned REAL NOT NULL DEFAULT 0,
            spent REAL NOT NULL DEFAULT 0,
            FOREIGN KEY(budget_id) REFERENCES budget(id) ON UPDATE CASCADE ON DELETE CASCADE,
            UNIQUE(budget_id, category)
        );

        CREATE INDEX IF NOT EXISTS idx_budget_owner_period ON budget(user_id, year, month);

        CREATE INDEX IF NOT EXISTS idx_budget_category_budget ON budget_category(budget_id);",
    )?;

    // Ensure the sequences start at 1
    connection.execute(
        "INSERT OR IGNORE INTO sqlite_sequence (name, seq) VALUES ('budget', 0)",
        (),
    )?;
    connection.execute(
        "INSERT OR IGNORE INTO sqlite_sequence (name, seq) VALUES ('budget_category', 0)",
        (),
    )?;

    Ok(())
}

fn map_allocation_row(row: &Row) -> Result<(BudgetCategory, CategoryAllocation), rusqlite::Error> {
    let raw_category: String = row.get(0)?;
    let category = raw_category.parse::<BudgetCategory>().map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(error))
    })?;

    Ok((
        category,
        CategoryAllocation {
            planned: row.get(1)?,
            spent: row.get(2)?,
        },
    ))
}
