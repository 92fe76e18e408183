//! Monthly ledger aggregates for the summary endpoint and insights.

use axum::{
    Json,
    extract::{Query, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{AppState, Error, UserId, budget::Period, category::Category};

/// The summed expenses for one category in a period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryExpense {
    /// The expense category.
    pub category: Category,
    /// The summed amount spent in the category.
    pub total: f64,
    /// How many transactions contributed to the total.
    pub count: u32,
}

/// Income, spending, and savings aggregates for one (user, period).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySummary {
    /// Total income recorded in the period.
    pub income: f64,
    /// Total expenses recorded in the period.
    pub expenses: f64,
    /// Income minus expenses. Negative when overspending.
    pub savings: f64,
    /// Savings as a percentage of income, 0 when there is no income.
    pub savings_rate: f64,
    /// Expenses grouped by category, largest first.
    pub category_breakdown: Vec<CategoryExpense>,
    /// The number of transactions recorded in the period.
    pub transaction_count: u32,
}

/// Aggregate a user's ledger for one period.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn monthly_summary(
    user_id: UserId,
    period: Period,
    connection: &Connection,
) -> Result<MonthlySummary, Error> {
    let (income, expenses, transaction_count) = connection
        .prepare(
            "SELECT
                COALESCE(SUM(CASE WHEN kind = 'income' THEN amount ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN kind = 'expense' THEN amount ELSE 0 END), 0),
                COUNT(id)
             FROM \"transaction\"
             WHERE user_id = ?1 AND date BETWEEN ?2 AND ?3",
        )?
        .query_row(
            (user_id, period.first_day(), period.last_day()),
            |row| {
                Ok((
                    row.get::<_, f64>(0)?,
                    row.get::<_, f64>(1)?,
                    row.get::<_, u32>(2)?,
                ))
            },
        )?;

    let category_breakdown = connection
        .prepare(
            "SELECT category, SUM(amount), COUNT(id) FROM \"transaction\"
             WHERE user_id = ?1 AND kind = 'expense' AND date BETWEEN ?2 AND ?3
             GROUP BY category
             ORDER BY SUM(amount) DESC",
        )?
        .query_map(
            (user_id, period.first_day(), period.last_day()),
            |row| {
                let raw_category: String = row.get(0)?;
                Ok((raw_category, row.get::<_, f64>(1)?, row.get::<_, u32>(2)?))
            },
        )?
        .map(|maybe_row| {
            let (raw_category, total, count) = maybe_row.map_err(Error::from)?;
            Ok(CategoryExpense {
                category: raw_category.parse::<Category>()?,
                total,
                count,
            })
        })
        .collect::<Result<Vec<_>, Error>>()?;

    let savings = income - expenses;
    let savings_rate = if income > 0.0 {
        (savings / income) * 100.0
    } else {
        0.0
    };

    Ok(MonthlySummary {
        income,
        expenses,
        savings,
        savings_rate,
        category_breakdown,
        transaction_count,
    })
}

/// Query parameters for the summary endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct SummaryQuery {
    user_id: UserId,
    month: u8,
    year: i32,
}

/// A route handler for a user's monthly ledger summary.
pub(crate) async fn get_summary_endpoint(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<MonthlySummary>, Error> {
    let period = Period::new(query.month, query.year)?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let summary = monthly_summary(query.user_id, period, &connection)?;

    Ok(Json(summary))
}
