//! Canned spending recommendations derived from monthly aggregates.
//!
//! These are fixed-form messages over the ledger summary, not any kind of
//! statistical model.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, UserId,
    budget::Period,
    transaction::{MonthlySummary, monthly_summary},
};

/// The savings rate below which the savings nudge is shown.
const SAVINGS_RATE_TARGET: f64 = 10.0;

/// Build the recommendation messages for a monthly summary.
///
/// Returns a prompt to add transactions when the ledger is empty for the
/// period.
pub fn spending_insights(summary: &MonthlySummary) -> Vec<String> {
    if summary.transaction_count == 0 {
        return vec!["Add some transactions to get spending insights.".to_string()];
    }

    let mut insights = Vec::new();

    if summary.savings < 0.0 {
        insights.push(format!(
            "You're spending {:.2} more than your income this month. Consider reducing expenses.",
            summary.savings.abs()
        ));
    } else if summary.savings > 0.0 {
        insights.push(format!(
            "Great! You're saving {:.2} this month.",
            summary.savings
        ));
    }

    if let Some(top) = summary.category_breakdown.first() {
        insights.push(format!(
            "Your highest spending is on {} ({:.2}).",
            top.category, top.total
        ));
    }

    if summary.income > 0.0 && summary.savings_rate < SAVINGS_RATE_TARGET {
        insights.push(format!(
            "Try to save at least {SAVINGS_RATE_TARGET:.0}% of your income. Current savings rate: {:.1}%.",
            summary.savings_rate
        ));
    }

    if insights.is_empty() {
        insights.push("Keep tracking your expenses for better insights.".to_string());
    }

    insights
}

/// Query parameters for the insights endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct InsightsQuery {
    user_id: UserId,
    month: u8,
    year: i32,
}

/// The insights endpoint's response body.
#[derive(Debug, Serialize)]
pub(crate) struct InsightsResponse {
    insights: Vec<String>,
}

/// A route handler for a user's monthly spending recommendations.
pub(crate) async fn get_insights_endpoint(
    State(state): State<AppState>,
    Query(query): Query<InsightsQuery>,
) -> Result<Json<InsightsResponse>, Error> {
    let period = Period::new(query.month, query.year)?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let summary = monthly_summary(query.user_id, period, &connection)?;

    Ok(Json(InsightsResponse {
        insights: spending_insights(&summary),
    }))
}
