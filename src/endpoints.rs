//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/goals/{goal_id}', use
//! [format_endpoint].

/// The route to access transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route to access a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route for a user's monthly ledger summary.
pub const SUMMARY: &str = "/api/summary";
/// The route to create a budget.
pub const BUDGETS: &str = "/api/budgets";
/// The route for a budget's progress report.
pub const BUDGET: &str = "/api/budgets/{month}/{year}";
/// The route to rebuild a budget's spent amounts from the ledger.
pub const BUDGET_RECOMPUTE: &str = "/api/budgets/{month}/{year}/recompute";
/// The route to set a category's planned amount.
pub const BUDGET_CATEGORY: &str = "/api/budgets/category";
/// The route for keyword category suggestions.
pub const CATEGORIZE: &str = "/api/categorize";
/// The route for canned spending recommendations.
pub const INSIGHTS: &str = "/api/insights";
/// The route to access goals.
pub const GOALS: &str = "/api/goals";
/// The route to access a single goal.
pub const GOAL: &str = "/api/goals/{goal_id}";
/// The route to add a contribution to a goal.
pub const GOAL_CONTRIBUTE: &str = "/api/goals/{goal_id}/contribute";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/api/goals/{goal_id}', '{goal_id}' is
/// the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
