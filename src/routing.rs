//! Application router configuration.

use axum::{
    Router,
    http::StatusCode,
    routing::{delete, get, post, put},
};

use crate::{
    AppState,
    budget::{
        create_budget_endpoint, get_budget_progress_endpoint, recompute_budget_endpoint,
        set_planned_endpoint,
    },
    endpoints,
    goal::{
        contribute_to_goal_endpoint, create_goal_endpoint, delete_goal_endpoint,
        get_goals_endpoint,
    },
    insights::get_insights_endpoint,
    rule::categorize_endpoint,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_summary_endpoint,
        get_transactions_endpoint, update_transaction_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            endpoints::TRANSACTIONS,
            get(get_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            put(update_transaction_endpoint).delete(delete_transaction_endpoint),
        )
        .route(endpoints::SUMMARY, get(get_summary_endpoint))
        .route(endpoints::BUDGETS, post(create_budget_endpoint))
        .route(endpoints::BUDGET, get(get_budget_progress_endpoint))
        .route(
            endpoints::BUDGET_RECOMPUTE,
            post(recompute_budget_endpoint),
        )
        .route(endpoints::BUDGET_CATEGORY, put(set_planned_endpoint))
        .route(endpoints::CATEGORIZE, get(categorize_endpoint))
        .route(endpoints::INSIGHTS, get(get_insights_endpoint))
        .route(
            endpoints::GOALS,
            get(get_goals_endpoint).post(create_goal_endpoint),
        )
        .route(endpoints::GOAL, delete(delete_goal_endpoint))
        .route(endpoints::GOAL_CONTRIBUTE, post(contribute_to_goal_endpoint))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The response for routes that do not exist.
async fn get_404_not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}
