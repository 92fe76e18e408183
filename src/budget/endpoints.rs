//! Route handlers for creating and inspecting budgets.

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, UserId,
    budget::{
        db::{create_budget, get_budget, set_planned},
        domain::{Budget, CategoryAllocation, Period},
        progress::{BudgetProgress, budget_progress},
        reconcile::recompute_budget,
        template::suggest_budget,
    },
    category::BudgetCategory,
};

/// The JSON representation of a budget returned by the API.
#[derive(Debug, Serialize)]
pub(crate) struct BudgetView {
    month: u8,
    year: i32,
    monthly_income: f64,
    categories: BTreeMap<BudgetCategory, CategoryAllocation>,
    total_planned: f64,
    total_spent: f64,
}

impl From<Budget> for BudgetView {
    fn from(budget: Budget) -> Self {
        Self {
            month: budget.period.month_number(),
            year: budget.period.year,
            monthly_income: budget.monthly_income,
            total_planned: budget.total_planned(),
            total_spent: budget.total_spent(),
            categories: budget.categories().clone(),
        }
    }
}

/// Identifies the budget owner on requests without a body.
#[derive(Debug, Deserialize)]
pub(crate) struct OwnerQuery {
    user_id: UserId,
}

/// Form data for creating a budget.
#[derive(Debug, Deserialize)]
pub(crate) struct CreateBudgetForm {
    user_id: UserId,
    month: u8,
    year: i32,
    monthly_income: f64,
}

/// A route handler for creating a budget from the 50/30/20 template.
///
/// A zero income produces a blank budget whose planned amounts can be filled
/// in afterwards via the category endpoint.
pub(crate) async fn create_budget_endpoint(
    State(state): State<AppState>,
    Json(form): Json<CreateBudgetForm>,
) -> Result<(StatusCode, Json<BudgetView>), Error> {
    let period = Period::new(form.month, form.year)?;
    let candidate = suggest_budget(form.user_id, period, form.monthly_income)?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let budget = create_budget(candidate, &connection)?;

    Ok((StatusCode::CREATED, Json(budget.into())))
}

/// A route handler for the per-category progress report of a budget.
pub(crate) async fn get_budget_progress_endpoint(
    State(state): State<AppState>,
    Path((month, year)): Path<(u8, i32)>,
    Query(owner): Query<OwnerQuery>,
) -> Result<Json<BudgetProgress>, Error> {
    let period = Period::new(month, year)?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let budget =
        get_budget(owner.user_id, period, &connection)?.ok_or(Error::BudgetNotFound(period))?;

    Ok(Json(budget_progress(&budget)))
}

/// Form data for setting the planned amount of one category.
#[derive(Debug, Deserialize)]
pub(crate) struct SetPlannedForm {
    user_id: UserId,
    month: u8,
    year: i32,
    category: String,
    amount: f64,
}

/// A route handler for changing a category's planned amount.
pub(crate) async fn set_planned_endpoint(
    State(state): State<AppState>,
    Json(form): Json<SetPlannedForm>,
) -> Result<Json<BudgetView>, Error> {
    let period = Period::new(form.month, form.year)?;
    let category = form.category.parse::<BudgetCategory>()?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    set_planned(form.user_id, period, category, form.amount, &connection)?;

    let budget =
        get_budget(form.user_id, period, &connection)?.ok_or(Error::BudgetNotFound(period))?;

    Ok(Json(budget.into()))
}

/// A route handler for rebuilding a budget's spent amounts from the ledger.
///
/// This is the source of truth against drift: it produces the same state a
/// correct sequence of incremental updates would have.
pub(crate) async fn recompute_budget_endpoint(
    State(state): State<AppState>,
    Path((month, year)): Path<(u8, i32)>,
    Query(owner): Query<OwnerQuery>,
) -> Result<Json<BudgetView>, Error> {
    let period = Period::new(month, year)?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let budget = recompute_budget(
        owner.user_id,
        period,
        state.alert_sink.as_ref(),
        &connection,
    )?;

    Ok(Json(budget.into()))
}
