//! Route handlers for savings goals.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    AppState, Error, UserId,
    goal::{
        db::{add_contribution, create_goal, delete_goal, get_goals},
        models::{Goal, GoalId, GoalStatus, NewGoal},
    },
};

/// The JSON representation of a goal returned by the API.
#[derive(Debug, Serialize)]
pub(crate) struct GoalView {
    id: GoalId,
    name: String,
    target_amount: f64,
    current_amount: f64,
    deadline: Date,
    status: GoalStatus,
    progress: u8,
}

impl From<Goal> for GoalView {
    fn from(goal: Goal) -> Self {
        Self {
            id: goal.id,
            progress: goal.progress_percent(),
            name: goal.name,
            target_amount: goal.target_amount,
            current_amount: goal.current_amount,
            deadline: goal.deadline,
            status: goal.status,
        }
    }
}

/// Form data for creating a goal.
#[derive(Debug, Deserialize)]
pub(crate) struct CreateGoalForm {
    user_id: UserId,
    name: String,
    target_amount: f64,
    deadline: Date,
}

/// Identifies the goal owner on requests without a body.
#[derive(Debug, Deserialize)]
pub(crate) struct OwnerQuery {
    user_id: UserId,
}

/// Form data for contributing to a goal.
#[derive(Debug, Deserialize)]
pub(crate) struct ContributionForm {
    amount: f64,
}

/// A route handler for creating a savings goal.
pub(crate) async fn create_goal_endpoint(
    State(state): State<AppState>,
    Json(form): Json<CreateGoalForm>,
) -> Result<(StatusCode, Json<GoalView>), Error> {
    let candidate = NewGoal::new(form.user_id, &form.name, form.target_amount, form.deadline)?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let goal = create_goal(candidate, &connection)?;

    Ok((StatusCode::CREATED, Json(goal.into())))
}

/// A route handler for listing a user's goals.
pub(crate) async fn get_goals_endpoint(
    State(state): State<AppState>,
    Query(owner): Query<OwnerQuery>,
) -> Result<Json<Vec<GoalView>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let goals = get_goals(owner.user_id, &connection)?;

    Ok(Json(goals.into_iter().map(GoalView::from).collect()))
}

/// A route handler for adding a contribution to a goal.
pub(crate) async fn contribute_to_goal_endpoint(
    State(state): State<AppState>,
    Path(goal_id): Path<GoalId>,
    Json(form): Json<ContributionForm>,
) -> Result<Json<GoalView>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let goal = add_contribution(goal_id, form.amount, &connection)?;

    Ok(Json(goal.into()))
}

/// A route handler for deleting a goal.
pub(crate) async fn delete_goal_endpoint(
    State(state): State<AppState>,
    Path(goal_id): Path<GoalId>,
) -> Result<StatusCode, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    delete_goal(goal_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}
