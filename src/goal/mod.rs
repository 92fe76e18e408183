//! Savings goals with a running contribution total.

mod db;
mod endpoints;
mod models;

pub use db::{add_contribution, create_goal, create_goal_table, delete_goal, get_goal, get_goals};
pub(crate) use endpoints::{
    contribute_to_goal_endpoint, create_goal_endpoint, delete_goal_endpoint, get_goals_endpoint,
};
pub use models::{Goal, GoalId, GoalStatus, NewGoal};
