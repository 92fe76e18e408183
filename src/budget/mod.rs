//! Monthly category budgets: the aggregate, the reconciliation engine, the
//! 50/30/20 template generator, and the budget API.

mod db;
mod domain;
mod endpoints;
mod progress;
mod reconcile;
mod template;

pub use db::{create_budget, create_budget_tables, get_budget, set_planned};
pub use domain::{Budget, BudgetId, CategoryAllocation, NewBudget, Period};
pub(crate) use domain::validate_amount;
pub(crate) use endpoints::{
    create_budget_endpoint, get_budget_progress_endpoint, recompute_budget_endpoint,
    set_planned_endpoint,
};
pub use progress::{BudgetProgress, CategoryProgress, ProgressStatus, ProgressSummary, budget_progress};
pub use reconcile::{apply_edit, record_expense, recompute_budget, remove_expense};
pub use template::suggest_budget;
