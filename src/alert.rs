//! Budget threshold alerts and the pluggable sink they are delivered to.

use crate::{UserId, budget::CategoryAllocation, category::BudgetCategory};

/// The fraction of the planned amount at which a warning alert is raised.
const WARNING_THRESHOLD: f64 = 0.8;

/// A notification that a budget category has crossed a spending threshold.
#[derive(Debug, Clone, PartialEq)]
pub enum BudgetAlert {
    /// Spending has reached or passed the planned amount.
    Exceeded {
        /// The category that went over budget.
        category: BudgetCategory,
        /// The amount spent so far.
        spent: f64,
        /// The planned amount for the period.
        planned: f64,
    },
    /// Spending has reached 80% of the planned amount but is still under it.
    Warning {
        /// The category that is close to its planned amount.
        category: BudgetCategory,
        /// How much of the planned amount has been used, rounded to a whole
        /// percentage.
        utilization_percent: u8,
    },
}

/// A destination for budget alerts.
///
/// Delivery is fire-and-forget: `notify` returns nothing and implementations
/// must absorb their own failures. A failed delivery must never fail the
/// ledger write that triggered the alert.
pub trait AlertSink: Send + Sync {
    /// Deliver `alert` for the budget owned by `user_id`.
    fn notify(&self, user_id: UserId, alert: BudgetAlert);
}

/// The default alert sink, which writes alerts to the application log.
#[derive(Debug, Clone, Default)]
pub struct LogAlertSink;

impl AlertSink for LogAlertSink {
    fn notify(&self, user_id: UserId, alert: BudgetAlert) {
        match alert {
            BudgetAlert::Exceeded {
                category,
                spent,
                planned,
            } => {
                tracing::warn!(
                    "budget exceeded for user {user_id}: spent {spent:.2} of {planned:.2} on {category}"
                );
            }
            BudgetAlert::Warning {
                category,
                utilization_percent,
            } => {
                tracing::warn!(
                    "budget warning for user {user_id}: {utilization_percent}% of the {category} budget used"
                );
            }
        }
    }
}

/// Evaluate the alert thresholds for one category allocation.
///
/// Returns `None` when the planned amount is zero (nothing to measure
/// against) or when spending is below the warning threshold.
pub fn evaluate(category: BudgetCategory, allocation: &CategoryAllocation) -> Option<BudgetAlert> {
    if allocation.planned == 0.0 {
        return None;
    }

    let utilization = allocation.spent / allocation.planned;

    if utilization >= 1.0 {
        Some(BudgetAlert::Exceeded {
            category,
            spent: allocation.spent,
            planned: allocation.planned,
        })
    } else if utilization >= WARNING_THRESHOLD {
        Some(BudgetAlert::Warning {
            category,
            utilization_percent: (utilization * 100.0).round() as u8,
        })
    } else {
        None
    }
}


#[cfg(test)]
mod alert_tests {
    use crate::{budget::CategoryAllocation, category::BudgetCategory};

    use super::{BudgetAlert, evaluate};

    fn allocation(planned: f64, spent: f64) -> CategoryAllocation {
        CategoryAllocation { planned, spent }
    }

    #[test]
    fn no_alert_below_warning_threshold() {
        let result = evaluate(BudgetCategory::Food, &allocation(1000.0, 799.0));

        assert_eq!(result, None);
    }

    #[test]
    fn warning_at_eighty_percent() {
        let result = evaluate(BudgetCategory::Food, &allocation(1000.0, 800.0));

        assert_eq!(
            result,
            Some(BudgetAlert::Warning {
                category: BudgetCategory::Food,
                utilization_percent: 80,
            })
        );
    }

    #[test]
    fn exceeded_at_planned_amount() {
        let result = evaluate(BudgetCategory::Food, &allocation(1000.0, 1000.0));

        assert_eq!(
            result,
            Some(BudgetAlert::Exceeded {
                category: BudgetCategory::Food,
                spent: 1000.0,
                planned: 1000.0,
            })
        );
    }

    #[test]
    fn exceeded_over_planned_amount() {
        let result = evaluate(BudgetCategory::Bills, &allocation(500.0, 620.5));

        assert_eq!(
            result,
            Some(BudgetAlert::Exceeded {
                category: BudgetCategory::Bills,
                spent: 620.5,
                planned: 500.0,
            })
        );
    }

    #[test]
    fn zero_planned_never_alerts() {
        let result = evaluate(BudgetCategory::Food, &allocation(0.0, 9999.0));

        assert_eq!(result, None);
    }
}
