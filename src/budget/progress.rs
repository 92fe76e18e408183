//! Budget progress reporting for the API.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
    budget::domain::{Budget, CategoryAllocation},
    category::BudgetCategory,
};

/// How far through its planned amount a category is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStatus {
    /// Spending has reached or passed the planned amount.
    Exceeded,
    /// Spending has reached 80% of the planned amount.
    Warning,
    /// Spending is comfortably under the planned amount.
    Normal,
}

/// The progress of one category in a budget period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryProgress {
    /// The planned amount for the period.
    pub planned: f64,
    /// The amount spent so far.
    pub spent: f64,
    /// How much of the planned amount is left. Negative when over budget.
    pub remaining: f64,
    /// How much of the planned amount has been used, rounded to a whole
    /// percentage. Zero when nothing is planned.
    pub utilization: i64,
    /// Whether the category is over, near, or under its planned amount.
    pub status: ProgressStatus,
    /// The category's presentation color.
    pub color: &'static str,
    /// The category's presentation icon.
    pub icon: &'static str,
}

/// Whole-budget totals accompanying the per-category progress.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSummary {
    /// The sum of planned amounts across all categories.
    pub total_planned: f64,
    /// The sum of spent amounts across all categories.
    pub total_spent: f64,
    /// Planned minus spent.
    pub total_remaining: f64,
    /// The declared income for the period.
    pub monthly_income: f64,
    /// Income minus total spent.
    pub savings: f64,
}

/// A full progress report for one budget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetProgress {
    /// Progress per category.
    pub progress: BTreeMap<BudgetCategory, CategoryProgress>,
    /// Whole-budget totals.
    pub summary: ProgressSummary,
}

/// Build the progress report for `budget`.
pub fn budget_progress(budget: &Budget) -> BudgetProgress {
    let progress = budget
        .categories()
        .iter()
        .map(|(category, allocation)| (*category, category_progress(*category, allocation)))
        .collect();

    let total_planned = budget.total_planned();
    let total_spent = budget.total_spent();

    BudgetProgress {
        progress,
        summary: ProgressSummary {
            total_planned,
            total_spent,
            total_remaining: total_planned - total_spent,
            monthly_income: budget.monthly_income,
            savings: budget.monthly_income - total_spent,
        },
    }
}

fn category_progress(
    category: BudgetCategory,
    allocation: &CategoryAllocation,
) -> CategoryProgress {
    let utilization = if allocation.planned > 0.0 {
        (allocation.spent / allocation.planned) * 100.0
    } else {
        0.0
    };

    let status = if allocation.planned > 0.0 && utilization >= 100.0 {
        ProgressStatus::Exceeded
    } else if allocation.planned > 0.0 && utilization >= 80.0 {
        ProgressStatus::Warning
    } else {
        ProgressStatus::Normal
    };

    CategoryProgress {
        planned: allocation.planned,
        spent: allocation.spent,
        remaining: allocation.planned - allocation.spent,
        utilization: utilization.round() as i64,
        status,
        color: category.color(),
        icon: category.icon(),
    }
}

#[cfg(test)]
mod progress_tests {
    use std::collections::BTreeMap;

    use crate::{
        budget::domain::{Budget, CategoryAllocation, Period},
        category::BudgetCategory,
    };

    use super::{ProgressStatus, budget_progress};

    fn budget_with(allocations: &[(BudgetCategory, f64, f64)]) -> Budget {
        let categories: BTreeMap<_, _> = allocations
            .iter()
            .map(|&(category, planned, spent)| {
                (category, CategoryAllocation { planned, spent })
            })
            .collect();

        Budget::from_parts(1, 1, Period::new(6, 2025).unwrap(), 4000.0, categories)
    }

    #[test]
    fn statuses_follow_utilization_thresholds() {
        let budget = budget_with(&[
            (BudgetCategory::Food, 1000.0, 500.0),
            (BudgetCategory::Bills, 1000.0, 850.0),
            (BudgetCategory::Shopping, 1000.0, 1100.0),
        ]);

        let report = budget_progress(&budget);

        assert_eq!(
            report.progress[&BudgetCategory::Food].status,
            ProgressStatus::Normal
        );
        assert_eq!(
            report.progress[&BudgetCategory::Bills].status,
            ProgressStatus::Warning
        );
        assert_eq!(
            report.progress[&BudgetCategory::Shopping].status,
            ProgressStatus::Exceeded
        );
        assert_eq!(report.progress[&BudgetCategory::Shopping].remaining, -100.0);
    }

    #[test]
    fn zero_planned_category_reads_as_normal() {
        let budget = budget_with(&[(BudgetCategory::Food, 0.0, 250.0)]);

        let report = budget_progress(&budget);

        let food = &report.progress[&BudgetCategory::Food];
        assert_eq!(food.status, ProgressStatus::Normal);
        assert_eq!(food.utilization, 0);
    }

    #[test]
    fn summary_totals_match_the_aggregate() {
        let budget = budget_with(&[
            (BudgetCategory::Food, 300.0, 120.0),
            (BudgetCategory::Transport, 200.0, 90.0),
        ]);

        let report = budget_progress(&budget);

        assert_eq!(report.summary.total_planned, 500.0);
        assert_eq!(report.summary.total_spent, 210.0);
        assert_eq!(report.summary.total_remaining, 290.0);
        assert_eq!(report.summary.savings, 4000.0 - 210.0);
        // Every category appears in the report, including untouched ones.
        assert_eq!(report.progress.len(), BudgetCategory::ALL.len());
    }
}
