//! Derives an initial budget allocation from a declared monthly income.

use std::collections::BTreeMap;

use crate::{
    Error, UserId,
    budget::domain::{CategoryAllocation, NewBudget, Period, validate_amount},
    category::BudgetCategory,
};

/// Suggest a budget for `period` using the 50/30/20 rule.
///
/// Half of the income goes to needs (food, transport, bills, healthcare),
/// 30% to wants (entertainment, shopping, education), and 20% straight to the
/// savings category. Each planned value is rounded to the nearest whole
/// currency unit independently, so the planned total may differ from the
/// income by a few units; this is accepted rather than corrected.
///
/// The result is a candidate only; persist it with
/// [create_budget](crate::budget::create_budget). An income of zero produces
/// the blank default template.
///
/// # Errors
/// This function will return an [Error::InvalidAmount] if `monthly_income` is
/// negative or not a number.
pub fn suggest_budget(
    user_id: UserId,
    period: Period,
    monthly_income: f64,
) -> Result<NewBudget, Error> {
    let monthly_income = validate_amount(monthly_income)?;

    let needs = monthly_income * 0.50;
    let wants = monthly_income * 0.30;
    let savings_pool = monthly_income * 0.20;

    let planned_for = |category: BudgetCategory| -> f64 {
        let share = match category {
            BudgetCategory::Food => needs * 0.30,
            BudgetCategory::Transport => needs * 0.20,
            BudgetCategory::Bills => needs * 0.30,
            BudgetCategory::Healthcare => needs * 0.20,
            BudgetCategory::Entertainment => wants * 0.40,
            BudgetCategory::Shopping => wants * 0.40,
            BudgetCategory::Education => wants * 0.20,
            BudgetCategory::Savings => savings_pool,
        };

        share.round()
    };

    let categories: BTreeMap<BudgetCategory, CategoryAllocation> = BudgetCategory::ALL
        .into_iter()
        .map(|category| {
            (
                category,
                CategoryAllocation {
                    planned: planned_for(category),
                    spent: 0.0,
                },
            )
        })
        .collect();

    Ok(NewBudget {
        user_id,
        period,
        monthly_income,
        categories,
    })
}
