//! Core budget domain types.

use std::{collections::BTreeMap, fmt::Display};

use serde::{Deserialize, Serialize};
use time::{Date, Month};

use crate::{Error, UserId, category::BudgetCategory};

/// Database identifier for a budget.
pub type BudgetId = i64;

/// A (month, year) pair identifying one budgeting cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Period {
    /// The calendar month of the budgeting cycle.
    pub month: Month,
    /// The calendar year of the budgeting cycle.
    pub year: i32,
}

impl Period {
    /// Create a period from a month number.
    ///
    /// # Errors
    /// This function will return an [Error::InvalidMonth] if `month` is
    /// outside 1-12.
    pub fn new(month: u8, year: i32) -> Result<Self, Error> {
        let month = Month::try_from(month).map_err(|_| Error::InvalidMonth(month))?;

        Ok(Self { month, year })
    }

    /// The period a calendar date falls in.
    pub fn from_date(date: Date) -> Self {
        Self {
            month: date.month(),
            year: date.year(),
        }
    }

    /// The first calendar day of the period.
    pub fn first_day(&self) -> Date {
        Date::from_calendar_date(self.year, self.month, 1)
            .expect("the first of the month is always a valid date")
    }

    /// The last calendar day of the period.
    pub fn last_day(&self) -> Date {
        Date::from_calendar_date(self.year, self.month, last_day_of_month(self.year, self.month))
            .expect("the last day of the month is always a valid date")
    }

    /// The month as a number from 1 to 12.
    pub fn month_number(&self) -> u8 {
        self.month as u8
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.month_number(), self.year)
    }
}

fn last_day_of_month(year: i32, month: Month) -> u8 {
    match month {
        Month::January
        | Month::March
        | Month::May
        | Month::July
        | Month::August
        | Month::October
        | Month::December => 31,
        Month::April | Month::June | Month::September | Month::November => 30,
        Month::February => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

/// The planned and spent amounts for one budget category in one period.
///
/// `spent` is derived from the ledger by the reconciliation engine and is
/// never set directly by users.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CategoryAllocation {
    /// The non-negative target amount for the period.
    pub planned: f64,
    /// The summed expense amounts recorded against the category.
    pub spent: f64,
}

/// One user's budget for one period.
///
/// The allocation map always contains an entry for every [BudgetCategory].
/// Totals are computed from the map on demand rather than stored, so they can
/// never drift from the per-category values.
#[derive(Debug, Clone, PartialEq)]
pub struct Budget {
    /// The ID of the budget.
    pub id: BudgetId,
    /// The user that owns the budget.
    pub user_id: UserId,
    /// The period the budget covers.
    pub period: Period,
    /// The declared income for the period, used only to template planned
    /// allocations.
    pub monthly_income: f64,
    categories: BTreeMap<BudgetCategory, CategoryAllocation>,
}

impl Budget {
    /// Assemble a budget from stored parts.
    ///
    /// Categories missing from `categories` get a zero allocation so that the
    /// map always covers the full fixed set.
    pub(crate) fn from_parts(
        id: BudgetId,
        user_id: UserId,
        period: Period,
        monthly_income: f64,
        mut categories: BTreeMap<BudgetCategory, CategoryAllocation>,
    ) -> Self {
        for category in BudgetCategory::ALL {
            categories.entry(category).or_default();
        }

        Self {
            id,
            user_id,
            period,
            monthly_income,
            categories,
        }
    }

    /// The allocation for `category`.
    pub fn allocation(&self, category: BudgetCategory) -> CategoryAllocation {
        self.categories
            .get(&category)
            .copied()
            .unwrap_or_default()
    }

    /// All allocations, keyed by category.
    pub fn categories(&self) -> &BTreeMap<BudgetCategory, CategoryAllocation> {
        &self.categories
    }

    /// The sum of planned amounts across all categories.
    pub fn total_planned(&self) -> f64 {
        self.categories
            .values()
            .map(|allocation| allocation.planned)
            .sum()
    }

    /// The sum of spent amounts across all categories.
    pub fn total_spent(&self) -> f64 {
        self.categories
            .values()
            .map(|allocation| allocation.spent)
            .sum()
    }
}

/// A budget candidate that has not been persisted yet.
///
/// Produced by the template generator or [NewBudget::blank], and turned into
/// a stored [Budget] by [create_budget](crate::budget::create_budget).
#[derive(Debug, Clone, PartialEq)]
pub struct NewBudget {
    /// The user that will own the budget.
    pub user_id: UserId,
    /// The period the budget covers.
    pub period: Period,
    /// The declared income for the period.
    pub monthly_income: f64,
    /// The initial allocation for every budget category.
    pub categories: BTreeMap<BudgetCategory, CategoryAllocation>,
}

impl NewBudget {
    /// A budget candidate with every planned amount set to zero.
    pub fn blank(user_id: UserId, period: Period, monthly_income: f64) -> Self {
        Self {
            user_id,
            period,
            monthly_income,
            categories: BudgetCategory::ALL
                .into_iter()
                .map(|category| (category, CategoryAllocation::default()))
                .collect(),
        }
    }
}

/// Check that `amount` is a usable amount of money.
///
/// # Errors
/// This function will return an [Error::InvalidAmount] if `amount` is
/// negative, NaN, or infinite.
pub(crate) fn validate_amount(amount: f64) -> Result<f64, Error> {
    if amount.is_finite() && amount >= 0.0 {
        Ok(amount)
    } else {
        Err(Error::InvalidAmount(amount))
    }
}

#[cfg(test)]
mod period_tests {
    use time::macros::date;

    use crate::Error;

    use super::Period;

    #[test]
    fn new_rejects_invalid_month_number() {
        assert_eq!(Period::new(0, 2025), Err(Error::InvalidMonth(0)));
        assert_eq!(Period::new(13, 2025), Err(Error::InvalidMonth(13)));
    }

    #[test]
    fn from_date_buckets_into_month_and_year() {
        let period = Period::from_date(date!(2025 - 02 - 14));

        assert_eq!(period, Period::new(2, 2025).unwrap());
    }

    #[test]
    fn day_range_covers_whole_month() {
        let period = Period::new(2, 2024).unwrap();

        assert_eq!(period.first_day(), date!(2024 - 02 - 01));
        // 2024 is a leap year.
        assert_eq!(period.last_day(), date!(2024 - 02 - 29));
    }
}
