//! The closed category enumeration shared between the ledger and budgets.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// The category of a transaction.
///
/// This is a closed set shared with API clients. Unknown category strings are
/// rejected at the API boundary with [Error::UnknownCategory] rather than
/// silently defaulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Food,
    Transport,
    Entertainment,
    Education,
    Shopping,
    Bills,
    Healthcare,
    Savings,
    /// Expenses that do not fit any other category. Not tracked by budgets.
    Other,
    /// Earnings such as salary. Not tracked by budgets.
    Income,
}

impl Category {
    /// The budget category this transaction category counts against, or `None`
    /// for the categories budgets do not track ("other" and "income").
    pub fn budget_category(self) -> Option<BudgetCategory> {
        match self {
            Category::Food => Some(BudgetCategory::Food),
            Category::Transport => Some(BudgetCategory::Transport),
            Category::Entertainment => Some(BudgetCategory::Entertainment),
            Category::Education => Some(BudgetCategory::Education),
            Category::Shopping => Some(BudgetCategory::Shopping),
            Category::Bills => Some(BudgetCategory::Bills),
            Category::Healthcare => Some(BudgetCategory::Healthcare),
            Category::Savings => Some(BudgetCategory::Savings),
            Category::Other | Category::Income => None,
        }
    }

    /// The lowercase name used in the database and the API.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Food => "food",
            Category::Transport => "transport",
            Category::Entertainment => "entertainment",
            Category::Education => "education",
            Category::Shopping => "shopping",
            Category::Bills => "bills",
            Category::Healthcare => "healthcare",
            Category::Savings => "savings",
            Category::Other => "other",
            Category::Income => "income",
        }
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "food" => Ok(Category::Food),
            "transport" => Ok(Category::Transport),
            "entertainment" => Ok(Category::Entertainment),
            "education" => Ok(Category::Education),
            "shopping" => Ok(Category::Shopping),
            "bills" => Ok(Category::Bills),
            "healthcare" => Ok(Category::Healthcare),
            "savings" => Ok(Category::Savings),
            "other" => Ok(Category::Other),
            "income" => Ok(Category::Income),
            _ => Err(Error::UnknownCategory(s.to_string())),
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A category tracked by a monthly budget.
///
/// Budgets always hold an allocation for every variant of this enum, in the
/// order listed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetCategory {
    Food,
    Transport,
    Entertainment,
    Education,
    Shopping,
    Bills,
    Healthcare,
    Savings,
}

impl BudgetCategory {
    /// Every budget category, in display order.
    pub const ALL: [BudgetCategory; 8] = [
        BudgetCategory::Food,
        BudgetCategory::Transport,
        BudgetCategory::Entertainment,
        BudgetCategory::Education,
        BudgetCategory::Shopping,
        BudgetCategory::Bills,
        BudgetCategory::Healthcare,
        BudgetCategory::Savings,
    ];

    /// The lowercase name used in the database and the API.
    pub fn as_str(self) -> &'static str {
        Category::from(self).as_str()
    }

    /// The hex color used when presenting this category.
    pub fn color(self) -> &'static str {
        match self {
            BudgetCategory::Food => "#FF6B6B",
            BudgetCategory::Transport => "#4ECDC4",
            BudgetCategory::Entertainment => "#FFD93D",
            BudgetCategory::Education => "#45B7D1",
            BudgetCategory::Shopping => "#6BCF7F",
            BudgetCategory::Bills => "#C44569",
            BudgetCategory::Healthcare => "#A78BFA",
            BudgetCategory::Savings => "#98D8AA",
        }
    }

    /// The emoji icon used when presenting this category.
    pub fn icon(self) -> &'static str {
        match self {
            BudgetCategory::Food => "🍕",
            BudgetCategory::Transport => "🚗",
            BudgetCategory::Entertainment => "🎬",
            BudgetCategory::Education => "📚",
            BudgetCategory::Shopping => "🛍️",
            BudgetCategory::Bills => "📄",
            BudgetCategory::Healthcare => "🏥",
            BudgetCategory::Savings => "💰",
        }
    }
}

impl From<BudgetCategory> for Category {
    fn from(category: BudgetCategory) -> Self {
        match category {
            BudgetCategory::Food => Category::Food,
            BudgetCategory::Transport => Category::Transport,
            BudgetCategory::Entertainment => Category::Entertainment,
            BudgetCategory::Education => Category::Education,
            BudgetCategory::Shopping => Category::Shopping,
            BudgetCategory::Bills => Category::Bills,
            BudgetCategory::Healthcare => Category::Healthcare,
            BudgetCategory::Savings => Category::Savings,
        }
    }
}

impl FromStr for BudgetCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Category::from_str(s)?.budget_category() {
            Some(category) => Ok(category),
            None => Err(Error::UnknownCategory(s.to_string())),
        }
    }
}

impl Display for BudgetCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
