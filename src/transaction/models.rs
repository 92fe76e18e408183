//! Core transaction domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, UserId, budget::validate_amount, category::Category};

/// Database identifier for a transaction.
pub type TransactionId = i64;

/// Whether a transaction represents money earned or money spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money flowing in, e.g. salary.
    Income,
    /// Money flowing out. Only expenses count against budgets.
    Expense,
}

impl TransactionKind {
    /// The lowercase name used in the database and the API.
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            _ => Err(Error::InvalidKind(s.to_string())),
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user that recorded the transaction.
    pub user_id: UserId,
    /// The amount of money spent or earned. Always non-negative; the
    /// direction comes from `kind`.
    pub amount: f64,
    /// What the money was spent on or earned from.
    pub category: Category,
    /// Whether the transaction is income or an expense.
    pub kind: TransactionKind,
    /// When the transaction happened. Buckets the transaction into a
    /// (month, year) budgeting period.
    pub date: Date,
    /// A text description of what the transaction was for.
    pub description: String,
}

/// A validated transaction that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub(crate) user_id: UserId,
    pub(crate) amount: f64,
    pub(crate) category: Category,
    pub(crate) kind: TransactionKind,
    pub(crate) date: Date,
    pub(crate) description: String,
}

impl NewTransaction {
    /// Create a validated transaction candidate.
    ///
    /// # Errors
    /// This function will return an [Error::InvalidAmount] if `amount` is
    /// negative or not a number.
    pub fn new(
        user_id: UserId,
        amount: f64,
        category: Category,
        kind: TransactionKind,
        date: Date,
        description: &str,
    ) -> Result<Self, Error> {
        let amount = validate_amount(amount)?;

        Ok(Self {
            user_id,
            amount,
            category,
            kind,
            date,
            description: description.to_owned(),
        })
    }
}
