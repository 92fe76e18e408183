//! Core savings-goal domain types.

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, UserId, budget::validate_amount};

/// Database identifier for a goal.
pub type GoalId = i64;

/// The lifecycle state of a savings goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    /// The goal is being saved towards.
    Active,
    /// The target amount has been reached.
    Completed,
    /// The goal was abandoned.
    Cancelled,
}

impl GoalStatus {
    /// The lowercase name used in the database and the API.
    pub fn as_str(self) -> &'static str {
        match self {
            GoalStatus::Active => "active",
            GoalStatus::Completed => "completed",
            GoalStatus::Cancelled => "cancelled",
        }
    }
}

/// A savings goal with a target amount and a running total of contributions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Goal {
    /// The ID of the goal.
    pub id: GoalId,
    /// The user that owns the goal.
    pub user_id: UserId,
    /// A short name for the goal, e.g. "Emergency fund".
    pub name: String,
    /// The amount to save. Always positive.
    pub target_amount: f64,
    /// The amount contributed so far.
    pub current_amount: f64,
    /// When the goal should be reached.
    pub deadline: Date,
    /// The lifecycle state of the goal.
    pub status: GoalStatus,
}

impl Goal {
    /// How much of the target has been saved, as a whole percentage capped
    /// at 100.
    pub fn progress_percent(&self) -> u8 {
        let percent = (self.current_amount / self.target_amount) * 100.0;

        percent.round().min(100.0) as u8
    }
}

/// A validated goal that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewGoal {
    pub(crate) user_id: UserId,
    pub(crate) name: String,
    pub(crate) target_amount: f64,
    pub(crate) deadline: Date,
}

impl NewGoal {
    /// Create a validated goal candidate.
    ///
    /// # Errors
    /// This function will return an [Error::InvalidAmount] if `target_amount`
    /// is not a positive number.
    pub fn new(
        user_id: UserId,
        name: &str,
        target_amount: f64,
        deadline: Date,
    ) -> Result<Self, Error> {
        let target_amount = validate_amount(target_amount)?;

        if target_amount == 0.0 {
            return Err(Error::InvalidAmount(target_amount));
        }

        Ok(Self {
            user_id,
            name: name.to_owned(),
            target_amount,
            deadline,
        })
    }
}

#[cfg(test)]
mod goal_model_tests {
    use time::macros::date;

    use crate::Error;

    use super::{Goal, GoalStatus, NewGoal};

    #[test]
    fn new_rejects_zero_target() {
        let result = NewGoal::new(1, "Emergency fund", 0.0, date!(2026 - 01 - 01));

        assert_eq!(result, Err(Error::InvalidAmount(0.0)));
    }

    #[test]
    fn progress_is_capped_at_one_hundred() {
        let goal = Goal {
            id: 1,
            user_id: 1,
            name: "Vacation".to_string(),
            target_amount: 1000.0,
            current_amount: 1500.0,
            deadline: date!(2026 - 01 - 01),
            status: GoalStatus::Completed,
        };

        assert_eq!(goal.progress_percent(), 100);
    }

    #[test]
    fn progress_rounds_to_whole_percent() {
        let goal = Goal {
            id: 1,
            user_id: 1,
            name: "Vacation".to_string(),
            target_amount: 3000.0,
            current_amount: 1000.0,
            deadline: date!(2026 - 01 - 01),
            status: GoalStatus::Active,
        };

        assert_eq!(goal.progress_percent(), 33);
    }
}
