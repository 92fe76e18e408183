//! Database operations for savings goals.

use rusqlite::{Connection, Row};

use crate::{
    Error, UserId,
    budget::validate_amount,
    goal::models::{Goal, GoalId, GoalStatus, NewGoal},
};

/// Create a goal and return it with its generated ID.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn create_goal(new_goal: NewGoal, connection: &Connection) -> Result<Goal, Error> {
    let goal = connection
        .prepare(
            "INSERT INTO goal (user_id, name, target_amount, current_amount, deadline, status)
             VALUES (?1, ?2, ?3, 0, ?4, 'active')
             RETURNING id, user_id, name, target_amount, current_amount, deadline, status",
        )?
        .query_row(
            (
                new_goal.user_id,
                new_goal.name,
                new_goal.target_amount,
                new_goal.deadline,
            ),
            map_goal_row,
        )?;

    Ok(goal)
}

/// Retrieve a single goal by ID.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `goal_id` does not refer to a valid goal,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_goal(goal_id: GoalId, connection: &Connection) -> Result<Goal, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, target_amount, current_amount, deadline, status
             FROM goal WHERE id = :id",
        )?
        .query_row(&[(":id", &goal_id)], map_goal_row)
        .map_err(|error| error.into())
}

/// Retrieve all of a user's goals, most recent first.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn get_goals(user_id: UserId, connection: &Connection) -> Result<Vec<Goal>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, target_amount, current_amount, deadline, status
             FROM goal WHERE user_id = :user_id ORDER BY id DESC",
        )?
        .query_map(&[(":user_id", &user_id)], map_goal_row)?
        .map(|maybe_goal| maybe_goal.map_err(|error| error.into()))
        .collect()
}

/// Add a contribution to a goal's running total.
///
/// An active goal whose total reaches the target flips to completed. Returns
/// the updated goal.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidAmount] if `amount` is negative or not a number,
/// - [Error::UpdateMissingGoal] if `goal_id` does not refer to a valid goal,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn add_contribution(
    goal_id: GoalId,
    amount: f64,
    connection: &Connection,
) -> Result<Goal, Error> {
    let amount = validate_amount(amount)?;

    let rows_affected = connection.execute(
        "UPDATE goal SET current_amount = current_amount + ?1 WHERE id = ?2",
        (amount, goal_id),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingGoal);
    }

    connection.execute(
        "UPDATE goal SET status = 'completed'
         WHERE id = ?1 AND status = 'active' AND current_amount >= target_amount",
        [goal_id],
    )?;

    get_goal(goal_id, connection)
}

/// Delete a goal by ID.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingGoal] if `goal_id` does not refer to a valid goal,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_goal(goal_id: GoalId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM goal WHERE id = ?1", [goal_id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingGoal);
    }

    Ok(())
}

/// Initialize the goal table.
pub fn create_goal_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS goal (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                target_amount REAL NOT NULL,
                current_amount REAL NOT NULL DEFAULT 0,
                deadline TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'active'
                )",
        (),
    )?;

    // Ensure the sequence starts at 1
    connection.execute(
        "INSERT OR IGNORE INTO sqlite_sequence (name, seq) VALUES ('goal', 0)",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_goal_owner ON goal(user_id);",
        (),
    )?;

    Ok(())
}

fn map_goal_row(row: &Row) -> Result<Goal, rusqlite::Error> {
    let raw_status: String = row.get(6)?;
    let status = match raw_status.as_str() {
        "active" => GoalStatus::Active,
        "completed" => GoalStatus::Completed,
        "cancelled" => GoalStatus::Cancelled,
        other => {
            return Err(rusqlite::Error::FromSqlConversionFailure(
                6,
                rusqlite::types::Type::Text,
                format!("\"{other}\" is not a valid goal status").into(),
            ));
        }
    };

    Ok(Goal {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        target_amount: row.get(3)?,
        current_amount: row.get(4)?,
        deadline: row.get(5)?,
        status,
    })
}
