//! Pocketplan is a personal-finance tracking service.
//!
//! Users log income and expense transactions, declare monthly category
//! budgets, and track savings goals. The budget reconciliation engine keeps
//! each budget's per-category spent amounts in sync with the transaction
//! ledger and raises alerts when a category approaches or exceeds its planned
//! amount.
//!
//! This library provides the domain model, the SQLite storage layer, and a
//! JSON REST API.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod alert;
mod app_state;
mod budget;
mod category;
mod db;
mod endpoints;
mod goal;
mod insights;
mod routing;
mod rule;
mod transaction;

pub use alert::{AlertSink, BudgetAlert, LogAlertSink};
pub use app_state::AppState;
pub use budget::Period;
pub use category::{BudgetCategory, Category};
pub use db::initialize as initialize_db;
pub use routing::build_router;

/// The identifier of the user who owns a record.
///
/// Authentication is out of scope for this service, so the owner travels as an
/// explicit field on API requests rather than in a session.
pub type UserId = i64;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A budget already exists for the requested (user, month, year).
    ///
    /// Budgets are unique per user per period. The existing budget is left
    /// unchanged; the client should edit it instead of creating a new one.
    #[error("a budget already exists for {0}")]
    DuplicatePeriod(Period),

    /// A category string outside the closed category set was used.
    ///
    /// Category names are rejected at the API boundary so that unknown values
    /// never reach the business logic.
    #[error("\"{0}\" is not a valid category")]
    UnknownCategory(String),

    /// A negative or non-finite amount was used where money is expected.
    #[error("{0} is not a valid amount, amounts must be non-negative numbers")]
    InvalidAmount(f64),

    /// An operation that requires an existing budget was called for a period
    /// that has none.
    ///
    /// Note that the incremental reconciliation path treats a missing budget
    /// as a defined no-op instead of returning this error.
    #[error("no budget exists for {0}")]
    BudgetNotFound(Period),

    /// A month number outside 1-12 was used to identify a period.
    #[error("{0} is not a valid month number, expected 1-12")]
    InvalidMonth(u8),

    /// A transaction kind string outside the closed set was used.
    #[error("\"{0}\" is not a valid transaction kind, expected income or expense")]
    InvalidKind(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to update a transaction that does not exist
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to update a goal that does not exist
    #[error("tried to update a goal that is not in the database")]
    UpdateMissingGoal,

    /// Tried to delete a goal that does not exist
    #[error("tried to delete a goal that is not in the database")]
    DeleteMissingGoal,

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code = match self {
            Error::DuplicatePeriod(_) => StatusCode::CONFLICT,
            Error::UnknownCategory(_)
            | Error::InvalidAmount(_)
            | Error::InvalidMonth(_)
            | Error::InvalidKind(_) => StatusCode::BAD_REQUEST,
            Error::BudgetNotFound(_)
            | Error::NotFound
            | Error::UpdateMissingTransaction
            | Error::DeleteMissingTransaction
            | Error::UpdateMissingGoal
            | Error::DeleteMissingGoal => StatusCode::NOT_FOUND,
            // Any errors that are not handled above are not intended to be shown to the client.
            ref error => {
                tracing::error!("An unexpected error occurred: {}", error);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": "an internal error occurred"})),
                )
                    .into_response();
            }
        };

        (status_code, Json(json!({"error": self.to_string()}))).into_response()
    }
}
