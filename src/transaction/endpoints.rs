//! Route handlers for the transaction ledger.
//!
//! Every write handler drives the incremental path of the budget
//! reconciliation engine after the ledger mutation succeeds, so budgets stay
//! in step with the ledger without the client doing anything.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error, UserId,
    budget::{apply_edit, record_expense, remove_expense},
    category::Category,
    transaction::{
        db::{
            TransactionFilter, create_transaction, delete_transaction, get_transaction,
            get_transactions, update_transaction,
        },
        models::{NewTransaction, Transaction, TransactionId, TransactionKind},
    },
};

/// Form data for creating or editing a transaction.
///
/// Category and kind arrive as strings and are parsed against the closed
/// enumerations here, at the boundary.
#[derive(Debug, Deserialize)]
pub(crate) struct TransactionForm {
    user_id: UserId,
    amount: f64,
    category: String,
    kind: String,
    date: Date,
    #[serde(default)]
    description: String,
}

impl TransactionForm {
    fn into_new_transaction(self) -> Result<NewTransaction, Error> {
        let category = self.category.parse::<Category>()?;
        let kind = self.kind.parse::<TransactionKind>()?;

        NewTransaction::new(
            self.user_id,
            self.amount,
            category,
            kind,
            self.date,
            &self.description,
        )
    }
}

/// A route handler for recording a new transaction.
pub(crate) async fn create_transaction_endpoint(
    State(state): State<AppState>,
    Json(form): Json<TransactionForm>,
) -> Result<(StatusCode, Json<Transaction>), Error> {
    let new_transaction = form.into_new_transaction()?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let transaction = create_transaction(new_transaction, &connection)?;

    record_expense(&transaction, state.alert_sink.as_ref(), &connection)?;

    Ok((StatusCode::CREATED, Json(transaction)))
}

/// A route handler for editing a transaction.
///
/// The budget effect of an edit is the removal of the old values followed by
/// the addition of the new ones, covering amount, category, kind, and date
/// changes in one motion.
pub(crate) async fn update_transaction_endpoint(
    State(state): State<AppState>,
    Path(transaction_id): Path<TransactionId>,
    Json(form): Json<TransactionForm>,
) -> Result<Json<Transaction>, Error> {
    let update = form.into_new_transaction()?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let old = get_transaction(transaction_id, &connection).map_err(|error| match error {
        Error::NotFound => Error::UpdateMissingTransaction,
        error => error,
    })?;

    let new = update_transaction(transaction_id, update, &connection)?;

    apply_edit(&old, &new, state.alert_sink.as_ref(), &connection)?;

    Ok(Json(new))
}

/// A route handler for deleting a transaction.
pub(crate) async fn delete_transaction_endpoint(
    State(state): State<AppState>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<StatusCode, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let old = get_transaction(transaction_id, &connection).map_err(|error| match error {
        Error::NotFound => Error::DeleteMissingTransaction,
        error => error,
    })?;

    delete_transaction(transaction_id, &connection)?;

    remove_expense(&old, state.alert_sink.as_ref(), &connection)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Query parameters for listing transactions.
#[derive(Debug, Deserialize)]
pub(crate) struct ListTransactionsQuery {
    user_id: UserId,
    category: Option<String>,
    kind: Option<String>,
    limit: Option<u32>,
    #[serde(default)]
    offset: u32,
}

/// A route handler for listing a user's transactions, newest first.
pub(crate) async fn get_transactions_endpoint(
    State(state): State<AppState>,
    Query(query): Query<ListTransactionsQuery>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let category = query
        .category
        .map(|raw| raw.parse::<Category>())
        .transpose()?;
    let kind = query.kind.map(|raw| raw.parse::<TransactionKind>()).transpose()?;

    let filter = TransactionFilter {
        category,
        kind,
        limit: query.limit,
        offset: query.offset,
    };

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = get_transactions(query.user_id, &filter, &connection)?;

    Ok(Json(transactions))
}
