//! The budget reconciliation engine.
//!
//! Keeps each budget's per-category spent amounts in sync with the
//! transaction ledger. Two paths exist: the incremental path applies the
//! delta of a single ledger write, and the full recompute rebuilds every
//! spent amount from a ledger scan. The recompute is the source of truth and
//! corrects any drift left by missed or duplicated incremental calls.

use rusqlite::Connection;

use crate::{
    Error, UserId,
    alert::{self, AlertSink},
    budget::{
        db::{add_spent, get_allocation, get_budget, replace_spent},
        domain::{Budget, Period},
    },
    category::BudgetCategory,
    transaction::{Transaction, TransactionKind, expense_totals_by_category},
};

/// Apply a newly recorded transaction to its period's budget.
///
/// Non-expense transactions and categories budgets do not track are ignored.
/// If the user has no budget for the transaction's period the spending is
/// simply untracked, which is a defined no-op rather than an error.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn record_expense(
    transaction: &Transaction,
    sink: &dyn AlertSink,
    connection: &Connection,
) -> Result<(), Error> {
    apply_spent_delta(transaction, transaction.amount, sink, connection)
}

/// Reverse a deleted transaction's effect on its period's budget.
///
/// The spent amount is clamped at zero so that deleting a transaction that
/// was never applied incrementally (or reversing one twice) can never drive
/// the aggregate negative.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn remove_expense(
    transaction: &Transaction,
    sink: &dyn AlertSink,
    connection: &Connection,
) -> Result<(), Error> {
    apply_spent_delta(transaction, -transaction.amount, sink, connection)
}

/// Apply an edited transaction to the affected budgets.
///
/// An edit is treated as the deletion of the old values followed by the
/// addition of the new values, so amount, category, kind, and period changes
/// all fall out of the same two primitives. When neither the old nor the new
/// record is an expense this is a no-op.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn apply_edit(
    old: &Transaction,
    new: &Transaction,
    sink: &dyn AlertSink,
    connection: &Connection,
) -> Result<(), Error> {
    remove_expense(old, sink, connection)?;
    record_expense(new, sink, connection)
}

/// Rebuild every spent amount of the budget for `(user_id, period)` from the
/// ledger.
///
/// All categories are reset to zero and rewritten from the grouped expense
/// sums in one SQL transaction, so the budget is rewritten as a whole or not
/// at all. Running this twice without intervening ledger changes yields the
/// same budget state. Alerts are evaluated for every category afterwards.
///
/// # Errors
/// This function will return a:
/// - [Error::BudgetNotFound] if no budget exists for `(user_id, period)`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn recompute_budget(
    user_id: UserId,
    period: Period,
    sink: &dyn AlertSink,
    connection: &Connection,
) -> Result<Budget, Error> {
    let totals = expense_totals_by_category(user_id, period, connection)?;

    let sums: Vec<(BudgetCategory, f64)> = totals
        .into_iter()
        .filter_map(|(category, total)| {
            category
                .budget_category()
                .map(|budget_category| (budget_category, total))
        })
        .collect();

    replace_spent(user_id, period, &sums, connection)?;

    let budget = get_budget(user_id, period, connection)?.ok_or(Error::BudgetNotFound(period))?;

    for (category, allocation) in budget.categories() {
        if let Some(budget_alert) = alert::evaluate(*category, allocation) {
            sink.notify(user_id, budget_alert);
        }
    }

    Ok(budget)
}

/// Shift one category's spent amount and evaluate alerts for it.
fn apply_spent_delta(
    transaction: &Transaction,
    delta: f64,
    sink: &dyn AlertSink,
    connection: &Connection,
) -> Result<(), Error> {
    if transaction.kind != TransactionKind::Expense {
        return Ok(());
    }

    let Some(category) = transaction.category.budget_category() else {
        return Ok(());
    };

    let period = Period::from_date(transaction.date);

    let changed = add_spent(transaction.user_id, period, category, delta, connection)?;

    if !changed {
        tracing::debug!(
            "no budget declared for user {} in {period}, leaving {category} spending untracked",
            transaction.user_id
        );
        return Ok(());
    }

    if let Some(allocation) = get_allocation(transaction.user_id, period, category, connection)? {
        if let Some(budget_alert) = alert::evaluate(category, &allocation) {
            sink.notify(transaction.user_id, budget_alert);
        }
    }

    Ok(())
}

#[cfg(test)]
mod reconcile_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        alert::{BudgetAlert, LogAlertSink, test_sink::CollectingAlertSink},
        budget::{
            db::{create_budget, get_budget, set_planned},
            domain::{NewBudget, Period},
        },
        category::{BudgetCategory, Category},
        db::initialize,
        transaction::{
            NewTransaction, Transaction, TransactionKind, create_transaction, delete_transaction,
            update_transaction,
        },
    };

    use super::{apply_edit, record_expense, recompute_budget, remove_expense};

    const USER: i64 = 1;

    fn get_test_db_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");
        connection
    }

    fn test_period() -> Period {
        Period::new(6, 2025).unwrap()
    }

    fn setup_budget(connection: &Connection) {
        create_budget(NewBudget::blank(USER, test_period(), 4000.0), connection)
            .expect("Could not create budget");
    }

    fn insert_expense(amount: f64, category: Category, connection: &Connection) -> Transaction {
        let candidate = NewTransaction::new(
            USER,
            amount,
            category,
            TransactionKind::Expense,
            date!(2025 - 06 - 15),
            "",
        )
        .expect("Could not build transaction");

        create_transaction(candidate, connection).expect("Could not create transaction")
    }

    fn spent(category: BudgetCategory, connection: &Connection) -> f64 {
        get_budget(USER, test_period(), connection)
            .expect("Could not get budget")
            .expect("Budget should exist")
            .allocation(category)
            .spent
    }

    #[test]
    fn record_expense_adds_to_spent() {
        let connection = get_test_db_connection();
        setup_budget(&connection);
        let transaction = insert_expense(42.5, Category::Food, &connection);

        record_expense(&transaction, &LogAlertSink, &connection)
            .expect("Could not record expense");

        assert_eq!(spent(BudgetCategory::Food, &connection), 42.5);
    }

    #[test]
    fn record_expense_without_budget_is_a_no_op() {
        let connection = get_test_db_connection();
        let transaction = insert_expense(42.5, Category::Food, &connection);

        let result = record_expense(&transaction, &LogAlertSink, &connection);

        assert_eq!(result, Ok(()));
    }

    #[test]
    fn income_is_never_counted_against_a_budget() {
        let connection = get_test_db_connection();
        setup_budget(&connection);
        let salary = create_transaction(
            NewTransaction::new(
                USER,
                3000.0,
                Category::Income,
                TransactionKind::Income,
                date!(2025 - 06 - 01),
                "salary",
            )
            .unwrap(),
            &connection,
        )
        .expect("Could not create transaction");

        record_expense(&salary, &LogAlertSink, &connection).expect("Could not record income");

        let budget = get_budget(USER, test_period(), &connection)
            .unwrap()
            .unwrap();
        assert_eq!(budget.total_spent(), 0.0);
    }

    #[test]
    fn other_category_spending_is_untracked() {
        let connection = get_test_db_connection();
        setup_budget(&connection);
        let transaction = insert_expense(10.0, Category::Other, &connection);

        record_expense(&transaction, &LogAlertSink, &connection)
            .expect("Could not record expense");

        let budget = get_budget(USER, test_period(), &connection)
            .unwrap()
            .unwrap();
        assert_eq!(budget.total_spent(), 0.0);
    }

    #[test]
    fn remove_expense_never_goes_negative() {
        let connection = get_test_db_connection();
        setup_budget(&connection);
        // This transaction was never applied through the incremental path.
        let transaction = insert_expense(100.0, Category::Shopping, &connection);

        remove_expense(&transaction, &LogAlertSink, &connection)
            .expect("Could not remove expense");
        remove_expense(&transaction, &LogAlertSink, &connection)
            .expect("Could not remove expense");

        assert_eq!(spent(BudgetCategory::Shopping, &connection), 0.0);
    }

    #[test]
    fn edit_moves_spending_between_categories() {
        let connection = get_test_db_connection();
        setup_budget(&connection);
        let old = insert_expense(60.0, Category::Food, &connection);
        record_expense(&old, &LogAlertSink, &connection).expect("Could not record expense");

        let update = NewTransaction::new(
            USER,
            45.0,
            Category::Entertainment,
            TransactionKind::Expense,
            date!(2025 - 06 - 20),
            "cinema, not groceries",
        )
        .unwrap();
        let new = update_transaction(old.id, update, &connection)
            .expect("Could not update transaction");

        apply_edit(&old, &new, &LogAlertSink, &connection).expect("Could not apply edit");

        assert_eq!(spent(BudgetCategory::Food, &connection), 0.0);
        assert_eq!(spent(BudgetCategory::Entertainment, &connection), 45.0);
    }

    #[test]
    fn edit_from_expense_to_income_reverses_spending() {
        let connection = get_test_db_connection();
        setup_budget(&connection);
        let old = insert_expense(60.0, Category::Food, &connection);
        record_expense(&old, &LogAlertSink, &connection).expect("Could not record expense");

        let mut new = old.clone();
        new.category = Category::Income;
        new.kind = TransactionKind::Income;

        apply_edit(&old, &new, &LogAlertSink, &connection).expect("Could not apply edit");

        assert_eq!(spent(BudgetCategory::Food, &connection), 0.0);
    }

    #[test]
    fn recompute_without_budget_returns_not_found() {
        let connection = get_test_db_connection();

        let result = recompute_budget(USER, test_period(), &LogAlertSink, &connection);

        assert_eq!(result, Err(Error::BudgetNotFound(test_period())));
    }

    #[test]
    fn recompute_matches_incremental_updates() {
        let connection = get_test_db_connection();
        setup_budget(&connection);

        // Apply a sequence of adds, an edit, and a delete incrementally.
        let first = insert_expense(30.0, Category::Food, &connection);
        record_expense(&first, &LogAlertSink, &connection).unwrap();

        let second = insert_expense(50.0, Category::Bills, &connection);
        record_expense(&second, &LogAlertSink, &connection).unwrap();

        let third = insert_expense(20.0, Category::Food, &connection);
        record_expense(&third, &LogAlertSink, &connection).unwrap();

        let edit = NewTransaction::new(
            USER,
            35.0,
            Category::Food,
            TransactionKind::Expense,
            date!(2025 - 06 - 16),
            "",
        )
        .unwrap();
        let edited = update_transaction(first.id, edit, &connection).unwrap();
        apply_edit(&first, &edited, &LogAlertSink, &connection).unwrap();

        delete_transaction(third.id, &connection).unwrap();
        remove_expense(&third, &LogAlertSink, &connection).unwrap();

        let incremental = get_budget(USER, test_period(), &connection)
            .unwrap()
            .unwrap();

        // A full recompute from the ledger must agree with the incremental
        // bookkeeping.
        let recomputed =
            recompute_budget(USER, test_period(), &LogAlertSink, &connection).unwrap();

        assert_eq!(recomputed.categories(), incremental.categories());
        assert_eq!(spent(BudgetCategory::Food, &connection), 35.0);
        assert_eq!(spent(BudgetCategory::Bills, &connection), 50.0);
    }

    #[test]
    fn recompute_corrects_drift() {
        let connection = get_test_db_connection();
        setup_budget(&connection);
        let transaction = insert_expense(25.0, Category::Transport, &connection);

        // Simulate a duplicated incremental call.
        record_expense(&transaction, &LogAlertSink, &connection).unwrap();
        record_expense(&transaction, &LogAlertSink, &connection).unwrap();
        assert_eq!(spent(BudgetCategory::Transport, &connection), 50.0);

        recompute_budget(USER, test_period(), &LogAlertSink, &connection)
            .expect("Could not recompute budget");

        assert_eq!(spent(BudgetCategory::Transport, &connection), 25.0);
    }

    #[test]
    fn recompute_is_idempotent() {
        let connection = get_test_db_connection();
        setup_budget(&connection);
        let transaction = insert_expense(25.0, Category::Transport, &connection);
        record_expense(&transaction, &LogAlertSink, &connection).unwrap();

        let first = recompute_budget(USER, test_period(), &LogAlertSink, &connection)
            .expect("Could not recompute budget");
        let second = recompute_budget(USER, test_period(), &LogAlertSink, &connection)
            .expect("Could not recompute budget");

        assert_eq!(first, second);
    }

    #[test]
    fn crossing_the_warning_threshold_notifies_the_sink() {
        let connection = get_test_db_connection();
        setup_budget(&connection);
        set_planned(USER, test_period(), BudgetCategory::Food, 1000.0, &connection)
            .expect("Could not set planned amount");
        let sink = CollectingAlertSink::default();

        let below = insert_expense(799.0, Category::Food, &connection);
        record_expense(&below, &sink, &connection).unwrap();
        assert!(sink.alerts.lock().unwrap().is_empty());

        let crossing = insert_expense(1.0, Category::Food, &connection);
        record_expense(&crossing, &sink, &connection).unwrap();

        let alerts = sink.alerts.lock().unwrap();
        assert_eq!(
            *alerts,
            vec![(
                USER,
                BudgetAlert::Warning {
                    category: BudgetCategory::Food,
                    utilization_percent: 80,
                }
            )]
        );
    }

    #[test]
    fn exceeding_the_budget_notifies_the_sink() {
        let connection = get_test_db_connection();
        setup_budget(&connection);
        set_planned(USER, test_period(), BudgetCategory::Bills, 500.0, &connection)
            .expect("Could not set planned amount");
        let sink = CollectingAlertSink::default();

        let transaction = insert_expense(500.0, Category::Bills, &connection);
        record_expense(&transaction, &sink, &connection).unwrap();

        let alerts = sink.alerts.lock().unwrap();
        assert_eq!(
            *alerts,
            vec![(
                USER,
                BudgetAlert::Exceeded {
                    category: BudgetCategory::Bills,
                    spent: 500.0,
                    planned: 500.0,
                }
            )]
        );
    }

    #[test]
    fn zero_planned_never_alerts() {
        let connection = get_test_db_connection();
        setup_budget(&connection);
        let sink = CollectingAlertSink::default();

        let transaction = insert_expense(9999.0, Category::Healthcare, &connection);
        record_expense(&transaction, &sink, &connection).unwrap();

        assert!(sink.alerts.lock().unwrap().is_empty());
    }
}
