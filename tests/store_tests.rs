// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use ruvipay::db;
use ruvipay::errors::Error;
use ruvipay::models::{
    CategoryPatch, GoalPatch, GoalType, NewCategory, NewGoal, NewInvestment, NewTransaction,
    TransactionPatch, TxKind, UNCATEGORIZED,
};
use ruvipay::store::{LedgerStore, SqliteLedger, TransactionFilter};

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn new_tx(desc: &str, amount: &str, kind: TxKind, on: &str, category_id: Option<i64>) -> NewTransaction {
    NewTransaction {
        description: desc.into(),
        amount: d(amount),
        kind,
        category_id,
        date: date(on),
        notes: None,
    }
}

fn new_category(name: &str, kind: TxKind) -> NewCategory {
    NewCategory {
        name: name.into(),
        description: None,
        kind,
        color: None,
        icon: None,
    }
}

#[test]
fn transactions_are_listed_newest_first_with_paging() {
    let conn = setup();
    let ledger = SqliteLedger::new(&conn);
    for day in 1..=3 {
        ledger
            .create_transaction(
                1,
                new_tx("Coffee", "3.50", TxKind::Expense, &format!("2025-01-0{}", day), None),
            )
            .unwrap();
    }
    // Same date as the last one, inserted later.
    let last = ledger
        .create_transaction(1, new_tx("Tea", "2", TxKind::Expense, "2025-01-03", None))
        .unwrap();

    let all = ledger
        .query_transactions(1, &TransactionFilter::default())
        .unwrap();
    assert_eq!(all.len(), 4);
    assert_eq!(all[0].id, last.id);
    assert_eq!(all[3].date, date("2025-01-01"));

    let page = ledger
        .query_transactions(
            1,
            &TransactionFilter {
                skip: Some(1),
                limit: Some(2),
                ..TransactionFilter::default()
            },
        )
        .unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].description, "Coffee");
    assert_eq!(page[0].date, date("2025-01-03"));
    assert_eq!(page[1].date, date("2025-01-02"));
}

#[test]
fn filters_are_inclusive_and_scoped_to_user() {
    let conn = setup();
    let ledger = SqliteLedger::new(&conn);
    ledger
        .create_transaction(1, new_tx("Rent", "800", TxKind::Expense, "2025-02-01", None))
        .unwrap();
    ledger
        .create_transaction(1, new_tx("Pay", "2000", TxKind::Income, "2025-02-28", None))
        .unwrap();
    ledger
        .create_transaction(1, new_tx("Late", "5", TxKind::Expense, "2025-03-01", None))
        .unwrap();
    ledger
        .create_transaction(2, new_tx("Other user", "9", TxKind::Expense, "2025-02-10", None))
        .unwrap();

    let feb = ledger
        .query_transactions(
            1,
            &TransactionFilter::between(date("2025-02-01"), date("2025-02-28")),
        )
        .unwrap();
    assert_eq!(feb.len(), 2);

    let incomes = ledger
        .query_transactions(
            1,
            &TransactionFilter {
                kind: Some(TxKind::Income),
                ..TransactionFilter::default()
            },
        )
        .unwrap();
    assert_eq!(incomes.len(), 1);
    assert_eq!(incomes[0].amount, d("2000"));
}

#[test]
fn transaction_validation() {
    let conn = setup();
    let ledger = SqliteLedger::new(&conn);
    let zero = ledger.create_transaction(1, new_tx("Zero", "0", TxKind::Expense, "2025-01-01", None));
    assert!(matches!(zero, Err(Error::InvalidInput(_))));
    let blank = ledger.create_transaction(1, new_tx("  ", "1", TxKind::Expense, "2025-01-01", None));
    assert!(matches!(blank, Err(Error::InvalidInput(_))));
    let missing_cat =
        ledger.create_transaction(1, new_tx("x", "1", TxKind::Expense, "2025-01-01", Some(99)));
    assert!(matches!(
        missing_cat,
        Err(Error::NotFound { entity: "category", id: 99 })
    ));
}

#[test]
fn kind_mismatch_with_category_is_accepted() {
    let conn = setup();
    let ledger = SqliteLedger::new(&conn);
    let salary = ledger
        .create_category(1, new_category("Salary", TxKind::Income))
        .unwrap();
    let t = ledger
        .create_transaction(
            1,
            new_tx("Refund", "10", TxKind::Expense, "2025-01-01", Some(salary.id)),
        )
        .unwrap();
    assert_eq!(t.category_id, Some(salary.id));
}

#[test]
fn transaction_patch_keeps_unset_fields() {
    let conn = setup();
    let ledger = SqliteLedger::new(&conn);
    let t = ledger
        .create_transaction(1, new_tx("Groceries", "42.10", TxKind::Expense, "2025-05-05", None))
        .unwrap();
    let updated = ledger
        .update_transaction(
            1,
            t.id,
            TransactionPatch {
                amount: Some(d("40")),
                notes: Some("discount".into()),
                ..TransactionPatch::default()
            },
        )
        .unwrap();
    assert_eq!(updated.amount, d("40"));
    assert_eq!(updated.description, "Groceries");
    assert_eq!(updated.date, date("2025-05-05"));

    let reloaded = ledger.get_transaction(1, t.id).unwrap();
    assert_eq!(reloaded.amount, d("40"));
    assert_eq!(reloaded.notes.as_deref(), Some("discount"));

    // Another user's row is invisible.
    assert!(matches!(
        ledger.get_transaction(2, t.id),
        Err(Error::NotFound { .. })
    ));
    ledger.delete_transaction(1, t.id).unwrap();
    assert!(matches!(
        ledger.delete_transaction(1, t.id),
        Err(Error::NotFound { entity: "transaction", .. })
    ));
}

#[test]
fn category_soft_delete_keeps_name_for_history() {
    let conn = setup();
    let ledger = SqliteLedger::new(&conn);
    let food = ledger
        .create_category(1, new_category("Food", TxKind::Expense))
        .unwrap();
    ledger
        .create_transaction(1, new_tx("Pizza", "12", TxKind::Expense, "2025-01-10", Some(food.id)))
        .unwrap();
    ledger.delete_category(1, food.id).unwrap();

    assert!(ledger.list_categories(1, None, false).unwrap().is_empty());
    let all = ledger.list_categories(1, None, true).unwrap();
    assert_eq!(all.len(), 1);
    assert!(!all[0].is_active);

    let rows = ledger
        .list_transaction_rows(1, &TransactionFilter::default())
        .unwrap();
    assert_eq!(rows[0].category, "Food");
    assert_eq!(ledger.category_name_by_id(food.id).unwrap(), "Food");
    assert_eq!(ledger.category_name_by_id(12345).unwrap(), UNCATEGORIZED);

    let revived = ledger
        .update_category(
            1,
            food.id,
            CategoryPatch {
                is_active: Some(true),
                ..CategoryPatch::default()
            },
        )
        .unwrap();
    assert!(revived.is_active);
}

#[test]
fn seeding_runs_once_per_user() {
    let conn = setup();
    let ledger = SqliteLedger::new(&conn);
    let n = ledger.seed_default_categories(1).unwrap();
    assert_eq!(n, 11);
    assert_eq!(ledger.seed_default_categories(1).unwrap(), 0);
    let incomes = ledger
        .list_categories(1, Some(TxKind::Income), false)
        .unwrap();
    assert_eq!(incomes.len(), 4);
    assert_eq!(ledger.seed_default_categories(2).unwrap(), 11);
}

#[test]
fn uncategorized_rows_get_sentinel_name() {
    let conn = setup();
    let ledger = SqliteLedger::new(&conn);
    ledger
        .create_transaction(1, new_tx("Cash", "5", TxKind::Expense, "2025-01-01", None))
        .unwrap();
    let rows = ledger
        .list_transaction_rows(1, &TransactionFilter::default())
        .unwrap();
    assert_eq!(rows[0].category, UNCATEGORIZED);
}

#[test]
fn investment_crud_and_validation() {
    let conn = setup();
    let ledger = SqliteLedger::new(&conn);
    let negative = ledger.create_investment(
        1,
        NewInvestment {
            name: "ETF".into(),
            r#type: "funds".into(),
            amount_invested: d("-1"),
            current_value: d("0"),
            purchase_date: date("2025-01-01"),
            description: None,
        },
    );
    assert!(matches!(negative, Err(Error::InvalidInput(_))));

    let inv = ledger
        .create_investment(
            1,
            NewInvestment {
                name: "ETF".into(),
                r#type: "funds".into(),
                amount_invested: d("1000"),
                current_value: d("1100.50"),
                purchase_date: date("2025-01-01"),
                description: None,
            },
        )
        .unwrap();
    let listed = ledger.query_investments(1).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].current_value, d("1100.50"));
    assert_eq!(listed[0].r#type, "funds");

    ledger.delete_investment(1, inv.id).unwrap();
    assert!(ledger.query_investments(1).unwrap().is_empty());
}

#[test]
fn goal_dates_are_validated_and_amount_is_persisted() {
    let conn = setup();
    let ledger = SqliteLedger::new(&conn);
    let bad = ledger.create_goal(
        1,
        NewGoal {
            title: "Backwards".into(),
            description: None,
            goal_type: GoalType::SavingsTarget,
            target_amount: d("100"),
            current_amount: Decimal::ZERO,
            period_type: "custom".into(),
            start_date: date("2025-02-01"),
            end_date: date("2025-01-01"),
            category_id: None,
        },
    );
    assert!(matches!(bad, Err(Error::InvalidInput(_))));

    let g = ledger
        .create_goal(
            1,
            NewGoal {
                title: "Save".into(),
                description: None,
                goal_type: GoalType::SavingsTarget,
                target_amount: d("100"),
                current_amount: Decimal::ZERO,
                period_type: "monthly".into(),
                start_date: date("2025-01-01"),
                end_date: date("2025-01-31"),
                category_id: None,
            },
        )
        .unwrap();
    ledger.upsert_goal_amount(g.id, d("55.5")).unwrap();
    assert_eq!(ledger.get_goal(1, g.id).unwrap().current_amount, d("55.5"));
    assert!(matches!(
        ledger.upsert_goal_amount(9999, d("1")),
        Err(Error::NotFound { entity: "goal", .. })
    ));
}

#[test]
fn amounts_beyond_limit_are_rejected() {
    let conn = setup();
    let ledger = SqliteLedger::new(&conn);
    let huge = "50000000000000000000000000000";
    let first = ledger.create_transaction(1, new_tx("Windfall", huge, TxKind::Income, "2025-01-01", None));
    assert!(matches!(first, Err(Error::InvalidInput(_))));

    let at_limit = Decimal::from(ruvipay::store::MAX_AMOUNT);
    let t = ledger
        .create_transaction(1, new_tx("Big", "1", TxKind::Income, "2025-01-01", None))
        .unwrap();
    let bumped = ledger.update_transaction(
        1,
        t.id,
        TransactionPatch {
            amount: Some(at_limit + Decimal::ONE),
            ..TransactionPatch::default()
        },
    );
    assert!(matches!(bumped, Err(Error::InvalidInput(_))));
    ledger
        .update_transaction(
            1,
            t.id,
            TransactionPatch {
                amount: Some(at_limit),
                ..TransactionPatch::default()
            },
        )
        .unwrap();
    ledger
        .create_transaction(1, new_tx("Big again", &at_limit.to_string(), TxKind::Income, "2025-01-02", None))
        .unwrap();

    // Totals over accepted rows stay computable.
    let stats = ruvipay::service::Aggregator::new(&ledger)
        .dashboard_stats(1)
        .unwrap();
    assert_eq!(stats.total_income, at_limit + at_limit);

    let inv = ledger.create_investment(
        1,
        NewInvestment {
            name: "Moon".into(),
            r#type: "crypto".into(),
            amount_invested: d("1"),
            current_value: d(huge),
            purchase_date: date("2025-01-01"),
            description: None,
        },
    );
    assert!(matches!(inv, Err(Error::InvalidInput(_))));

    let goal = ledger.create_goal(
        1,
        NewGoal {
            title: "Too much".into(),
            description: None,
            goal_type: GoalType::SavingsTarget,
            target_amount: d(huge),
            current_amount: Decimal::ZERO,
            period_type: "custom".into(),
            start_date: date("2025-01-01"),
            end_date: date("2025-12-31"),
            category_id: None,
        },
    );
    assert!(matches!(goal, Err(Error::InvalidInput(_))));
}

#[test]
fn patch_can_clear_category() {
    let conn = setup();
    let ledger = SqliteLedger::new(&conn);
    let food = ledger
        .create_category(1, new_category("Food", TxKind::Expense))
        .unwrap();
    let t = ledger
        .create_transaction(1, new_tx("Lunch", "9", TxKind::Expense, "2025-01-01", Some(food.id)))
        .unwrap();

    // Leaving the field unset keeps the category.
    let kept = ledger
        .update_transaction(
            1,
            t.id,
            TransactionPatch {
                notes: Some("team".into()),
                ..TransactionPatch::default()
            },
        )
        .unwrap();
    assert_eq!(kept.category_id, Some(food.id));

    let cleared = ledger
        .update_transaction(
            1,
            t.id,
            TransactionPatch {
                category_id: Some(None),
                ..TransactionPatch::default()
            },
        )
        .unwrap();
    assert_eq!(cleared.category_id, None);
    assert_eq!(ledger.get_transaction(1, t.id).unwrap().category_id, None);

    let g = ledger
        .create_goal(
            1,
            NewGoal {
                title: "Food cap".into(),
                description: None,
                goal_type: GoalType::ExpenseLimit,
                target_amount: d("300"),
                current_amount: Decimal::ZERO,
                period_type: "monthly".into(),
                start_date: date("2025-01-01"),
                end_date: date("2025-01-31"),
                category_id: Some(food.id),
            },
        )
        .unwrap();
    let g = ledger
        .update_goal(
            1,
            g.id,
            GoalPatch {
                category_id: Some(None),
                ..GoalPatch::default()
            },
        )
        .unwrap();
    assert_eq!(g.category_id, None);
    assert_eq!(ledger.get_goal(1, g.id).unwrap().category_id, None);

    let missing = ledger.update_goal(
        1,
        g.id,
        GoalPatch {
            category_id: Some(Some(4242)),
            ..GoalPatch::default()
        },
    );
    assert!(matches!(missing, Err(Error::NotFound { entity: "category", .. })));
}
