// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::service::Aggregator;
use crate::store::SqliteLedger;
use crate::utils::{fmt_money, maybe_print_json, parse_month, pretty_table, required};
use anyhow::Result;
use chrono::Utc;
use rusqlite::Connection;

pub fn handle(conn: &Connection, user_id: i64, m: &clap::ArgMatches) -> Result<()> {
    let ledger = SqliteLedger::new(conn);
    let agg = Aggregator::new(&ledger);
    match m.subcommand() {
        Some(("stats", sub)) => {
            let s = agg.dashboard_stats(user_id)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &s)? {
                println!(
                    "Income: {}  Expense: {}  Balance: {}  Transactions: {}",
                    fmt_money(&s.total_income),
                    fmt_money(&s.total_expense),
                    fmt_money(&s.balance),
                    s.transaction_count
                );
                let rows = s
                    .recent_transactions
                    .iter()
                    .map(|r| {
                        let t = &r.transaction;
                        vec![
                            t.date.to_string(),
                            t.description.clone(),
                            t.kind.to_string(),
                            fmt_money(&t.amount),
                            r.category.clone(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["Date", "Description", "Kind", "Amount", "Category"], rows)
                );
            }
        }
        Some(("balance", sub)) => {
            let b = agg.balance(user_id)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &b)? {
                let rows = vec![vec![
                    fmt_money(&b.income),
                    fmt_money(&b.expense),
                    fmt_money(&b.balance),
                ]];
                println!("{}", pretty_table(&["Income", "Expense", "Balance"], rows));
            }
        }
        Some(("chart", sub)) => {
            let months = *sub.get_one::<u32>("months").unwrap();
            let data = agg.monthly_chart_series(user_id, months, Utc::now().date_naive())?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .iter()
                    .map(|p| {
                        vec![
                            p.month.clone(),
                            fmt_money(&p.income),
                            fmt_money(&p.expense),
                            fmt_money(&(p.income - p.expense)),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["Month", "Income", "Expense", "Net"], rows)
                );
            }
        }
        Some(("monthly", sub)) => {
            let ym = parse_month(&required(sub, "month")?)?;
            let s = agg.monthly_summary(user_id, ym.year(), ym.month())?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &s)? {
                println!(
                    "{}  Income: {}  Expense: {}  Balance: {}",
                    ym,
                    fmt_money(&s.income),
                    fmt_money(&s.expense),
                    fmt_money(&s.balance)
                );
                let rows = s
                    .expense_by_category
                    .iter()
                    .map(|c| vec![c.category.clone(), fmt_money(&c.amount)])
                    .collect();
                println!("{}", pretty_table(&["Category", "Spent"], rows));
            }
        }
        _ => {}
    }
    Ok(())
}
