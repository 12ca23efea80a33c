// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine::investment_view;
use crate::models::{InvestmentPatch, NewInvestment};
use crate::service::Aggregator;
use crate::store::{LedgerStore, SqliteLedger};
use crate::utils::{
    arg, fmt_money, fmt_percent, maybe_print_json, opt_date, opt_decimal, parse_date,
    parse_decimal, pretty_table, required,
};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, user_id: i64, m: &clap::ArgMatches) -> Result<()> {
    let ledger = SqliteLedger::new(conn);
    match m.subcommand() {
        Some(("add", sub)) => {
            let invested = parse_decimal(&required(sub, "invested")?)?;
            let current = opt_decimal(sub, "current")?.unwrap_or(invested);
            let new = NewInvestment {
                name: required(sub, "name")?,
                r#type: required(sub, "type")?,
                amount_invested: invested,
                current_value: current,
                purchase_date: parse_date(&required(sub, "date")?)?,
                description: arg(sub, "description"),
            };
            let i = ledger.create_investment(user_id, new)?;
            println!(
                "Added investment '{}' ({}) {} on {} (id {})",
                i.name,
                i.r#type,
                fmt_money(&i.amount_invested),
                i.purchase_date,
                i.id
            );
        }
        Some(("list", sub)) => {
            let data: Vec<_> = ledger
                .query_investments(user_id)?
                .into_iter()
                .map(investment_view)
                .collect();
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .iter()
                    .map(|v| {
                        let i = &v.investment;
                        vec![
                            i.id.to_string(),
                            i.name.clone(),
                            i.r#type.clone(),
                            i.purchase_date.to_string(),
                            fmt_money(&i.amount_invested),
                            fmt_money(&i.current_value),
                            fmt_money(&v.profit_loss),
                            fmt_percent(&v.profit_loss_percentage),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(
                        &["ID", "Name", "Type", "Purchased", "Invested", "Current", "P/L", "P/L %"],
                        rows,
                    )
                );
            }
        }
        Some(("update", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let patch = InvestmentPatch {
                name: arg(sub, "name"),
                r#type: arg(sub, "type"),
                amount_invested: opt_decimal(sub, "invested")?,
                current_value: opt_decimal(sub, "current")?,
                purchase_date: opt_date(sub, "date")?,
                description: arg(sub, "description"),
            };
            let i = ledger.update_investment(user_id, id, patch)?;
            println!("Updated investment {} '{}'", i.id, i.name);
        }
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            ledger.delete_investment(user_id, id)?;
            println!("Deleted investment {}", id);
        }
        Some(("summary", sub)) => {
            let s = Aggregator::new(&ledger).investments_summary(user_id)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &s)? {
                let mut rows: Vec<Vec<String>> = s
                    .by_type
                    .iter()
                    .map(|t| {
                        vec![
                            t.r#type.clone(),
                            t.count.to_string(),
                            fmt_money(&t.invested),
                            fmt_money(&t.current_value),
                            fmt_money(&t.profit_loss),
                            fmt_percent(&t.profit_loss_percentage),
                        ]
                    })
                    .collect();
                rows.push(vec![
                    "TOTAL".into(),
                    s.by_type.iter().map(|t| t.count).sum::<usize>().to_string(),
                    fmt_money(&s.total_invested),
                    fmt_money(&s.total_current_value),
                    fmt_money(&s.profit_loss),
                    fmt_percent(&s.profit_loss_percentage),
                ]);
                println!(
                    "{}",
                    pretty_table(
                        &["Type", "Count", "Invested", "Current", "P/L", "P/L %"],
                        rows
                    )
                );
            }
        }
        _ => {}
    }
    Ok(())
}
