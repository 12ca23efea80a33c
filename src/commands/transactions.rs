// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{NewTransaction, TransactionPatch, TransactionRow};
use crate::store::{SqliteLedger, TransactionFilter};
use crate::utils::{
    arg, category_patch, fmt_money, maybe_print_json, opt_date, opt_decimal, parse_date, parse_decimal,
    parse_kind, pretty_table, required,
};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, user_id: i64, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, user_id, sub)?,
        Some(("list", sub)) => list(conn, user_id, sub)?,
        Some(("update", sub)) => update(conn, user_id, sub)?,
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            SqliteLedger::new(conn).delete_transaction(user_id, id)?;
            println!("Deleted transaction {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, user_id: i64, sub: &clap::ArgMatches) -> Result<()> {
    let new = NewTransaction {
        description: required(sub, "description")?,
        amount: parse_decimal(&required(sub, "amount")?)?,
        kind: parse_kind(&required(sub, "kind")?)?,
        category_id: sub.get_one::<i64>("category-id").copied(),
        date: parse_date(&required(sub, "date")?)?,
        notes: arg(sub, "notes"),
    };
    let t = SqliteLedger::new(conn).create_transaction(user_id, new)?;
    println!(
        "Recorded {} {} on {} '{}' (id {})",
        t.kind,
        fmt_money(&t.amount),
        t.date,
        t.description,
        t.id
    );
    Ok(())
}

fn update(conn: &Connection, user_id: i64, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let patch = TransactionPatch {
        description: arg(sub, "description"),
        amount: opt_decimal(sub, "amount")?,
        kind: arg(sub, "kind").map(|k| parse_kind(&k)).transpose()?,
        category_id: category_patch(sub),
        date: opt_date(sub, "date")?,
        notes: arg(sub, "notes"),
    };
    let t = SqliteLedger::new(conn).update_transaction(user_id, id, patch)?;
    println!("Updated transaction {} '{}'", t.id, t.description);
    Ok(())
}

fn list(conn: &Connection, user_id: i64, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(conn, user_id, sub)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                let t = &r.transaction;
                vec![
                    t.id.to_string(),
                    t.date.to_string(),
                    t.description.clone(),
                    t.kind.to_string(),
                    fmt_money(&t.amount),
                    r.category.clone(),
                    t.notes.clone().unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Date", "Description", "Kind", "Amount", "Category", "Notes"],
                rows,
            )
        );
    }
    Ok(())
}

pub fn query_rows(
    conn: &Connection,
    user_id: i64,
    sub: &clap::ArgMatches,
) -> Result<Vec<TransactionRow>> {
    let filter = TransactionFilter {
        start_date: opt_date(sub, "from")?,
        end_date: opt_date(sub, "to")?,
        kind: arg(sub, "kind").map(|k| parse_kind(&k)).transpose()?,
        category_id: sub.get_one::<i64>("category-id").copied(),
        skip: sub.get_one::<usize>("skip").copied(),
        limit: sub.get_one::<usize>("limit").copied(),
    };
    Ok(SqliteLedger::new(conn).list_transaction_rows(user_id, &filter)?)
}
