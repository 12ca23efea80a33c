// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{CategoryPatch, NewCategory};
use crate::service::Aggregator;
use crate::store::SqliteLedger;
use crate::utils::{arg, fmt_money, maybe_print_json, parse_kind, pretty_table, required};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, user_id: i64, m: &clap::ArgMatches) -> Result<()> {
    let ledger = SqliteLedger::new(conn);
    match m.subcommand() {
        Some(("add", sub)) => {
            let new = NewCategory {
                name: required(sub, "name")?,
                description: arg(sub, "description"),
                kind: parse_kind(&required(sub, "kind")?)?,
                color: arg(sub, "color"),
                icon: arg(sub, "icon"),
            };
            let c = ledger.create_category(user_id, new)?;
            println!("Added category '{}' ({}, id {})", c.name, c.kind, c.id);
        }
        Some(("list", sub)) => {
            let kind = arg(sub, "kind").map(|k| parse_kind(&k)).transpose()?;
            let data = ledger.list_categories(user_id, kind, sub.get_flag("all"))?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .iter()
                    .map(|c| {
                        vec![
                            c.id.to_string(),
                            format!("{} {}", c.icon, c.name),
                            c.kind.to_string(),
                            c.color.clone(),
                            if c.is_active { "yes" } else { "no" }.to_string(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["ID", "Category", "Kind", "Color", "Active"], rows)
                );
            }
        }
        Some(("update", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let patch = CategoryPatch {
                name: arg(sub, "name"),
                description: arg(sub, "description"),
                color: arg(sub, "color"),
                icon: arg(sub, "icon"),
                is_active: sub.get_one::<bool>("active").copied(),
            };
            let c = ledger.update_category(user_id, id, patch)?;
            println!("Updated category {} '{}'", c.id, c.name);
        }
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            ledger.delete_category(user_id, id)?;
            println!("Deactivated category {}", id);
        }
        Some(("seed", _)) => {
            let n = ledger.seed_default_categories(user_id)?;
            if n == 0 {
                println!("User {} already has categories; nothing seeded", user_id);
            } else {
                println!("Seeded {} default categories for user {}", n, user_id);
            }
        }
        Some(("stats", sub)) => {
            let data = Aggregator::new(&ledger).category_stats(user_id)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .iter()
                    .map(|s| {
                        vec![
                            s.category.name.clone(),
                            s.category.kind.to_string(),
                            s.transaction_count.to_string(),
                            fmt_money(&s.total_amount),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["Category", "Kind", "Transactions", "Total"], rows)
                );
            }
        }
        _ => {}
    }
    Ok(())
}
