// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine::goal_view;
use crate::models::{GoalPatch, GoalType, GoalView, NewGoal};
use crate::service::Aggregator;
use crate::store::SqliteLedger;
use crate::utils::{
    arg, category_patch, fmt_money, fmt_percent, maybe_print_json, opt_date, opt_decimal, parse_date,
    parse_decimal, pretty_table, required,
};
use anyhow::Result;
use chrono::Utc;
use rusqlite::Connection;

pub fn handle(conn: &Connection, user_id: i64, m: &clap::ArgMatches) -> Result<()> {
    let ledger = SqliteLedger::new(conn);
    match m.subcommand() {
        Some(("add", sub)) => {
            let new = NewGoal {
                title: required(sub, "title")?,
                description: arg(sub, "description"),
                goal_type: GoalType::from(required(sub, "type")?),
                target_amount: parse_decimal(&required(sub, "target")?)?,
                current_amount: opt_decimal(sub, "current")?.unwrap_or_default(),
                period_type: required(sub, "period")?,
                start_date: parse_date(&required(sub, "start")?)?,
                end_date: parse_date(&required(sub, "end")?)?,
                category_id: sub.get_one::<i64>("category-id").copied(),
            };
            let g = ledger.create_goal(user_id, new)?;
            println!(
                "Added goal '{}' ({}) target {} from {} to {} (id {})",
                g.title,
                g.goal_type,
                fmt_money(&g.target_amount),
                g.start_date,
                g.end_date,
                g.id
            );
        }
        Some(("list", sub)) => {
            let data = Aggregator::new(&ledger).goal_views(user_id, !sub.get_flag("all"))?;
            print_goals(sub, &data)?;
        }
        Some(("update", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let patch = GoalPatch {
                title: arg(sub, "title"),
                description: arg(sub, "description"),
                goal_type: arg(sub, "type").map(GoalType::from),
                target_amount: opt_decimal(sub, "target")?,
                current_amount: opt_decimal(sub, "current")?,
                period_type: arg(sub, "period"),
                start_date: opt_date(sub, "start")?,
                end_date: opt_date(sub, "end")?,
                category_id: category_patch(sub),
                is_active: sub.get_one::<bool>("active").copied(),
            };
            let g = ledger.update_goal(user_id, id, patch)?;
            println!("Updated goal {} '{}'", g.id, g.title);
        }
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            ledger.delete_goal(user_id, id)?;
            println!("Deleted goal {}", id);
        }
        Some(("refresh", sub)) => {
            let data: Vec<GoalView> = Aggregator::new(&ledger)
                .refresh_goals(user_id)?
                .into_iter()
                .map(goal_view)
                .collect();
            print_goals(sub, &data)?;
        }
        Some(("summary", sub)) => {
            let today = Utc::now().date_naive();
            let s = Aggregator::new(&ledger).refresh_and_summarize_goals(user_id, today)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &s)? {
                println!(
                    "Goals: {}  completed: {}  in progress: {}  completion: {}  expiring within a week: {}",
                    s.total_goals,
                    s.completed_goals,
                    s.in_progress_goals,
                    fmt_percent(&s.completion_rate),
                    s.expiring_soon
                );
                let rows = s
                    .goals_by_type
                    .iter()
                    .map(|(t, st)| {
                        vec![
                            t.clone(),
                            st.count.to_string(),
                            st.completed.to_string(),
                            fmt_money(&st.total_target),
                            fmt_money(&st.total_current),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["Type", "Goals", "Completed", "Target", "Current"], rows)
                );
            }
        }
        _ => {}
    }
    Ok(())
}

fn print_goals(sub: &clap::ArgMatches, data: &[GoalView]) -> Result<()> {
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        return Ok(());
    }
    let rows = data
        .iter()
        .map(|v| {
            let g = &v.goal;
            vec![
                g.id.to_string(),
                g.title.clone(),
                g.goal_type.to_string(),
                format!("{}..{}", g.start_date, g.end_date),
                fmt_money(&g.current_amount),
                fmt_money(&g.target_amount),
                fmt_percent(&v.progress_percentage),
                v.status.to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["ID", "Title", "Type", "Period", "Current", "Target", "Progress", "Status"],
            rows,
        )
    );
    Ok(())
}
