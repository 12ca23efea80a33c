// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use ruvipay::config::Settings;
use ruvipay::{cli, commands, db, logging};

fn main() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let settings = Settings::load()?;
    logging::init(&settings.log_filter);

    let conn = db::open_or_init(&settings)?;
    let user_id = settings.resolve_user(&conn, matches.get_one::<i64>("user").copied())?;
    tracing::debug!(user_id, "resolved active user");

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", settings.db_path.display());
        }
        Some(("category", sub)) => commands::categories::handle(&conn, user_id, sub)?,
        Some(("tx", sub)) => commands::transactions::handle(&conn, user_id, sub)?,
        Some(("investment", sub)) => commands::investments::handle(&conn, user_id, sub)?,
        Some(("goal", sub)) => commands::goals::handle(&conn, user_id, sub)?,
        Some(("dashboard", sub)) => commands::dashboard::handle(&conn, user_id, sub)?,
        Some(("settings", sub)) => commands::settings::handle(&conn, &settings, user_id, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
