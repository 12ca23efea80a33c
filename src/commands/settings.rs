// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::{self, Settings};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(
    conn: &Connection,
    settings: &Settings,
    user_id: i64,
    m: &clap::ArgMatches,
) -> Result<()> {
    match m.subcommand() {
        Some(("show", _)) => {
            println!("Database:      {}", settings.db_path.display());
            println!("Active user:   {}", user_id);
            match config::get_default_user(conn)? {
                Some(id) => println!("Stored user:   {}", id),
                None => println!("Stored user:   (unset, using {})", config::DEFAULT_USER_ID),
            }
            println!("Log filter:    {}", settings.log_filter);
        }
        Some(("set-user", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            config::set_default_user(conn, id)?;
            tracing::info!(user_id = id, "default user updated");
            println!("Default user set to {}", id);
        }
        _ => {}
    }
    Ok(())
}
