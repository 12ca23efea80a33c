// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::PathBuf;

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com.ruvipay", "RuViPay", "ruvipay"));

pub const ENV_DB: &str = "RUVIPAY_DB";
pub const ENV_USER: &str = "RUVIPAY_USER";
pub const ENV_LOG: &str = "RUVIPAY_LOG";

pub const DEFAULT_USER_ID: i64 = 1;
pub const DEFAULT_LOG_FILTER: &str = "ruvipay=info";

#[derive(Debug, Clone)]
pub struct Settings {
    pub db_path: PathBuf,
    /// User id from the environment, if any. The stored preference and
    /// `DEFAULT_USER_ID` apply when this is `None`.
    pub env_user_id: Option<i64>,
    pub log_filter: String,
}

impl Settings {
    pub fn load() -> Result<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path = match lookup(ENV_DB).filter(|s| !s.trim().is_empty()) {
            Some(p) => PathBuf::from(p.trim()),
            None => default_db_path()?,
        };
        let env_user_id = match lookup(ENV_USER).filter(|s| !s.trim().is_empty()) {
            Some(raw) => Some(
                raw.trim()
                    .parse::<i64>()
                    .with_context(|| format!("Invalid {} '{}'", ENV_USER, raw))?,
            ),
            None => None,
        };
        let log_filter = lookup(ENV_LOG)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
        Ok(Self {
            db_path,
            env_user_id,
            log_filter,
        })
    }

    /// Effective user: explicit flag, then environment, then the stored
    /// preference, then `DEFAULT_USER_ID`.
    pub fn resolve_user(&self, conn: &Connection, flag: Option<i64>) -> Result<i64> {
        if let Some(id) = flag.or(self.env_user_id) {
            return Ok(id);
        }
        Ok(get_default_user(conn)?.unwrap_or(DEFAULT_USER_ID))
    }
}

pub fn default_db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    Ok(proj.data_dir().join("ruvipay.sqlite"))
}

pub fn get_default_user(conn: &Connection) -> Result<Option<i64>> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key='default_user_id'",
            [],
            |r| r.get(0),
        )
        .optional()?;
    match v {
        Some(s) => Ok(Some(
            s.parse::<i64>()
                .with_context(|| format!("Invalid stored default_user_id '{}'", s))?,
        )),
        None => Ok(None),
    }
}

pub fn set_default_user(conn: &Connection, user_id: i64) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES('default_user_id', ?1)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![user_id.to_string()],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn env_overrides_are_trimmed() {
        let s = Settings::from_lookup(lookup_from(&[
            (ENV_DB, " /tmp/ledger.sqlite "),
            (ENV_USER, " 42 "),
            (ENV_LOG, "ruvipay=debug"),
        ]))
        .unwrap();
        assert_eq!(s.db_path, PathBuf::from("/tmp/ledger.sqlite"));
        assert_eq!(s.env_user_id, Some(42));
        assert_eq!(s.log_filter, "ruvipay=debug");
    }

    #[test]
    fn bad_user_env_is_rejected() {
        let r = Settings::from_lookup(lookup_from(&[(ENV_DB, "x.sqlite"), (ENV_USER, "abc")]));
        assert!(r.is_err());
    }

    #[test]
    fn user_resolution_order() {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::init_schema(&conn).unwrap();
        let s = Settings::from_lookup(lookup_from(&[(ENV_DB, "x.sqlite")])).unwrap();
        assert_eq!(s.log_filter, DEFAULT_LOG_FILTER);
        assert_eq!(s.resolve_user(&conn, None).unwrap(), DEFAULT_USER_ID);

        set_default_user(&conn, 7).unwrap();
        assert_eq!(s.resolve_user(&conn, None).unwrap(), 7);

        let with_env =
            Settings::from_lookup(lookup_from(&[(ENV_DB, "x.sqlite"), (ENV_USER, "9")])).unwrap();
        assert_eq!(with_env.resolve_user(&conn, None).unwrap(), 9);
        assert_eq!(with_env.resolve_user(&conn, Some(3)).unwrap(), 3);
    }
}
