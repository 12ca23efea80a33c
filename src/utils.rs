// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use rust_decimal::Decimal;

use crate::engine::YearMonth;
use crate::models::TxKind;

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

/// `YYYY-MM` into a validated month.
pub fn parse_month(s: &str) -> Result<YearMonth> {
    let s = s.trim();
    let (y, m) = s
        .split_once('-')
        .with_context(|| format!("Invalid month '{}', expected YYYY-MM", s))?;
    let year: i32 = y
        .parse()
        .with_context(|| format!("Invalid year in '{}'", s))?;
    let month: u32 = m
        .parse()
        .with_context(|| format!("Invalid month in '{}'", s))?;
    Ok(YearMonth::new(year, month)?)
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

pub fn parse_kind(s: &str) -> Result<TxKind> {
    Ok(s.parse::<TxKind>()?)
}

/// Trimmed string argument, if present.
pub fn arg(m: &clap::ArgMatches, name: &str) -> Option<String> {
    m.get_one::<String>(name).map(|s| s.trim().to_string())
}

pub fn required(m: &clap::ArgMatches, name: &str) -> Result<String> {
    arg(m, name).with_context(|| format!("Missing --{}", name))
}

pub fn opt_date(m: &clap::ArgMatches, name: &str) -> Result<Option<NaiveDate>> {
    arg(m, name).map(|s| parse_date(&s)).transpose()
}

pub fn opt_decimal(m: &clap::ArgMatches, name: &str) -> Result<Option<Decimal>> {
    arg(m, name).map(|s| parse_decimal(&s)).transpose()
}

/// Category change requested by `--category-id` / `--no-category`.
pub fn category_patch(m: &clap::ArgMatches) -> Option<Option<i64>> {
    if m.get_flag("no-category") {
        return Some(None);
    }
    m.get_one::<i64>("category-id").copied().map(Some)
}

pub fn fmt_money(d: &Decimal) -> String {
    format!("{:.2}", d.round_dp(2))
}

pub fn fmt_percent(d: &Decimal) -> String {
    format!("{:.2}%", d.round_dp(2))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_parsing() {
        let m = parse_month(" 2024-12 ").unwrap();
        assert_eq!((m.year(), m.month()), (2024, 12));
        assert!(parse_month("2024-13").is_err());
        assert!(parse_month("2024").is_err());
    }

    #[test]
    fn money_formatting_keeps_two_places() {
        assert_eq!(fmt_money(&parse_decimal("10").unwrap()), "10.00");
        assert_eq!(fmt_money(&parse_decimal(" 3.14159 ").unwrap()), "3.14");
        assert_eq!(fmt_percent(&parse_decimal("15").unwrap()), "15.00%");
    }

    #[test]
    fn kind_parsing_is_case_insensitive() {
        assert_eq!(parse_kind("Income").unwrap(), TxKind::Income);
        assert!(parse_kind("transfer").is_err());
    }
}
