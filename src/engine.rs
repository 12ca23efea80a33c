// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Derived metrics over ledger snapshots.
//!
//! Everything here is pure: callers hand in rows already fetched from the
//! store and get computed views back. Ratios never fail; a zero or negative
//! denominator yields zero.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use crate::errors::{Error, Result};
use crate::models::{
    Goal, GoalStatus, GoalType, GoalView, Investment, InvestmentView, Transaction, TxKind,
    UNCATEGORIZED,
};

/// `numerator / denominator * 100`, or zero when the denominator is not positive.
pub fn percent_of(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    numerator
        .checked_div(denominator)
        .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(Decimal::ZERO)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitLoss {
    pub delta: Decimal,
    pub percentage: Decimal,
}

pub fn profit_loss(invested: Decimal, current_value: Decimal) -> ProfitLoss {
    let delta = current_value - invested;
    ProfitLoss {
        delta,
        percentage: percent_of(delta, invested),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalProgress {
    pub percentage: Decimal,
    pub remaining: Decimal,
    pub completed: bool,
}

pub fn goal_progress(target: Decimal, current: Decimal) -> GoalProgress {
    let percentage = percent_of(current, target)
        .min(Decimal::ONE_HUNDRED)
        .max(Decimal::ZERO);
    GoalProgress {
        percentage,
        remaining: (target - current).max(Decimal::ZERO),
        completed: current >= target,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    pub income: Decimal,
    pub expense: Decimal,
    pub balance: Decimal,
}

pub fn balance<'a, I>(transactions: I) -> Balance
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut out = Balance::default();
    for t in transactions {
        match t.kind {
            TxKind::Income => out.income += t.amount,
            TxKind::Expense => out.expense += t.amount,
        }
    }
    out.balance = out.income - out.expense;
    out
}

/// A validated calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(Error::invalid(format!(
                "month {} outside 1-12",
                month
            )));
        }
        NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| Error::invalid(format!("year {} out of range", year)))?;
        Ok(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Day before the first day of the following month.
    pub fn last_day(&self) -> NaiveDate {
        let next = self.next();
        next.first_day().pred_opt().unwrap_or(NaiveDate::MAX)
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn months_before(&self, n: u32) -> Self {
        let idx = self.year * 12 + (self.month as i32 - 1) - n as i32;
        Self {
            year: idx.div_euclid(12),
            month: idx.rem_euclid(12) as u32 + 1,
        }
    }

    pub fn period(&self) -> Period {
        Period {
            start: self.first_day(),
            end: self.last_day(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Closed date interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAmount {
    pub category: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    pub year: i32,
    pub month: u32,
    pub income: Decimal,
    pub expense: Decimal,
    pub balance: Decimal,
    pub expense_by_category: Vec<CategoryAmount>,
}

/// Income, expense and per-category spend for one calendar month.
///
/// Category names are resolved through `category_names`; ids missing from the
/// map (or transactions without a category) are grouped under
/// [`UNCATEGORIZED`].
pub fn monthly_summary(
    transactions: &[Transaction],
    month: YearMonth,
    category_names: &HashMap<i64, String>,
) -> MonthlySummary {
    let period = month.period();
    let in_month: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| period.contains(t.date))
        .collect();
    let totals = balance(in_month.iter().copied());

    let mut by_cat: HashMap<&str, Decimal> = HashMap::new();
    for t in in_month.iter().filter(|t| t.kind == TxKind::Expense) {
        let name = t
            .category_id
            .and_then(|id| category_names.get(&id))
            .map(String::as_str)
            .unwrap_or(UNCATEGORIZED);
        *by_cat.entry(name).or_insert(Decimal::ZERO) += t.amount;
    }
    let mut expense_by_category: Vec<CategoryAmount> = by_cat
        .into_iter()
        .map(|(category, amount)| CategoryAmount {
            category: category.to_string(),
            amount,
        })
        .collect();
    expense_by_category.sort_by(|a, b| {
        b.amount
            .cmp(&a.amount)
            .then_with(|| a.category.cmp(&b.category))
    });

    MonthlySummary {
        year: month.year(),
        month: month.month(),
        income: totals.income,
        expense: totals.expense,
        balance: totals.balance,
        expense_by_category,
    }
}

/// Result of recomputing a goal from the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalAmount {
    Computed(Decimal),
    /// The goal type has no derivation rule; the amount defaults to zero.
    Unsupported,
}

impl GoalAmount {
    pub fn amount(&self) -> Decimal {
        match self {
            GoalAmount::Computed(d) => *d,
            GoalAmount::Unsupported => Decimal::ZERO,
        }
    }
}

/// Recompute a goal's current amount from the rows that can feed it.
///
/// Rows outside `[start_date, end_date]` are ignored, so callers may pass the
/// user's whole ledger.
pub fn goal_current_amount(
    goal: &Goal,
    transactions: &[Transaction],
    investments: &[Investment],
) -> GoalAmount {
    let period = Period {
        start: goal.start_date,
        end: goal.end_date,
    };
    let in_period = move || transactions.iter().filter(move |t| period.contains(t.date));

    match &goal.goal_type {
        GoalType::ExpenseLimit => {
            let total = in_period()
                .filter(|t| t.kind == TxKind::Expense)
                .filter(|t| goal.category_id.is_none() || t.category_id == goal.category_id)
                .map(|t| t.amount)
                .sum();
            GoalAmount::Computed(total)
        }
        GoalType::SavingsTarget => GoalAmount::Computed(balance(in_period()).balance),
        GoalType::InvestmentGoal => {
            let total = investments
                .iter()
                .filter(|i| period.contains(i.purchase_date))
                .map(|i| i.amount_invested)
                .sum();
            GoalAmount::Computed(total)
        }
        GoalType::Other(_) => GoalAmount::Unsupported,
    }
}

pub fn goal_view(goal: Goal) -> GoalView {
    let progress = goal_progress(goal.target_amount, goal.current_amount);
    let status = if progress.completed {
        GoalStatus::Completed
    } else if goal.is_active {
        GoalStatus::Active
    } else {
        GoalStatus::Paused
    };
    GoalView {
        goal,
        progress_percentage: progress.percentage,
        remaining_amount: progress.remaining,
        is_completed: progress.completed,
        status,
    }
}

pub fn investment_view(investment: Investment) -> InvestmentView {
    let pl = profit_loss(investment.amount_invested, investment.current_value);
    InvestmentView {
        investment,
        profit_loss: pl.delta,
        profit_loss_percentage: pl.percentage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn tx(id: i64, kind: TxKind, amount: &str, on: &str, category_id: Option<i64>) -> Transaction {
        Transaction {
            id,
            user_id: 1,
            description: format!("t{}", id),
            amount: d(amount),
            kind,
            category_id,
            date: date(on),
            notes: None,
        }
    }

    fn goal(goal_type: GoalType, target: &str, current: &str) -> Goal {
        Goal {
            id: 1,
            user_id: 1,
            title: "g".into(),
            description: None,
            goal_type,
            target_amount: d(target),
            current_amount: d(current),
            period_type: "custom".into(),
            start_date: date("2024-01-01"),
            end_date: date("2024-12-31"),
            category_id: None,
            is_active: true,
        }
    }

    #[test]
    fn profit_loss_on_gain() {
        let pl = profit_loss(d("1000"), d("1150"));
        assert_eq!(pl.delta, d("150"));
        assert_eq!(pl.percentage, d("15"));
    }

    #[test]
    fn profit_loss_with_nothing_invested_is_zero_percent() {
        assert_eq!(profit_loss(Decimal::ZERO, d("50")).percentage, Decimal::ZERO);
        assert_eq!(profit_loss(d("-10"), d("50")).percentage, Decimal::ZERO);
        assert_eq!(profit_loss(Decimal::ZERO, d("50")).delta, d("50"));
    }

    #[test]
    fn profit_loss_on_loss() {
        let pl = profit_loss(d("200"), d("150"));
        assert_eq!(pl.delta, d("-50"));
        assert_eq!(pl.percentage, d("-25"));
    }

    #[test]
    fn goal_progress_clamps_overshoot() {
        let p = goal_progress(d("100"), d("150"));
        assert_eq!(p.percentage, d("100"));
        assert_eq!(p.remaining, Decimal::ZERO);
        assert!(p.completed);
    }

    #[test]
    fn goal_progress_partial() {
        let p = goal_progress(d("10000"), d("2500"));
        assert_eq!(p.percentage, d("25"));
        assert_eq!(p.remaining, d("7500"));
        assert!(!p.completed);
    }

    #[test]
    fn goal_progress_zero_target_and_negative_current() {
        assert_eq!(goal_progress(Decimal::ZERO, d("5")).percentage, Decimal::ZERO);
        let p = goal_progress(d("100"), d("-40"));
        assert_eq!(p.percentage, Decimal::ZERO);
        assert_eq!(p.remaining, d("140"));
    }

    #[test]
    fn balance_of_empty_ledger() {
        assert_eq!(balance(&Vec::<Transaction>::new()), Balance::default());
    }

    #[test]
    fn balance_can_go_negative() {
        let txs = vec![
            tx(1, TxKind::Income, "10", "2024-01-01", None),
            tx(2, TxKind::Expense, "25.50", "2024-01-02", None),
        ];
        let b = balance(&txs);
        assert_eq!(b.income, d("10"));
        assert_eq!(b.expense, d("25.50"));
        assert_eq!(b.balance, d("-15.50"));
    }

    #[test]
    fn year_month_rejects_bad_month() {
        assert!(YearMonth::new(2024, 0).is_err());
        assert!(YearMonth::new(2024, 13).is_err());
    }

    #[test]
    fn december_rolls_into_next_year() {
        let dec = YearMonth::new(2024, 12).unwrap();
        assert_eq!(dec.last_day(), date("2024-12-31"));
        assert_eq!(dec.next().to_string(), "2025-01");
        let feb = YearMonth::new(2024, 2).unwrap();
        assert_eq!(feb.last_day(), date("2024-02-29"));
    }

    #[test]
    fn months_before_crosses_years() {
        let m = YearMonth::new(2024, 2).unwrap();
        assert_eq!(m.months_before(0), m);
        assert_eq!(m.months_before(2).to_string(), "2023-12");
        assert_eq!(m.months_before(14).to_string(), "2022-12");
    }

    #[test]
    fn monthly_summary_january() {
        let txs = vec![
            tx(1, TxKind::Income, "100", "2024-01-05", Some(1)),
            tx(2, TxKind::Expense, "40", "2024-01-10", Some(2)),
            tx(3, TxKind::Expense, "20", "2024-02-01", Some(2)),
        ];
        let names = HashMap::from([(1, "Salary".to_string()), (2, "Food".to_string())]);
        let s = monthly_summary(&txs, YearMonth::new(2024, 1).unwrap(), &names);
        assert_eq!(s.income, d("100"));
        assert_eq!(s.expense, d("40"));
        assert_eq!(s.balance, d("60"));
        assert_eq!(
            s.expense_by_category,
            vec![CategoryAmount {
                category: "Food".into(),
                amount: d("40")
            }]
        );
    }

    #[test]
    fn monthly_summary_december_bounds() {
        let txs = vec![
            tx(1, TxKind::Expense, "1", "2024-12-01", None),
            tx(2, TxKind::Expense, "2", "2024-12-31", Some(9)),
            tx(3, TxKind::Expense, "4", "2025-01-01", None),
            tx(4, TxKind::Expense, "8", "2024-11-30", None),
        ];
        let s = monthly_summary(&txs, YearMonth::new(2024, 12).unwrap(), &HashMap::new());
        assert_eq!(s.expense, d("3"));
        assert_eq!(s.expense_by_category.len(), 1);
        assert_eq!(s.expense_by_category[0].category, UNCATEGORIZED);
    }

    #[test]
    fn expense_limit_respects_category_and_period() {
        let mut g = goal(GoalType::ExpenseLimit, "500", "0");
        let txs = vec![
            tx(1, TxKind::Expense, "100", "2024-03-01", Some(1)),
            tx(2, TxKind::Expense, "50", "2024-03-02", Some(2)),
            tx(3, TxKind::Expense, "70", "2023-12-31", Some(1)),
            tx(4, TxKind::Income, "900", "2024-03-03", Some(1)),
        ];
        assert_eq!(
            goal_current_amount(&g, &txs, &[]),
            GoalAmount::Computed(d("150"))
        );
        g.category_id = Some(1);
        assert_eq!(
            goal_current_amount(&g, &txs, &[]),
            GoalAmount::Computed(d("100"))
        );
    }

    #[test]
    fn savings_target_recompute_is_idempotent() {
        let mut g = goal(GoalType::SavingsTarget, "10000", "2500");
        let txs = vec![
            tx(1, TxKind::Income, "3000", "2024-05-01", Some(1)),
            tx(2, TxKind::Expense, "500", "2024-05-15", Some(2)),
        ];
        let first = goal_current_amount(&g, &txs, &[]);
        assert_eq!(first, GoalAmount::Computed(d("2500")));
        g.current_amount = first.amount();
        assert_eq!(goal_current_amount(&g, &txs, &[]), first);
    }

    #[test]
    fn investment_goal_sums_purchases_in_period() {
        let g = goal(GoalType::InvestmentGoal, "5000", "0");
        let inv = |id: i64, amt: &str, on: &str| Investment {
            id,
            user_id: 1,
            name: "x".into(),
            r#type: "stocks".into(),
            amount_invested: d(amt),
            current_value: d(amt),
            purchase_date: date(on),
            description: None,
        };
        let invs = vec![inv(1, "1000", "2024-02-01"), inv(2, "300", "2025-01-01")];
        assert_eq!(
            goal_current_amount(&g, &[], &invs),
            GoalAmount::Computed(d("1000"))
        );
    }

    #[test]
    fn unknown_goal_type_is_reported() {
        let g = goal(GoalType::from("debt_payoff".to_string()), "100", "30");
        let r = goal_current_amount(&g, &[], &[]);
        assert_eq!(r, GoalAmount::Unsupported);
        assert_eq!(r.amount(), Decimal::ZERO);
    }

    #[test]
    fn goal_view_status() {
        let mut g = goal(GoalType::SavingsTarget, "100", "20");
        assert_eq!(goal_view(g.clone()).status, GoalStatus::Active);
        g.is_active = false;
        assert_eq!(goal_view(g.clone()).status, GoalStatus::Paused);
        g.current_amount = d("100");
        let v = goal_view(g);
        assert_eq!(v.status, GoalStatus::Completed);
        assert!(v.is_completed);
    }
}
