// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Dashboard and summary views assembled from store queries.
//!
//! Every operation takes the user id explicitly. Only
//! [`Aggregator::refresh_and_summarize_goals`] (and [`Aggregator::refresh_goals`])
//! write: they persist each active goal's recomputed `current_amount`.

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

use crate::engine::{self, Balance, GoalAmount, MonthlySummary, YearMonth};
use crate::errors::{Error, Result};
use crate::models::{Category, Goal, GoalType, GoalView, TransactionRow, TxKind, UNCATEGORIZED};
use crate::store::{LedgerStore, TransactionFilter};

pub const RECENT_TRANSACTIONS: usize = 5;
pub const EXPIRING_WINDOW_DAYS: u64 = 7;
pub const MAX_CHART_MONTHS: u32 = 120;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub balance: Decimal,
    pub transaction_count: usize,
    pub recent_transactions: Vec<TransactionRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentTypeSummary {
    pub r#type: String,
    pub invested: Decimal,
    pub current_value: Decimal,
    pub count: usize,
    pub profit_loss: Decimal,
    pub profit_loss_percentage: Decimal,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentsSummary {
    pub total_invested: Decimal,
    pub total_current_value: Decimal,
    pub profit_loss: Decimal,
    pub profit_loss_percentage: Decimal,
    pub by_type: Vec<InvestmentTypeSummary>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalTypeStats {
    pub count: usize,
    pub completed: usize,
    pub total_target: Decimal,
    pub total_current: Decimal,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalsSummary {
    pub total_goals: usize,
    pub completed_goals: usize,
    pub in_progress_goals: usize,
    pub completion_rate: Decimal,
    pub goals_by_type: BTreeMap<String, GoalTypeStats>,
    pub expiring_soon: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub month: String,
    pub income: Decimal,
    pub expense: Decimal,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStat {
    #[serde(flatten)]
    pub category: Category,
    pub transaction_count: usize,
    pub total_amount: Decimal,
}

pub struct Aggregator<'a, S: LedgerStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: LedgerStore + ?Sized> Aggregator<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    fn category_names<I>(&self, ids: I) -> Result<HashMap<i64, String>>
    where
        I: IntoIterator<Item = i64>,
    {
        let mut names = HashMap::new();
        for id in ids {
            if !names.contains_key(&id) {
                names.insert(id, self.store.category_name_by_id(id)?);
            }
        }
        Ok(names)
    }

    pub fn balance(&self, user_id: i64) -> Result<Balance> {
        let txs = self
            .store
            .query_transactions(user_id, &TransactionFilter::default())?;
        Ok(engine::balance(&txs))
    }

    pub fn dashboard_stats(&self, user_id: i64) -> Result<DashboardStats> {
        let txs = self
            .store
            .query_transactions(user_id, &TransactionFilter::default())?;
        let totals = engine::balance(&txs);

        // Store order is date DESC, id DESC.
        let recent: Vec<_> = txs.iter().take(RECENT_TRANSACTIONS).cloned().collect();
        let names = self.category_names(recent.iter().filter_map(|t| t.category_id))?;
        let recent_transactions = recent
            .into_iter()
            .map(|t| {
                let category = t
                    .category_id
                    .and_then(|id| names.get(&id).cloned())
                    .unwrap_or_else(|| UNCATEGORIZED.to_string());
                TransactionRow {
                    transaction: t,
                    category,
                }
            })
            .collect();

        debug!(user_id, count = txs.len(), "dashboard stats built");
        Ok(DashboardStats {
            total_income: totals.income,
            total_expense: totals.expense,
            balance: totals.balance,
            transaction_count: txs.len(),
            recent_transactions,
        })
    }

    pub fn investments_summary(&self, user_id: i64) -> Result<InvestmentsSummary> {
        let investments = self.store.query_investments(user_id)?;

        let mut total_invested = Decimal::ZERO;
        let mut total_current_value = Decimal::ZERO;
        let mut groups: BTreeMap<String, (Decimal, Decimal, usize)> = BTreeMap::new();
        for inv in &investments {
            total_invested += inv.amount_invested;
            total_current_value += inv.current_value;
            let entry = groups
                .entry(inv.r#type.clone())
                .or_insert((Decimal::ZERO, Decimal::ZERO, 0));
            entry.0 += inv.amount_invested;
            entry.1 += inv.current_value;
            entry.2 += 1;
        }

        let by_type = groups
            .into_iter()
            .map(|(r#type, (invested, current_value, count))| {
                let pl = engine::profit_loss(invested, current_value);
                InvestmentTypeSummary {
                    r#type,
                    invested,
                    current_value,
                    count,
                    profit_loss: pl.delta,
                    profit_loss_percentage: pl.percentage,
                }
            })
            .collect();
        let pl = engine::profit_loss(total_invested, total_current_value);

        Ok(InvestmentsSummary {
            total_invested,
            total_current_value,
            profit_loss: pl.delta,
            profit_loss_percentage: pl.percentage,
            by_type,
        })
    }

    /// Recompute and persist `current_amount` for every active goal.
    pub fn refresh_goals(&self, user_id: i64) -> Result<Vec<Goal>> {
        let mut goals = self.store.query_goals(user_id, true)?;
        if goals.is_empty() {
            return Ok(goals);
        }

        let start = goals.iter().map(|g| g.start_date).min();
        let end = goals.iter().map(|g| g.end_date).max();
        let filter = TransactionFilter {
            start_date: start,
            end_date: end,
            ..TransactionFilter::default()
        };
        let txs = self.store.query_transactions(user_id, &filter)?;
        let investments = if goals
            .iter()
            .any(|g| g.goal_type == GoalType::InvestmentGoal)
        {
            self.store.query_investments(user_id)?
        } else {
            Vec::new()
        };

        for goal in goals.iter_mut() {
            let amount = match engine::goal_current_amount(goal, &txs, &investments) {
                GoalAmount::Computed(a) => a,
                GoalAmount::Unsupported => {
                    warn!(
                        goal_id = goal.id,
                        goal_type = %goal.goal_type,
                        "unsupported goal type, current amount reset to zero"
                    );
                    Decimal::ZERO
                }
            };
            self.store.upsert_goal_amount(goal.id, amount)?;
            debug!(goal_id = goal.id, %amount, "goal amount refreshed");
            goal.current_amount = amount;
        }
        Ok(goals)
    }

    /// Refreshes every active goal (persisting the new amounts) and then
    /// summarises them. Not a pure read.
    pub fn refresh_and_summarize_goals(
        &self,
        user_id: i64,
        today: NaiveDate,
    ) -> Result<GoalsSummary> {
        let goals = self.refresh_goals(user_id)?;
        let horizon = today
            .checked_add_days(Days::new(EXPIRING_WINDOW_DAYS))
            .unwrap_or(NaiveDate::MAX);

        let mut completed_goals = 0;
        let mut expiring_soon = 0;
        let mut goals_by_type: BTreeMap<String, GoalTypeStats> = BTreeMap::new();
        for g in &goals {
            let completed = engine::goal_progress(g.target_amount, g.current_amount).completed;
            let stats = goals_by_type
                .entry(g.goal_type.to_string())
                .or_default();
            stats.count += 1;
            stats.total_target += g.target_amount;
            stats.total_current += g.current_amount;
            if completed {
                completed_goals += 1;
                stats.completed += 1;
            } else if today <= g.end_date && g.end_date <= horizon {
                expiring_soon += 1;
            }
        }

        let total_goals = goals.len();
        let completion_rate = engine::percent_of(
            Decimal::from(completed_goals as u64),
            Decimal::from(total_goals as u64),
        );
        debug!(user_id, total_goals, completed_goals, "goals summary built");
        Ok(GoalsSummary {
            total_goals,
            completed_goals,
            in_progress_goals: total_goals - completed_goals,
            completion_rate,
            goals_by_type,
            expiring_soon,
        })
    }

    pub fn goal_views(&self, user_id: i64, active_only: bool) -> Result<Vec<GoalView>> {
        let goals = self.store.query_goals(user_id, active_only)?;
        Ok(goals.into_iter().map(engine::goal_view).collect())
    }

    pub fn monthly_summary(&self, user_id: i64, year: i32, month: u32) -> Result<MonthlySummary> {
        let ym = YearMonth::new(year, month)?;
        let txs = self
            .store
            .query_transactions(user_id, &TransactionFilter::between(ym.first_day(), ym.last_day()))?;
        let names = self.category_names(
            txs.iter()
                .filter(|t| t.kind == TxKind::Expense)
                .filter_map(|t| t.category_id),
        )?;
        Ok(engine::monthly_summary(&txs, ym, &names))
    }

    /// Per-month income and expense for the last `months_back` calendar
    /// months, the current one included. Months without transactions are
    /// omitted; points are in ascending month order.
    pub fn monthly_chart_series(
        &self,
        user_id: i64,
        months_back: u32,
        today: NaiveDate,
    ) -> Result<Vec<ChartPoint>> {
        if months_back == 0 || months_back > MAX_CHART_MONTHS {
            return Err(Error::invalid(format!(
                "months must be between 1 and {} (got {})",
                MAX_CHART_MONTHS, months_back
            )));
        }
        let current = YearMonth::of(today);
        let first = current.months_before(months_back - 1);
        let txs = self.store.query_transactions(
            user_id,
            &TransactionFilter::between(first.first_day(), current.last_day()),
        )?;

        let mut by_month: BTreeMap<YearMonth, (Decimal, Decimal)> = BTreeMap::new();
        for t in &txs {
            let entry = by_month
                .entry(YearMonth::of(t.date))
                .or_insert((Decimal::ZERO, Decimal::ZERO));
            match t.kind {
                TxKind::Income => entry.0 += t.amount,
                TxKind::Expense => entry.1 += t.amount,
            }
        }
        Ok(by_month
            .into_iter()
            .map(|(m, (income, expense))| ChartPoint {
                month: m.to_string(),
                income,
                expense,
            })
            .collect())
    }

    pub fn category_stats(&self, user_id: i64) -> Result<Vec<CategoryStat>> {
        let categories = self.store.query_categories(user_id, false)?;
        let txs = self
            .store
            .query_transactions(user_id, &TransactionFilter::default())?;
        let mut per_cat: HashMap<i64, (usize, Decimal)> = HashMap::new();
        for t in &txs {
            if let Some(cid) = t.category_id {
                let e = per_cat.entry(cid).or_insert((0, Decimal::ZERO));
                e.0 += 1;
                e.1 += t.amount;
            }
        }
        Ok(categories
            .into_iter()
            .map(|category| {
                let (transaction_count, total_amount) = per_cat
                    .get(&category.id)
                    .copied()
                    .unwrap_or((0, Decimal::ZERO));
                CategoryStat {
                    category,
                    transaction_count,
                    total_amount,
                }
            })
            .collect())
    }
}
