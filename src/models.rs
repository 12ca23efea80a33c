// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::Error;

/// Name reported for transactions whose category is missing or unknown.
pub const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxKind {
    Income,
    Expense,
}

impl TxKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxKind::Income => "income",
            TxKind::Expense => "expense",
        }
    }
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TxKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(TxKind::Income),
            "expense" => Ok(TxKind::Expense),
            other => Err(Error::invalid(format!(
                "unknown kind '{}', expected income|expense",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub description: String,
    pub amount: Decimal,
    pub kind: TxKind,
    pub category_id: Option<i64>,
    pub date: NaiveDate,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTransaction {
    pub description: String,
    pub amount: Decimal,
    pub kind: TxKind,
    pub category_id: Option<i64>,
    pub date: NaiveDate,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionPatch {
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub kind: Option<TxKind>,
    /// `Some(None)` clears the category.
    pub category_id: Option<Option<i64>>,
    pub date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// A transaction joined with its category name, as listed to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRow {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub kind: TxKind,
    pub color: String,
    pub icon: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
    pub kind: TxKind,
    pub color: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub is_active: Option<bool>,
}

pub const DEFAULT_CATEGORY_COLOR: &str = "#3B82F6";
pub const DEFAULT_CATEGORY_ICON: &str = "💰";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Investment {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub r#type: String,
    pub amount_invested: Decimal,
    pub current_value: Decimal,
    pub purchase_date: NaiveDate,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewInvestment {
    pub name: String,
    pub r#type: String,
    pub amount_invested: Decimal,
    pub current_value: Decimal,
    pub purchase_date: NaiveDate,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvestmentPatch {
    pub name: Option<String>,
    pub r#type: Option<String>,
    pub amount_invested: Option<Decimal>,
    pub current_value: Option<Decimal>,
    pub purchase_date: Option<NaiveDate>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentView {
    #[serde(flatten)]
    pub investment: Investment,
    pub profit_loss: Decimal,
    pub profit_loss_percentage: Decimal,
}

/// How a goal's current amount is derived from the ledger.
///
/// Unrecognised tags are kept verbatim so they round-trip through storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GoalType {
    ExpenseLimit,
    SavingsTarget,
    InvestmentGoal,
    Other(String),
}

impl GoalType {
    pub fn as_str(&self) -> &str {
        match self {
            GoalType::ExpenseLimit => "expense_limit",
            GoalType::SavingsTarget => "savings_target",
            GoalType::InvestmentGoal => "investment_goal",
            GoalType::Other(s) => s,
        }
    }
}

impl From<String> for GoalType {
    fn from(s: String) -> Self {
        match s.trim() {
            "expense_limit" => GoalType::ExpenseLimit,
            "savings_target" => GoalType::SavingsTarget,
            "investment_goal" => GoalType::InvestmentGoal,
            _ => GoalType::Other(s),
        }
    }
}

impl From<GoalType> for String {
    fn from(t: GoalType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for GoalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub goal_type: GoalType,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub period_type: String, // monthly | yearly | custom
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub category_id: Option<i64>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGoal {
    pub title: String,
    pub description: Option<String>,
    pub goal_type: GoalType,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub period_type: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub category_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoalPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub goal_type: Option<GoalType>,
    pub target_amount: Option<Decimal>,
    pub current_amount: Option<Decimal>,
    pub period_type: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// `Some(None)` clears the category.
    pub category_id: Option<Option<i64>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    Completed,
    Active,
    Paused,
}

impl fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GoalStatus::Completed => "completed",
            GoalStatus::Active => "active",
            GoalStatus::Paused => "paused",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalView {
    #[serde(flatten)]
    pub goal: Goal,
    pub progress_percentage: Decimal,
    pub remaining_amount: Decimal,
    pub is_completed: bool,
    pub status: GoalStatus,
}
