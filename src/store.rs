// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, ToSql};
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::errors::{Error, Result};
use crate::models::{
    Category, CategoryPatch, Goal, GoalPatch, GoalType, Investment, InvestmentPatch,
    NewCategory, NewGoal, NewInvestment, NewTransaction, Transaction, TransactionPatch,
    TransactionRow, TxKind, DEFAULT_CATEGORY_COLOR, DEFAULT_CATEGORY_ICON, UNCATEGORIZED,
};

/// Optional narrowing for transaction queries. Dates are inclusive.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub kind: Option<TxKind>,
    pub category_id: Option<i64>,
    pub skip: Option<usize>,
    pub limit: Option<usize>,
}

impl TransactionFilter {
    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start_date: Some(start),
            end_date: Some(end),
            ..Self::default()
        }
    }
}

/// What the aggregation layer needs from persistence.
pub trait LedgerStore {
    /// Matching transactions, most recent first; ties on date keep the
    /// newest id first.
    fn query_transactions(&self, user_id: i64, filter: &TransactionFilter)
    -> Result<Vec<Transaction>>;

    fn query_investments(&self, user_id: i64) -> Result<Vec<Investment>>;

    fn query_categories(&self, user_id: i64, include_inactive: bool) -> Result<Vec<Category>>;

    fn query_goals(&self, user_id: i64, active_only: bool) -> Result<Vec<Goal>>;

    fn upsert_goal_amount(&self, goal_id: i64, amount: Decimal) -> Result<()>;

    /// Category name, or [`UNCATEGORIZED`] when the id is unknown.
    fn category_name_by_id(&self, category_id: i64) -> Result<String>;
}

pub struct SqliteLedger<'a> {
    conn: &'a Connection,
}

fn corrupt(idx: usize, msg: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(Error::Corrupt(msg)))
}

fn decimal_at(r: &Row, idx: usize) -> rusqlite::Result<Decimal> {
    let s: String = r.get(idx)?;
    Decimal::from_str(s.trim()).map_err(|e| corrupt(idx, format!("decimal '{}': {}", s, e)))
}

fn kind_at(r: &Row, idx: usize) -> rusqlite::Result<TxKind> {
    let s: String = r.get(idx)?;
    TxKind::from_str(&s).map_err(|_| corrupt(idx, format!("kind '{}'", s)))
}

const TX_COLUMNS: &str = "t.id, t.user_id, t.description, t.amount, t.kind, t.category_id, t.date, t.notes";

fn transaction_from_row(r: &Row) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: r.get(0)?,
        user_id: r.get(1)?,
        description: r.get(2)?,
        amount: decimal_at(r, 3)?,
        kind: kind_at(r, 4)?,
        category_id: r.get(5)?,
        date: r.get(6)?,
        notes: r.get(7)?,
    })
}

const CATEGORY_COLUMNS: &str = "id, user_id, name, description, kind, color, icon, is_active";

fn category_from_row(r: &Row) -> rusqlite::Result<Category> {
    Ok(Category {
        id: r.get(0)?,
        user_id: r.get(1)?,
        name: r.get(2)?,
        description: r.get(3)?,
        kind: kind_at(r, 4)?,
        color: r.get(5)?,
        icon: r.get(6)?,
        is_active: r.get(7)?,
    })
}

const INVESTMENT_COLUMNS: &str =
    "id, user_id, name, type, amount_invested, current_value, purchase_date, description";

fn investment_from_row(r: &Row) -> rusqlite::Result<Investment> {
    Ok(Investment {
        id: r.get(0)?,
        user_id: r.get(1)?,
        name: r.get(2)?,
        r#type: r.get(3)?,
        amount_invested: decimal_at(r, 4)?,
        current_value: decimal_at(r, 5)?,
        purchase_date: r.get(6)?,
        description: r.get(7)?,
    })
}

const GOAL_COLUMNS: &str = "id, user_id, title, description, goal_type, target_amount, current_amount, period_type, start_date, end_date, category_id, is_active";

fn goal_from_row(r: &Row) -> rusqlite::Result<Goal> {
    Ok(Goal {
        id: r.get(0)?,
        user_id: r.get(1)?,
        title: r.get(2)?,
        description: r.get(3)?,
        goal_type: GoalType::from(r.get::<_, String>(4)?),
        target_amount: decimal_at(r, 5)?,
        current_amount: decimal_at(r, 6)?,
        period_type: r.get(7)?,
        start_date: r.get(8)?,
        end_date: r.get(9)?,
        category_id: r.get(10)?,
        is_active: r.get(11)?,
    })
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::invalid(format!("{} must not be empty", field)));
    }
    Ok(())
}

/// Largest magnitude accepted for a stored amount. Sums over any realistic
/// number of rows stay far below `Decimal::MAX`.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000_000;

fn require_bounded(field: &str, value: Decimal) -> Result<()> {
    if value.abs() > Decimal::from(MAX_AMOUNT) {
        return Err(Error::invalid(format!(
            "{} exceeds {} (got {})",
            field, MAX_AMOUNT, value
        )));
    }
    Ok(())
}

fn require_non_negative(field: &str, value: Decimal) -> Result<()> {
    if value < Decimal::ZERO {
        return Err(Error::invalid(format!(
            "{} must not be negative (got {})",
            field, value
        )));
    }
    require_bounded(field, value)
}

fn validate_transaction(t: &Transaction) -> Result<()> {
    require_text("description", &t.description)?;
    if t.amount <= Decimal::ZERO {
        return Err(Error::invalid(format!(
            "amount must be positive (got {})",
            t.amount
        )));
    }
    require_bounded("amount", t.amount)
}

fn validate_investment(i: &Investment) -> Result<()> {
    require_text("name", &i.name)?;
    require_text("type", &i.r#type)?;
    require_non_negative("amount_invested", i.amount_invested)?;
    require_non_negative("current_value", i.current_value)
}

fn validate_goal(g: &Goal) -> Result<()> {
    require_text("title", &g.title)?;
    require_non_negative("target_amount", g.target_amount)?;
    require_bounded("current_amount", g.current_amount)?;
    if g.end_date < g.start_date {
        return Err(Error::invalid(format!(
            "end date {} is before start date {}",
            g.end_date, g.start_date
        )));
    }
    Ok(())
}

impl<'a> SqliteLedger<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    // Categories

    pub fn create_category(&self, user_id: i64, new: NewCategory) -> Result<Category> {
        require_text("name", &new.name)?;
        self.conn.execute(
            "INSERT INTO categories(user_id, name, description, kind, color, icon)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                user_id,
                new.name.trim(),
                new.description,
                new.kind.as_str(),
                new.color.as_deref().unwrap_or(DEFAULT_CATEGORY_COLOR),
                new.icon.as_deref().unwrap_or(DEFAULT_CATEGORY_ICON),
            ],
        )?;
        self.get_category(user_id, self.conn.last_insert_rowid())
    }

    pub fn get_category(&self, user_id: i64, id: i64) -> Result<Category> {
        let sql = format!(
            "SELECT {} FROM categories WHERE id=?1 AND user_id=?2",
            CATEGORY_COLUMNS
        );
        self.conn
            .query_row(&sql, params![id, user_id], category_from_row)
            .optional()?
            .ok_or_else(|| Error::not_found("category", id))
    }

    pub fn list_categories(
        &self,
        user_id: i64,
        kind: Option<TxKind>,
        include_inactive: bool,
    ) -> Result<Vec<Category>> {
        let mut sql = format!("SELECT {} FROM categories WHERE user_id=?1", CATEGORY_COLUMNS);
        if !include_inactive {
            sql.push_str(" AND is_active=1");
        }
        if kind.is_some() {
            sql.push_str(" AND kind=?2");
        }
        sql.push_str(" ORDER BY kind DESC, name, id");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = match kind {
            Some(k) => stmt.query_map(params![user_id, k.as_str()], category_from_row)?,
            None => stmt.query_map(params![user_id], category_from_row)?,
        };
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn update_category(&self, user_id: i64, id: i64, patch: CategoryPatch) -> Result<Category> {
        let mut c = self.get_category(user_id, id)?;
        if let Some(v) = patch.name {
            c.name = v.trim().to_string();
        }
        if let Some(v) = patch.description {
            c.description = Some(v);
        }
        if let Some(v) = patch.color {
            c.color = v;
        }
        if let Some(v) = patch.icon {
            c.icon = v;
        }
        if let Some(v) = patch.is_active {
            c.is_active = v;
        }
        require_text("name", &c.name)?;
        self.conn.execute(
            "UPDATE categories SET name=?1, description=?2, color=?3, icon=?4, is_active=?5
             WHERE id=?6 AND user_id=?7",
            params![c.name, c.description, c.color, c.icon, c.is_active, id, user_id],
        )?;
        Ok(c)
    }

    /// Soft delete: the row stays so historical transactions keep their name.
    pub fn delete_category(&self, user_id: i64, id: i64) -> Result<()> {
        let n = self.conn.execute(
            "UPDATE categories SET is_active=0 WHERE id=?1 AND user_id=?2",
            params![id, user_id],
        )?;
        if n == 0 {
            return Err(Error::not_found("category", id));
        }
        Ok(())
    }

    /// Insert the starter income/expense categories for a user with none.
    /// Returns how many were created.
    pub fn seed_default_categories(&self, user_id: i64) -> Result<usize> {
        let existing: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM categories WHERE user_id=?1",
            params![user_id],
            |r| r.get(0),
        )?;
        if existing > 0 {
            debug!(user_id, existing, "categories already present, skipping seed");
            return Ok(0);
        }
        let defaults: [(&str, TxKind, &str, &str); 11] = [
            ("Salary", TxKind::Income, "💼", "#10B981"),
            ("Freelance", TxKind::Income, "💻", "#059669"),
            ("Investments", TxKind::Income, "📈", "#047857"),
            ("Other income", TxKind::Income, "💰", "#065F46"),
            ("Food", TxKind::Expense, "🍕", "#EF4444"),
            ("Transport", TxKind::Expense, "🚗", "#DC2626"),
            ("Housing", TxKind::Expense, "🏠", "#B91C1C"),
            ("Health", TxKind::Expense, "🏥", "#991B1B"),
            ("Education", TxKind::Expense, "📚", "#7F1D1D"),
            ("Leisure", TxKind::Expense, "🎮", "#6B1D1D"),
            ("Shopping", TxKind::Expense, "🛒", "#5B1D1D"),
        ];
        for (name, kind, icon, color) in defaults {
            self.create_category(
                user_id,
                NewCategory {
                    name: name.to_string(),
                    description: None,
                    kind,
                    color: Some(color.to_string()),
                    icon: Some(icon.to_string()),
                },
            )?;
        }
        Ok(defaults.len())
    }

    // Transactions

    fn check_category(&self, user_id: i64, category_id: Option<i64>, kind: TxKind) -> Result<()> {
        let Some(cid) = category_id else {
            return Ok(());
        };
        let cat = self.get_category(user_id, cid)?;
        if cat.kind != kind {
            warn!(
                category_id = cid,
                category_kind = %cat.kind,
                transaction_kind = %kind,
                "transaction kind does not match its category"
            );
        }
        Ok(())
    }

    pub fn create_transaction(&self, user_id: i64, new: NewTransaction) -> Result<Transaction> {
        let mut t = Transaction {
            id: 0,
            user_id,
            description: new.description.trim().to_string(),
            amount: new.amount,
            kind: new.kind,
            category_id: new.category_id,
            date: new.date,
            notes: new.notes,
        };
        validate_transaction(&t)?;
        self.check_category(user_id, t.category_id, t.kind)?;
        self.conn.execute(
            "INSERT INTO transactions(user_id, description, amount, kind, category_id, date, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                user_id,
                t.description,
                t.amount.to_string(),
                t.kind.as_str(),
                t.category_id,
                t.date,
                t.notes,
            ],
        )?;
        t.id = self.conn.last_insert_rowid();
        debug!(user_id, id = t.id, "transaction created");
        Ok(t)
    }

    pub fn get_transaction(&self, user_id: i64, id: i64) -> Result<Transaction> {
        let sql = format!(
            "SELECT {} FROM transactions t WHERE t.id=?1 AND t.user_id=?2",
            TX_COLUMNS
        );
        self.conn
            .query_row(&sql, params![id, user_id], transaction_from_row)
            .optional()?
            .ok_or_else(|| Error::not_found("transaction", id))
    }

    pub fn update_transaction(
        &self,
        user_id: i64,
        id: i64,
        patch: TransactionPatch,
    ) -> Result<Transaction> {
        let mut t = self.get_transaction(user_id, id)?;
        if let Some(v) = patch.description {
            t.description = v.trim().to_string();
        }
        if let Some(v) = patch.amount {
            t.amount = v;
        }
        if let Some(v) = patch.kind {
            t.kind = v;
        }
        if let Some(v) = patch.category_id {
            t.category_id = v;
        }
        if let Some(v) = patch.date {
            t.date = v;
        }
        if let Some(v) = patch.notes {
            t.notes = Some(v);
        }
        validate_transaction(&t)?;
        self.check_category(user_id, t.category_id, t.kind)?;
        self.conn.execute(
            "UPDATE transactions SET description=?1, amount=?2, kind=?3, category_id=?4, date=?5,
             notes=?6, updated_at=datetime('now') WHERE id=?7 AND user_id=?8",
            params![
                t.description,
                t.amount.to_string(),
                t.kind.as_str(),
                t.category_id,
                t.date,
                t.notes,
                id,
                user_id,
            ],
        )?;
        Ok(t)
    }

    pub fn delete_transaction(&self, user_id: i64, id: i64) -> Result<()> {
        let n = self.conn.execute(
            "DELETE FROM transactions WHERE id=?1 AND user_id=?2",
            params![id, user_id],
        )?;
        if n == 0 {
            return Err(Error::not_found("transaction", id));
        }
        Ok(())
    }

    /// Filtered transactions joined with their category names.
    pub fn list_transaction_rows(
        &self,
        user_id: i64,
        filter: &TransactionFilter,
    ) -> Result<Vec<TransactionRow>> {
        self.select_transactions(user_id, filter, true, |r| {
            let transaction = transaction_from_row(r)?;
            let category: Option<String> = r.get(8)?;
            Ok(TransactionRow {
                transaction,
                category: category.unwrap_or_else(|| UNCATEGORIZED.to_string()),
            })
        })
    }

    fn select_transactions<T, F>(
        &self,
        user_id: i64,
        filter: &TransactionFilter,
        with_category: bool,
        map: F,
    ) -> Result<Vec<T>>
    where
        F: FnMut(&Row) -> rusqlite::Result<T>,
    {
        let mut sql = format!("SELECT {}", TX_COLUMNS);
        if with_category {
            sql.push_str(", c.name FROM transactions t LEFT JOIN categories c ON t.category_id=c.id");
        } else {
            sql.push_str(" FROM transactions t");
        }
        sql.push_str(" WHERE t.user_id=?");
        let mut args: Vec<Box<dyn ToSql>> = vec![Box::new(user_id)];

        if let Some(start) = filter.start_date {
            sql.push_str(" AND t.date>=?");
            args.push(Box::new(start));
        }
        if let Some(end) = filter.end_date {
            sql.push_str(" AND t.date<=?");
            args.push(Box::new(end));
        }
        if let Some(kind) = filter.kind {
            sql.push_str(" AND t.kind=?");
            args.push(Box::new(kind.as_str()));
        }
        if let Some(cid) = filter.category_id {
            sql.push_str(" AND t.category_id=?");
            args.push(Box::new(cid));
        }
        sql.push_str(" ORDER BY t.date DESC, t.id DESC");
        if filter.limit.is_some() || filter.skip.is_some() {
            sql.push_str(" LIMIT ? OFFSET ?");
            let limit = filter.limit.map(|l| l as i64).unwrap_or(-1);
            let skip = filter.skip.unwrap_or(0) as i64;
            args.push(Box::new(limit));
            args.push(Box::new(skip));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(
            rusqlite::params_from_iter(args.iter().map(|a| a.as_ref())),
            map,
        )?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    // Investments

    pub fn create_investment(&self, user_id: i64, new: NewInvestment) -> Result<Investment> {
        let mut i = Investment {
            id: 0,
            user_id,
            name: new.name.trim().to_string(),
            r#type: new.r#type.trim().to_string(),
            amount_invested: new.amount_invested,
            current_value: new.current_value,
            purchase_date: new.purchase_date,
            description: new.description,
        };
        validate_investment(&i)?;
        self.conn.execute(
            "INSERT INTO investments(user_id, name, type, amount_invested, current_value,
             purchase_date, description) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                user_id,
                i.name,
                i.r#type,
                i.amount_invested.to_string(),
                i.current_value.to_string(),
                i.purchase_date,
                i.description,
            ],
        )?;
        i.id = self.conn.last_insert_rowid();
        Ok(i)
    }

    pub fn get_investment(&self, user_id: i64, id: i64) -> Result<Investment> {
        let sql = format!(
            "SELECT {} FROM investments WHERE id=?1 AND user_id=?2",
            INVESTMENT_COLUMNS
        );
        self.conn
            .query_row(&sql, params![id, user_id], investment_from_row)
            .optional()?
            .ok_or_else(|| Error::not_found("investment", id))
    }

    pub fn update_investment(
        &self,
        user_id: i64,
        id: i64,
        patch: InvestmentPatch,
    ) -> Result<Investment> {
        let mut i = self.get_investment(user_id, id)?;
        if let Some(v) = patch.name {
            i.name = v.trim().to_string();
        }
        if let Some(v) = patch.r#type {
            i.r#type = v.trim().to_string();
        }
        if let Some(v) = patch.amount_invested {
            i.amount_invested = v;
        }
        if let Some(v) = patch.current_value {
            i.current_value = v;
        }
        if let Some(v) = patch.purchase_date {
            i.purchase_date = v;
        }
        if let Some(v) = patch.description {
            i.description = Some(v);
        }
        validate_investment(&i)?;
        self.conn.execute(
            "UPDATE investments SET name=?1, type=?2, amount_invested=?3, current_value=?4,
             purchase_date=?5, description=?6, updated_at=datetime('now')
             WHERE id=?7 AND user_id=?8",
            params![
                i.name,
                i.r#type,
                i.amount_invested.to_string(),
                i.current_value.to_string(),
                i.purchase_date,
                i.description,
                id,
                user_id,
            ],
        )?;
        Ok(i)
    }

    pub fn delete_investment(&self, user_id: i64, id: i64) -> Result<()> {
        let n = self.conn.execute(
            "DELETE FROM investments WHERE id=?1 AND user_id=?2",
            params![id, user_id],
        )?;
        if n == 0 {
            return Err(Error::not_found("investment", id));
        }
        Ok(())
    }

    // Goals

    pub fn create_goal(&self, user_id: i64, new: NewGoal) -> Result<Goal> {
        let mut g = Goal {
            id: 0,
            user_id,
            title: new.title.trim().to_string(),
            description: new.description,
            goal_type: new.goal_type,
            target_amount: new.target_amount,
            current_amount: new.current_amount,
            period_type: new.period_type,
            start_date: new.start_date,
            end_date: new.end_date,
            category_id: new.category_id,
            is_active: true,
        };
        validate_goal(&g)?;
        if let Some(cid) = g.category_id {
            self.get_category(user_id, cid)?;
        }
        self.conn.execute(
            "INSERT INTO goals(user_id, title, description, goal_type, target_amount,
             current_amount, period_type, start_date, end_date, category_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                user_id,
                g.title,
                g.description,
                g.goal_type.as_str(),
                g.target_amount.to_string(),
                g.current_amount.to_string(),
                g.period_type,
                g.start_date,
                g.end_date,
                g.category_id,
            ],
        )?;
        g.id = self.conn.last_insert_rowid();
        Ok(g)
    }

    pub fn get_goal(&self, user_id: i64, id: i64) -> Result<Goal> {
        let sql = format!(
            "SELECT {} FROM goals WHERE id=?1 AND user_id=?2",
            GOAL_COLUMNS
        );
        self.conn
            .query_row(&sql, params![id, user_id], goal_from_row)
            .optional()?
            .ok_or_else(|| Error::not_found("goal", id))
    }

    pub fn update_goal(&self, user_id: i64, id: i64, patch: GoalPatch) -> Result<Goal> {
        let mut g = self.get_goal(user_id, id)?;
        if let Some(v) = patch.title {
            g.title = v.trim().to_string();
        }
        if let Some(v) = patch.description {
            g.description = Some(v);
        }
        if let Some(v) = patch.goal_type {
            g.goal_type = v;
        }
        if let Some(v) = patch.target_amount {
            g.target_amount = v;
        }
        if let Some(v) = patch.current_amount {
            g.current_amount = v;
        }
        if let Some(v) = patch.period_type {
            g.period_type = v;
        }
        if let Some(v) = patch.start_date {
            g.start_date = v;
        }
        if let Some(v) = patch.end_date {
            g.end_date = v;
        }
        if let Some(v) = patch.category_id {
            if let Some(cid) = v {
                self.get_category(user_id, cid)?;
            }
            g.category_id = v;
        }
        if let Some(v) = patch.is_active {
            g.is_active = v;
        }
        validate_goal(&g)?;
        self.conn.execute(
            "UPDATE goals SET title=?1, description=?2, goal_type=?3, target_amount=?4,
             current_amount=?5, period_type=?6, start_date=?7, end_date=?8, category_id=?9,
             is_active=?10, updated_at=datetime('now') WHERE id=?11 AND user_id=?12",
            params![
                g.title,
                g.description,
                g.goal_type.as_str(),
                g.target_amount.to_string(),
                g.current_amount.to_string(),
                g.period_type,
                g.start_date,
                g.end_date,
                g.category_id,
                g.is_active,
                id,
                user_id,
            ],
        )?;
        Ok(g)
    }

    pub fn delete_goal(&self, user_id: i64, id: i64) -> Result<()> {
        let n = self.conn.execute(
            "DELETE FROM goals WHERE id=?1 AND user_id=?2",
            params![id, user_id],
        )?;
        if n == 0 {
            return Err(Error::not_found("goal", id));
        }
        Ok(())
    }
}

impl LedgerStore for SqliteLedger<'_> {
    fn query_transactions(
        &self,
        user_id: i64,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>> {
        self.select_transactions(user_id, filter, false, transaction_from_row)
    }

    fn query_investments(&self, user_id: i64) -> Result<Vec<Investment>> {
        let sql = format!(
            "SELECT {} FROM investments WHERE user_id=?1 ORDER BY purchase_date DESC, id DESC",
            INVESTMENT_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![user_id], investment_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn query_categories(&self, user_id: i64, include_inactive: bool) -> Result<Vec<Category>> {
        self.list_categories(user_id, None, include_inactive)
    }

    fn query_goals(&self, user_id: i64, active_only: bool) -> Result<Vec<Goal>> {
        let mut sql = format!("SELECT {} FROM goals WHERE user_id=?1", GOAL_COLUMNS);
        if active_only {
            sql.push_str(" AND is_active=1");
        }
        sql.push_str(" ORDER BY end_date, id");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![user_id], goal_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn upsert_goal_amount(&self, goal_id: i64, amount: Decimal) -> Result<()> {
        let n = self.conn.execute(
            "UPDATE goals SET current_amount=?1, updated_at=datetime('now') WHERE id=?2",
            params![amount.to_string(), goal_id],
        )?;
        if n == 0 {
            return Err(Error::not_found("goal", goal_id));
        }
        Ok(())
    }

    fn category_name_by_id(&self, category_id: i64) -> Result<String> {
        let name: Option<String> = self
            .conn
            .query_row(
                "SELECT name FROM categories WHERE id=?1",
                params![category_id],
                |r| r.get(0),
            )
            .optional()?;
        Ok(name.unwrap_or_else(|| UNCATEGORIZED.to_string()))
    }
}
