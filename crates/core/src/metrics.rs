//! Aggregate figures derived from a profile and its transaction history.
//!
//! Everything here is recomputed per call and never persisted.

use crate::domain::profile::Profile;
use crate::domain::transaction::Transaction;
use crate::time::in_recency_window;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Months of expenses an emergency fund should cover.
pub const EMERGENCY_FUND_MONTHS: f64 = 6.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub total_income: f64,
    pub total_expenses: f64,
    pub balance: f64,
    pub monthly_expenses: f64,
    pub free_cash_flow: f64,
    pub savings_rate: f64,
    pub emergency_fund_target: f64,
    /// Expense totals for the last 30 days, in first-seen category order.
    pub recent_expenses_by_category: Vec<CategoryTotal>,
}

impl Metrics {
    /// Largest 30-day category. Ties go to the category seen first in the
    /// transaction list; that ordering is incidental rather than a business rule.
    pub fn top_expense_category(&self) -> Option<&CategoryTotal> {
        let mut top: Option<&CategoryTotal> = None;
        for entry in &self.recent_expenses_by_category {
            match top {
                Some(current) if entry.total <= current.total => {}
                _ => top = Some(entry),
            }
        }
        top
    }
}

pub fn calculate(profile: &Profile, transactions: &[Transaction], as_of: NaiveDate) -> Metrics {
    let total_income: f64 = transactions
        .iter()
        .filter(|t| t.is_income())
        .map(Transaction::counted_amount)
        .sum();
    let total_expenses: f64 = transactions
        .iter()
        .filter(|t| t.is_expense())
        .map(Transaction::counted_amount)
        .sum();

    let monthly_expenses = profile.monthly_expenses();
    let free_cash_flow = profile.monthly_income - monthly_expenses;

    let recent = transactions
        .iter()
        .filter(|t| t.is_expense() && in_recency_window(t.date, as_of));

    Metrics {
        total_income,
        total_expenses,
        balance: total_income - total_expenses,
        monthly_expenses,
        free_cash_flow,
        savings_rate: percentage(free_cash_flow, profile.monthly_income),
        emergency_fund_target: monthly_expenses * EMERGENCY_FUND_MONTHS,
        recent_expenses_by_category: group_by_category(recent),
    }
}

/// Sums amounts per category, keeping first-seen order.
pub fn group_by_category<'a>(
    transactions: impl Iterator<Item = &'a Transaction>,
) -> Vec<CategoryTotal> {
    let mut out: Vec<CategoryTotal> = Vec::new();
    for t in transactions {
        let amount = t.counted_amount();
        match out.iter_mut().find(|c| c.category == t.category) {
            Some(entry) => entry.total += amount,
            None => out.push(CategoryTotal {
                category: t.category.clone(),
                total: amount,
            }),
        }
    }
    out
}

/// `part / whole * 100`, or 0 when `whole` is not positive.
pub fn percentage(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}
