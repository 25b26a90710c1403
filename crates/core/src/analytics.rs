//! Dashboard figures: totals, 50/30/20 plan, category breakdown and monthly trend.

use crate::domain::profile::Profile;
use crate::domain::transaction::Transaction;
use crate::metrics::{self, percentage};
use crate::time::trend_window_start;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const LIFESTYLE_SHARE: f64 = 0.3;
pub const SAVINGS_SHARE: f64 = 0.2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub as_of_date: NaiveDate,
    pub summary: Summary,
    pub profile: ProfileFigures,
    pub goals: GoalProgress,
    pub budget_plan: BudgetPlan,
    pub category_breakdown: Vec<CategoryShare>,
    pub monthly_trend: Vec<MonthTrend>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_income: f64,
    pub total_expenses: f64,
    pub balance: f64,
    pub transaction_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileFigures {
    pub monthly_income: f64,
    pub total_monthly_expenses: f64,
    pub free_cash_flow: f64,
    /// Rounded to one decimal place.
    pub savings_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalProgress {
    pub emergency_fund_target: f64,
    /// Percent of the target covered by the current balance, capped at 100.
    pub emergency_fund_progress: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanLine {
    pub recommended: f64,
    pub current: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetPlan {
    pub essentials: PlanLine,
    pub lifestyle: PlanLine,
    pub savings: PlanLine,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub category: String,
    pub amount: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthTrend {
    /// `YYYY-MM`
    pub month: String,
    pub income: f64,
    pub expenses: f64,
    pub balance: f64,
}

pub fn build_analytics(
    profile: &Profile,
    transactions: &[Transaction],
    as_of: NaiveDate,
) -> AnalyticsReport {
    let m = metrics::calculate(profile, transactions, as_of);
    let income = profile.monthly_income;

    let emergency_fund_progress = if m.balance <= 0.0 {
        0.0
    } else if m.emergency_fund_target > 0.0 {
        percentage(m.balance, m.emergency_fund_target).min(100.0)
    } else {
        100.0
    };

    let mut category_breakdown: Vec<CategoryShare> =
        metrics::group_by_category(transactions.iter().filter(|t| t.is_expense()))
            .into_iter()
            .map(|c| CategoryShare {
                percentage: percentage(c.total, m.total_expenses),
                category: c.category,
                amount: c.total,
            })
            .collect();
    category_breakdown.sort_by(|a, b| b.amount.total_cmp(&a.amount));

    AnalyticsReport {
        as_of_date: as_of,
        summary: Summary {
            total_income: m.total_income,
            total_expenses: m.total_expenses,
            balance: m.balance,
            transaction_count: transactions.len(),
        },
        profile: ProfileFigures {
            monthly_income: income,
            total_monthly_expenses: m.monthly_expenses,
            free_cash_flow: m.free_cash_flow,
            savings_rate: (m.savings_rate * 10.0).round() / 10.0,
        },
        goals: GoalProgress {
            emergency_fund_target: m.emergency_fund_target,
            emergency_fund_progress,
        },
        budget_plan: BudgetPlan {
            essentials: PlanLine {
                recommended: income * crate::rules::ESSENTIALS_SHARE,
                current: profile.fixed_expenses,
            },
            lifestyle: PlanLine {
                recommended: income * LIFESTYLE_SHARE,
                current: profile.variable_expenses,
            },
            savings: PlanLine {
                recommended: income * SAVINGS_SHARE,
                current: m.free_cash_flow,
            },
        },
        category_breakdown,
        monthly_trend: monthly_trend(transactions, as_of),
    }
}

fn monthly_trend(transactions: &[Transaction], as_of: NaiveDate) -> Vec<MonthTrend> {
    let start = trend_window_start(as_of);
    let mut months: BTreeMap<String, (f64, f64)> = BTreeMap::new();
    for t in transactions.iter().filter(|t| t.date >= start) {
        let entry = months
            .entry(t.date.format("%Y-%m").to_string())
            .or_insert((0.0, 0.0));
        if t.is_income() {
            entry.0 += t.counted_amount();
        } else {
            entry.1 += t.counted_amount();
        }
    }

    months
        .into_iter()
        .map(|(month, (income, expenses))| MonthTrend {
            month,
            income,
            expenses,
            balance: income - expenses,
        })
        .collect()
}
