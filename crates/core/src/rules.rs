//! Condition → recommendation rules.
//!
//! Each rule is independent and yields at most one recommendation. Table order
//! only matters for ties, since the ranker sorts stably by priority.

use crate::config::EngineConfig;
use crate::domain::profile::{Goal, Profile, RiskProfile};
use crate::domain::recommendation::{Priority, Recommendation};
use crate::metrics::{percentage, Metrics};

/// Savings rate below which the low-savings rule fires, in percent.
pub const TARGET_SAVINGS_RATE: f64 = 15.0;
/// Savings rate above which investment advice fires regardless of goal.
pub const INVESTMENT_SAVINGS_RATE: f64 = 20.0;
/// 50/30/20 essentials share.
pub const ESSENTIALS_SHARE: f64 = 0.5;
/// A single 30-day category above this share of income is flagged.
pub const CATEGORY_ALERT_SHARE: f64 = 0.15;
pub const CATEGORY_CAP_SHARE: f64 = 0.12;

/// Everything a rule may look at.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub profile: &'a Profile,
    pub metrics: &'a Metrics,
    pub goal: Option<Goal>,
    pub horizon: u32,
    pub config: &'a EngineConfig,
}

impl RuleContext<'_> {
    pub fn money(&self, value: f64) -> String {
        format!("{} {:.2}", self.config.currency_symbol, value)
    }

    fn goal_is(&self, goals: &[Goal]) -> bool {
        self.goal.is_some_and(|g| goals.contains(&g))
    }
}

fn months(n: u32) -> String {
    if n == 1 {
        "1 month".to_string()
    } else {
        format!("{n} months")
    }
}

pub struct Rule {
    pub name: &'static str,
    pub evaluate: fn(&RuleContext<'_>) -> Option<Recommendation>,
}

pub const RULES: &[Rule] = &[
    Rule { name: "emergency_fund_gap", evaluate: emergency_fund_gap },
    Rule { name: "low_savings_rate", evaluate: low_savings_rate },
    Rule { name: "negative_cash_flow", evaluate: negative_cash_flow },
    Rule { name: "fixed_expense_imbalance", evaluate: fixed_expense_imbalance },
    Rule { name: "concentrated_category_spend", evaluate: concentrated_category_spend },
    Rule { name: "investment_optimization", evaluate: investment_optimization },
    Rule { name: "debt_risk", evaluate: debt_risk },
];

pub fn evaluate_all(ctx: &RuleContext<'_>) -> Vec<Recommendation> {
    RULES
        .iter()
        .filter_map(|rule| {
            let rec = (rule.evaluate)(ctx)?;
            tracing::debug!(rule = rule.name, priority = ?rec.priority, "rule fired");
            Some(rec)
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationTemplate {
    pub label: &'static str,
    pub allocation: &'static str,
    pub assets: &'static str,
    pub expected_return: &'static str,
}

const CONSERVATIVE_ALLOCATION: AllocationTemplate = AllocationTemplate {
    label: "conservative",
    allocation: "80% fixed income + 20% funds",
    assets: "Tesouro Selic, CDBs, LCI/LCA",
    expected_return: "~10-12% a year (100% of CDI)",
};

const MODERATE_ALLOCATION: AllocationTemplate = AllocationTemplate {
    label: "moderate",
    allocation: "60% fixed income + 30% funds + 10% equities",
    assets: "Tesouro, CDBs, multimarket funds, ETFs",
    expected_return: "~12-15% a year with moderate volatility",
};

const AGGRESSIVE_ALLOCATION: AllocationTemplate = AllocationTemplate {
    label: "aggressive",
    allocation: "40% fixed income + 60% variable income",
    assets: "Stocks, ETFs, REITs (FIIs), crypto",
    expected_return: "~15-20% a year with high volatility",
};

pub fn allocation_template(risk: RiskProfile) -> &'static AllocationTemplate {
    match risk {
        RiskProfile::Conservative => &CONSERVATIVE_ALLOCATION,
        RiskProfile::Moderate => &MODERATE_ALLOCATION,
        RiskProfile::Aggressive => &AGGRESSIVE_ALLOCATION,
    }
}

fn emergency_fund_gap(ctx: &RuleContext<'_>) -> Option<Recommendation> {
    let target = ctx.metrics.emergency_fund_target;
    if target <= 0.0 || !ctx.goal_is(&[Goal::Reserve, Goal::Balance]) {
        return None;
    }

    let gap = target - ctx.metrics.balance.max(0.0);
    if gap <= 0.0 {
        return None;
    }
    let monthly = gap / f64::from(ctx.horizon.max(1));

    Some(Recommendation::new(
        "Build your emergency fund",
        format!(
            "You need {} as a reserve (6 months of expenses). {} still to go.",
            ctx.money(target),
            ctx.money(gap)
        ),
        Priority::High,
        "Financial Security",
        vec![
            format!(
                "Set aside {} per month to reach it in {}",
                ctx.money(monthly),
                months(ctx.horizon)
            ),
            "Keep it in Tesouro Selic or a daily-liquidity CDB".to_string(),
            "Only touch it for real emergencies (health, job loss)".to_string(),
            "Review your progress every month".to_string(),
        ],
    ))
}

fn low_savings_rate(ctx: &RuleContext<'_>) -> Option<Recommendation> {
    let rate = ctx.metrics.savings_rate;
    if rate >= TARGET_SAVINGS_RATE {
        return None;
    }

    let target = ctx.profile.monthly_income * TARGET_SAVINGS_RATE / 100.0;
    let shortfall = (target - ctx.metrics.free_cash_flow).max(0.0);

    Some(Recommendation::new(
        "Raise your savings rate",
        format!(
            "Your savings rate is {rate:.2}%. Aim for 15-20% of your income to build wealth."
        ),
        Priority::High,
        "Savings",
        vec![
            format!("Save an extra {} per month", ctx.money(shortfall)),
            "Review discretionary spending and cut 20% of it".to_string(),
            "Automate a transfer to savings on payday".to_string(),
            "Pay yourself first".to_string(),
        ],
    ))
}

fn negative_cash_flow(ctx: &RuleContext<'_>) -> Option<Recommendation> {
    let fcf = ctx.metrics.free_cash_flow;
    if fcf >= 0.0 {
        return None;
    }

    Some(Recommendation::new(
        "URGENT: balance your budget",
        format!(
            "Your expenses exceed your income by {} per month. This leads to debt.",
            ctx.money(fcf.abs())
        ),
        Priority::High,
        "Critical Budget",
        vec![
            "Cut non-essential expenses immediately".to_string(),
            "Look for extra income (freelance work, sales, temporary jobs)".to_string(),
            "Renegotiate contracts (internet, phone, gym)".to_string(),
            "Consider bigger changes (housing, car) if needed".to_string(),
        ],
    ))
}

fn fixed_expense_imbalance(ctx: &RuleContext<'_>) -> Option<Recommendation> {
    let fixed = ctx.profile.fixed_expenses;
    let ideal = ctx.profile.monthly_income * ESSENTIALS_SHARE;
    if fixed <= ideal {
        return None;
    }
    let excess = fixed - ideal;

    Some(Recommendation::new(
        "Rebalance essential expenses",
        format!(
            "Fixed expenses ({}) exceed 50% of income. Target: {}.",
            ctx.money(fixed),
            ctx.money(ideal)
        ),
        Priority::Medium,
        "50/30/20 Budget",
        vec![
            format!("Reduce fixed expenses by {}", ctx.money(excess)),
            "Reassess housing (move, share an apartment)".to_string(),
            "Consider cheaper transport".to_string(),
            "Renegotiate every recurring service".to_string(),
        ],
    ))
}

fn concentrated_category_spend(ctx: &RuleContext<'_>) -> Option<Recommendation> {
    let income = ctx.profile.monthly_income;
    if income <= 0.0 {
        return None;
    }
    let top = ctx.metrics.top_expense_category()?;
    if top.total <= income * CATEGORY_ALERT_SHARE {
        return None;
    }
    let share = percentage(top.total, income);
    let cap = income * CATEGORY_CAP_SHARE;

    Some(Recommendation::new(
        format!("Rein in spending on {}", top.category),
        format!(
            "{} on {} in the last 30 days ({share:.2}% of income) is above the recommended level.",
            ctx.money(top.total),
            top.category
        ),
        Priority::Medium,
        "Spending Control",
        vec![
            format!("Set a cap of {} per month for this category", ctx.money(cap)),
            "List every expense in this category for the month".to_string(),
            "Ask before each purchase: do I really need this?".to_string(),
            "Look for cheaper alternatives".to_string(),
        ],
    ))
}

fn investment_optimization(ctx: &RuleContext<'_>) -> Option<Recommendation> {
    let fcf = ctx.metrics.free_cash_flow;
    if fcf <= 0.0 {
        return None;
    }
    if !ctx.goal_is(&[Goal::Invest]) && ctx.metrics.savings_rate <= INVESTMENT_SAVINGS_RATE {
        return None;
    }
    let template = allocation_template(ctx.profile.risk_profile);

    Some(Recommendation::new(
        "Optimize your investments",
        format!(
            "With {} per month available and a {} profile, you can build a solid portfolio.",
            ctx.money(fcf),
            template.label
        ),
        Priority::Medium,
        "Investments",
        vec![
            format!("Allocation: {}", template.allocation),
            format!("Focus on: {}", template.assets),
            format!("Expected return: {}", template.expected_return),
            "Reinvest dividends to compound returns".to_string(),
        ],
    ))
}

fn debt_risk(ctx: &RuleContext<'_>) -> Option<Recommendation> {
    let fixed = ctx.profile.fixed_expenses;
    let ratio = ctx.config.debt_risk_fixed_ratio;
    let threshold = ctx.profile.monthly_income * ratio;
    if fixed <= threshold {
        return None;
    }

    Some(Recommendation::new(
        "Reduce your debt load",
        format!(
            "Fixed expenses of {} are above {:.2}% of income ({}), which may indicate excessive debt.",
            ctx.money(fixed),
            ratio * 100.0,
            ctx.money(threshold)
        ),
        Priority::High,
        "Debt",
        vec![
            "List every debt with its interest rate and term".to_string(),
            "Pay off high-interest debt first (credit card, overdraft)".to_string(),
            "Negotiate a transfer to lower rates".to_string(),
            "Take on no new debt until the current ones are under control".to_string(),
        ],
    ))
}
