//! Keyword matching over the user's free-text question.
//!
//! No language understanding: the lower-cased question is checked for substrings,
//! groups are tried top to bottom and the first hit wins.

use crate::domain::recommendation::{Priority, Recommendation};
use crate::rules::RuleContext;

pub const QUESTION_CATEGORY: &str = "Your Question";

/// Savings target suggested to users asking how to save, as a share of income.
pub const SAVINGS_TARGET_SHARE: f64 = 0.2;

pub struct Intent {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
    pub build: fn(&RuleContext<'_>) -> Recommendation,
}

pub const INTENTS: &[Intent] = &[
    Intent {
        name: "invest",
        keywords: &["invest", "aplicar"],
        build: invest_answer,
    },
    Intent {
        name: "save",
        keywords: &["save", "saving", "economizar", "poupar", "guardar"],
        build: savings_answer,
    },
    Intent {
        name: "debt",
        keywords: &["debt", "loan", "dívida", "divida", "dever", "empréstimo", "emprestimo"],
        build: debt_answer,
    },
];

pub fn match_question(question: Option<&str>, ctx: &RuleContext<'_>) -> Option<Recommendation> {
    let question = question.map(str::trim).filter(|q| !q.is_empty())?;
    let lowered = question.to_lowercase();

    let intent = INTENTS
        .iter()
        .find(|intent| intent.keywords.iter().any(|k| lowered.contains(*k)))?;
    tracing::debug!(intent = intent.name, "question matched");
    Some((intent.build)(ctx))
}

fn invest_answer(ctx: &RuleContext<'_>) -> Recommendation {
    if ctx.metrics.free_cash_flow <= 0.0 {
        return Recommendation::new(
            "First: balance your budget",
            "To invest you need money left over at the end of the month.",
            Priority::High,
            QUESTION_CATEGORY,
            vec![
                "Cut expenses until your cash flow is positive".to_string(),
                "Start by saving 10% of your income".to_string(),
                "Then follow the investment recommendations".to_string(),
                "Study personal finance (books, courses)".to_string(),
            ],
        );
    }

    Recommendation::new(
        "Start investing now",
        format!(
            "You have {} per month available. Start simple and learn by doing.",
            ctx.money(ctx.metrics.free_cash_flow)
        ),
        Priority::High,
        QUESTION_CATEGORY,
        vec![
            "Open a brokerage account".to_string(),
            "Learn the basics (Tesouro, CDBs, stocks)".to_string(),
            "Start with R$ 100-500 per month in Tesouro Selic".to_string(),
            "Increase the amounts as your confidence grows".to_string(),
        ],
    )
}

fn savings_answer(ctx: &RuleContext<'_>) -> Recommendation {
    let target = ctx.profile.monthly_income * SAVINGS_TARGET_SHARE;
    Recommendation::new(
        "Strategies to save more",
        "Saving is a skill learned with method and discipline.",
        Priority::High,
        QUESTION_CATEGORY,
        vec![
            "Pay yourself first: set savings aside as soon as you are paid".to_string(),
            "30-day rule: wait before buying anything non-essential".to_string(),
            "Automate transfers into savings or investments".to_string(),
            format!("Target: {} per month (20% of income)", ctx.money(target)),
        ],
    )
}

fn debt_answer(_ctx: &RuleContext<'_>) -> Recommendation {
    Recommendation::new(
        "Get out of debt",
        "Debt is a financial emergency. Make paying it off your top priority.",
        Priority::High,
        QUESTION_CATEGORY,
        vec![
            "Snowball method: pay the smallest debt first".to_string(),
            "Avalanche method: pay the highest interest first".to_string(),
            "Negotiate discounts (often 30-50%)".to_string(),
            "Take on extra work temporarily to pay it off".to_string(),
        ],
    )
}
