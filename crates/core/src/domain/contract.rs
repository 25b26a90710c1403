use crate::domain::profile::{Goal, Profile, RiskProfile};
use crate::domain::transaction::{Transaction, TransactionType};
use crate::engine::AdviceInput;
use anyhow::{bail, ensure, Context};
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const DEFAULT_HORIZON_MONTHS: u32 = 12;
pub const MAX_HORIZON_MONTHS: u32 = 24;

/// Wire-level request as supplied by callers. Field names accept camelCase aliases.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdviceRequest {
    #[serde(default)]
    pub profile: ProfileInput,
    #[serde(default)]
    pub transactions: Vec<TransactionInput>,
    #[serde(default)]
    pub goal: Option<String>,
    #[serde(default)]
    pub horizon: Option<i64>,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default, alias = "asOfDate")]
    pub as_of_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileInput {
    #[serde(default, alias = "monthlyIncome")]
    pub monthly_income: Option<f64>,
    #[serde(default, alias = "fixedExpenses")]
    pub fixed_expenses: Option<f64>,
    #[serde(default, alias = "variableExpenses")]
    pub variable_expenses: Option<f64>,
    #[serde(default, alias = "riskProfile")]
    pub risk_profile: Option<String>,
    #[serde(default, alias = "mainGoal")]
    pub main_goal: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionInput {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub amount: f64,
    pub date: String,
}

impl AdviceRequest {
    pub fn validate_and_into_input(self) -> anyhow::Result<AdviceInput> {
        let profile = self.profile.into_profile();

        let goal = match self.goal.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => {
                let goal = Goal::parse(raw);
                if goal.is_none() {
                    tracing::debug!(goal = raw, "unrecognized goal; goal-gated rules disabled");
                }
                goal
            }
            None => Some(Goal::Balance),
        };

        let mut seen_ids = BTreeSet::<String>::new();
        let mut transactions = Vec::with_capacity(self.transactions.len());
        for item in self.transactions {
            transactions.push(item.validate_and_into_transaction(&mut seen_ids)?);
        }

        let question = self
            .question
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(AdviceInput {
            profile,
            transactions,
            goal,
            horizon: clamp_horizon(self.horizon),
            question,
        })
    }
}

impl ProfileInput {
    pub fn into_profile(self) -> Profile {
        let risk_profile = self
            .risk_profile
            .as_deref()
            .map(RiskProfile::parse_lenient)
            .unwrap_or_default();
        let main_goal = self.main_goal.as_deref().and_then(Goal::parse);

        Profile::new(
            self.monthly_income.unwrap_or(0.0),
            self.fixed_expenses.unwrap_or(0.0),
            self.variable_expenses.unwrap_or(0.0),
        )
        .with_risk_profile(risk_profile)
        .with_main_goal(main_goal)
    }
}

impl From<ProfileInput> for Profile {
    fn from(input: ProfileInput) -> Self {
        input.into_profile()
    }
}

impl TransactionInput {
    fn validate_and_into_transaction(
        self,
        seen_ids: &mut BTreeSet<String>,
    ) -> anyhow::Result<Transaction> {
        let id = self.id.trim().to_string();
        ensure!(!id.is_empty(), "transaction id must be non-empty");
        ensure!(seen_ids.insert(id.clone()), "duplicate transaction id: {id}");

        ensure!(
            self.amount.is_finite() && self.amount > 0.0,
            "transaction {id}: amount must be positive (got {})",
            self.amount
        );

        let date = parse_transaction_date(&self.date)
            .with_context(|| format!("transaction {id}: invalid date"))?;

        Ok(Transaction::new(id, self.kind, &self.category, self.amount, date)
            .with_description(self.description.trim()))
    }
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp (its calendar date is kept).
pub fn parse_transaction_date(raw: &str) -> anyhow::Result<NaiveDate> {
    let raw = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(d);
    }
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => Ok(dt.date_naive()),
        Err(_) => bail!("expected YYYY-MM-DD or RFC 3339 timestamp, got {raw:?}"),
    }
}

/// Missing or zero horizons use the default; everything else lands in 1..=24.
pub fn clamp_horizon(raw: Option<i64>) -> u32 {
    match raw {
        None | Some(0) => DEFAULT_HORIZON_MONTHS,
        Some(n) => n.clamp(1, MAX_HORIZON_MONTHS as i64) as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(value: serde_json::Value) -> AdviceRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn accepts_camel_case_and_defaults() {
        let req = request(json!({
            "profile": {
                "monthlyIncome": 5000.0,
                "fixedExpenses": 3000.0,
                "riskProfile": "arrojado"
            },
            "transactions": [
                { "id": "a", "type": "expense", "category": "", "amount": 12.5, "date": "2026-01-10" },
                { "id": "b", "type": "income", "amount": 100.0, "date": "2026-01-11T09:30:00-03:00" }
            ]
        }));

        let input = req.validate_and_into_input().unwrap();
        assert_eq!(input.profile.monthly_income, 5000.0);
        assert_eq!(input.profile.variable_expenses, 0.0);
        assert_eq!(input.profile.risk_profile, RiskProfile::Aggressive);
        assert_eq!(input.goal, Some(Goal::Balance));
        assert_eq!(input.horizon, 12);
        assert_eq!(input.question, None);
        assert_eq!(input.transactions[0].category, "Other");
        assert_eq!(
            input.transactions[1].date,
            NaiveDate::from_ymd_opt(2026, 1, 11).unwrap()
        );
    }

    #[test]
    fn missing_goal_defaults_to_balance() {
        let req = request(json!({ "profile": { "mainGoal": "investir" } }));
        let input = req.validate_and_into_input().unwrap();
        assert_eq!(input.goal, Some(Goal::Balance));
        assert_eq!(input.profile.main_goal, Some(Goal::Invest));
    }

    #[test]
    fn unknown_goal_disables_goal_rules() {
        let req = request(json!({ "goal": "retire-early" }));
        let input = req.validate_and_into_input().unwrap();
        assert_eq!(input.goal, None);
    }

    #[test]
    fn negative_profile_values_are_clamped() {
        let req = request(json!({ "profile": { "monthly_income": -10.0 } }));
        let input = req.validate_and_into_input().unwrap();
        assert_eq!(input.profile.monthly_income, 0.0);
    }

    #[test]
    fn rejects_duplicate_ids() {
        let req = request(json!({
            "transactions": [
                { "id": "a", "type": "expense", "amount": 1.0, "date": "2026-01-10" },
                { "id": "a", "type": "expense", "amount": 2.0, "date": "2026-01-11" }
            ]
        }));
        let err = req.validate_and_into_input().unwrap_err();
        assert!(err.to_string().contains("duplicate transaction id"));
    }

    #[test]
    fn rejects_non_positive_amount() {
        let req = request(json!({
            "transactions": [
                { "id": "a", "type": "expense", "amount": -1.0, "date": "2026-01-10" }
            ]
        }));
        assert!(req.validate_and_into_input().is_err());
    }

    #[test]
    fn rejects_bad_date() {
        let req = request(json!({
            "transactions": [
                { "id": "a", "type": "expense", "amount": 1.0, "date": "10/01/2026" }
            ]
        }));
        assert!(req.validate_and_into_input().is_err());
    }

    #[test]
    fn horizon_is_clamped() {
        assert_eq!(clamp_horizon(None), 12);
        assert_eq!(clamp_horizon(Some(0)), 12);
        assert_eq!(clamp_horizon(Some(-3)), 1);
        assert_eq!(clamp_horizon(Some(6)), 6);
        assert_eq!(clamp_horizon(Some(120)), 24);
    }

    #[test]
    fn blank_question_is_dropped() {
        let req = request(json!({ "question": "   " }));
        let input = req.validate_and_into_input().unwrap();
        assert_eq!(input.question, None);
    }
}
