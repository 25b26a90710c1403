use crate::config::EngineConfig;
use crate::domain::profile::{Goal, Profile};
use crate::domain::recommendation::{AdviceSnapshot, Recommendation};
use crate::domain::transaction::Transaction;
use crate::intent::match_question;
use crate::metrics;
use crate::ranker::rank_and_limit;
use crate::rules::{evaluate_all, RuleContext};
use chrono::{DateTime, NaiveDate, Utc};

/// Validated engine input. Build it from an `AdviceRequest` or directly.
#[derive(Debug, Clone, PartialEq)]
pub struct AdviceInput {
    pub profile: Profile,
    pub transactions: Vec<Transaction>,
    /// `None` when the caller's goal was not recognized.
    pub goal: Option<Goal>,
    /// Months over which a savings gap should be closed.
    pub horizon: u32,
    pub question: Option<String>,
}

/// Pure pipeline: metrics, every rule, the question matcher, then rank and cap.
pub fn generate_recommendations(
    input: &AdviceInput,
    as_of: NaiveDate,
    config: &EngineConfig,
) -> Vec<Recommendation> {
    let metrics = metrics::calculate(&input.profile, &input.transactions, as_of);
    let ctx = RuleContext {
        profile: &input.profile,
        metrics: &metrics,
        goal: input.goal,
        horizon: input.horizon.max(1),
        config,
    };

    let mut recommendations = evaluate_all(&ctx);
    if let Some(answer) = match_question(input.question.as_deref(), &ctx) {
        recommendations.push(answer);
    }

    let fired = recommendations.len();
    let ranked = rank_and_limit(recommendations, config.max_recommendations);
    tracing::debug!(
        %as_of,
        transactions = input.transactions.len(),
        fired,
        returned = ranked.len(),
        "generated recommendations"
    );
    ranked
}

pub fn generate_snapshot(
    input: &AdviceInput,
    as_of: NaiveDate,
    generated_at: DateTime<Utc>,
    config: &EngineConfig,
) -> AdviceSnapshot {
    AdviceSnapshot {
        as_of_date: as_of,
        generated_at,
        recommendations: generate_recommendations(input, as_of, config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::profile::RiskProfile;
    use crate::domain::recommendation::Priority;
    use crate::domain::transaction::TransactionType;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 31).unwrap()
    }

    fn input(profile: Profile, goal: Option<Goal>, question: Option<&str>) -> AdviceInput {
        AdviceInput {
            profile,
            transactions: Vec::new(),
            goal,
            horizon: 12,
            question: question.map(str::to_string),
        }
    }

    fn titles(recs: &[Recommendation]) -> Vec<&str> {
        recs.iter().map(|r| r.title.as_str()).collect()
    }

    fn assert_priority_sorted(recs: &[Recommendation]) {
        for pair in recs.windows(2) {
            assert!(pair[0].priority <= pair[1].priority, "{:?}", titles(recs));
        }
    }

    #[test]
    fn scenario_low_savings_with_heavy_fixed_costs() {
        let input = input(Profile::new(5000.0, 3000.0, 1500.0), Some(Goal::Balance), None);
        let out = generate_recommendations(&input, as_of(), &EngineConfig::default());

        assert_eq!(
            titles(&out),
            vec![
                "Build your emergency fund",
                "Raise your savings rate",
                "Reduce your debt load",
                "Rebalance essential expenses",
            ]
        );
        assert!(out[0].description.contains("R$ 27000.00"));
        assert_eq!(out[3].priority, Priority::Medium);
        assert_priority_sorted(&out);
    }

    #[test]
    fn scenario_expenses_exceed_income() {
        let input = input(Profile::new(3000.0, 2000.0, 1500.0), Some(Goal::Balance), None);
        let out = generate_recommendations(&input, as_of(), &EngineConfig::default());

        let urgent = out
            .iter()
            .find(|r| r.title == "URGENT: balance your budget")
            .unwrap();
        assert_eq!(urgent.priority, Priority::High);
        assert!(urgent.description.contains("500.00"));
        assert_priority_sorted(&out);
    }

    #[test]
    fn scenario_healthy_aggressive_investor() {
        let profile =
            Profile::new(10000.0, 4000.0, 3000.0).with_risk_profile(RiskProfile::Aggressive);
        let input = input(profile, Some(Goal::Invest), None);
        let out = generate_recommendations(&input, as_of(), &EngineConfig::default());

        assert_eq!(titles(&out), vec!["Optimize your investments"]);
        assert!(out[0].description.contains("R$ 3000.00"));
        assert!(out[0].description.contains("aggressive"));
        assert_eq!(out[0].action_items[0], "Allocation: 40% fixed income + 60% variable income");
    }

    #[test]
    fn scenario_savings_question_fires_once() {
        let input = input(
            Profile::new(10000.0, 4000.0, 3000.0),
            Some(Goal::Invest),
            Some("Quero economizar mais"),
        );
        let out = generate_recommendations(&input, as_of(), &EngineConfig::default());

        let answers: Vec<_> = out.iter().filter(|r| r.category == "Your Question").collect();
        assert_eq!(answers.len(), 1);
        assert_eq!(answers[0].title, "Strategies to save more");
        assert_eq!(out[0].title, "Strategies to save more");
    }

    #[test]
    fn scenario_empty_profile_does_not_fail() {
        let input = input(Profile::default(), None, None);
        let out = generate_recommendations(&input, as_of(), &EngineConfig::default());
        assert!(out.len() <= 1);
        assert!(out.iter().all(|r| !r.action_items.is_empty()));
    }

    #[test]
    fn equal_priorities_keep_evaluation_order() {
        let input = input(
            Profile::new(3000.0, 2000.0, 1500.0),
            Some(Goal::Balance),
            Some("how do I get out of debt?"),
        );
        let out = generate_recommendations(&input, as_of(), &EngineConfig::default());
        assert_eq!(
            titles(&out),
            vec![
                "Build your emergency fund",
                "Raise your savings rate",
                "URGENT: balance your budget",
                "Reduce your debt load",
                "Get out of debt",
                "Rebalance essential expenses",
            ]
        );
    }

    #[test]
    fn cap_is_configurable() {
        let input = input(
            Profile::new(3000.0, 2000.0, 1500.0),
            Some(Goal::Balance),
            Some("how do I get out of debt?"),
        );
        let config = EngineConfig { max_recommendations: 5, ..EngineConfig::default() };
        let out = generate_recommendations(&input, as_of(), &config);
        assert_eq!(out.len(), 5);
        assert!(out.iter().all(|r| r.priority == Priority::High));
    }

    #[test]
    fn recent_category_spend_is_flagged() {
        let mut input = input(Profile::new(4000.0, 1000.0, 1000.0), None, None);
        input.transactions = vec![
            Transaction::new("e1", TransactionType::Expense, "Dining", 500.0, as_of()),
            Transaction::new("e2", TransactionType::Expense, "Dining", 300.0, as_of()),
            Transaction::new("i1", TransactionType::Income, "Salary", 4000.0, as_of()),
        ];
        let out = generate_recommendations(&input, as_of(), &EngineConfig::default());
        let flagged = out
            .iter()
            .find(|r| r.title == "Rein in spending on Dining")
            .unwrap();
        assert!(flagged.description.starts_with("R$ 800.00 on Dining"));
    }

    #[test]
    fn same_input_same_output() {
        let input = input(
            Profile::new(5000.0, 3000.0, 1500.0),
            Some(Goal::Reserve),
            Some("invest"),
        );
        let config = EngineConfig::default();
        let first = serde_json::to_string(&generate_recommendations(&input, as_of(), &config)).unwrap();
        let second = serde_json::to_string(&generate_recommendations(&input, as_of(), &config)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn zero_horizon_does_not_divide_by_zero() {
        let mut input = input(Profile::new(5000.0, 3000.0, 1500.0), Some(Goal::Reserve), None);
        input.horizon = 0;
        let out = generate_recommendations(&input, as_of(), &EngineConfig::default());
        assert_eq!(
            out[0].action_items[0],
            "Set aside R$ 27000.00 per month to reach it in 1 month"
        );
    }
}
