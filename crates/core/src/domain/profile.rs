use crate::domain::contract::ProfileInput;
use serde::{Deserialize, Serialize};

/// Investor risk appetite. Unknown spellings fall back to `Moderate`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskProfile {
    Conservative,
    #[default]
    Moderate,
    Aggressive,
}

impl RiskProfile {
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "conservative" | "conservador" => Self::Conservative,
            "aggressive" | "arrojado" => Self::Aggressive,
            "moderate" | "moderado" => Self::Moderate,
            other => {
                if !other.is_empty() {
                    tracing::debug!(risk_profile = other, "unknown risk profile; using moderate");
                }
                Self::Moderate
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Conservative => "conservative",
            Self::Moderate => "moderate",
            Self::Aggressive => "aggressive",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Goal {
    Balance,
    Reserve,
    Invest,
}

impl Goal {
    /// Returns `None` for unrecognized goals; goal-gated rules then stay silent.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "balance" | "equilibrar" => Some(Self::Balance),
            "reserve" | "reserva" => Some(Self::Reserve),
            "invest" | "investir" => Some(Self::Invest),
            _ => None,
        }
    }
}

/// Static monthly budget declared by the user.
///
/// Deserialization goes through `ProfileInput`, so missing fields default to 0
/// and negative amounts are clamped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "ProfileInput")]
pub struct Profile {
    pub monthly_income: f64,
    pub fixed_expenses: f64,
    pub variable_expenses: f64,
    pub risk_profile: RiskProfile,
    pub main_goal: Option<Goal>,
}

impl Profile {
    pub fn new(monthly_income: f64, fixed_expenses: f64, variable_expenses: f64) -> Self {
        Self {
            monthly_income: clamp_money("monthly_income", monthly_income),
            fixed_expenses: clamp_money("fixed_expenses", fixed_expenses),
            variable_expenses: clamp_money("variable_expenses", variable_expenses),
            risk_profile: RiskProfile::default(),
            main_goal: None,
        }
    }

    pub fn with_risk_profile(mut self, risk_profile: RiskProfile) -> Self {
        self.risk_profile = risk_profile;
        self
    }

    pub fn with_main_goal(mut self, main_goal: Option<Goal>) -> Self {
        self.main_goal = main_goal;
        self
    }

    pub fn monthly_expenses(&self) -> f64 {
        self.fixed_expenses + self.variable_expenses
    }
}

/// Negative and non-finite amounts are clamped to zero.
pub fn clamp_money(field: &'static str, value: f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        tracing::warn!(field, value, "clamping invalid money value to 0");
        0.0
    }
}
