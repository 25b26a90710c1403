pub mod analytics;
pub mod domain;
pub mod engine;
pub mod intent;
pub mod metrics;
pub mod ranker;
pub mod rules;
pub mod time;

pub use engine::{generate_recommendations, generate_snapshot, AdviceInput};

pub mod config {
    use anyhow::Context;
    use std::str::FromStr;

    /// Maximum number of recommendations returned per call.
    pub const DEFAULT_MAX_RECOMMENDATIONS: usize = 6;

    /// Fixed expenses above this share of monthly income raise the debt-risk flag.
    pub const DEFAULT_DEBT_RISK_FIXED_RATIO: f64 = 0.55;

    pub const DEFAULT_CURRENCY_SYMBOL: &str = "R$";

    pub const DEFAULT_PORT: u16 = 3000;

    #[derive(Debug, Clone, PartialEq)]
    pub struct EngineConfig {
        pub max_recommendations: usize,
        pub debt_risk_fixed_ratio: f64,
        pub currency_symbol: String,
        /// Offset applied to the wall clock when resolving "today".
        pub utc_offset_minutes: i32,
    }

    impl Default for EngineConfig {
        fn default() -> Self {
            Self {
                max_recommendations: DEFAULT_MAX_RECOMMENDATIONS,
                debt_risk_fixed_ratio: DEFAULT_DEBT_RISK_FIXED_RATIO,
                currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
                utc_offset_minutes: 0,
            }
        }
    }

    impl EngineConfig {
        pub fn from_env() -> Self {
            Self::from_lookup(|key| std::env::var(key).ok())
        }

        pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
            let mut out = Self::default();

            if let Some(n) = parse_var::<usize>(&lookup, "ADVISOR_MAX_RECOMMENDATIONS") {
                if n > 0 {
                    out.max_recommendations = n;
                } else {
                    tracing::warn!(value = n, "ADVISOR_MAX_RECOMMENDATIONS must be at least 1; keeping default");
                }
            }

            if let Some(r) = parse_var::<f64>(&lookup, "ADVISOR_DEBT_RISK_RATIO") {
                if r.is_finite() && r > 0.0 {
                    out.debt_risk_fixed_ratio = r;
                } else {
                    tracing::warn!(value = r, "ADVISOR_DEBT_RISK_RATIO must be positive; keeping default");
                }
            }

            if let Some(s) = lookup("ADVISOR_CURRENCY_SYMBOL") {
                let s = s.trim();
                if !s.is_empty() {
                    out.currency_symbol = s.to_string();
                }
            }

            if let Some(m) = parse_var::<i32>(&lookup, "ADVISOR_UTC_OFFSET_MINUTES") {
                if (-14 * 60..=14 * 60).contains(&m) {
                    out.utc_offset_minutes = m;
                } else {
                    tracing::warn!(value = m, "ADVISOR_UTC_OFFSET_MINUTES out of range; keeping default");
                }
            }

            out
        }
    }

    fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
        let raw = lookup(key)?;
        match raw.trim().parse::<T>() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(key, value = %raw, "ignoring unparsable setting");
                None
            }
        }
    }

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub port: u16,
        pub sentry_dsn: Option<String>,
        pub engine: EngineConfig,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let port = match std::env::var("PORT") {
                Ok(s) => s
                    .trim()
                    .parse()
                    .with_context(|| format!("PORT must be a valid port number (got {s:?})"))?,
                Err(_) => DEFAULT_PORT,
            };

            Ok(Self {
                port,
                sentry_dsn: std::env::var("SENTRY_DSN").ok().filter(|s| !s.is_empty()),
                engine: EngineConfig::from_env(),
            })
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::collections::HashMap;

        fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
            let map: HashMap<String, String> = pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            move |key: &str| map.get(key).cloned()
        }

        #[test]
        fn defaults_when_nothing_set() {
            let cfg = EngineConfig::from_lookup(lookup_from(&[]));
            assert_eq!(cfg, EngineConfig::default());
            assert_eq!(cfg.max_recommendations, 6);
            assert_eq!(cfg.debt_risk_fixed_ratio, 0.55);
        }

        #[test]
        fn reads_overrides() {
            let cfg = EngineConfig::from_lookup(lookup_from(&[
                ("ADVISOR_MAX_RECOMMENDATIONS", "5"),
                ("ADVISOR_DEBT_RISK_RATIO", "0.6"),
                ("ADVISOR_CURRENCY_SYMBOL", "$"),
                ("ADVISOR_UTC_OFFSET_MINUTES", "-180"),
            ]));
            assert_eq!(cfg.max_recommendations, 5);
            assert_eq!(cfg.debt_risk_fixed_ratio, 0.6);
            assert_eq!(cfg.currency_symbol, "$");
            assert_eq!(cfg.utc_offset_minutes, -180);
        }

        #[test]
        fn keeps_defaults_for_bad_values() {
            let cfg = EngineConfig::from_lookup(lookup_from(&[
                ("ADVISOR_MAX_RECOMMENDATIONS", "many"),
                ("ADVISOR_DEBT_RISK_RATIO", "-1"),
                ("ADVISOR_CURRENCY_SYMBOL", "   "),
                ("ADVISOR_UTC_OFFSET_MINUTES", "9999"),
            ]));
            assert_eq!(cfg, EngineConfig::default());
        }

        #[test]
        fn zero_cap_is_rejected() {
            let cfg = EngineConfig::from_lookup(lookup_from(&[("ADVISOR_MAX_RECOMMENDATIONS", "0")]));
            assert_eq!(cfg.max_recommendations, DEFAULT_MAX_RECOMMENDATIONS);
        }
    }
}
