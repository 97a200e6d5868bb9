use analysis_core::StrategyKind;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;

use crate::engine::DEFAULT_THRESHOLD;

const DEFAULT_MAX_CONCURRENCY: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenerConfig {
    pub threshold: f64,                // 50.0
    pub max_concurrency: usize,        // concurrent provider fetches
    pub strategies: Vec<StrategyKind>, // kinds used by batch screening
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            strategies: StrategyKind::ALL.to_vec(),
        }
    }
}

impl ScreenerConfig {
    /// Load from `SCREENER_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Build from any variable source; unset variables take their defaults.
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let threshold = match lookup("SCREENER_THRESHOLD") {
            Some(raw) => raw
                .trim()
                .parse::<f64>()
                .with_context(|| format!("SCREENER_THRESHOLD is not a number: {}", raw))?,
            None => defaults.threshold,
        };

        let max_concurrency = match lookup("SCREENER_MAX_CONCURRENCY") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .with_context(|| format!("SCREENER_MAX_CONCURRENCY is not a count: {}", raw))?,
            None => defaults.max_concurrency,
        };

        let strategies = match lookup("SCREENER_STRATEGIES") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(|id| id.parse::<StrategyKind>().context("SCREENER_STRATEGIES"))
                .collect::<Result<Vec<_>>>()?,
            None => defaults.strategies,
        };

        let config = Self {
            threshold,
            max_concurrency,
            strategies,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject thresholds outside 0..=100, zero concurrency and an empty strategy list.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.threshold) {
            bail!("threshold must be within 0-100, got {}", self.threshold);
        }
        if self.max_concurrency == 0 {
            bail!("max_concurrency must be at least 1");
        }
        if self.strategies.is_empty() {
            bail!("at least one strategy is required");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn load(pairs: &[(&str, &str)]) -> Result<ScreenerConfig> {
        let vars = vars(pairs);
        ScreenerConfig::from_vars(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config, ScreenerConfig::default());
        assert_eq!(config.threshold, 50.0);
        assert_eq!(config.max_concurrency, 8);
        assert_eq!(config.strategies.len(), 6);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("SCREENER_THRESHOLD", "65"),
            ("SCREENER_MAX_CONCURRENCY", "2"),
            ("SCREENER_STRATEGIES", "value_investing, contrarian,quality"),
        ])
        .unwrap();
        assert_eq!(config.threshold, 65.0);
        assert_eq!(config.max_concurrency, 2);
        assert_eq!(
            config.strategies,
            vec![StrategyKind::Value, StrategyKind::Contrarian, StrategyKind::Quality]
        );
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(load(&[("SCREENER_THRESHOLD", "150")]).is_err());
        assert!(load(&[("SCREENER_THRESHOLD", "-1")]).is_err());
        assert!(load(&[("SCREENER_THRESHOLD", "high")]).is_err());
        assert!(load(&[("SCREENER_MAX_CONCURRENCY", "0")]).is_err());
        assert!(load(&[("SCREENER_STRATEGIES", "value,garp")]).is_err());
        assert!(load(&[("SCREENER_STRATEGIES", " , ")]).is_err());
    }
}
