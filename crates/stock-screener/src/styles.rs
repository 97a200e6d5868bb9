//! Investment styles and screening profiles expressed as criteria bundles.
//!
//! All growth, yield, return and payout bounds are percentage points, the
//! same unit the record and the computed metrics use.

use analysis_core::AnalysisError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::criteria::{Bounds, Criteria};

/// A named set of metric bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriteriaStrategy {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub criteria: Criteria,
}

impl CriteriaStrategy {
    /// Replace whole per-metric bounds; metrics not mentioned keep their defaults.
    pub fn with_overrides(mut self, overrides: Criteria) -> Self {
        self.criteria.extend(overrides);
        self
    }
}

pub fn create_custom_strategy(name: &str, criteria: Criteria, description: &str) -> CriteriaStrategy {
    CriteriaStrategy {
        name: name.to_string(),
        description: description.to_string(),
        criteria,
    }
}

fn bundle(entries: &[(&str, Bounds)]) -> Criteria {
    entries
        .iter()
        .map(|(metric, bounds)| (metric.to_string(), *bounds))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestmentStyle {
    Value,
    Growth,
    Dividend,
    Quality,
    Momentum,
    Garp,
}

impl InvestmentStyle {
    pub const ALL: [InvestmentStyle; 6] = [
        InvestmentStyle::Value,
        InvestmentStyle::Growth,
        InvestmentStyle::Dividend,
        InvestmentStyle::Quality,
        InvestmentStyle::Momentum,
        InvestmentStyle::Garp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InvestmentStyle::Value => "value",
            InvestmentStyle::Growth => "growth",
            InvestmentStyle::Dividend => "dividend",
            InvestmentStyle::Quality => "quality",
            InvestmentStyle::Momentum => "momentum",
            InvestmentStyle::Garp => "garp",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            InvestmentStyle::Value => "Value Investing",
            InvestmentStyle::Growth => "Growth Investing",
            InvestmentStyle::Dividend => "Dividend Investing",
            InvestmentStyle::Quality => "Quality Investing",
            InvestmentStyle::Momentum => "Momentum Investing",
            InvestmentStyle::Garp => "GARP",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            InvestmentStyle::Value => "Find undervalued stocks with strong fundamentals",
            InvestmentStyle::Growth => "Find companies with high growth potential",
            InvestmentStyle::Dividend => "Find stocks with attractive and sustainable dividends",
            InvestmentStyle::Quality => "Find high-quality companies with strong fundamentals",
            InvestmentStyle::Momentum => "Find stocks with strong price and earnings momentum",
            InvestmentStyle::Garp => "Find growth stocks at reasonable prices",
        }
    }

    pub fn default_criteria(&self) -> Criteria {
        match self {
            InvestmentStyle::Value => bundle(&[
                ("pe_ratio", Bounds::max(15.0)),
                ("pb_ratio", Bounds::max(1.5)),
                ("roe", Bounds::min(10.0)),
                ("debt_to_equity", Bounds::max(1.0)),
                ("current_ratio", Bounds::min(1.5)),
            ]),
            InvestmentStyle::Growth => bundle(&[
                ("revenue_growth", Bounds::min(15.0)),
                ("earnings_growth", Bounds::min(15.0)),
                ("pe_ratio", Bounds::between(15.0, 50.0)),
                ("roe", Bounds::min(15.0)),
            ]),
            InvestmentStyle::Dividend => bundle(&[
                ("dividend_yield", Bounds::min(3.0)),
                ("payout_ratio", Bounds::max(70.0)),
                ("debt_to_equity", Bounds::max(1.0)),
                ("current_ratio", Bounds::min(1.0)),
            ]),
            InvestmentStyle::Quality => bundle(&[
                ("roe", Bounds::min(15.0)),
                ("roa", Bounds::min(10.0)),
                ("debt_to_equity", Bounds::max(1.0)),
                ("current_ratio", Bounds::min(2.0)),
                ("interest_coverage", Bounds::min(5.0)),
            ]),
            InvestmentStyle::Momentum => bundle(&[
                ("earnings_growth", Bounds::min(20.0)),
                ("revenue_growth", Bounds::min(15.0)),
            ]),
            InvestmentStyle::Garp => bundle(&[
                ("pe_ratio", Bounds::between(10.0, 25.0)),
                ("earnings_growth", Bounds::min(10.0)),
                ("revenue_growth", Bounds::min(10.0)),
                ("roe", Bounds::min(12.0)),
                ("debt_to_equity", Bounds::max(1.5)),
            ]),
        }
    }

    pub fn strategy(&self) -> CriteriaStrategy {
        create_custom_strategy(self.display_name(), self.default_criteria(), self.description())
    }

    pub fn strategy_with(&self, overrides: Criteria) -> CriteriaStrategy {
        self.strategy().with_overrides(overrides)
    }
}

impl fmt::Display for InvestmentStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvestmentStyle {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|style| style.as_str() == wanted)
            .ok_or_else(|| AnalysisError::UnknownStrategy(s.to_string()))
    }
}

/// Predefined criteria sets for common risk appetites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreeningProfile {
    Conservative,
    Aggressive,
    Income,
    Balanced,
}

impl ScreeningProfile {
    pub const ALL: [ScreeningProfile; 4] = [
        ScreeningProfile::Conservative,
        ScreeningProfile::Aggressive,
        ScreeningProfile::Income,
        ScreeningProfile::Balanced,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScreeningProfile::Conservative => "conservative",
            ScreeningProfile::Aggressive => "aggressive",
            ScreeningProfile::Income => "income",
            ScreeningProfile::Balanced => "balanced",
        }
    }

    pub fn criteria(&self) -> Criteria {
        match self {
            ScreeningProfile::Conservative => bundle(&[
                ("pe_ratio", Bounds::max(15.0)),
                ("debt_to_equity", Bounds::max(0.5)),
                ("current_ratio", Bounds::min(2.0)),
                ("roe", Bounds::min(12.0)),
                ("dividend_yield", Bounds::min(2.0)),
            ]),
            ScreeningProfile::Aggressive => bundle(&[
                ("revenue_growth", Bounds::min(25.0)),
                ("earnings_growth", Bounds::min(25.0)),
                ("roe", Bounds::min(15.0)),
            ]),
            ScreeningProfile::Income => bundle(&[
                ("dividend_yield", Bounds::min(4.0)),
                ("payout_ratio", Bounds::max(60.0)),
                ("debt_to_equity", Bounds::max(1.0)),
            ]),
            ScreeningProfile::Balanced => bundle(&[
                ("pe_ratio", Bounds::between(10.0, 25.0)),
                ("debt_to_equity", Bounds::max(1.0)),
                ("current_ratio", Bounds::min(1.5)),
                ("roe", Bounds::min(10.0)),
            ]),
        }
    }

    pub fn strategy(&self) -> CriteriaStrategy {
        create_custom_strategy(self.as_str(), self.criteria(), "")
    }
}

impl fmt::Display for ScreeningProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScreeningProfile {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|profile| profile.as_str() == wanted)
            .ok_or_else(|| AnalysisError::UnknownStrategy(s.to_string()))
    }
}
