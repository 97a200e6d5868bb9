use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::AnalysisError;

/// Normalized financial facts for one company at one point in time.
///
/// Growth and yield figures are percentage points (15.0 means 15%), never
/// fractions. The optional ratios are whatever the upstream provider
/// reported; they are carried along but never used for scoring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FundamentalsRecord {
    pub symbol: String,
    pub price: f64,
    pub eps: f64,
    pub revenue: f64,
    pub net_income: f64,
    pub total_assets: f64,
    pub total_liabilities: f64,
    pub cash: f64,
    pub debt: f64,
    pub shares_outstanding: i64,
    pub market_cap: f64,
    pub dividend_per_share: f64,
    pub book_value_per_share: f64,
    pub revenue_growth: f64,
    pub earnings_growth: f64,
    pub dividend_yield: f64,
    #[serde(default)]
    pub pe_ratio: Option<f64>,
    #[serde(default)]
    pub pb_ratio: Option<f64>,
    #[serde(default)]
    pub peg_ratio: Option<f64>,
    #[serde(default)]
    pub roe: Option<f64>,
    #[serde(default)]
    pub roa: Option<f64>,
    #[serde(default)]
    pub debt_to_equity: Option<f64>,
    #[serde(default)]
    pub current_ratio: Option<f64>,
    #[serde(default)]
    pub quick_ratio: Option<f64>,
    #[serde(default)]
    pub debt_to_assets: Option<f64>,
    #[serde(default)]
    pub interest_coverage: Option<f64>,
}

/// Raw numeric fields addressable by name, in declaration order.
pub const RECORD_FIELDS: &[&str] = &[
    "price",
    "eps",
    "revenue",
    "net_income",
    "total_assets",
    "total_liabilities",
    "cash",
    "debt",
    "shares_outstanding",
    "market_cap",
    "dividend_per_share",
    "book_value_per_share",
    "revenue_growth",
    "earnings_growth",
    "dividend_yield",
    "pe_ratio",
    "pb_ratio",
    "peg_ratio",
    "roe",
    "roa",
    "debt_to_equity",
    "current_ratio",
    "quick_ratio",
    "debt_to_assets",
    "interest_coverage",
];

impl FundamentalsRecord {
    /// Shareholders' equity as the screener defines it (assets minus liabilities).
    pub fn equity(&self) -> f64 {
        self.total_assets - self.total_liabilities
    }

    /// Copy of the record with its symbol in canonical uppercase form.
    pub fn normalized(mut self) -> Self {
        self.symbol = self.symbol.trim().to_uppercase();
        self
    }

    /// Look up a raw numeric field by its snake_case name.
    ///
    /// Provider ratios only resolve when the provider actually supplied them.
    pub fn field(&self, name: &str) -> Option<f64> {
        match name {
            "price" => Some(self.price),
            "eps" => Some(self.eps),
            "revenue" => Some(self.revenue),
            "net_income" => Some(self.net_income),
            "total_assets" => Some(self.total_assets),
            "total_liabilities" => Some(self.total_liabilities),
            "cash" => Some(self.cash),
            "debt" => Some(self.debt),
            "shares_outstanding" => Some(self.shares_outstanding as f64),
            "market_cap" => Some(self.market_cap),
            "dividend_per_share" => Some(self.dividend_per_share),
            "book_value_per_share" => Some(self.book_value_per_share),
            "revenue_growth" => Some(self.revenue_growth),
            "earnings_growth" => Some(self.earnings_growth),
            "dividend_yield" => Some(self.dividend_yield),
            "pe_ratio" => self.pe_ratio,
            "pb_ratio" => self.pb_ratio,
            "peg_ratio" => self.peg_ratio,
            "roe" => self.roe,
            "roa" => self.roa,
            "debt_to_equity" => self.debt_to_equity,
            "current_ratio" => self.current_ratio,
            "quick_ratio" => self.quick_ratio,
            "debt_to_assets" => self.debt_to_assets,
            "interest_coverage" => self.interest_coverage,
            _ => None,
        }
    }

    /// Reject records that would poison the ratio pipeline with NaN.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.symbol.trim().is_empty() {
            return Err(AnalysisError::InvalidInput("symbol is empty".to_string()));
        }
        if self.shares_outstanding < 0 {
            return Err(AnalysisError::InvalidInput(format!(
                "{}: shares_outstanding is negative ({})",
                self.symbol, self.shares_outstanding
            )));
        }
        for name in RECORD_FIELDS {
            if let Some(value) = self.field(name) {
                if !value.is_finite() {
                    return Err(AnalysisError::InvalidInput(format!(
                        "{}: {} is not a finite number",
                        self.symbol, name
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn provider_ratios(&self) -> ProviderRatios {
        ProviderRatios {
            pe_ratio: self.pe_ratio,
            pb_ratio: self.pb_ratio,
            peg_ratio: self.peg_ratio,
            roe: self.roe,
            roa: self.roa,
            debt_to_equity: self.debt_to_equity,
            current_ratio: self.current_ratio,
            quick_ratio: self.quick_ratio,
            debt_to_assets: self.debt_to_assets,
            interest_coverage: self.interest_coverage,
        }
    }
}

/// Ratios as reported by the data provider, kept for cross-checking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderRatios {
    pub pe_ratio: Option<f64>,
    pub pb_ratio: Option<f64>,
    pub peg_ratio: Option<f64>,
    pub roe: Option<f64>,
    pub roa: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub current_ratio: Option<f64>,
    pub quick_ratio: Option<f64>,
    pub debt_to_assets: Option<f64>,
    pub interest_coverage: Option<f64>,
}

/// Serializes `+inf` (the "undefined ratio" sentinel) as JSON null and back.
mod unbounded {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}

/// Derived ratios for one record.
///
/// Ratios whose denominator is not positive hold `f64::INFINITY` or `0.0`
/// depending on the metric; NaN never appears for a validated record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    // Valuation
    #[serde(with = "unbounded")]
    pub pe_ratio: f64,
    #[serde(with = "unbounded")]
    pub pb_ratio: f64,
    #[serde(with = "unbounded")]
    pub peg_ratio: f64,
    #[serde(with = "unbounded")]
    pub price_to_sales: f64,

    // Profitability
    pub roe: f64,
    pub roa: f64,
    pub net_margin: f64,
    pub gross_margin: f64,
    pub operating_margin: f64,
    pub roic: f64,

    // Efficiency
    pub asset_turnover: f64,
    pub equity_multiplier: f64,

    // Liquidity
    #[serde(with = "unbounded")]
    pub current_ratio: f64,
    #[serde(with = "unbounded")]
    pub quick_ratio: f64,
    #[serde(with = "unbounded")]
    pub cash_ratio: f64,

    // Solvency
    #[serde(with = "unbounded")]
    pub debt_to_equity: f64,
    pub debt_to_assets: f64,
    pub equity_ratio: f64,
    #[serde(with = "unbounded")]
    pub interest_coverage: f64,

    // Growth (pass-through)
    pub revenue_growth: f64,
    pub earnings_growth: f64,
    pub dividend_yield: f64,

    // Per share (pass-through)
    pub eps: f64,
    pub book_value_per_share: f64,
    pub dividend_per_share: f64,
}

pub const METRIC_NAMES: &[&str] = &[
    "pe_ratio",
    "pb_ratio",
    "peg_ratio",
    "price_to_sales",
    "roe",
    "roa",
    "net_margin",
    "gross_margin",
    "operating_margin",
    "roic",
    "asset_turnover",
    "equity_multiplier",
    "current_ratio",
    "quick_ratio",
    "cash_ratio",
    "debt_to_equity",
    "debt_to_assets",
    "equity_ratio",
    "interest_coverage",
    "revenue_growth",
    "earnings_growth",
    "dividend_yield",
    "eps",
    "book_value_per_share",
    "dividend_per_share",
];

impl Metrics {
    pub fn get(&self, name: &str) -> Option<f64> {
        let value = match name {
            "pe_ratio" => self.pe_ratio,
            "pb_ratio" => self.pb_ratio,
            "peg_ratio" => self.peg_ratio,
            "price_to_sales" => self.price_to_sales,
            "roe" => self.roe,
            "roa" => self.roa,
            "net_margin" => self.net_margin,
            "gross_margin" => self.gross_margin,
            "operating_margin" => self.operating_margin,
            "roic" => self.roic,
            "asset_turnover" => self.asset_turnover,
            "equity_multiplier" => self.equity_multiplier,
            "current_ratio" => self.current_ratio,
            "quick_ratio" => self.quick_ratio,
            "cash_ratio" => self.cash_ratio,
            "debt_to_equity" => self.debt_to_equity,
            "debt_to_assets" => self.debt_to_assets,
            "equity_ratio" => self.equity_ratio,
            "interest_coverage" => self.interest_coverage,
            "revenue_growth" => self.revenue_growth,
            "earnings_growth" => self.earnings_growth,
            "dividend_yield" => self.dividend_yield,
            "eps" => self.eps,
            "book_value_per_share" => self.book_value_per_share,
            "dividend_per_share" => self.dividend_per_share,
            _ => return None,
        };
        Some(value)
    }

    /// All metrics as (name, value) pairs in vocabulary order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        METRIC_NAMES
            .iter()
            .filter_map(move |name| self.get(name).map(|value| (*name, value)))
    }
}

/// Five-level ordinal rating of overall fundamental health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FundamentalStrength {
    VeryWeak,
    Weak,
    Moderate,
    Strong,
    VeryStrong,
}

impl FundamentalStrength {
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 80.0 => FundamentalStrength::VeryStrong,
            s if s >= 60.0 => FundamentalStrength::Strong,
            s if s >= 40.0 => FundamentalStrength::Moderate,
            s if s >= 20.0 => FundamentalStrength::Weak,
            _ => FundamentalStrength::VeryWeak,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FundamentalStrength::VeryStrong => "VERY_STRONG",
            FundamentalStrength::Strong => "STRONG",
            FundamentalStrength::Moderate => "MODERATE",
            FundamentalStrength::Weak => "WEAK",
            FundamentalStrength::VeryWeak => "VERY_WEAK",
        }
    }
}

impl fmt::Display for FundamentalStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full fundamental analysis of one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub symbol: String,
    pub metrics: Metrics,
    pub signals: Vec<String>,
    pub risk_score: f64,
    pub fundamental_strength: FundamentalStrength,
    pub valuation_score: f64,
    pub quality_score: f64,
    pub growth_score: f64,
    pub momentum_score: f64,
    #[serde(default)]
    pub provider_ratios: ProviderRatios,
}

impl AnalysisResult {
    pub fn has_signal(&self, signal: &str) -> bool {
        self.signals.iter().any(|s| s == signal)
    }
}

/// The six strategies the screening engine scores natively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StrategyKind {
    #[serde(rename = "value_investing")]
    Value,
    #[serde(rename = "growth_investing")]
    Growth,
    #[serde(rename = "dividend_investing")]
    Dividend,
    #[serde(rename = "momentum_investing")]
    Momentum,
    #[serde(rename = "quality_investing")]
    Quality,
    #[serde(rename = "contrarian")]
    Contrarian,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 6] = [
        StrategyKind::Value,
        StrategyKind::Growth,
        StrategyKind::Dividend,
        StrategyKind::Momentum,
        StrategyKind::Quality,
        StrategyKind::Contrarian,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Value => "value_investing",
            StrategyKind::Growth => "growth_investing",
            StrategyKind::Dividend => "dividend_investing",
            StrategyKind::Momentum => "momentum_investing",
            StrategyKind::Quality => "quality_investing",
            StrategyKind::Contrarian => "contrarian",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = AnalysisError;

    /// Accepts the canonical id (`value_investing`) or the short form (`value`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.trim().to_lowercase();
        StrategyKind::ALL
            .into_iter()
            .find(|kind| {
                kind.as_str() == id || kind.as_str().trim_end_matches("_investing") == id
            })
            .ok_or_else(|| AnalysisError::UnknownStrategy(s.to_string()))
    }
}

/// Which strategy produced a screening result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum StrategyTag {
    Builtin(StrategyKind),
    Custom(String),
    Criteria(String),
}

impl fmt::Display for StrategyTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyTag::Builtin(kind) => write!(f, "{}", kind),
            StrategyTag::Custom(id) => f.write_str(id),
            StrategyTag::Criteria(name) => f.write_str(name),
        }
    }
}

/// Outcome of scoring one record in a screening pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningResult {
    pub symbol: String,
    pub score: f64,
    pub strategy: StrategyTag,
    pub metrics: Metrics,
    pub signals: Vec<String>,
    pub evaluated_at: DateTime<Utc>,
}

// Two passes over identical input are equal regardless of when they ran.
impl PartialEq for ScreeningResult {
    fn eq(&self, other: &Self) -> bool {
        self.symbol == other.symbol
            && self.score == other.score
            && self.strategy == other.strategy
            && self.metrics == other.metrics
            && self.signals == other.signals
    }
}

/// Extra provider facts used only by the rules-of-thumb evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupplementalInfo {
    /// Dividend payout ratio in percentage points.
    pub payout_ratio: Option<f64>,
    pub free_cash_flow: Option<f64>,
    pub sector: Option<String>,
}
