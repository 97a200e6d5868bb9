//! User-defined screening strategies built from independent rules.
//!
//! A custom strategy is a list of predicates over a record and its analysis.
//! A record's score is the share of rules it satisfies, so a strategy with
//! four rules can only ever score 0, 25, 50, 75 or 100.

use analysis_core::{AnalysisError, AnalysisResult, FundamentalsRecord, ScreeningResult, StrategyTag};
use chrono::{DateTime, Utc};
use fundamental_analysis::StockAnalyzer;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::engine::rank;

/// Result of applying one rule to one record.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleOutcome {
    Matched,
    NotMatched,
    EvaluationError(String),
}

impl From<Result<bool, String>> for RuleOutcome {
    fn from(result: Result<bool, String>) -> Self {
        match result {
            Ok(true) => RuleOutcome::Matched,
            Ok(false) => RuleOutcome::NotMatched,
            Err(reason) => RuleOutcome::EvaluationError(reason),
        }
    }
}

pub trait Rule: Send + Sync {
    fn evaluate(&self, record: &FundamentalsRecord, analysis: &AnalysisResult) -> RuleOutcome;
}

impl<F> Rule for F
where
    F: Fn(&FundamentalsRecord, &AnalysisResult) -> Result<bool, String> + Send + Sync,
{
    fn evaluate(&self, record: &FundamentalsRecord, analysis: &AnalysisResult) -> RuleOutcome {
        self(record, analysis).into()
    }
}

/// Adapts a plain boolean predicate into a [`Rule`].
struct Infallible<F>(F);

impl<F> Rule for Infallible<F>
where
    F: Fn(&FundamentalsRecord, &AnalysisResult) -> bool + Send + Sync,
{
    fn evaluate(&self, record: &FundamentalsRecord, analysis: &AnalysisResult) -> RuleOutcome {
        if (self.0)(record, analysis) {
            RuleOutcome::Matched
        } else {
            RuleOutcome::NotMatched
        }
    }
}

pub type BoxedRule = Arc<dyn Rule>;

/// Wrap a predicate that cannot fail.
pub fn rule<F>(predicate: F) -> BoxedRule
where
    F: Fn(&FundamentalsRecord, &AnalysisResult) -> bool + Send + Sync + 'static,
{
    Arc::new(Infallible(predicate))
}

/// Wrap a predicate that may report an evaluation error.
pub fn fallible_rule<F>(predicate: F) -> BoxedRule
where
    F: Fn(&FundamentalsRecord, &AnalysisResult) -> Result<bool, String> + Send + Sync + 'static,
{
    Arc::new(predicate)
}

pub struct CustomStrategy {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    rules: Vec<BoxedRule>,
}

impl CustomStrategy {
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    fn info(&self) -> StrategyInfo {
        StrategyInfo {
            id: self.id.clone(),
            name: self.name.clone(),
            rule_count: self.rules.len(),
            created_at: self.created_at,
        }
    }

    /// Fraction of rules matched (as 0-100) and the `RULE_<i>` tag of each match.
    fn evaluate(&self, record: &FundamentalsRecord, analysis: &AnalysisResult) -> (f64, Vec<String>) {
        let mut signals = Vec::new();
        for (index, rule) in self.rules.iter().enumerate() {
            match rule.evaluate(record, analysis) {
                RuleOutcome::Matched => signals.push(format!("RULE_{}", index)),
                RuleOutcome::NotMatched => {}
                RuleOutcome::EvaluationError(reason) => {
                    let error = AnalysisError::RuleEvaluation { rule: index, reason };
                    tracing::warn!(symbol = %record.symbol, strategy = %self.id, "{}", error);
                }
            }
        }
        let score = signals.len() as f64 / self.rules.len() as f64 * 100.0;
        (score, signals)
    }
}

/// Registration details of a custom strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyInfo {
    pub id: String,
    pub name: String,
    pub rule_count: usize,
    pub created_at: DateTime<Utc>,
}

/// Handle to a registry of custom strategies. Clones share the registry.
#[derive(Clone, Default)]
pub struct StrategyBuilder {
    analyzer: StockAnalyzer,
    strategies: Arc<Mutex<Vec<Arc<CustomStrategy>>>>,
}

impl StrategyBuilder {
    /// Create a builder with an empty strategy registry.
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the lock cannot leave the Vec half-written.
    fn registry(&self) -> MutexGuard<'_, Vec<Arc<CustomStrategy>>> {
        self.strategies.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lookup(&self, strategy_id: &str) -> Result<Arc<CustomStrategy>, AnalysisError> {
        self.registry()
            .iter()
            .find(|s| s.id == strategy_id)
            .cloned()
            .ok_or_else(|| AnalysisError::UnknownStrategy(strategy_id.to_string()))
    }

    /// Register a strategy and return its id, `custom_<name>_<ordinal>`.
    pub fn create_strategy(&self, name: &str, rules: Vec<BoxedRule>) -> Result<String, AnalysisError> {
        if rules.is_empty() {
            return Err(AnalysisError::InvalidInput(format!(
                "strategy '{}' needs at least one rule",
                name
            )));
        }

        let mut registry = self.registry();
        let id = format!("custom_{}_{}", name, registry.len());
        registry.push(Arc::new(CustomStrategy {
            id: id.clone(),
            name: name.to_string(),
            created_at: Utc::now(),
            rules,
        }));

        tracing::debug!(strategy = %id, "Registered custom strategy");
        Ok(id)
    }

    /// Screen records against a registered strategy, best first.
    ///
    /// Records that fail analysis are logged and skipped; an unknown id is an error.
    pub fn screen_with_custom_strategy(
        &self,
        records: &[FundamentalsRecord],
        strategy_id: &str,
        threshold: f64,
    ) -> Result<Vec<ScreeningResult>, AnalysisError> {
        let strategy = self.lookup(strategy_id)?;

        let mut results = Vec::new();
        for record in records {
            let analysis = match self.analyzer.analyze(record) {
                Ok(analysis) => analysis,
                Err(e) => {
                    tracing::warn!(symbol = %record.symbol, error = %e, "Skipping record in {} screen", strategy_id);
                    continue;
                }
            };

            let (score, signals) = strategy.evaluate(record, &analysis);
            if score >= threshold {
                results.push(ScreeningResult {
                    symbol: analysis.symbol,
                    score,
                    strategy: StrategyTag::Custom(strategy.id.clone()),
                    metrics: analysis.metrics,
                    signals,
                    evaluated_at: Utc::now(),
                });
            }
        }
        rank(&mut results);
        Ok(results)
    }

    /// One rule: `pe_min <= pe_ratio <= pe_max`.
    pub fn create_pe_based_strategy(&self, pe_min: f64, pe_max: f64) -> Result<String, AnalysisError> {
        self.create_strategy(
            &format!("pe_{}_{}", pe_min, pe_max),
            vec![rule(move |_, a| pe_min <= a.metrics.pe_ratio && a.metrics.pe_ratio <= pe_max)],
        )
    }

    /// ROE, leverage and a 1.5 current-ratio floor.
    pub fn create_quality_screen_strategy(&self, min_roe: f64, max_debt_to_equity: f64) -> Result<String, AnalysisError> {
        self.create_strategy(
            "quality_screen",
            vec![
                rule(move |_, a| a.metrics.roe >= min_roe),
                rule(move |_, a| a.metrics.debt_to_equity <= max_debt_to_equity),
                rule(|_, a| a.metrics.current_ratio >= 1.5),
            ],
        )
    }

    /// Revenue and earnings growth floors plus a finite PEG under 2.
    pub fn create_growth_screen_strategy(
        &self,
        min_revenue_growth: f64,
        min_earnings_growth: f64,
    ) -> Result<String, AnalysisError> {
        self.create_strategy(
            "growth_screen",
            vec![
                rule(move |r, _| r.revenue_growth >= min_revenue_growth),
                rule(move |r, _| r.earnings_growth >= min_earnings_growth),
                rule(|_, a| a.metrics.peg_ratio < 2.0 && a.metrics.peg_ratio.is_finite()),
            ],
        )
    }

    /// Minimum yield, backed by ROE >= 10 and D/E < 1.
    pub fn create_dividend_screen_strategy(&self, min_yield: f64) -> Result<String, AnalysisError> {
        self.create_strategy(
            "dividend_screen",
            vec![
                rule(move |r, _| r.dividend_yield >= min_yield),
                rule(|_, a| a.metrics.roe >= 10.0 && a.metrics.debt_to_equity < 1.0),
            ],
        )
    }

    /// Registration details for `strategy_id`.
    pub fn strategy_info(&self, strategy_id: &str) -> Result<StrategyInfo, AnalysisError> {
        self.lookup(strategy_id).map(|s| s.info())
    }

    /// Registered ids in registration order.
    pub fn list_strategies(&self) -> Vec<String> {
        self.registry().iter().map(|s| s.id.clone()).collect()
    }
}

/// Defaults for the convenience builders.
pub mod defaults {
    pub const PE_MIN: f64 = 10.0;
    pub const PE_MAX: f64 = 20.0;
    pub const QUALITY_MIN_ROE: f64 = 15.0;
    pub const QUALITY_MAX_DEBT_TO_EQUITY: f64 = 1.0;
    pub const GROWTH_MIN_REVENUE_GROWTH: f64 = 15.0;
    pub const GROWTH_MIN_EARNINGS_GROWTH: f64 = 15.0;
    pub const DIVIDEND_MIN_YIELD: f64 = 3.0;
}
