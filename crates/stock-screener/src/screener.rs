use analysis_core::{AnalysisError, FundamentalsRecord, ScreeningResult, StrategyKind, StrategyTag};
use chrono::Utc;

use crate::builder::StrategyBuilder;
use crate::criteria::CriteriaFilter;
use crate::engine::{rank, ScreeningEngine};
use crate::styles::{CriteriaStrategy, InvestmentStyle, ScreeningProfile};

/// Every way a caller can name a strategy.
#[derive(Debug, Clone, PartialEq)]
pub enum StrategyRef {
    NamedStrategy(StrategyKind),
    CustomCriteria(CriteriaStrategy),
    /// Id returned by [`StrategyBuilder::create_strategy`].
    CustomRules(String),
}

impl From<StrategyKind> for StrategyRef {
    fn from(kind: StrategyKind) -> Self {
        StrategyRef::NamedStrategy(kind)
    }
}

impl From<CriteriaStrategy> for StrategyRef {
    fn from(strategy: CriteriaStrategy) -> Self {
        StrategyRef::CustomCriteria(strategy)
    }
}

impl From<InvestmentStyle> for StrategyRef {
    fn from(style: InvestmentStyle) -> Self {
        StrategyRef::CustomCriteria(style.strategy())
    }
}

impl From<ScreeningProfile> for StrategyRef {
    fn from(profile: ScreeningProfile) -> Self {
        StrategyRef::CustomCriteria(profile.strategy())
    }
}

/// Single entry point dispatching to the engine, the rule builder or the
/// criteria filter.
#[derive(Clone, Default)]
pub struct Screener {
    engine: ScreeningEngine,
    builder: StrategyBuilder,
    filter: CriteriaFilter,
}

impl Screener {
    /// Create a screener with its own, empty custom-strategy registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an existing rule registry, so strategies created through `builder`
    /// are visible to [`StrategyRef::CustomRules`].
    pub fn with_builder(builder: StrategyBuilder) -> Self {
        Self {
            builder,
            ..Self::default()
        }
    }

    pub fn engine(&self) -> &ScreeningEngine {
        &self.engine
    }

    pub fn builder(&self) -> &StrategyBuilder {
        &self.builder
    }

    /// Screen `records` with whichever kind of strategy `strategy` names.
    pub fn screen(
        &self,
        records: &[FundamentalsRecord],
        strategy: &StrategyRef,
        threshold: f64,
    ) -> Result<Vec<ScreeningResult>, AnalysisError> {
        match strategy {
            StrategyRef::NamedStrategy(kind) => Ok(self.engine.screen(records, *kind, threshold)),
            StrategyRef::CustomRules(id) => self.builder.screen_with_custom_strategy(records, id, threshold),
            StrategyRef::CustomCriteria(criteria) => Ok(self.screen_criteria(records, criteria, threshold)),
        }
    }

    // Criteria are pass/fail: every survivor scores 100.
    fn screen_criteria(
        &self,
        records: &[FundamentalsRecord],
        strategy: &CriteriaStrategy,
        threshold: f64,
    ) -> Vec<ScreeningResult> {
        let mut results: Vec<ScreeningResult> = self
            .filter
            .filter_analyzed(records, &strategy.criteria)
            .into_iter()
            .map(|(_, analysis)| ScreeningResult {
                symbol: analysis.symbol,
                score: 100.0,
                strategy: StrategyTag::Criteria(strategy.name.clone()),
                metrics: analysis.metrics,
                signals: analysis.signals,
                evaluated_at: Utc::now(),
            })
            .filter(|result| result.score >= threshold)
            .collect();
        rank(&mut results);

        tracing::info!(
            "Criteria screen '{}': {}/{} stocks passed",
            strategy.name,
            results.len(),
            records.len()
        );
        results
    }
}
