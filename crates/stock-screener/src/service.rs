use analysis_core::{AnalysisError, AnalysisResult, FundamentalsProvider, FundamentalsRecord, ScreeningResult};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::config::ScreenerConfig;
use crate::rules_of_thumb::{self, RulesOfThumbReport};
use crate::screener::{Screener, StrategyRef};

/// A symbol that dropped out of a batch, and why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolFailure {
    pub symbol: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchAnalysis {
    pub results: Vec<AnalysisResult>,
    pub requested: usize,
    pub failures: Vec<SymbolFailure>,
}

/// Outcome of screening a symbol list. `analyzed` counts records that were
/// fetched and passed validation; every other symbol is in `failures`.
#[derive(Debug, Clone, Serialize)]
pub struct ScreenReport {
    pub results: Vec<ScreeningResult>,
    pub requested: usize,
    pub analyzed: usize,
    pub failures: Vec<SymbolFailure>,
}

/// Like [`ScreenReport`], with one result list per strategy id.
#[derive(Debug, Clone, Serialize)]
pub struct BatchScreenReport {
    pub results: BTreeMap<String, Vec<ScreeningResult>>,
    pub requested: usize,
    pub analyzed: usize,
    pub failures: Vec<SymbolFailure>,
}

/// Provider-backed front door: fetches fundamentals, then analyzes or screens them.
pub struct StockScreener {
    provider: Arc<dyn FundamentalsProvider>,
    screener: Screener,
    config: ScreenerConfig,
}

impl StockScreener {
    /// Create a screening service over `provider` with a fresh strategy registry.
    pub fn new(provider: Arc<dyn FundamentalsProvider>, config: ScreenerConfig) -> Self {
        Self {
            provider,
            screener: Screener::new(),
            config,
        }
    }

    /// Create a screening service that shares an existing [`Screener`] and its
    /// custom strategies.
    pub fn with_screener(provider: Arc<dyn FundamentalsProvider>, screener: Screener, config: ScreenerConfig) -> Self {
        Self {
            provider,
            screener,
            config,
        }
    }

    pub fn screener(&self) -> &Screener {
        &self.screener
    }

    pub fn config(&self) -> &ScreenerConfig {
        &self.config
    }

    /// Fetch and analyze a single symbol.
    pub async fn analyze_stock(&self, symbol: &str) -> Result<AnalysisResult, AnalysisError> {
        let record = self.provider.fetch(symbol).await?;
        self.screener.engine().analyzer().analyze(&record)
    }

    /// Fetch every symbol concurrently, at most `max_concurrency` at a time.
    /// Records come back in request order; misses are reported, not raised.
    async fn fetch_all(&self, symbols: &[String]) -> (Vec<FundamentalsRecord>, Vec<SymbolFailure>) {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency.max(1)));
        let mut tasks = JoinSet::new();

        for (index, symbol) in symbols.iter().enumerate() {
            let provider = Arc::clone(&self.provider);
            let semaphore = Arc::clone(&semaphore);
            let symbol = symbol.clone();
            tasks.spawn(async move {
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) => provider.fetch(&symbol).await,
                    Err(e) => Err(AnalysisError::DataUnavailable(e.to_string())),
                };
                (index, result)
            });
        }

        let mut slots: Vec<Option<Result<FundamentalsRecord, AnalysisError>>> = vec![None; symbols.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => slots[index] = Some(result),
                Err(e) => tracing::error!("Fetch task failed: {}", e),
            }
        }

        let mut records = Vec::with_capacity(symbols.len());
        let mut failures = Vec::new();
        for (symbol, slot) in symbols.iter().zip(slots) {
            match slot {
                Some(Ok(record)) => records.push(record),
                Some(Err(e)) => {
                    tracing::warn!(symbol = %symbol, error = %e, "Failed to fetch fundamentals");
                    failures.push(SymbolFailure {
                        symbol: symbol.clone(),
                        reason: e.to_string(),
                    });
                }
                None => failures.push(SymbolFailure {
                    symbol: symbol.clone(),
                    reason: "fetch task did not complete".to_string(),
                }),
            }
        }
        (records, failures)
    }

    /// Drop records that fail validation, recording each as a failure.
    fn keep_valid(records: Vec<FundamentalsRecord>, failures: &mut Vec<SymbolFailure>) -> Vec<FundamentalsRecord> {
        records
            .into_iter()
            .filter(|record| match record.validate() {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(symbol = %record.symbol, error = %e, "Invalid fundamentals record");
                    failures.push(SymbolFailure {
                        symbol: record.symbol.clone(),
                        reason: e.to_string(),
                    });
                    false
                }
            })
            .collect()
    }

    /// Analyze every symbol, in request order. Fetch and analysis failures
    /// are collected rather than returned.
    pub async fn batch_analyze(&self, symbols: &[String]) -> BatchAnalysis {
        tracing::info!("Analyzing {} stocks", symbols.len());
        let (records, mut failures) = self.fetch_all(symbols).await;

        let analyzer = self.screener.engine().analyzer();
        let mut results = Vec::with_capacity(records.len());
        for record in &records {
            match analyzer.analyze(record) {
                Ok(analysis) => results.push(analysis),
                Err(e) => {
                    tracing::warn!(symbol = %record.symbol, error = %e, "Analysis failed");
                    failures.push(SymbolFailure {
                        symbol: record.symbol.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            "Batch analysis complete: {}/{} analyzed",
            results.len(),
            symbols.len()
        );
        BatchAnalysis {
            results,
            requested: symbols.len(),
            failures,
        }
    }

    /// Fetch `symbols` and screen them against `strategy`.
    ///
    /// Fails only when the strategy itself cannot be resolved.
    pub async fn screen_symbols(
        &self,
        symbols: &[String],
        strategy: &StrategyRef,
        threshold: f64,
    ) -> Result<ScreenReport, AnalysisError> {
        let (records, mut failures) = self.fetch_all(symbols).await;
        let records = Self::keep_valid(records, &mut failures);
        let results = self.screener.screen(&records, strategy, threshold)?;
        Ok(ScreenReport {
            results,
            requested: symbols.len(),
            analyzed: records.len(),
            failures,
        })
    }

    /// Screen against every configured strategy at the configured threshold.
    pub async fn batch_screen_symbols(&self, symbols: &[String]) -> BatchScreenReport {
        let (records, mut failures) = self.fetch_all(symbols).await;
        let records = Self::keep_valid(records, &mut failures);
        let results = self
            .screener
            .engine()
            .batch_screen(&records, &self.config.strategies, self.config.threshold);
        BatchScreenReport {
            results,
            requested: symbols.len(),
            analyzed: records.len(),
            failures,
        }
    }

    /// Fetch, analyze and run the rules-of-thumb checklist for one symbol.
    pub async fn evaluate_rules_of_thumb(&self, symbol: &str) -> Result<RulesOfThumbReport, AnalysisError> {
        let record = self.provider.fetch(symbol).await?;
        let analysis = self.screener.engine().analyzer().analyze(&record)?;
        let info = self.provider.supplemental(symbol).await?;
        Ok(rules_of_thumb::evaluate(&record, &analysis, &info))
    }
}
