use analysis_core::{AnalysisError, AnalysisResult, FundamentalsRecord, ScreeningResult, StrategyKind, StrategyTag};
use chrono::Utc;
use fundamental_analysis::ladder::{tally, Ladder, Rung};
use fundamental_analysis::StockAnalyzer;
use std::collections::BTreeMap;

/// Upper bound for every strategy score.
pub const MAX_SCORE: f64 = 100.0;

pub const DEFAULT_THRESHOLD: f64 = 50.0;

pub static VALUE_LADDERS: &[Ladder<AnalysisResult>] = &[
    Ladder {
        metric: "pe_ratio",
        rungs: &[
            Rung { when: |_, a| a.metrics.pe_ratio < 10.0, points: 30.0, signal: Some("VERY_LOW_PE") },
            Rung { when: |_, a| a.metrics.pe_ratio < 15.0, points: 20.0, signal: Some("LOW_PE") },
            Rung { when: |_, a| a.metrics.pe_ratio < 20.0, points: 10.0, signal: None },
        ],
    },
    Ladder {
        metric: "pb_ratio",
        rungs: &[
            Rung { when: |_, a| a.metrics.pb_ratio < 1.0, points: 25.0, signal: Some("LOW_PB") },
            Rung { when: |_, a| a.metrics.pb_ratio < 1.5, points: 15.0, signal: None },
        ],
    },
    Ladder {
        metric: "price_to_sales",
        rungs: &[
            Rung { when: |_, a| a.metrics.price_to_sales < 1.0, points: 15.0, signal: Some("LOW_PS") },
            Rung { when: |_, a| a.metrics.price_to_sales < 2.0, points: 10.0, signal: None },
        ],
    },
    Ladder {
        metric: "roe",
        rungs: &[Rung { when: |_, a| a.metrics.roe > 10.0, points: 20.0, signal: Some("DECENT_ROE") }],
    },
    Ladder {
        metric: "earnings_growth",
        rungs: &[Rung { when: |r, _| r.earnings_growth >= 0.0, points: 10.0, signal: None }],
    },
];

pub static GROWTH_LADDERS: &[Ladder<AnalysisResult>] = &[
    Ladder {
        metric: "revenue_growth",
        rungs: &[
            Rung { when: |r, _| r.revenue_growth > 30.0, points: 30.0, signal: Some("VERY_HIGH_REVENUE_GROWTH") },
            Rung { when: |r, _| r.revenue_growth > 20.0, points: 25.0, signal: Some("HIGH_REVENUE_GROWTH") },
            Rung { when: |r, _| r.revenue_growth > 10.0, points: 15.0, signal: None },
        ],
    },
    Ladder {
        metric: "earnings_growth",
        rungs: &[
            Rung { when: |r, _| r.earnings_growth > 30.0, points: 30.0, signal: Some("VERY_HIGH_EARNINGS_GROWTH") },
            Rung { when: |r, _| r.earnings_growth > 20.0, points: 25.0, signal: Some("HIGH_EARNINGS_GROWTH") },
            Rung { when: |r, _| r.earnings_growth > 10.0, points: 15.0, signal: None },
        ],
    },
    Ladder {
        metric: "peg_ratio",
        rungs: &[
            Rung { when: |_, a| a.metrics.peg_ratio < 1.0, points: 20.0, signal: Some("GOOD_PEG") },
            Rung { when: |_, a| a.metrics.peg_ratio < 2.0, points: 10.0, signal: None },
        ],
    },
    Ladder {
        metric: "roe",
        rungs: &[Rung { when: |_, a| a.metrics.roe > 15.0, points: 15.0, signal: None }],
    },
];

pub static DIVIDEND_LADDERS: &[Ladder<AnalysisResult>] = &[
    Ladder {
        metric: "dividend_yield",
        rungs: &[
            Rung { when: |r, _| r.dividend_yield >= 5.0, points: 30.0, signal: Some("VERY_HIGH_YIELD") },
            Rung { when: |r, _| r.dividend_yield >= 3.0, points: 25.0, signal: Some("HIGH_YIELD") },
            Rung { when: |r, _| r.dividend_yield >= 2.0, points: 15.0, signal: Some("MODERATE_YIELD") },
            Rung { when: |r, _| r.dividend_per_share > 0.0, points: 5.0, signal: Some("PAYS_DIVIDEND") },
        ],
    },
    Ladder {
        metric: "roe",
        rungs: &[Rung { when: |_, a| a.metrics.roe > 10.0, points: 20.0, signal: Some("SUSTAINABLE_DIVIDEND") }],
    },
    Ladder {
        metric: "debt_to_equity",
        rungs: &[
            Rung { when: |_, a| a.metrics.debt_to_equity < 1.0, points: 15.0, signal: None },
            Rung { when: |_, a| a.metrics.debt_to_equity < 2.0, points: 10.0, signal: None },
        ],
    },
    Ladder {
        metric: "earnings_growth",
        rungs: &[Rung { when: |r, _| r.earnings_growth >= -5.0, points: 10.0, signal: None }],
    },
];

pub static MOMENTUM_LADDERS: &[Ladder<AnalysisResult>] = &[
    Ladder {
        metric: "earnings_growth",
        rungs: &[
            Rung { when: |r, _| r.earnings_growth > 25.0, points: 35.0, signal: Some("STRONG_MOMENTUM") },
            Rung { when: |r, _| r.earnings_growth > 15.0, points: 25.0, signal: Some("MODERATE_MOMENTUM") },
            Rung { when: |r, _| r.earnings_growth > 5.0, points: 15.0, signal: None },
        ],
    },
    Ladder {
        metric: "revenue_growth",
        rungs: &[Rung { when: |r, _| r.revenue_growth > 20.0, points: 20.0, signal: None }],
    },
    Ladder {
        metric: "momentum_score",
        rungs: &[Rung { when: |_, a| a.momentum_score > 70.0, points: 15.0, signal: None }],
    },
];

pub static QUALITY_LADDERS: &[Ladder<AnalysisResult>] = &[
    Ladder {
        metric: "quality_score",
        rungs: &[
            Rung { when: |_, a| a.quality_score > 80.0, points: 30.0, signal: Some("HIGH_QUALITY") },
            Rung { when: |_, a| a.quality_score > 70.0, points: 20.0, signal: Some("GOOD_QUALITY") },
        ],
    },
    Ladder {
        metric: "roe",
        rungs: &[
            Rung { when: |_, a| a.metrics.roe > 20.0, points: 20.0, signal: Some("EXCELLENT_ROE") },
            Rung { when: |_, a| a.metrics.roe > 15.0, points: 15.0, signal: None },
        ],
    },
    Ladder {
        metric: "roa",
        rungs: &[Rung { when: |_, a| a.metrics.roa > 10.0, points: 15.0, signal: None }],
    },
    Ladder {
        metric: "debt_to_equity",
        rungs: &[
            Rung { when: |_, a| a.metrics.debt_to_equity < 0.5, points: 20.0, signal: Some("VERY_LOW_DEBT") },
            Rung { when: |_, a| a.metrics.debt_to_equity < 1.0, points: 10.0, signal: None },
        ],
    },
    Ladder {
        metric: "current_ratio",
        rungs: &[Rung { when: |_, a| a.metrics.current_ratio > 2.0, points: 10.0, signal: Some("STRONG_LIQUIDITY") }],
    },
    Ladder {
        metric: "net_margin",
        rungs: &[Rung { when: |_, a| a.metrics.net_margin > 15.0, points: 10.0, signal: None }],
    },
];

pub static CONTRARIAN_LADDERS: &[Ladder<AnalysisResult>] = &[
    Ladder {
        metric: "pe_ratio",
        rungs: &[
            Rung { when: |_, a| a.metrics.pe_ratio < 8.0, points: 30.0, signal: Some("EXTREMELY_UNDERVALUED") },
            Rung { when: |_, a| a.metrics.pe_ratio < 12.0, points: 20.0, signal: Some("SIGNIFICANTLY_UNDERVALUED") },
        ],
    },
    Ladder {
        metric: "pb_ratio",
        rungs: &[Rung { when: |_, a| a.metrics.pb_ratio < 0.8, points: 20.0, signal: None }],
    },
    Ladder {
        metric: "valuation_score",
        rungs: &[Rung { when: |_, a| a.valuation_score > 70.0, points: 25.0, signal: Some("MARKET_UNDERVALUATION") }],
    },
    Ladder {
        metric: "roe+revenue_growth",
        rungs: &[Rung {
            when: |r, a| a.metrics.roe > 10.0 && r.revenue_growth >= 0.0,
            points: 20.0,
            signal: Some("HIDDEN_VALUE"),
        }],
    },
];

/// Scoring table for a built-in strategy.
pub fn ladders(kind: StrategyKind) -> &'static [Ladder<AnalysisResult>] {
    match kind {
        StrategyKind::Value => VALUE_LADDERS,
        StrategyKind::Growth => GROWTH_LADDERS,
        StrategyKind::Dividend => DIVIDEND_LADDERS,
        StrategyKind::Momentum => MOMENTUM_LADDERS,
        StrategyKind::Quality => QUALITY_LADDERS,
        StrategyKind::Contrarian => CONTRARIAN_LADDERS,
    }
}

/// Sort results by score, highest first. Equal scores keep their input order.
pub fn rank(results: &mut [ScreeningResult]) {
    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Scores records against the six built-in strategies.
#[derive(Debug, Clone, Default)]
pub struct ScreeningEngine {
    analyzer: StockAnalyzer,
}

impl ScreeningEngine {
    /// Create an engine with a default analyzer.
    pub fn new() -> Self {
        Self {
            analyzer: StockAnalyzer::new(),
        }
    }

    pub fn analyzer(&self) -> &StockAnalyzer {
        &self.analyzer
    }

    /// Strategy score (capped at 100) and the signals of every rung that fired.
    pub fn evaluate(
        &self,
        record: &FundamentalsRecord,
        analysis: &AnalysisResult,
        kind: StrategyKind,
    ) -> (f64, Vec<String>) {
        let result = tally(ladders(kind), record, analysis);
        (result.points.min(MAX_SCORE), result.signals)
    }

    /// Score one record without applying a threshold.
    pub fn score_one(
        &self,
        record: &FundamentalsRecord,
        kind: StrategyKind,
    ) -> Result<ScreeningResult, AnalysisError> {
        let analysis = self.analyzer.analyze(record)?;
        Ok(self.to_result(record, analysis, kind))
    }

    /// Score every record, keep those at or above `threshold`, best first.
    ///
    /// Records that fail analysis are logged and left out, so the output can
    /// be shorter than the input even at threshold 0.
    pub fn screen(
        &self,
        records: &[FundamentalsRecord],
        kind: StrategyKind,
        threshold: f64,
    ) -> Vec<ScreeningResult> {
        let mut results = Vec::new();
        for record in records {
            match self.score_one(record, kind) {
                Ok(result) if result.score >= threshold => results.push(result),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(symbol = %record.symbol, error = %e, "Skipping record in {} screen", kind);
                }
            }
        }
        rank(&mut results);

        tracing::info!(
            "Screen complete: {}/{} stocks passed {} (threshold {})",
            results.len(),
            records.len(),
            kind,
            threshold
        );
        results
    }

    /// Like [`screen`](Self::screen) but takes the strategy by id, failing on unknown ids.
    pub fn screen_by_id(
        &self,
        records: &[FundamentalsRecord],
        strategy_id: &str,
        threshold: f64,
    ) -> Result<Vec<ScreeningResult>, AnalysisError> {
        let kind: StrategyKind = strategy_id.parse()?;
        Ok(self.screen(records, kind, threshold))
    }

    /// Screen the same universe against several strategies, keyed by strategy id.
    pub fn batch_screen(
        &self,
        records: &[FundamentalsRecord],
        kinds: &[StrategyKind],
        threshold: f64,
    ) -> BTreeMap<String, Vec<ScreeningResult>> {
        kinds
            .iter()
            .map(|kind| (kind.as_str().to_string(), self.screen(records, *kind, threshold)))
            .collect()
    }

    fn to_result(&self, record: &FundamentalsRecord, analysis: AnalysisResult, kind: StrategyKind) -> ScreeningResult {
        let (score, signals) = self.evaluate(record, &analysis, kind);
        ScreeningResult {
            symbol: analysis.symbol,
            score,
            strategy: StrategyTag::Builtin(kind),
            metrics: analysis.metrics,
            signals,
            evaluated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(symbol: &str) -> FundamentalsRecord {
        FundamentalsRecord {
            symbol: symbol.to_string(),
            price: 50.0,
            eps: 5.0,
            revenue: 2_000.0,
            net_income: 12.0,
            total_assets: 200.0,
            total_liabilities: 100.0,
            cash: 50.0,
            debt: 40.0,
            shares_outstanding: 100,
            market_cap: 1_000.0,
            dividend_per_share: 1.0,
            book_value_per_share: 40.0,
            revenue_growth: 4.0,
            earnings_growth: 5.0,
            dividend_yield: 2.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_value_score_by_hand() {
        // pe 10 -> +20 LOW_PE, pb 1.25 -> +15, ps 0.5 -> +15 LOW_PS,
        // roe 12 -> +20 DECENT_ROE, earnings growth >= 0 -> +10
        let engine = ScreeningEngine::new();
        let result = engine.score_one(&record("VAL"), StrategyKind::Value).unwrap();
        assert_eq!(result.score, 80.0);
        assert_eq!(result.signals, vec!["LOW_PE", "LOW_PS", "DECENT_ROE"]);
        assert!(!result.signals.iter().any(|s| s == "LOW_PB"));
        assert_eq!(result.strategy, StrategyTag::Builtin(StrategyKind::Value));
    }

    #[test]
    fn test_growth_ladder() {
        let r = FundamentalsRecord {
            revenue_growth: 31.0,
            earnings_growth: 25.0,
            ..record("GRO")
        };
        let result = ScreeningEngine::new().score_one(&r, StrategyKind::Growth).unwrap();
        // 30 + 25 + peg 0.4 -> 20, roe 12 -> 0
        assert_eq!(result.score, 75.0);
        assert_eq!(
            result.signals,
            vec!["VERY_HIGH_REVENUE_GROWTH", "HIGH_EARNINGS_GROWTH", "GOOD_PEG"]
        );
    }

    #[test]
    fn test_dividend_ladder_uses_inclusive_yield_bounds() {
        let engine = ScreeningEngine::new();
        let cases = [(5.0, "VERY_HIGH_YIELD", 30.0), (3.0, "HIGH_YIELD", 25.0), (2.0, "MODERATE_YIELD", 15.0)];
        for (dividend_yield, signal, points) in cases {
            let r = FundamentalsRecord { dividend_yield, ..record("DIV") };
            let result = engine.score_one(&r, StrategyKind::Dividend).unwrap();
            // + roe 12 -> 20, d/e 0.4 -> 15, eg 5 -> 10
            assert_eq!(result.score, points + 45.0);
            assert_eq!(result.signals[0], signal);
        }

        let r = FundamentalsRecord { dividend_yield: 1.0, ..record("DIV") };
        let result = engine.score_one(&r, StrategyKind::Dividend).unwrap();
        assert_eq!(result.signals, vec!["PAYS_DIVIDEND", "SUSTAINABLE_DIVIDEND"]);
        assert_eq!(result.score, 50.0);
    }

    #[test]
    fn test_momentum_uses_analyzer_momentum_score() {
        let r = FundamentalsRecord {
            revenue_growth: 22.0,
            earnings_growth: 30.0,
            ..record("MOM")
        };
        let result = ScreeningEngine::new().score_one(&r, StrategyKind::Momentum).unwrap();
        // 35 + 20 + momentum_score 100 > 70 -> 15
        assert_eq!(result.score, 70.0);
        assert_eq!(result.signals, vec!["STRONG_MOMENTUM"]);
    }

    #[test]
    fn test_quality_and_contrarian_caps() {
        let r = FundamentalsRecord {
            symbol: "TOP".to_string(),
            price: 10.0,
            eps: 2.0,
            revenue: 1_000.0,
            net_income: 300.0,
            total_assets: 1_000.0,
            total_liabilities: 200.0,
            cash: 900.0,
            debt: 50.0,
            market_cap: 500.0,
            book_value_per_share: 20.0,
            revenue_growth: 5.0,
            earnings_growth: 5.0,
            ..Default::default()
        };
        let engine = ScreeningEngine::new();
        let quality = engine.score_one(&r, StrategyKind::Quality).unwrap();
        // 30 + 20 + 15 + 20 + 10 + 10 = 105 -> capped
        assert_eq!(quality.score, 100.0);
        assert_eq!(
            quality.signals,
            vec!["HIGH_QUALITY", "EXCELLENT_ROE", "VERY_LOW_DEBT", "STRONG_LIQUIDITY"]
        );

        let contrarian = engine.score_one(&r, StrategyKind::Contrarian).unwrap();
        // pe 5 -> 30, pb 0.5 -> 20, valuation 100 -> 25, roe 37.5 & growth -> 20
        assert_eq!(contrarian.score, 95.0);
        assert_eq!(
            contrarian.signals,
            vec!["EXTREMELY_UNDERVALUED", "MARKET_UNDERVALUATION", "HIDDEN_VALUE"]
        );
    }

    #[test]
    fn test_every_ladder_can_contribute() {
        for kind in StrategyKind::ALL {
            for ladder in ladders(kind) {
                assert!(!ladder.rungs.is_empty(), "{}:{} has no rungs", kind, ladder.metric);
                assert!(ladder.max_points() > 0.0, "{}:{} never scores", kind, ladder.metric);
            }
        }
    }

    #[test]
    fn test_screen_ranks_and_filters() {
        let cheap = FundamentalsRecord { price: 30.0, ..record("CHEAP") };
        let fair = record("FAIR");
        let pricey = FundamentalsRecord { price: 200.0, book_value_per_share: 10.0, ..record("PRICEY") };
        let engine = ScreeningEngine::new();

        let results = engine.screen(&[fair.clone(), pricey.clone(), cheap.clone()], StrategyKind::Value, 50.0);
        let symbols: Vec<&str> = results.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["CHEAP", "FAIR"]);
        assert!(results[0].score >= results[1].score);

        let everything = engine.screen(&[fair, pricey, cheap], StrategyKind::Value, 0.0);
        assert_eq!(everything.len(), 3);
    }

    #[test]
    fn test_threshold_hundred_keeps_only_perfect_scores() {
        let perfect = FundamentalsRecord {
            symbol: "PERFECT".to_string(),
            price: 10.0,
            eps: 2.0,
            revenue: 1_000.0,
            net_income: 300.0,
            total_assets: 1_000.0,
            total_liabilities: 200.0,
            cash: 900.0,
            debt: 50.0,
            market_cap: 500.0,
            book_value_per_share: 20.0,
            ..Default::default()
        };
        let results = ScreeningEngine::new().screen(&[record("FAIR"), perfect], StrategyKind::Value, 100.0);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].symbol, "PERFECT");
        assert_eq!(results[0].score, 100.0);
    }

    #[test]
    fn test_invalid_records_are_omitted_not_fatal() {
        let broken = FundamentalsRecord { eps: f64::NAN, ..record("BROKEN") };
        let results = ScreeningEngine::new().screen(&[broken, record("OK")], StrategyKind::Value, 0.0);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].symbol, "OK");
    }

    #[test]
    fn test_results_carry_uppercase_symbols() {
        let results = ScreeningEngine::new().screen(&[record("brk.b")], StrategyKind::Value, 0.0);
        assert_eq!(results[0].symbol, "BRK.B");
    }

    #[test]
    fn test_unknown_strategy_id_fails() {
        let engine = ScreeningEngine::new();
        let err = engine.screen_by_id(&[record("A")], "garp", 50.0).unwrap_err();
        assert!(matches!(err, AnalysisError::UnknownStrategy(_)));
        assert!(engine.screen_by_id(&[record("A")], "value_investing", 0.0).is_ok());
    }

    #[test]
    fn test_batch_screen_keys_by_strategy_id() {
        let engine = ScreeningEngine::new();
        let batches = engine.batch_screen(&[record("A")], &StrategyKind::ALL, 0.0);
        assert_eq!(batches.len(), 6);
        assert!(batches.contains_key("value_investing"));
        assert!(batches.contains_key("contrarian"));
        assert!(batches.values().all(|results| results.len() == 1));
    }

    #[test]
    fn test_repeated_screens_are_equal() {
        let engine = ScreeningEngine::new();
        let records = [record("A"), record("B")];
        assert_eq!(
            engine.screen(&records, StrategyKind::Quality, 0.0),
            engine.screen(&records, StrategyKind::Quality, 0.0)
        );
    }
}
