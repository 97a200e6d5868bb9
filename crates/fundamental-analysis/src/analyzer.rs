use analysis_core::{AnalysisError, AnalysisResult, FundamentalStrength, FundamentalsRecord, Metrics};

use crate::ladder::{score, tally, Ladder, Rung};
use crate::metrics::MetricsCalculator;

/// Score every sub-score starts from before ladder adjustments.
const NEUTRAL_SCORE: f64 = 50.0;

/// Signal rules, one ladder per rule. Order here is the order signals are reported in.
pub static SIGNAL_LADDERS: &[Ladder<Metrics>] = &[
    Ladder {
        metric: "pe_ratio",
        rungs: &[
            Rung { when: |_, m| m.pe_ratio < 15.0, points: 0.0, signal: Some("UNDERVALUED_PE") },
            Rung { when: |_, m| m.pe_ratio > 30.0, points: 0.0, signal: Some("OVERVALUED_PE") },
        ],
    },
    Ladder {
        metric: "pb_ratio",
        rungs: &[
            Rung { when: |_, m| m.pb_ratio < 1.0, points: 0.0, signal: Some("UNDERVALUED_BOOK") },
            Rung { when: |_, m| m.pb_ratio > 3.0, points: 0.0, signal: Some("OVERVALUED_BOOK") },
        ],
    },
    Ladder {
        metric: "roe",
        rungs: &[Rung { when: |_, m| m.roe > 15.0, points: 0.0, signal: Some("HIGH_ROE") }],
    },
    Ladder {
        metric: "roa",
        rungs: &[Rung { when: |_, m| m.roa > 10.0, points: 0.0, signal: Some("HIGH_ROA") }],
    },
    Ladder {
        metric: "net_margin",
        rungs: &[Rung { when: |_, m| m.net_margin > 20.0, points: 0.0, signal: Some("HIGH_MARGIN") }],
    },
    Ladder {
        metric: "revenue_growth",
        rungs: &[Rung {
            when: |r, _| r.revenue_growth > 20.0,
            points: 0.0,
            signal: Some("HIGH_REVENUE_GROWTH"),
        }],
    },
    Ladder {
        metric: "earnings_growth",
        rungs: &[Rung {
            when: |r, _| r.earnings_growth > 20.0,
            points: 0.0,
            signal: Some("HIGH_EARNINGS_GROWTH"),
        }],
    },
    Ladder {
        metric: "dividend_yield",
        rungs: &[
            Rung { when: |r, _| r.dividend_yield > 3.0, points: 0.0, signal: Some("HIGH_DIVIDEND_YIELD") },
            Rung { when: |r, _| r.dividend_yield > 0.0, points: 0.0, signal: Some("PAYS_DIVIDEND") },
        ],
    },
    Ladder {
        metric: "current_ratio",
        rungs: &[
            Rung { when: |_, m| m.current_ratio > 2.0, points: 0.0, signal: Some("STRONG_LIQUIDITY") },
            Rung { when: |_, m| m.current_ratio < 1.0, points: 0.0, signal: Some("WEAK_LIQUIDITY") },
        ],
    },
    Ladder {
        metric: "debt_to_equity",
        rungs: &[
            Rung { when: |_, m| m.debt_to_equity < 0.5, points: 0.0, signal: Some("LOW_DEBT") },
            Rung { when: |_, m| m.debt_to_equity > 2.0, points: 0.0, signal: Some("HIGH_DEBT") },
        ],
    },
];

/// Risk contributions (higher = riskier), summed from zero.
pub static RISK_LADDERS: &[Ladder<Metrics>] = &[
    Ladder {
        metric: "current_ratio",
        rungs: &[
            Rung { when: |_, m| m.current_ratio < 1.0, points: 25.0, signal: None },
            Rung { when: |_, m| m.current_ratio < 1.5, points: 10.0, signal: None },
        ],
    },
    Ladder {
        metric: "debt_to_equity",
        rungs: &[
            Rung { when: |_, m| m.debt_to_equity > 2.0, points: 25.0, signal: None },
            Rung { when: |_, m| m.debt_to_equity > 1.0, points: 10.0, signal: None },
        ],
    },
    Ladder {
        metric: "roe",
        rungs: &[
            Rung { when: |_, m| m.roe < 5.0, points: 20.0, signal: None },
            Rung { when: |_, m| m.roe < 10.0, points: 10.0, signal: None },
        ],
    },
    Ladder {
        metric: "revenue_growth",
        rungs: &[
            Rung { when: |r, _| r.revenue_growth < -10.0, points: 15.0, signal: None },
            Rung { when: |r, _| r.revenue_growth < 0.0, points: 5.0, signal: None },
        ],
    },
];

/// Fundamental strength bands, 25 points per dimension at most.
pub static STRENGTH_LADDERS: &[Ladder<Metrics>] = &[
    Ladder {
        metric: "roe",
        rungs: &[
            Rung { when: |_, m| m.roe > 15.0, points: 25.0, signal: None },
            Rung { when: |_, m| m.roe > 10.0, points: 15.0, signal: None },
            Rung { when: |_, m| m.roe > 5.0, points: 5.0, signal: None },
        ],
    },
    Ladder {
        metric: "debt_to_equity",
        rungs: &[
            Rung { when: |_, m| m.debt_to_equity < 0.5, points: 25.0, signal: None },
            Rung { when: |_, m| m.debt_to_equity < 1.0, points: 15.0, signal: None },
            Rung { when: |_, m| m.debt_to_equity < 2.0, points: 5.0, signal: None },
        ],
    },
    Ladder {
        metric: "current_ratio",
        rungs: &[
            Rung { when: |_, m| m.current_ratio > 1.5, points: 25.0, signal: None },
            Rung { when: |_, m| m.current_ratio > 1.0, points: 15.0, signal: None },
        ],
    },
    Ladder {
        metric: "revenue_growth",
        rungs: &[
            Rung { when: |r, _| r.revenue_growth > 10.0, points: 25.0, signal: None },
            Rung { when: |r, _| r.revenue_growth > 5.0, points: 15.0, signal: None },
            Rung { when: |r, _| r.revenue_growth > 0.0, points: 5.0, signal: None },
        ],
    },
];

pub static VALUATION_LADDERS: &[Ladder<Metrics>] = &[
    Ladder {
        metric: "pe_ratio",
        rungs: &[
            Rung { when: |_, m| m.pe_ratio < 10.0, points: 20.0, signal: None },
            Rung { when: |_, m| m.pe_ratio < 15.0, points: 15.0, signal: None },
            Rung { when: |_, m| m.pe_ratio < 20.0, points: 10.0, signal: None },
            Rung { when: |_, m| m.pe_ratio < 30.0, points: 5.0, signal: None },
            Rung { when: |_, _| true, points: -20.0, signal: None },
        ],
    },
    Ladder {
        metric: "pb_ratio",
        rungs: &[
            Rung { when: |_, m| m.pb_ratio < 1.0, points: 20.0, signal: None },
            Rung { when: |_, m| m.pb_ratio < 1.5, points: 10.0, signal: None },
            Rung { when: |_, m| m.pb_ratio < 2.5, points: 5.0, signal: None },
            Rung { when: |_, _| true, points: -10.0, signal: None },
        ],
    },
    Ladder {
        metric: "price_to_sales",
        rungs: &[
            Rung { when: |_, m| m.price_to_sales < 1.0, points: 10.0, signal: None },
            Rung { when: |_, m| m.price_to_sales < 2.0, points: 5.0, signal: None },
        ],
    },
];

pub static QUALITY_LADDERS: &[Ladder<Metrics>] = &[
    Ladder {
        metric: "roe",
        rungs: &[
            Rung { when: |_, m| m.roe > 20.0, points: 20.0, signal: None },
            Rung { when: |_, m| m.roe > 15.0, points: 15.0, signal: None },
            Rung { when: |_, m| m.roe > 10.0, points: 10.0, signal: None },
        ],
    },
    Ladder {
        metric: "roa",
        rungs: &[
            Rung { when: |_, m| m.roa > 10.0, points: 15.0, signal: None },
            Rung { when: |_, m| m.roa > 5.0, points: 10.0, signal: None },
        ],
    },
    Ladder {
        metric: "net_margin",
        rungs: &[
            Rung { when: |_, m| m.net_margin > 20.0, points: 15.0, signal: None },
            Rung { when: |_, m| m.net_margin > 10.0, points: 10.0, signal: None },
        ],
    },
    Ladder {
        metric: "debt_to_equity",
        rungs: &[
            Rung { when: |_, m| m.debt_to_equity < 0.5, points: 20.0, signal: None },
            Rung { when: |_, m| m.debt_to_equity < 1.0, points: 10.0, signal: None },
            Rung { when: |_, m| m.debt_to_equity > 2.0, points: -15.0, signal: None },
        ],
    },
    Ladder {
        metric: "current_ratio",
        rungs: &[
            Rung { when: |_, m| m.current_ratio > 2.0, points: 10.0, signal: None },
            Rung { when: |_, m| m.current_ratio < 1.0, points: -20.0, signal: None },
        ],
    },
];

pub static GROWTH_LADDERS: &[Ladder<Metrics>] = &[
    Ladder {
        metric: "revenue_growth",
        rungs: &[
            Rung { when: |r, _| r.revenue_growth > 30.0, points: 25.0, signal: None },
            Rung { when: |r, _| r.revenue_growth > 20.0, points: 20.0, signal: None },
            Rung { when: |r, _| r.revenue_growth > 10.0, points: 15.0, signal: None },
            Rung { when: |r, _| r.revenue_growth > 5.0, points: 10.0, signal: None },
            Rung { when: |r, _| r.revenue_growth < 0.0, points: -25.0, signal: None },
        ],
    },
    Ladder {
        metric: "earnings_growth",
        rungs: &[
            Rung { when: |r, _| r.earnings_growth > 30.0, points: 25.0, signal: None },
            Rung { when: |r, _| r.earnings_growth > 20.0, points: 20.0, signal: None },
            Rung { when: |r, _| r.earnings_growth > 10.0, points: 15.0, signal: None },
            Rung { when: |r, _| r.earnings_growth > 5.0, points: 10.0, signal: None },
            Rung { when: |r, _| r.earnings_growth < 0.0, points: -25.0, signal: None },
        ],
    },
    Ladder {
        metric: "peg_ratio",
        rungs: &[
            Rung { when: |r, m| m.peg_ratio < 1.0 && r.earnings_growth > 0.0, points: 20.0, signal: None },
            Rung { when: |r, m| m.peg_ratio < 2.0 && r.earnings_growth > 0.0, points: 10.0, signal: None },
        ],
    },
];

/// Growth figures standing in for price momentum; no price history is used.
pub static MOMENTUM_LADDERS: &[Ladder<Metrics>] = &[
    Ladder {
        metric: "revenue_growth",
        rungs: &[Rung { when: |r, _| r.revenue_growth > 15.0, points: 25.0, signal: None }],
    },
    Ladder {
        metric: "earnings_growth",
        rungs: &[Rung { when: |r, _| r.earnings_growth > 15.0, points: 25.0, signal: None }],
    },
];

/// Turns a record's ratios into signals, a risk score, a strength rating and
/// four 0-100 sub-scores.
#[derive(Debug, Clone, Default)]
pub struct StockAnalyzer {
    calculator: MetricsCalculator,
}

impl StockAnalyzer {
    /// Create an analyzer with the standard ratio calculator.
    pub fn new() -> Self {
        Self {
            calculator: MetricsCalculator::new(),
        }
    }

    pub fn calculator(&self) -> &MetricsCalculator {
        &self.calculator
    }

    /// Validate `record`, compute its metrics and run every scoring ladder.
    ///
    /// The result carries the symbol in canonical uppercase form.
    pub fn analyze(&self, record: &FundamentalsRecord) -> Result<AnalysisResult, AnalysisError> {
        record.validate()?;
        let metrics = self.calculator.calculate(record);

        let signals = tally(SIGNAL_LADDERS, record, &metrics).signals;
        let risk_score = score(0.0, RISK_LADDERS, record, &metrics);
        let strength_points = tally(STRENGTH_LADDERS, record, &metrics).points;

        Ok(AnalysisResult {
            symbol: record.symbol.trim().to_uppercase(),
            signals,
            risk_score,
            fundamental_strength: FundamentalStrength::from_score(strength_points),
            valuation_score: score(NEUTRAL_SCORE, VALUATION_LADDERS, record, &metrics),
            quality_score: score(NEUTRAL_SCORE, QUALITY_LADDERS, record, &metrics),
            growth_score: score(NEUTRAL_SCORE, GROWTH_LADDERS, record, &metrics),
            momentum_score: score(NEUTRAL_SCORE, MOMENTUM_LADDERS, record, &metrics),
            provider_ratios: record.provider_ratios(),
            metrics,
        })
    }
}
