//! Fundamental analysis: ratio derivation and ratio-based scoring.
//!
//! [`MetricsCalculator`] maps a record to its ratios; [`StockAnalyzer`]
//! turns those ratios into signals and 0-100 scores using the threshold
//! ladders in [`analyzer`].

pub mod analyzer;
pub mod ladder;
pub mod metrics;

pub use analyzer::StockAnalyzer;
pub use ladder::{Ladder, Rung, Tally};
pub use metrics::MetricsCalculator;
