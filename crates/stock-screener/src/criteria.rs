use analysis_core::{AnalysisResult, FundamentalsRecord, Metrics};
use fundamental_analysis::StockAnalyzer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Inclusive bounds on one metric. A missing side is unconstrained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl Bounds {
    pub fn min(min: f64) -> Self {
        Self { min: Some(min), max: None }
    }

    pub fn max(max: f64) -> Self {
        Self { min: None, max: Some(max) }
    }

    pub fn between(min: f64, max: f64) -> Self {
        Self { min: Some(min), max: Some(max) }
    }

    pub fn admits(&self, value: f64) -> bool {
        if let Some(min) = self.min {
            if value < min {
                return false;
            }
        }
        if let Some(max) = self.max {
            if value > max {
                return false;
            }
        }
        true
    }
}

/// `{ metric_name: { "min": .., "max": .. } }`
pub type Criteria = BTreeMap<String, Bounds>;

/// Keeps records whose metrics fall inside every criterion's bounds.
#[derive(Debug, Clone, Default)]
pub struct CriteriaFilter {
    analyzer: StockAnalyzer,
}

impl CriteriaFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value a criterion is checked against: computed metric first, then the
    /// raw record field. `None` means the criterion does not apply.
    pub fn resolve(metrics: &Metrics, record: &FundamentalsRecord, name: &str) -> Option<f64> {
        metrics.get(name).or_else(|| record.field(name))
    }

    /// True when every applicable criterion admits the record.
    pub fn passes(record: &FundamentalsRecord, analysis: &AnalysisResult, criteria: &Criteria) -> bool {
        criteria.iter().all(|(name, bounds)| {
            match Self::resolve(&analysis.metrics, record, name) {
                Some(value) => bounds.admits(value),
                None => {
                    tracing::debug!(metric = %name, "Criterion has no matching metric, skipping");
                    true
                }
            }
        })
    }

    /// Records that pass every criterion, in input order. Invalid records are dropped.
    pub fn filter(&self, records: &[FundamentalsRecord], criteria: &Criteria) -> Vec<FundamentalsRecord> {
        self.filter_analyzed(records, criteria)
            .into_iter()
            .map(|(record, _)| record)
            .collect()
    }

    /// Like [`filter`](Self::filter) but also hands back each survivor's analysis.
    pub fn filter_analyzed(
        &self,
        records: &[FundamentalsRecord],
        criteria: &Criteria,
    ) -> Vec<(FundamentalsRecord, AnalysisResult)> {
        records
            .iter()
            .filter_map(|record| match self.analyzer.analyze(record) {
                Ok(analysis) => Some((record, analysis)),
                Err(e) => {
                    tracing::warn!(symbol = %record.symbol, error = %e, "Dropping record from criteria filter");
                    None
                }
            })
            .filter(|(record, analysis)| Self::passes(record, analysis, criteria))
            .map(|(record, analysis)| (record.clone(), analysis))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(symbol: &str, price: f64) -> FundamentalsRecord {
        FundamentalsRecord {
            symbol: symbol.to_string(),
            price,
            eps: 1.0,
            revenue: 1_000.0,
            net_income: 150.0,
            total_assets: 2_000.0,
            total_liabilities: 1_000.0,
            cash: 500.0,
            debt: 300.0,
            market_cap: 800.0,
            book_value_per_share: 10.0,
            revenue_growth: 12.0,
            earnings_growth: 8.0,
            dividend_yield: 2.5,
            ..Default::default()
        }
    }

    fn criteria(entries: &[(&str, Bounds)]) -> Criteria {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_max_pe_keeps_cheaper_record() {
        let filter = CriteriaFilter::new();
        let kept = filter.filter(
            &[record("FIFTEEN", 15.0), record("TWENTYFIVE", 25.0)],
            &criteria(&[("pe_ratio", Bounds::max(20.0))]),
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].symbol, "FIFTEEN");
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let b = Bounds::between(10.0, 20.0);
        assert!(b.admits(10.0));
        assert!(b.admits(20.0));
        assert!(!b.admits(9.99));
        assert!(!b.admits(20.01));
        assert!(!b.admits(f64::INFINITY));
        assert!(Bounds::default().admits(f64::INFINITY));
    }

    #[test]
    fn test_all_criteria_must_pass() {
        let filter = CriteriaFilter::new();
        // roe 15, d/e 0.3, pe 15
        let c = criteria(&[
            ("roe", Bounds::min(10.0)),
            ("debt_to_equity", Bounds::max(0.5)),
            ("pe_ratio", Bounds::max(12.0)),
        ]);
        assert!(filter.filter(&[record("A", 15.0)], &c).is_empty());
        assert_eq!(filter.filter(&[record("A", 10.0)], &c).len(), 1);
    }

    #[test]
    fn test_raw_fields_resolve_after_metrics() {
        let filter = CriteriaFilter::new();
        let c = criteria(&[("market_cap", Bounds::min(1_000.0))]);
        assert!(filter.filter(&[record("SMALL", 10.0)], &c).is_empty());

        let big = FundamentalsRecord { market_cap: 5_000.0, ..record("BIG", 10.0) };
        assert_eq!(filter.filter(&[big], &c).len(), 1);
    }

    #[test]
    fn test_computed_metric_shadows_provider_ratio() {
        let filter = CriteriaFilter::new();
        // computed pe 10, provider says 99
        let stale = FundamentalsRecord { pe_ratio: Some(99.0), ..record("STALE", 10.0) };
        let c = criteria(&[("pe_ratio", Bounds::max(20.0))]);
        let kept = filter.filter(&[stale], &c);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].symbol, "STALE");
    }

    #[test]
    fn test_unknown_metric_is_skipped() {
        let filter = CriteriaFilter::new();
        let c = criteria(&[("payout_ratio", Bounds::max(60.0)), ("years_of_dividends", Bounds::min(10.0))]);
        assert_eq!(filter.filter(&[record("A", 10.0)], &c).len(), 1);
    }

    #[test]
    fn test_unbounded_ratio_fails_max() {
        let filter = CriteriaFilter::new();
        let loss = FundamentalsRecord { eps: -2.0, ..record("LOSS", 10.0) };
        let c = criteria(&[("pe_ratio", Bounds::max(50.0))]);
        assert!(filter.filter(&[loss], &c).is_empty());
    }

    #[test]
    fn test_invalid_records_dropped() {
        let filter = CriteriaFilter::new();
        let broken = FundamentalsRecord { symbol: String::new(), ..record("", 10.0) };
        assert!(filter.filter(&[broken], &Criteria::new()).is_empty());
    }

    #[test]
    fn test_criteria_json_shape() {
        let parsed: Criteria = serde_json::from_str(r#"{"pe_ratio": {"max": 20}, "roe": {"min": 15, "max": 40}}"#).unwrap();
        assert_eq!(parsed["pe_ratio"], Bounds::max(20.0));
        assert_eq!(parsed["roe"], Bounds::between(15.0, 40.0));
    }
}
