//! Twelve classic rules of thumb, each worth up to ten points.

use analysis_core::{AnalysisResult, FundamentalsRecord, SupplementalInfo};
use serde::Serialize;
use std::fmt;

const POINTS_PER_RULE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    StrongBuy,
    Buy,
    Hold,
    Sell,
}

impl Recommendation {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 80.0 {
            Recommendation::StrongBuy
        } else if percentage >= 60.0 {
            Recommendation::Buy
        } else if percentage >= 40.0 {
            Recommendation::Hold
        } else {
            Recommendation::Sell
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::StrongBuy => "STRONG_BUY",
            Recommendation::Buy => "BUY",
            Recommendation::Hold => "HOLD",
            Recommendation::Sell => "SELL",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rule-of-thumb check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleCheck {
    pub metric: &'static str,
    pub value: String,
    pub rule: &'static str,
    pub status: &'static str,
    pub score: u32,
    pub tip: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RulesOfThumbReport {
    pub symbol: String,
    pub evaluations: Vec<RuleCheck>,
    pub overall_score: u32,
    pub max_score: u32,
    pub percentage: f64,
    pub recommendation: Recommendation,
}

fn ratio_text(value: f64) -> String {
    if value.is_finite() {
        format!("{:.2}", value)
    } else {
        "N/A".to_string()
    }
}

fn percent_text(value: f64) -> String {
    if value.is_finite() {
        format!("{:.1}%", value)
    } else {
        "N/A".to_string()
    }
}

fn pe_check(pe: f64) -> RuleCheck {
    let (status, score) = if (15.0..=20.0).contains(&pe) {
        ("GOOD", 10)
    } else if pe < 15.0 {
        ("UNDERVALUED", if pe >= 10.0 { 8 } else { 5 })
    } else {
        ("OVERVALUED", if pe < 30.0 { 5 } else { 0 })
    };
    RuleCheck {
        metric: "P/E Ratio",
        value: ratio_text(pe),
        rule: "15-20 is reasonable",
        status,
        score,
        tip: "Compare to peers and the industry average.",
    }
}

fn debt_to_equity_check(de: f64) -> RuleCheck {
    let (status, score) = if de < 1.0 {
        ("HEALTHY", 10)
    } else if de < 2.0 {
        ("HIGH", 5)
    } else {
        ("HIGH", 0)
    };
    RuleCheck {
        metric: "Debt-to-Equity",
        value: ratio_text(de),
        rule: "<1 is safer",
        status,
        score,
        tip: "Ensure company's cash flow can service debt.",
    }
}

fn current_ratio_check(cr: f64) -> RuleCheck {
    let status = if (1.5..=3.0).contains(&cr) {
        "HEALTHY"
    } else if cr < 1.5 {
        "LOW"
    } else {
        "INEFFICIENT"
    };
    let score = if (1.8..=2.5).contains(&cr) {
        10
    } else if (1.5..=3.0).contains(&cr) {
        7
    } else {
        0
    };
    RuleCheck {
        metric: "Current Ratio",
        value: ratio_text(cr),
        rule: "2:1 is healthy",
        status,
        score,
        tip: "Too high might suggest inefficient asset use.",
    }
}

fn growth_score(growth: f64) -> u32 {
    if growth > 10.0 {
        10
    } else if growth > 0.0 {
        5
    } else {
        0
    }
}

fn revenue_growth_check(growth: f64) -> RuleCheck {
    RuleCheck {
        metric: "Revenue Growth (YoY)",
        value: percent_text(growth),
        rule: "Look for consistent growth",
        status: if growth > 5.0 { "STABLE" } else { "VOLATILE" },
        score: growth_score(growth),
        tip: "Sudden jumps or declines may suggest market disruption.",
    }
}

fn eps_growth_check(growth: f64) -> RuleCheck {
    RuleCheck {
        metric: "EPS Growth (YoY)",
        value: percent_text(growth),
        rule: "Steady or rising",
        status: if growth > 0.0 { "GROWING" } else { "DECLINING" },
        score: growth_score(growth),
        tip: "EPS should grow in tandem with revenue.",
    }
}

fn roe_check(roe: f64) -> RuleCheck {
    RuleCheck {
        metric: "ROE",
        value: percent_text(roe),
        rule: "15%+ is good",
        status: if roe >= 15.0 { "EXCELLENT" } else { "POOR" },
        score: if roe >= 15.0 {
            10
        } else if roe >= 10.0 {
            5
        } else {
            0
        },
        tip: "Compare ROE to peers in the same industry.",
    }
}

// An unknown payout ratio reads as zero: sustainable, but unscored.
fn payout_check(payout_ratio: Option<f64>) -> RuleCheck {
    let payout = payout_ratio.unwrap_or(0.0);
    RuleCheck {
        metric: "Payout Ratio",
        value: if payout != 0.0 { percent_text(payout) } else { "N/A".to_string() },
        rule: "<60% is sustainable",
        status: if payout < 60.0 { "SUSTAINABLE" } else { "HIGH" },
        score: if payout > 0.0 && payout < 60.0 {
            10
        } else if (60.0..80.0).contains(&payout) {
            5
        } else {
            0
        },
        tip: "Very high payout limit growth and reinvestment.",
    }
}

fn pb_check(pb: f64) -> RuleCheck {
    let (status, score) = if pb < 1.0 {
        ("UNDERVALUED", 10)
    } else if pb < 2.0 {
        ("FAIR/OVER", 7)
    } else {
        ("FAIR/OVER", 3)
    };
    RuleCheck {
        metric: "P/B Ratio",
        value: ratio_text(pb),
        rule: "<1 suggests undervaluation",
        status,
        score,
        tip: "Better for asset-heavy industries.",
    }
}

fn free_cash_flow_check(fcf: Option<f64>) -> RuleCheck {
    let fcf = fcf.filter(|v| v.is_finite() && *v != 0.0);
    let positive = fcf.map_or(false, |v| v > 0.0);
    RuleCheck {
        metric: "Free Cash Flow",
        value: fcf.map_or_else(|| "N/A".to_string(), |v| format!("${:.2}B", v / 1e9)),
        rule: "Should be positive and growing",
        status: if positive { "POSITIVE" } else { "NEGATIVE" },
        score: if positive { POINTS_PER_RULE } else { 0 },
        tip: "FCF is essential for dividends and debt repayment.",
    }
}

fn category_check(pe: f64, earnings_growth: f64) -> RuleCheck {
    let growth = pe > 25.0 || earnings_growth > 15.0;
    RuleCheck {
        metric: "Category",
        value: if growth { "Growth" } else { "Value" }.to_string(),
        rule: "Growth (High P/E) vs Value (Low P/E)",
        status: "ANALYZED",
        score: POINTS_PER_RULE,
        tip: "Value offers safety; Growth offers high reward.",
    }
}

fn diversification_check() -> RuleCheck {
    RuleCheck {
        metric: "Diversification Advice",
        value: "Review Weight".to_string(),
        rule: "Max 5% per stock",
        status: "ADVICE",
        score: POINTS_PER_RULE,
        tip: "Don't put more than 5% of your portfolio into a single stock.",
    }
}

fn industry_check(sector: Option<&str>) -> RuleCheck {
    RuleCheck {
        metric: "Industry Context",
        value: sector.unwrap_or("Unknown").to_string(),
        rule: "Compare within the same industry",
        status: "CONTEXT",
        score: POINTS_PER_RULE,
        tip: "Always compare metrics within the same industry.",
    }
}

/// Run all twelve checks and total them into a recommendation.
pub fn evaluate(
    record: &FundamentalsRecord,
    analysis: &AnalysisResult,
    info: &SupplementalInfo,
) -> RulesOfThumbReport {
    let m = &analysis.metrics;
    let evaluations = vec![
        pe_check(m.pe_ratio),
        debt_to_equity_check(m.debt_to_equity),
        current_ratio_check(m.current_ratio),
        revenue_growth_check(record.revenue_growth),
        eps_growth_check(record.earnings_growth),
        roe_check(m.roe),
        payout_check(info.payout_ratio),
        pb_check(m.pb_ratio),
        free_cash_flow_check(info.free_cash_flow),
        category_check(m.pe_ratio, record.earnings_growth),
        diversification_check(),
        industry_check(info.sector.as_deref()),
    ];

    let overall_score: u32 = evaluations.iter().map(|e| e.score).sum();
    let max_score = evaluations.len() as u32 * POINTS_PER_RULE;
    let percentage = overall_score as f64 / max_score as f64 * 100.0;

    RulesOfThumbReport {
        symbol: analysis.symbol.clone(),
        evaluations,
        overall_score,
        max_score,
        percentage,
        recommendation: Recommendation::from_percentage(percentage),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use fundamental_analysis::StockAnalyzer;

    fn report(record: &FundamentalsRecord, info: &SupplementalInfo) -> RulesOfThumbReport {
        let analysis = StockAnalyzer::new().analyze(record).unwrap();
        evaluate(record, &analysis, info)
    }

    fn average() -> FundamentalsRecord {
        FundamentalsRecord {
            symbol: "AVG".to_string(),
            price: 50.0,
            eps: 5.0,
            revenue: 2_000.0,
            net_income: 240.0,
            total_assets: 4_000.0,
            total_liabilities: 2_000.0,
            cash: 600.0,
            debt: 800.0,
            market_cap: 5_000.0,
            book_value_per_share: 20.0,
            revenue_growth: 8.0,
            earnings_growth: 10.0,
            dividend_yield: 3.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_average_company_is_hold() {
        let r = report(&average(), &SupplementalInfo::default());
        assert_eq!(r.evaluations.len(), 12);
        assert_eq!(r.max_score, 120);
        let scores: Vec<u32> = r.evaluations.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![8, 10, 0, 5, 5, 5, 0, 3, 0, 10, 10, 10]);
        assert_eq!(r.overall_score, 66);
        assert_relative_eq!(r.percentage, 55.0, epsilon = 1e-9);
        assert_eq!(r.recommendation, Recommendation::Hold);

        assert_eq!(r.evaluations[0].status, "UNDERVALUED");
        assert_eq!(r.evaluations[0].value, "10.00");
        assert_eq!(r.evaluations[2].status, "LOW");
        assert_eq!(r.evaluations[6].value, "N/A");
        assert_eq!(r.evaluations[6].status, "SUSTAINABLE");
        assert_eq!(r.evaluations[9].value, "Value");
        assert_eq!(r.evaluations[11].value, "Unknown");
    }

    #[test]
    fn test_textbook_company_is_strong_buy() {
        let record = FundamentalsRecord {
            symbol: "BEST".to_string(),
            price: 18.0,
            eps: 1.0,
            total_assets: 3_000.0,
            total_liabilities: 1_000.0,
            net_income: 400.0,
            debt: 400.0,
            cash: 2_000.0,
            book_value_per_share: 20.0,
            revenue_growth: 12.0,
            earnings_growth: 12.0,
            ..Default::default()
        };
        let info = SupplementalInfo {
            payout_ratio: Some(40.0),
            free_cash_flow: Some(1.5e9),
            sector: Some("Technology".to_string()),
        };
        let r = report(&record, &info);
        assert_eq!(r.overall_score, 120);
        assert_eq!(r.recommendation, Recommendation::StrongBuy);
        assert_eq!(r.evaluations[8].value, "$1.50B");
        assert_eq!(r.evaluations[11].value, "Technology");
    }

    #[test]
    fn test_unbounded_ratios_print_na() {
        let loss = FundamentalsRecord { eps: -1.0, total_liabilities: 0.0, ..average() };
        let r = report(&loss, &SupplementalInfo::default());
        assert_eq!(r.evaluations[0].value, "N/A");
        assert_eq!(r.evaluations[0].status, "OVERVALUED");
        assert_eq!(r.evaluations[0].score, 0);
        assert_eq!(r.evaluations[2].value, "N/A");
        assert_eq!(r.evaluations[2].status, "INEFFICIENT");
        assert_eq!(r.evaluations[9].value, "Growth");
    }

    #[test]
    fn test_payout_bands() {
        assert_eq!(payout_check(Some(59.9)).score, 10);
        assert_eq!(payout_check(Some(60.0)).score, 5);
        assert_eq!(payout_check(Some(60.0)).status, "HIGH");
        assert_eq!(payout_check(Some(85.0)).score, 0);
        assert_eq!(payout_check(None).score, 0);
    }

    #[test]
    fn test_recommendation_tiers() {
        assert_eq!(Recommendation::from_percentage(80.0), Recommendation::StrongBuy);
        assert_eq!(Recommendation::from_percentage(79.9), Recommendation::Buy);
        assert_eq!(Recommendation::from_percentage(40.0), Recommendation::Hold);
        assert_eq!(Recommendation::from_percentage(39.9), Recommendation::Sell);
    }
}
