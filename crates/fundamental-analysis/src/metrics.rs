use analysis_core::{FundamentalsRecord, Metrics};

/// Assumed borrowing cost used to approximate interest expense from total debt.
const ASSUMED_INTEREST_RATE: f64 = 0.05;

/// Derives financial ratios from a [`FundamentalsRecord`].
///
/// Every ratio guards its denominator: a non-positive denominator yields
/// `f64::INFINITY` for "lower is better" ratios and `0.0` for returns and
/// margins. The upstream data has no current-asset or gross/operating line
/// items, so current/quick/cash ratios all use cash over total liabilities
/// and gross/operating margins equal the net margin.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsCalculator;

impl MetricsCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Compute the full ratio set for one record.
    pub fn calculate(&self, record: &FundamentalsRecord) -> Metrics {
        let equity = record.equity();
        let pe_ratio = self.calculate_pe_ratio(record.price, record.eps);
        let margin = self.calculate_profit_margin(record.net_income, record.revenue);
        let liquidity = self.calculate_cash_coverage(record.cash, record.total_liabilities);

        Metrics {
            pe_ratio,
            pb_ratio: self.calculate_pb_ratio(record.price, record.book_value_per_share),
            peg_ratio: self.calculate_peg_ratio(pe_ratio, record.earnings_growth),
            price_to_sales: self.calculate_price_to_sales(record.market_cap, record.revenue),

            roe: self.calculate_roe(record.net_income, equity),
            roa: self.calculate_roa(record.net_income, record.total_assets),
            net_margin: margin,
            gross_margin: margin,
            operating_margin: margin,
            roic: self.calculate_roic(record),

            asset_turnover: self.calculate_asset_turnover(record.revenue, record.total_assets),
            equity_multiplier: self.calculate_equity_multiplier(record.total_assets, equity),

            current_ratio: liquidity,
            quick_ratio: liquidity,
            cash_ratio: liquidity,

            debt_to_equity: self.calculate_debt_to_equity(record.debt, equity),
            debt_to_assets: self.calculate_debt_to_assets(record.debt, record.total_assets),
            equity_ratio: self.calculate_equity_ratio(equity, record.total_assets),
            interest_coverage: self.calculate_interest_coverage(record.net_income, record.debt),

            revenue_growth: record.revenue_growth,
            earnings_growth: record.earnings_growth,
            dividend_yield: record.dividend_yield,

            eps: record.eps,
            book_value_per_share: record.book_value_per_share,
            dividend_per_share: record.dividend_per_share,
        }
    }

    fn calculate_pe_ratio(&self, price: f64, eps: f64) -> f64 {
        if eps > 0.0 {
            price / eps
        } else {
            f64::INFINITY
        }
    }

    fn calculate_pb_ratio(&self, price: f64, book_value_per_share: f64) -> f64 {
        if book_value_per_share > 0.0 {
            price / book_value_per_share
        } else {
            f64::INFINITY
        }
    }

    fn calculate_peg_ratio(&self, pe_ratio: f64, earnings_growth: f64) -> f64 {
        if earnings_growth > 0.0 {
            pe_ratio / earnings_growth
        } else {
            f64::INFINITY
        }
    }

    fn calculate_price_to_sales(&self, market_cap: f64, revenue: f64) -> f64 {
        if revenue > 0.0 {
            market_cap / revenue
        } else {
            f64::INFINITY
        }
    }

    fn calculate_roe(&self, net_income: f64, equity: f64) -> f64 {
        if equity > 0.0 {
            (net_income / equity) * 100.0
        } else {
            0.0
        }
    }

    fn calculate_roa(&self, net_income: f64, total_assets: f64) -> f64 {
        if total_assets > 0.0 {
            (net_income / total_assets) * 100.0
        } else {
            0.0
        }
    }

    fn calculate_profit_margin(&self, net_income: f64, revenue: f64) -> f64 {
        if revenue > 0.0 {
            (net_income / revenue) * 100.0
        } else {
            0.0
        }
    }

    fn calculate_roic(&self, record: &FundamentalsRecord) -> f64 {
        // assets - (assets - liabilities - cash)
        let invested_capital =
            record.total_assets - (record.total_assets - record.total_liabilities - record.cash);
        if invested_capital > 0.0 {
            (record.net_income / invested_capital) * 100.0
        } else {
            0.0
        }
    }

    fn calculate_asset_turnover(&self, revenue: f64, total_assets: f64) -> f64 {
        if total_assets > 0.0 {
            revenue / total_assets
        } else {
            0.0
        }
    }

    fn calculate_equity_multiplier(&self, total_assets: f64, equity: f64) -> f64 {
        if equity > 0.0 {
            total_assets / equity
        } else {
            0.0
        }
    }

    fn calculate_cash_coverage(&self, cash: f64, total_liabilities: f64) -> f64 {
        if total_liabilities > 0.0 {
            cash / total_liabilities
        } else {
            f64::INFINITY
        }
    }

    fn calculate_debt_to_equity(&self, debt: f64, equity: f64) -> f64 {
        if equity > 0.0 {
            debt / equity
        } else {
            f64::INFINITY
        }
    }

    fn calculate_debt_to_assets(&self, debt: f64, total_assets: f64) -> f64 {
        if total_assets > 0.0 {
            debt / total_assets
        } else {
            0.0
        }
    }

    fn calculate_equity_ratio(&self, equity: f64, total_assets: f64) -> f64 {
        if total_assets > 0.0 {
            (equity / total_assets) * 100.0
        } else {
            0.0
        }
    }

    fn calculate_interest_coverage(&self, net_income: f64, debt: f64) -> f64 {
        let interest_expense = debt * ASSUMED_INTEREST_RATE;
        if debt > 0.0 && interest_expense > 0.0 {
            net_income / interest_expense
        } else {
            f64::INFINITY
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn healthy() -> FundamentalsRecord {
        FundamentalsRecord {
            symbol: "ACME".to_string(),
            price: 50.0,
            eps: 5.0,
            revenue: 2_000.0,
            net_income: 240.0,
            total_assets: 4_000.0,
            total_liabilities: 2_000.0,
            cash: 600.0,
            debt: 800.0,
            shares_outstanding: 100,
            market_cap: 5_000.0,
            dividend_per_share: 1.5,
            book_value_per_share: 20.0,
            revenue_growth: 8.0,
            earnings_growth: 10.0,
            dividend_yield: 3.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_valuation_ratios() {
        let m = MetricsCalculator::new().calculate(&healthy());
        assert_relative_eq!(m.pe_ratio, 10.0, epsilon = 1e-9);
        assert_relative_eq!(m.pb_ratio, 2.5, epsilon = 1e-9);
        assert_relative_eq!(m.peg_ratio, 1.0, epsilon = 1e-9);
        assert_relative_eq!(m.price_to_sales, 2.5, epsilon = 1e-9);
    }

    #[test]
    fn test_profitability_and_solvency() {
        let m = MetricsCalculator::new().calculate(&healthy());
        // equity = 2000
        assert_relative_eq!(m.roe, 12.0, epsilon = 1e-9);
        assert_relative_eq!(m.roa, 6.0, epsilon = 1e-9);
        assert_relative_eq!(m.net_margin, 12.0, epsilon = 1e-9);
        assert_eq!(m.gross_margin, m.net_margin);
        assert_eq!(m.operating_margin, m.net_margin);
        // invested capital = 4000 - (4000 - 2000 - 600) = 2600
        assert_relative_eq!(m.roic, 240.0 / 2_600.0 * 100.0, epsilon = 1e-9);
        assert_relative_eq!(m.asset_turnover, 0.5, epsilon = 1e-9);
        assert_relative_eq!(m.equity_multiplier, 2.0, epsilon = 1e-9);
        assert_relative_eq!(m.current_ratio, 0.3, epsilon = 1e-9);
        assert_eq!(m.quick_ratio, m.current_ratio);
        assert_eq!(m.cash_ratio, m.current_ratio);
        assert_relative_eq!(m.debt_to_equity, 0.4, epsilon = 1e-9);
        assert_relative_eq!(m.debt_to_assets, 0.2, epsilon = 1e-9);
        assert_relative_eq!(m.equity_ratio, 50.0, epsilon = 1e-9);
        // 240 / (800 * 0.05)
        assert_relative_eq!(m.interest_coverage, 6.0, epsilon = 1e-9);
    }

    #[test]
    fn test_pass_through_fields() {
        let r = healthy();
        let m = MetricsCalculator::new().calculate(&r);
        assert_eq!(m.revenue_growth, r.revenue_growth);
        assert_eq!(m.earnings_growth, r.earnings_growth);
        assert_eq!(m.dividend_yield, r.dividend_yield);
        assert_eq!(m.eps, r.eps);
        assert_eq!(m.book_value_per_share, r.book_value_per_share);
        assert_eq!(m.dividend_per_share, r.dividend_per_share);
    }

    #[test]
    fn test_non_positive_eps_is_unbounded_pe() {
        for eps in [0.0, -2.5] {
            let r = FundamentalsRecord { eps, ..healthy() };
            let m = MetricsCalculator::new().calculate(&r);
            assert!(m.pe_ratio.is_infinite() && m.pe_ratio > 0.0);
            // growth is positive, so PEG carries the unbounded P/E through
            assert!(m.peg_ratio.is_infinite());
        }
    }

    #[test]
    fn test_zero_debt_is_unbounded_interest_coverage() {
        let r = FundamentalsRecord { debt: 0.0, ..healthy() };
        let m = MetricsCalculator::new().calculate(&r);
        assert!(m.interest_coverage.is_infinite());
        assert_eq!(m.debt_to_equity, 0.0);
        assert_eq!(m.debt_to_assets, 0.0);
    }

    #[test]
    fn test_negative_equity_guards() {
        let r = FundamentalsRecord {
            total_assets: 1_000.0,
            total_liabilities: 1_500.0,
            ..healthy()
        };
        let m = MetricsCalculator::new().calculate(&r);
        assert_eq!(m.roe, 0.0);
        assert_eq!(m.equity_multiplier, 0.0);
        assert!(m.debt_to_equity.is_infinite());
        assert_relative_eq!(m.equity_ratio, -50.0, epsilon = 1e-9);
    }

    #[test]
    fn test_empty_record_never_nan() {
        let m = MetricsCalculator::new().calculate(&FundamentalsRecord {
            symbol: "EMPTY".to_string(),
            ..Default::default()
        });
        for (name, value) in m.iter() {
            assert!(!value.is_nan(), "{} is NaN", name);
        }
        assert!(m.pe_ratio.is_infinite());
        assert!(m.pb_ratio.is_infinite());
        assert!(m.price_to_sales.is_infinite());
        assert!(m.current_ratio.is_infinite());
        assert_eq!(m.roa, 0.0);
        assert_eq!(m.roic, 0.0);
    }
}
