use async_trait::async_trait;
use crate::{AnalysisError, FundamentalsRecord, SupplementalInfo};

/// Supplier of fundamentals, implemented by the market-data layer.
#[async_trait]
pub trait FundamentalsProvider: Send + Sync {
    async fn fetch(&self, symbol: &str) -> Result<FundamentalsRecord, AnalysisError>;

    /// Facts outside the record shape (payout ratio, free cash flow, sector).
    async fn supplemental(&self, _symbol: &str) -> Result<SupplementalInfo, AnalysisError> {
        Ok(SupplementalInfo::default())
    }
}
