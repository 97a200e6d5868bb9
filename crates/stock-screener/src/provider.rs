use analysis_core::{AnalysisError, FundamentalsProvider, FundamentalsRecord, SupplementalInfo};
use async_trait::async_trait;
use dashmap::DashMap;

/// Fundamentals held in memory, keyed by uppercase symbol.
#[derive(Debug, Default)]
pub struct InMemoryProvider {
    records: DashMap<String, FundamentalsRecord>,
    supplemental: DashMap<String, SupplementalInfo>,
}

fn key(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a provider holding `records`, keyed by their normalized symbols.
    pub fn from_records(records: impl IntoIterator<Item = FundamentalsRecord>) -> Self {
        let provider = Self::new();
        for record in records {
            provider.insert(record);
        }
        provider
    }

    /// Store a record under its normalized symbol, replacing any earlier one.
    pub fn insert(&self, record: FundamentalsRecord) {
        let record = record.normalized();
        self.records.insert(record.symbol.clone(), record);
    }

    pub fn insert_supplemental(&self, symbol: &str, info: SupplementalInfo) {
        self.supplemental.insert(key(symbol), info);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Stored symbols in sorted order.
    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.records.iter().map(|entry| entry.key().clone()).collect();
        symbols.sort();
        symbols
    }
}

#[async_trait]
impl FundamentalsProvider for InMemoryProvider {
    async fn fetch(&self, symbol: &str) -> Result<FundamentalsRecord, AnalysisError> {
        self.records
            .get(&key(symbol))
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AnalysisError::DataUnavailable(format!("no fundamentals for {}", symbol)))
    }

    async fn supplemental(&self, symbol: &str) -> Result<SupplementalInfo, AnalysisError> {
        Ok(self
            .supplemental
            .get(&key(symbol))
            .map(|entry| entry.value().clone())
            .unwrap_or_default())
    }
}
