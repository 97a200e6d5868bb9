use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown strategy: {0}")]
    UnknownStrategy(String),

    #[error("Rule {rule} failed: {reason}")]
    RuleEvaluation { rule: usize, reason: String },

    #[error("Data unavailable: {0}")]
    DataUnavailable(String),
}
