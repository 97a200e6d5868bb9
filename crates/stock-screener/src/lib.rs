//! Stock screening: built-in strategies, rule-based custom strategies,
//! criteria filters and a provider-backed screening service.

pub mod builder;
pub mod config;
pub mod criteria;
pub mod engine;
pub mod provider;
pub mod rules_of_thumb;
pub mod screener;
pub mod service;
pub mod styles;

pub use builder::{fallible_rule, rule, BoxedRule, Rule, RuleOutcome, StrategyBuilder, StrategyInfo};
pub use config::ScreenerConfig;
pub use criteria::{Bounds, Criteria, CriteriaFilter};
pub use engine::{ScreeningEngine, DEFAULT_THRESHOLD};
pub use provider::InMemoryProvider;
pub use rules_of_thumb::{Recommendation, RuleCheck, RulesOfThumbReport};
pub use screener::{Screener, StrategyRef};
pub use service::{BatchAnalysis, BatchScreenReport, ScreenReport, StockScreener, SymbolFailure};
pub use styles::{create_custom_strategy, CriteriaStrategy, InvestmentStyle, ScreeningProfile};
