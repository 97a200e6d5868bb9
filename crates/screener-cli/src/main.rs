//! screener-cli: screen a universe of fundamentals records from a JSON file.
//!
//! Usage:
//!   screener-cli --input records.json --strategy value_investing
//!   screener-cli --input records.json --style garp --threshold 0
//!   screener-cli --input records.json --profile conservative
//!   screener-cli --input records.json --criteria '{"pe_ratio": {"max": 20}}'
//!   screener-cli --input records.json --all
//!   screener-cli --input records.json --analyze
//!   screener-cli --input records.json --rules-of-thumb AAPL

use analysis_core::{FundamentalsRecord, StrategyKind};
use anyhow::{bail, Context, Result};
use std::sync::Arc;
use stock_screener::{
    create_custom_strategy, Criteria, InMemoryProvider, InvestmentStyle, ScreenerConfig, ScreeningProfile,
    StockScreener, StrategyRef,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Debug, Clone, PartialEq)]
enum Mode {
    Screen(StrategyRef),
    All,
    Analyze,
    RulesOfThumb(String),
}

#[derive(Debug, Clone, PartialEq)]
struct Options {
    input: String,
    mode: Mode,
    threshold: Option<f64>,
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
}

fn parse_args(args: &[String]) -> Result<Options> {
    let input = flag_value(args, "--input")
        .context("--input <records.json> is required")?
        .to_string();

    let threshold = flag_value(args, "--threshold")
        .map(|raw| raw.parse::<f64>().with_context(|| format!("invalid --threshold: {}", raw)))
        .transpose()?;

    let mode = if let Some(kind) = flag_value(args, "--strategy") {
        Mode::Screen(StrategyRef::NamedStrategy(kind.parse::<StrategyKind>()?))
    } else if let Some(style) = flag_value(args, "--style") {
        Mode::Screen(style.parse::<InvestmentStyle>()?.into())
    } else if let Some(profile) = flag_value(args, "--profile") {
        Mode::Screen(profile.parse::<ScreeningProfile>()?.into())
    } else if let Some(json) = flag_value(args, "--criteria") {
        let criteria: Criteria = serde_json::from_str(json).context("--criteria must be a JSON object of bounds")?;
        Mode::Screen(create_custom_strategy("custom", criteria, "").into())
    } else if let Some(symbol) = flag_value(args, "--rules-of-thumb") {
        Mode::RulesOfThumb(symbol.to_string())
    } else if args.iter().any(|a| a == "--analyze") {
        Mode::Analyze
    } else if args.iter().any(|a| a == "--all") {
        Mode::All
    } else {
        bail!("one of --strategy, --style, --profile, --criteria, --all, --analyze or --rules-of-thumb is required");
    };

    Ok(Options { input, mode, threshold })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  screener-cli --input FILE --strategy KIND     value_investing, growth_investing, dividend_investing,");
    eprintln!("                                                momentum_investing, quality_investing, contrarian");
    eprintln!("  screener-cli --input FILE --style STYLE       value, growth, dividend, quality, momentum, garp");
    eprintln!("  screener-cli --input FILE --profile PROFILE   conservative, aggressive, income, balanced");
    eprintln!("  screener-cli --input FILE --criteria JSON     e.g. '{{\"pe_ratio\": {{\"max\": 20}}}}'");
    eprintln!("  screener-cli --input FILE --all               every configured strategy");
    eprintln!("  screener-cli --input FILE --analyze           full analysis per record");
    eprintln!("  screener-cli --input FILE --rules-of-thumb SYMBOL");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --threshold N   minimum score (default: SCREENER_THRESHOLD or 50)");
}

fn init_logging() {
    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "screener_cli=info,stock_screener=info".into());

    if json_logging {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn load_records(path: &str) -> Result<Vec<FundamentalsRecord>> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path))?;
    let records: Vec<FundamentalsRecord> =
        serde_json::from_str(&raw).with_context(|| format!("{} is not a JSON array of records", path))?;
    Ok(records.into_iter().map(FundamentalsRecord::normalized).collect())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    let args: Vec<String> = std::env::args().collect();
    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("error: {:#}", e);
            print_usage();
            std::process::exit(1);
        }
    };

    let mut config = ScreenerConfig::from_env()?;
    if let Some(threshold) = options.threshold {
        config.threshold = threshold;
        config.validate()?;
    }

    let records = load_records(&options.input)?;
    let symbols: Vec<String> = records.iter().map(|r| r.symbol.clone()).collect();
    tracing::info!(
        "screener-cli: {} records from {}, threshold={}, concurrency={}",
        records.len(),
        options.input,
        config.threshold,
        config.max_concurrency
    );

    let threshold = config.threshold;
    let service = StockScreener::new(Arc::new(InMemoryProvider::from_records(records)), config);

    let output = match options.mode {
        Mode::Screen(strategy) => {
            let report = service.screen_symbols(&symbols, &strategy, threshold).await?;
            serde_json::to_string_pretty(&report)?
        }
        Mode::All => serde_json::to_string_pretty(&service.batch_screen_symbols(&symbols).await)?,
        Mode::Analyze => serde_json::to_string_pretty(&service.batch_analyze(&symbols).await)?,
        Mode::RulesOfThumb(symbol) => serde_json::to_string_pretty(&service.evaluate_rules_of_thumb(&symbol).await?)?,
    };
    println!("{}", output);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("screener-cli")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_named_strategy() {
        let options = parse_args(&args(&["--input", "r.json", "--strategy", "contrarian", "--threshold", "0"])).unwrap();
        assert_eq!(options.input, "r.json");
        assert_eq!(options.threshold, Some(0.0));
        assert_eq!(options.mode, Mode::Screen(StrategyRef::NamedStrategy(StrategyKind::Contrarian)));
    }

    #[test]
    fn test_style_and_criteria() {
        let options = parse_args(&args(&["--input", "r.json", "--style", "garp"])).unwrap();
        assert_eq!(options.mode, Mode::Screen(InvestmentStyle::Garp.into()));

        let options = parse_args(&args(&["--input", "r.json", "--criteria", r#"{"pe_ratio": {"max": 20}}"#])).unwrap();
        match options.mode {
            Mode::Screen(StrategyRef::CustomCriteria(c)) => assert_eq!(c.criteria.len(), 1),
            other => panic!("unexpected mode {:?}", other),
        }
    }

    #[test]
    fn test_missing_input_or_mode() {
        assert!(parse_args(&args(&["--strategy", "value"])).is_err());
        assert!(parse_args(&args(&["--input", "r.json"])).is_err());
        assert!(parse_args(&args(&["--input", "r.json", "--strategy", "garp"])).is_err());
        assert!(parse_args(&args(&["--input", "r.json", "--all", "--threshold", "x"])).is_err());
    }

    #[test]
    fn test_flag_modes() {
        assert_eq!(parse_args(&args(&["--input", "r.json", "--all"])).unwrap().mode, Mode::All);
        assert_eq!(parse_args(&args(&["--input", "r.json", "--analyze"])).unwrap().mode, Mode::Analyze);
        assert_eq!(
            parse_args(&args(&["--input", "r.json", "--rules-of-thumb", "KO"])).unwrap().mode,
            Mode::RulesOfThumb("KO".to_string())
        );
    }
}
