//! Holdings CLI - Command line interface for profit and return calculations.
//!
//! Every command prints a JSON envelope (`{"ok": .., "data": .., "error": ..}`).

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use holdings_core::{
    dates::parse_date, ApiResponse, Holdings, InstrumentRegistry, PortfolioStore,
    PricedInstrument,
};
use serde_json::{json, Value};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "holdings")]
#[command(about = "Holdings CLI - profit and annualized return over dated prices")]
#[command(version)]
struct Cli {
    /// Portfolio snapshot file (defaults to $HOLDINGS_PORTFOLIO_FILE or ~/.holdings/portfolio.json)
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the built-in two-stock example
    Demo,
    /// Instrument management commands
    Instrument {
        #[command(subcommand)]
        action: InstrumentAction,
    },
    /// Position management commands
    Position {
        #[command(subcommand)]
        action: PositionAction,
    },
    /// Show stored instruments and positions
    Status,
    /// Calculate total profit between two dates
    Profit {
        #[command(flatten)]
        range: DateRange,
    },
    /// Calculate annualized return (percent) between two dates
    Return {
        #[command(flatten)]
        range: DateRange,
    },
    /// Full performance report with per-position breakdown
    Report {
        #[command(flatten)]
        range: DateRange,
    },
}

#[derive(clap::Args)]
struct DateRange {
    /// Start date (YYYY-MM-DD)
    #[arg(short, long)]
    start: String,
    /// End date (YYYY-MM-DD)
    #[arg(short, long)]
    end: String,
}

#[derive(Subcommand)]
enum InstrumentAction {
    /// Add an instrument with its price history
    Add {
        /// Instrument name
        #[arg(short, long)]
        name: String,
        /// Price snapshot as DATE=PRICE (repeatable)
        #[arg(short, long = "price", value_parser = parse_price_point)]
        prices: Vec<(String, f64)>,
    },
}

#[derive(Subcommand)]
enum PositionAction {
    /// Add shares of an instrument (accumulates onto existing shares)
    Add {
        /// Instrument name
        #[arg(short, long)]
        instrument: String,
        /// Number of shares
        #[arg(short = 'n', long)]
        quantity: f64,
    },
}

fn parse_price_point(raw: &str) -> std::result::Result<(String, f64), String> {
    let (date, price) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected DATE=PRICE, got '{raw}'"))?;
    let date = date.trim();
    parse_date(date).map_err(|e| e.to_string())?;
    let price: f64 = price
        .trim()
        .parse()
        .map_err(|_| format!("invalid price '{price}'"))?;
    Ok((date.to_string(), price))
}

fn main() {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let output = match run(cli) {
        Ok(data) => render(&ApiResponse::ok(data)),
        Err(e) => render(&ApiResponse::<()>::err(format!("{e:#}"))),
    };

    println!("{}", output);
}

fn render<T: serde::Serialize>(response: &ApiResponse<T>) -> String {
    serde_json::to_string_pretty(response)
        .unwrap_or_else(|e| format!(r#"{{"ok":false,"error":"serialization failed: {e}"}}"#))
}

fn run(cli: Cli) -> Result<Value> {
    let file = cli.file;
    match cli.command {
        Commands::Demo => handle_demo(),
        Commands::Instrument { action } => handle_instrument(&mut open_store(file)?, action),
        Commands::Position { action } => handle_position(&mut open_store(file)?, action),
        Commands::Status => handle_status(&open_store(file)?),
        Commands::Profit { range } => handle_profit(&open_store(file)?, &range),
        Commands::Return { range } => handle_return(&open_store(file)?, &range),
        Commands::Report { range } => handle_report(&open_store(file)?, &range),
    }
}

/// Open the snapshot strictly so a corrupt file is reported, never overwritten.
fn open_store(file: Option<PathBuf>) -> Result<PortfolioStore> {
    let path = file.unwrap_or_else(PortfolioStore::default_path);
    info!(path = %path.display(), "using portfolio file");
    PortfolioStore::open(path.clone())
        .with_context(|| format!("failed to read portfolio file {}", path.display()))
}

fn handle_demo() -> Result<Value> {
    let mut registry = InstrumentRegistry::new();
    let stock_a = registry.register(PricedInstrument::new(
        "Stock A",
        [("2024-01-01", 100.0), ("2024-06-01", 150.0), ("2024-12-01", 200.0)],
    ))?;
    let stock_b = registry.register(PricedInstrument::new(
        "Stock B",
        [("2024-01-01", 50.0), ("2024-06-01", 75.0), ("2024-12-01", 80.0)],
    ))?;

    let mut holdings = Holdings::new(&registry);
    holdings.add_position(stock_a, 10.0)?;
    holdings.add_position(stock_a, 20.0)?;
    holdings.add_position(stock_b, 20.0)?;

    let (start, end) = ("2024-01-01", "2024-12-01");
    let profit = holdings.profit(start, end);
    let annualized = holdings.annualized_return(start, end)?;

    Ok(json!({
        "start": start,
        "end": end,
        "profit": profit,
        "annualized_return": annualized,
        "summary": format!("Profit: ${profit}, Annualized Return: {annualized:.2}%"),
    }))
}

fn handle_instrument(store: &mut PortfolioStore, action: InstrumentAction) -> Result<Value> {
    match action {
        InstrumentAction::Add { name, prices } => {
            let instrument = PricedInstrument::new(name, prices);
            store.add_instrument(instrument.clone())?;
            store.save().context("failed to save portfolio")?;
            Ok(json!({ "instrument": instrument }))
        }
    }
}

fn handle_position(store: &mut PortfolioStore, action: PositionAction) -> Result<Value> {
    match action {
        PositionAction::Add {
            instrument,
            quantity,
        } => {
            let total = store.add_position(&instrument, quantity)?;
            store.save().context("failed to save portfolio")?;
            Ok(json!({
                "instrument": instrument,
                "added": quantity,
                "quantity": total,
            }))
        }
    }
}

fn handle_status(store: &PortfolioStore) -> Result<Value> {
    let snapshot = store.snapshot();
    Ok(json!({
        "path": store.path(),
        "instruments": snapshot.instruments,
        "positions": snapshot.positions,
        "updated_at": snapshot.updated_at,
    }))
}

fn handle_profit(store: &PortfolioStore, range: &DateRange) -> Result<Value> {
    let registry = store.snapshot().registry()?;
    let holdings = store.snapshot().holdings(&registry)?;
    Ok(json!({
        "start": range.start,
        "end": range.end,
        "profit": holdings.profit(&range.start, &range.end),
    }))
}

fn handle_return(store: &PortfolioStore, range: &DateRange) -> Result<Value> {
    let registry = store.snapshot().registry()?;
    let holdings = store.snapshot().holdings(&registry)?;
    let annualized = holdings.annualized_return(&range.start, &range.end)?;
    Ok(json!({
        "start": range.start,
        "end": range.end,
        "annualized_return": annualized,
        "formatted": format!("{annualized:.2}%"),
    }))
}

fn handle_report(store: &PortfolioStore, range: &DateRange) -> Result<Value> {
    let registry = store.snapshot().registry()?;
    let holdings = store.snapshot().holdings(&registry)?;
    Ok(json!({
        "performance": holdings.performance(&range.start, &range.end)?,
        "positions": holdings.position_profits(&range.start, &range.end),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn run_args(args: &[&str]) -> Result<Value> {
        run(Cli::try_parse_from(args)?)
    }

    #[test]
    fn test_parse_price_point() {
        assert_eq!(
            parse_price_point("2024-01-01=100.5").unwrap(),
            ("2024-01-01".to_string(), 100.5)
        );
        assert_eq!(
            parse_price_point(" 2024-01-01 = 42 ").unwrap(),
            ("2024-01-01".to_string(), 42.0)
        );
    }

    #[test]
    fn test_parse_price_point_missing_separator() {
        let err = parse_price_point("2024-01-01:100").unwrap_err();
        assert!(err.contains("expected DATE=PRICE"));
    }

    #[test]
    fn test_parse_price_point_bad_date() {
        let err = parse_price_point("2024-02-30=100").unwrap_err();
        assert!(err.contains("2024-02-30"));
    }

    #[test]
    fn test_parse_price_point_bad_price() {
        let err = parse_price_point("2024-01-01=abc").unwrap_err();
        assert!(err.contains("invalid price"));
    }

    #[test]
    fn test_demo_output() {
        let data = run_args(&["holdings", "demo"]).unwrap();
        assert_eq!(data["profit"], 3600.0);
        assert!(data["summary"]
            .as_str()
            .unwrap()
            .ends_with("Annualized Return: 101.34%"));
    }

    #[test]
    fn test_commands_round_trip_through_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("portfolio.json");
        let run_in = |command: &str| {
            let mut args = vec!["holdings", "--file", file.to_str().unwrap()];
            args.extend(command.split_whitespace());
            run_args(&args)
        };

        run_in("instrument add --name ACME --price 2024-01-01=100 --price 2024-12-01=200").unwrap();
        run_in("position add -i ACME -n 10").unwrap();
        let data = run_in("position add -i ACME -n 20").unwrap();
        assert_eq!(data["quantity"], 30.0);

        let data = run_in("profit -s 2024-01-01 -e 2024-12-01").unwrap();
        assert_eq!(data["profit"], 3000.0);

        let data = run_in("return -s 2024-01-01 -e 2024-01-01").unwrap();
        assert_eq!(data["formatted"], "0.00%");
    }

    #[test]
    fn test_write_command_leaves_corrupt_file_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("portfolio.json");
        let corrupt = r#"{"instruments": [{"name": "Stock A", "prices": {}},], "positions": []}"#;
        fs::write(&path, corrupt).unwrap();

        let result = run_args(&[
            "holdings",
            "--file",
            path.to_str().unwrap(),
            "instrument",
            "add",
            "--name",
            "Stock C",
            "--price",
            "2024-01-01=1",
        ]);
        let err = result.unwrap_err();
        assert!(format!("{err:#}").contains("failed to read portfolio file"));
        assert_eq!(fs::read_to_string(&path).unwrap(), corrupt);
    }
}
