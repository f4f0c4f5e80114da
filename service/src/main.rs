//! Denomina CLI
//!
//! Breaks amounts into notes and coins and prints the result as JSON.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use denomina_common::{CalculationRequest, Constraint, CurrencyCode, OptimizationMode};
use denomina_service::{BatchRow, Calculator, ServiceConfig};

/// Denomina CLI
#[derive(Parser, Debug)]
#[command(name = "denomina")]
#[command(about = "Break amounts into notes and coins")]
struct Cli {
    /// Currency definitions file (overrides DENOMINA_CURRENCY_CONFIG)
    #[arg(long, global = true)]
    currencies: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Calculate a breakdown
    Calculate {
        /// Amount to break down
        amount: Decimal,

        /// Currency of the breakdown
        currency: String,

        /// Optimization mode
        #[arg(short, long, default_value = "greedy")]
        mode: OptimizationMode,

        /// Denomination to leave out (repeatable)
        #[arg(long)]
        avoid: Vec<Decimal>,

        /// Piece limit as DENOMINATION=COUNT (repeatable)
        #[arg(long, value_parser = parse_cap)]
        cap: Vec<Constraint>,

        /// Comma-separated denominations to restrict the breakdown to
        #[arg(long, value_delimiter = ',')]
        only: Vec<Decimal>,

        /// Source currency to convert from
        #[arg(long)]
        from: Option<String>,

        /// Break down in the source currency, then convert
        #[arg(long, requires = "from")]
        breakdown_first: bool,

        /// Number of alternatives to attach
        #[arg(short, long, default_value = "0")]
        alternatives: usize,

        /// Use labeled suggestions as alternatives
        #[arg(long)]
        suggest: bool,
    },

    /// List supported currencies
    Currencies,

    /// Show a currency's denominations
    Info {
        /// Currency code
        currency: String,
    },

    /// Show exchange rates from a base currency
    Rates {
        /// Base currency
        #[arg(long, default_value = "USD")]
        base: String,
    },

    /// Process a JSON array of rows
    Batch {
        /// Path to the rows file
        file: PathBuf,
    },
}

fn parse_cap(raw: &str) -> Result<Constraint, String> {
    let (denomination, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected DENOMINATION=COUNT, got {raw:?}"))?;
    Ok(Constraint::Cap {
        denomination: denomination
            .trim()
            .parse()
            .map_err(|e| format!("invalid denomination {denomination:?}: {e}"))?,
        value: value
            .trim()
            .parse()
            .map_err(|e| format!("invalid count {value:?}: {e}"))?,
    })
}

fn init_tracing(config: &ServiceConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));

    let (json, plain) = if config.log_json {
        (
            Some(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)),
            None,
        )
    } else {
        (
            None,
            Some(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
        )
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(plain)
        .init();
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{out}");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = ServiceConfig::from_env();
    if let Some(path) = cli.currencies.clone() {
        config.currency_config = Some(path);
    }

    init_tracing(&config);

    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(anyhow::anyhow!("Configuration error: {}", e));
    }

    let calculator = Calculator::from_config(config)?;

    match cli.command {
        Command::Calculate {
            amount,
            currency,
            mode,
            avoid,
            cap,
            only,
            from,
            breakdown_first,
            alternatives,
            suggest,
        } => {
            let mut constraints: Vec<Constraint> = avoid
                .into_iter()
                .map(|denomination| Constraint::Avoid { denomination })
                .collect();
            constraints.extend(cap);
            if !only.is_empty() {
                constraints.push(Constraint::Only {
                    denominations: only,
                });
            }

            let mut request = CalculationRequest::new(amount, CurrencyCode::parse(&currency)?)?
                .with_mode(mode)
                .with_constraints(constraints);
            if let Some(from) = from {
                request = request.with_source_currency(CurrencyCode::parse(&from)?);
                if breakdown_first {
                    request = request.breakdown_before_conversion();
                }
            }

            let result = calculator
                .calculate_with_alternatives(&request, alternatives, suggest)
                .await?;
            print_json(&result, cli.pretty)?;
        }

        Command::Currencies => {
            print_json(&calculator.engine().supported_currencies(), cli.pretty)?;
        }

        Command::Info { currency } => {
            let info = calculator
                .engine()
                .currency_info(&CurrencyCode::parse(&currency)?)?;
            print_json(&info, cli.pretty)?;
        }

        Command::Rates { base } => {
            let table = calculator
                .exchange_rates(&CurrencyCode::parse(&base)?)
                .await;
            print_json(&table, cli.pretty)?;
        }

        Command::Batch { file } => {
            let source = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let rows: Vec<BatchRow> = serde_json::from_str(&source)
                .with_context(|| format!("parsing {}", file.display()))?;

            info!(rows = rows.len(), file = %file.display(), "Processing batch");
            let summary = calculator.process_rows(&rows)?;
            print_json(&summary, cli.pretty)?;
        }
    }

    Ok(())
}
