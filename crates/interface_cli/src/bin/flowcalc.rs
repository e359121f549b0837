//! Payment-Flow Calculator - CLI Binary
//!
//! Evaluates saved proposal snapshots and prints the results as JSON.
//!
//! # Usage
//!
//! ```bash
//! # Totals and overage for a saved proposal
//! flowcalc evaluate proposal.json
//!
//! # Export-ready schedule (exits non-zero when payments exceed the price)
//! flowcalc schedule proposal.json
//!
//! # Empty proposal to start from
//! flowcalc template --property-value 500000
//! ```
//!
//! # Environment Variables
//!
//! * `FLOWCALC_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `FLOWCALC_TOLERANCE` - Overage tolerated before export is refused (default: 0.01)
//! * `FLOWCALC_DEBOUNCE_MS` - Recompute quiet period in milliseconds (default: 100)
//! * `FLOWCALC_CURRENCY` - Currency for snapshots that name none (default: BRL)

use clap::{Parser, Subcommand};
use interface_cli::{commands, config::CliConfig};
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print totals and overage for a snapshot
    Evaluate {
        /// Snapshot JSON file
        snapshot: PathBuf,
    },
    /// Print the dated payment schedule for a snapshot
    Schedule {
        /// Snapshot JSON file
        snapshot: PathBuf,
    },
    /// Print a default snapshot for a new proposal
    Template {
        #[arg(long)]
        property_value: Decimal,

        /// Currency code or symbol (defaults to FLOWCALC_CURRENCY)
        #[arg(long)]
        currency: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = CliConfig::from_env()?;
    init_tracing(&config.log_level);

    match cli.command {
        Command::Evaluate { snapshot } => {
            let snapshot = commands::read_snapshot(&snapshot)?;
            print_json(&commands::evaluate(&snapshot, &config)?)
        }
        Command::Schedule { snapshot } => {
            let snapshot = commands::read_snapshot(&snapshot)?;
            print_json(&commands::schedule(&snapshot, &config)?)
        }
        Command::Template { property_value, currency } => {
            print_json(&commands::template(property_value, currency.as_deref(), &config)?)
        }
    }
}

/// Initializes the tracing subscriber, writing to stderr so stdout stays JSON only.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
