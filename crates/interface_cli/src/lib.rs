//! Command-Line Layer
//!
//! Loads saved proposal snapshots from disk, runs them through the
//! payment-flow engine and renders the results as JSON.
//!
//! # Architecture
//!
//! - **Config**: environment-driven settings (`FLOWCALC_*`)
//! - **Commands**: one function per `flowcalc` subcommand, free of I/O on stdout
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_cli::{commands, config::CliConfig};
//!
//! let config = CliConfig::from_env()?;
//! let result = commands::evaluate(&commands::read_snapshot(path)?, &config)?;
//! ```

pub mod config;
pub mod commands;

pub use config::CliConfig;
