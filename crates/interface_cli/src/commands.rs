//! `flowcalc` subcommands
//!
//! Each command returns a value for the binary to print; logging goes
//! through `tracing`.

use anyhow::Context;
use std::path::Path;

use core_kernel::Currency;
use domain_flow::{FlowDefinition, FlowResult, FlowSession, FlowSnapshot, PaymentSchedule};
use rust_decimal::Decimal;

use crate::config::CliConfig;

/// Reads a snapshot document from disk
pub fn read_snapshot(path: &Path) -> anyhow::Result<FlowSnapshot> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    let snapshot = FlowSnapshot::from_json(&json)
        .with_context(|| format!("failed to parse snapshot {}", path.display()))?;
    Ok(snapshot)
}

/// Restores the snapshot into a fresh session and balances it once
fn open_session(snapshot: &FlowSnapshot, config: &CliConfig) -> anyhow::Result<FlowSession> {
    let currency = config.default_currency()?;
    let mut session = FlowSession::new(FlowDefinition::default(), &config.engine_config());
    let outcome = session.load_snapshot(snapshot, currency)?;
    tracing::debug!(?outcome, "snapshot balanced");

    for warning in session.take_warnings() {
        tracing::warn!(kind = ?warning.kind(), "{}", warning);
    }
    Ok(session)
}

/// Totals, per-component figures and overage for a snapshot
pub fn evaluate(snapshot: &FlowSnapshot, config: &CliConfig) -> anyhow::Result<FlowResult> {
    let mut session = open_session(snapshot, config)?;
    let result = session.evaluate()?;
    if result.exceeds_limit {
        tracing::warn!(exceeded = %result.exceeded_amount, "payments exceed property value");
    }
    Ok(result)
}

/// Dated payment schedule for a snapshot; fails when the payments exceed the price
pub fn schedule(snapshot: &FlowSnapshot, config: &CliConfig) -> anyhow::Result<PaymentSchedule> {
    let mut session = open_session(snapshot, config)?;
    let schedule = session.schedule()?;
    tracing::info!(entries = schedule.len(), total = %schedule.total, "schedule built");
    Ok(schedule)
}

/// Default snapshot for a new proposal
pub fn template(property_value: Decimal, currency: Option<&str>, config: &CliConfig) -> anyhow::Result<FlowSnapshot> {
    let currency: Currency = match currency {
        Some(code) => code.parse()?,
        None => config.default_currency()?,
    };
    Ok(FlowDefinition::new(property_value, currency).to_snapshot())
}
