//! Edit session
//!
//! A [`FlowSession`] owns the single flow being edited and reacts to the
//! events its mutations emit. Events that can move the balance arm a
//! [`Debouncer`]; the host loop calls [`FlowSession::tick`] and the recompute
//! only runs once the flow has been quiet for the configured window. Any
//! trigger inside the window cancels the pending recompute and re-arms it.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::debug;

use core_kernel::Currency;

use crate::aggregator::{FlowAggregator, FlowResult};
use crate::component::{ComponentAmount, PaymentKind, SpecMode};
use crate::config::EngineConfig;
use crate::coordinator::{Coordinator, RecomputeOutcome};
use crate::error::FlowError;
use crate::events::{FlowEvent, FlowWarning};
use crate::flow::FlowDefinition;
use crate::schedule::PaymentSchedule;
use crate::snapshot::{migrate, FlowSnapshot};

/// Source of the current instant
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to; clones share the same time
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    elapsed: Rc<Cell<Duration>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            elapsed: Rc::new(Cell::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.elapsed.set(self.elapsed.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pending {
    ticket: u64,
    due_at: Instant,
}

/// Cancellable single-shot timer
///
/// Scheduling while a ticket is pending cancels it; only the most recent
/// ticket can ever fire.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    pending: Option<Pending>,
    next_ticket: u64,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
            next_ticket: 0,
        }
    }

    /// Arms the timer for `now + window`, replacing any pending ticket
    pub fn schedule(&mut self, now: Instant) -> u64 {
        self.next_ticket += 1;
        if let Some(cancelled) = self.pending.take() {
            tracing::trace!(ticket = cancelled.ticket, "recompute rescheduled");
        }
        self.pending = Some(Pending {
            ticket: self.next_ticket,
            due_at: now + self.window,
        });
        self.next_ticket
    }

    /// Drops the pending ticket, if any
    pub fn cancel(&mut self) -> Option<u64> {
        self.pending.take().map(|p| p.ticket)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending ticket will fire
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.map(|p| p.due_at)
    }

    /// Fires the pending ticket if its quiet period has elapsed
    pub fn take_due(&mut self, now: Instant) -> Option<u64> {
        match self.pending {
            Some(p) if now >= p.due_at => {
                self.pending = None;
                Some(p.ticket)
            }
            _ => None,
        }
    }
}

/// The working session around one flow
#[derive(Debug)]
pub struct FlowSession<C: Clock = SystemClock> {
    flow: FlowDefinition,
    coordinator: Coordinator,
    aggregator: FlowAggregator,
    debouncer: Debouncer,
    clock: C,
    loading: bool,
    warnings: Vec<FlowWarning>,
}

impl FlowSession<SystemClock> {
    pub fn new(flow: FlowDefinition, config: &EngineConfig) -> Self {
        Self::with_clock(flow, config, SystemClock)
    }
}

impl<C: Clock> FlowSession<C> {
    pub fn with_clock(flow: FlowDefinition, config: &EngineConfig, clock: C) -> Self {
        Self {
            flow,
            coordinator: Coordinator::new(),
            aggregator: FlowAggregator::new(config.tolerance),
            debouncer: Debouncer::new(config.debounce),
            clock,
            loading: false,
            warnings: Vec::new(),
        }
    }

    pub fn flow(&self) -> &FlowDefinition {
        &self.flow
    }

    /// Hands the flow over, e.g. to a persistence collaborator
    pub fn into_flow(self) -> FlowDefinition {
        self.flow
    }

    /// Warnings raised since the last call to [`FlowSession::take_warnings`]
    pub fn warnings(&self) -> &[FlowWarning] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<FlowWarning> {
        std::mem::take(&mut self.warnings)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_recompute_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.next_deadline()
    }

    pub fn set_property_value(&mut self, value: Decimal) -> FlowEvent {
        let event = self.flow.set_property_value(value);
        self.notify(event)
    }

    pub fn set_currency(&mut self, currency: Currency) -> FlowEvent {
        let event = self.flow.set_currency(currency);
        self.notify(event)
    }

    pub fn set_client_name(&mut self, name: impl Into<String>) -> FlowEvent {
        let event = self.flow.set_client_name(name);
        self.notify(event)
    }

    pub fn set_delivery_date(&mut self, date: Option<NaiveDate>) -> FlowEvent {
        let event = self.flow.set_delivery_date(date);
        self.notify(event)
    }

    pub fn set_enabled(&mut self, kind: PaymentKind, enabled: bool) -> Result<FlowEvent, FlowError> {
        let event = self.flow.set_enabled(kind, enabled)?;
        Ok(self.notify(event))
    }

    pub fn switch_mode(&mut self, kind: PaymentKind, mode: SpecMode) -> FlowEvent {
        let event = self.flow.switch_mode(kind, mode);
        self.notify(event)
    }

    pub fn set_percentage(&mut self, kind: PaymentKind, raw: &str) -> FlowEvent {
        let event = self.flow.set_percentage(kind, raw);
        self.notify(event)
    }

    pub fn set_value(&mut self, kind: PaymentKind, raw: &str) -> FlowEvent {
        let event = self.flow.set_value(kind, raw);
        self.notify(event)
    }

    pub fn set_amount(&mut self, kind: PaymentKind, amount: ComponentAmount) -> FlowEvent {
        let event = self.flow.set_amount(kind, amount);
        self.notify(event)
    }

    pub fn set_count(&mut self, kind: PaymentKind, count: u32) -> FlowEvent {
        let event = self.flow.set_count(kind, count);
        self.notify(event)
    }

    pub fn set_first_due_date(&mut self, kind: PaymentKind, date: Option<NaiveDate>) -> FlowEvent {
        let event = self.flow.set_first_due_date(kind, date);
        self.notify(event)
    }

    /// Designates the auto-balanced component; balances it immediately
    pub fn request_auto_calculate(&mut self, kind: PaymentKind) -> Result<RecomputeOutcome, FlowError> {
        let outcome = self.coordinator.request_auto_calculate(&mut self.flow, kind)?;
        self.record(&outcome);
        Ok(outcome)
    }

    pub fn release_auto_calculate(&mut self, kind: PaymentKind) -> FlowEvent {
        let event = self.coordinator.release(&mut self.flow, kind);
        self.notify(event)
    }

    /// Suspends recompute scheduling while a snapshot is restored
    pub fn begin_bulk_load(&mut self) {
        self.loading = true;
        self.debouncer.cancel();
    }

    /// Resumes scheduling and balances the restored flow once
    pub fn finish_bulk_load(&mut self) -> Result<RecomputeOutcome, FlowError> {
        self.loading = false;
        self.debouncer.cancel();
        self.run_recompute()
    }

    /// Replaces the flow with a migrated snapshot
    pub fn load_snapshot(
        &mut self,
        snapshot: &FlowSnapshot,
        default_currency: Currency,
    ) -> Result<RecomputeOutcome, FlowError> {
        self.begin_bulk_load();
        let migration = migrate(snapshot, default_currency);
        self.flow = migration.flow;
        self.warnings.extend(migration.warnings);
        self.notify(FlowEvent::SnapshotLoaded);
        self.finish_bulk_load()
    }

    /// Runs the pending recompute if the quiet period has elapsed
    pub fn tick(&mut self) -> Result<Option<RecomputeOutcome>, FlowError> {
        let Some(ticket) = self.debouncer.take_due(self.clock.now()) else {
            return Ok(None);
        };
        debug!(ticket, "debounced recompute fired");
        self.run_recompute().map(Some)
    }

    /// Runs the pending recompute now, without waiting for the quiet period
    pub fn flush(&mut self) -> Result<Option<RecomputeOutcome>, FlowError> {
        if self.debouncer.cancel().is_none() {
            return Ok(None);
        }
        self.run_recompute().map(Some)
    }

    /// Current totals, after settling any pending recompute
    pub fn evaluate(&mut self) -> Result<FlowResult, FlowError> {
        self.flush()?;
        self.aggregator.evaluate(&self.flow)
    }

    /// Export-ready schedule; refused while the payments exceed the price
    pub fn schedule(&mut self) -> Result<PaymentSchedule, FlowError> {
        let result = self.evaluate()?;
        PaymentSchedule::build(&self.flow, &result)
    }

    /// Snapshot for saving; refused while the payments exceed the price
    pub fn snapshot_for_save(&mut self) -> Result<FlowSnapshot, FlowError> {
        self.evaluate()?.ensure_within_limit()?;
        Ok(self.flow.to_snapshot())
    }

    fn notify(&mut self, event: FlowEvent) -> FlowEvent {
        if !self.loading && event.affects_balance() {
            self.debouncer.schedule(self.clock.now());
        }
        event
    }

    fn run_recompute(&mut self) -> Result<RecomputeOutcome, FlowError> {
        let outcome = self.coordinator.recompute(&mut self.flow)?;
        self.record(&outcome);
        Ok(outcome)
    }

    fn record(&mut self, outcome: &RecomputeOutcome) {
        if let Some(warning) = outcome.warning() {
            self.warnings.push(warning.clone());
        }
    }
}
