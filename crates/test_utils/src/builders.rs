//! Test Data Builders
//!
//! Provides a builder for constructing flows with sensible defaults. Tests
//! specify only the components they care about.

use chrono::NaiveDate;
use core_kernel::Currency;
use domain_flow::{
    Coordinator, EngineConfig, FlowDefinition, FlowSession, ManualClock, PaymentKind,
};
use rust_decimal::Decimal;

use crate::fixtures::FlowFixtures;

/// Builder for constructing test flows
pub struct FlowBuilder {
    flow: FlowDefinition,
    auto: Option<PaymentKind>,
}

impl Default for FlowBuilder {
    fn default() -> Self {
        Self::new(FlowFixtures::property_value())
    }
}

impl FlowBuilder {
    /// Creates a builder for a flow priced at `property_value`
    pub fn new(property_value: Decimal) -> Self {
        Self {
            flow: FlowDefinition::new(property_value, Currency::BRL),
            auto: None,
        }
    }

    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.flow.set_currency(currency);
        self
    }

    pub fn with_client_name(mut self, name: &str) -> Self {
        self.flow.set_client_name(name);
        self
    }

    pub fn with_delivery_date(mut self, date: NaiveDate) -> Self {
        self.flow.set_delivery_date(Some(date));
        self
    }

    /// Sets a percentage as typed by a user (enables optional blocks)
    pub fn with_percentage(mut self, kind: PaymentKind, raw: &str) -> Self {
        self = self.enabled(kind);
        self.flow.set_percentage(kind, raw);
        self
    }

    /// Sets an absolute amount as typed by a user (enables optional blocks)
    pub fn with_value(mut self, kind: PaymentKind, raw: &str) -> Self {
        self = self.enabled(kind);
        self.flow.set_value(kind, raw);
        self
    }

    /// Sets the installment count (enables optional blocks)
    pub fn with_count(mut self, kind: PaymentKind, count: u32) -> Self {
        self = self.enabled(kind);
        self.flow.set_count(kind, count);
        self
    }

    pub fn with_first_due_date(mut self, kind: PaymentKind, date: NaiveDate) -> Self {
        self.flow.set_first_due_date(kind, Some(date));
        self
    }

    /// Marks `kind` as auto-balanced when the flow is built
    pub fn with_auto(mut self, kind: PaymentKind) -> Self {
        self = self.enabled(kind);
        self.auto = Some(kind);
        self
    }

    fn enabled(mut self, kind: PaymentKind) -> Self {
        if kind.is_optional() {
            self.flow
                .set_enabled(kind, true)
                .expect("optional components can always be enabled");
        }
        self
    }

    /// Builds the flow, balancing the auto component if one was requested
    pub fn build(mut self) -> FlowDefinition {
        if let Some(kind) = self.auto {
            Coordinator::new()
                .request_auto_calculate(&mut self.flow, kind)
                .expect("auto-balance request should be accepted");
        }
        self.flow
    }

    /// Builds a session driven by a manual clock
    pub fn build_session(self, clock: &ManualClock) -> FlowSession<ManualClock> {
        let config = FlowFixtures::engine_config();
        FlowSession::with_clock(self.build(), &config, clock.clone())
    }

    /// Builds a session with a custom engine configuration
    pub fn build_session_with(self, config: &EngineConfig, clock: &ManualClock) -> FlowSession<ManualClock> {
        FlowSession::with_clock(self.build(), config, clock.clone())
    }
}
