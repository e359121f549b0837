//! The flow definition
//!
//! [`FlowDefinition`] is the in-memory working document of one payment
//! proposal: the property price plus one component per [`PaymentKind`].
//!
//! # Invariants
//!
//! - Every kind has exactly one component; the down payment and the keys
//!   payment are always enabled.
//! - At most one component is auto-balanced. The flag lives here as a single
//!   [`AutoBalance`] value and only the coordinator can activate it.
//! - Percentage and value never drift apart (see [`ComponentAmount`]).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::Currency;

use crate::component::{ComponentAmount, PaymentComponent, PaymentKind, SpecMode, MAX_INSTALLMENTS};
use crate::error::FlowError;
use crate::events::{ComponentChange, FlowEvent};
use crate::resolver;

/// Auto-balance status of a flow
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AutoBalance {
    #[default]
    None,
    Active(PaymentKind),
}

impl AutoBalance {
    pub fn active_kind(&self) -> Option<PaymentKind> {
        match self {
            AutoBalance::None => None,
            AutoBalance::Active(kind) => Some(*kind),
        }
    }
}

/// One payment proposal being edited
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowDefinition {
    property_value: Decimal,
    currency: Currency,
    client_name: String,
    delivery_date: Option<NaiveDate>,
    components: [PaymentComponent; 6],
    auto_balance: AutoBalance,
}

impl Default for FlowDefinition {
    fn default() -> Self {
        Self::new(Decimal::ZERO, Currency::default())
    }
}

impl FlowDefinition {
    /// Creates a flow with every optional block disabled
    pub fn new(property_value: Decimal, currency: Currency) -> Self {
        Self {
            property_value: property_value.max(Decimal::ZERO),
            currency,
            client_name: String::new(),
            delivery_date: None,
            components: PaymentKind::ALL.map(PaymentComponent::new),
            auto_balance: AutoBalance::None,
        }
    }

    pub fn property_value(&self) -> Decimal {
        self.property_value
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn client_name(&self) -> &str {
        &self.client_name
    }

    pub fn delivery_date(&self) -> Option<NaiveDate> {
        self.delivery_date
    }

    pub fn component(&self, kind: PaymentKind) -> &PaymentComponent {
        &self.components[kind.index()]
    }

    pub(crate) fn component_mut(&mut self, kind: PaymentKind) -> &mut PaymentComponent {
        &mut self.components[kind.index()]
    }

    /// All components in flow order
    pub fn components(&self) -> impl Iterator<Item = &PaymentComponent> {
        self.components.iter()
    }

    /// Components that contribute to the total
    pub fn enabled_components(&self) -> impl Iterator<Item = &PaymentComponent> {
        self.components.iter().filter(|c| c.is_enabled())
    }

    pub fn auto_balance(&self) -> AutoBalance {
        self.auto_balance
    }

    pub fn auto_balanced(&self) -> Option<PaymentKind> {
        self.auto_balance.active_kind()
    }

    pub fn is_auto_balanced(&self, kind: PaymentKind) -> bool {
        self.auto_balanced() == Some(kind)
    }

    pub(crate) fn set_auto_balance(&mut self, state: AutoBalance) {
        self.auto_balance = state;
    }

    /// Sets the property price; negative prices are stored as zero
    pub fn set_property_value(&mut self, value: Decimal) -> FlowEvent {
        let from = self.property_value;
        self.property_value = value.max(Decimal::ZERO);
        FlowEvent::PropertyValueChanged {
            from,
            to: self.property_value,
        }
    }

    pub fn set_currency(&mut self, currency: Currency) -> FlowEvent {
        self.currency = currency;
        FlowEvent::DetailsChanged
    }

    pub fn set_client_name(&mut self, name: impl Into<String>) -> FlowEvent {
        self.client_name = name.into();
        FlowEvent::DetailsChanged
    }

    pub fn set_delivery_date(&mut self, date: Option<NaiveDate>) -> FlowEvent {
        self.delivery_date = date;
        FlowEvent::DetailsChanged
    }

    /// Turns an optional block on or off
    ///
    /// Disabling the auto-balanced component also releases auto-balance.
    pub fn set_enabled(&mut self, kind: PaymentKind, enabled: bool) -> Result<FlowEvent, FlowError> {
        if !kind.is_optional() {
            if enabled {
                return Ok(FlowEvent::Unchanged);
            }
            return Err(FlowError::ComponentRequired(kind));
        }
        if !enabled && self.is_auto_balanced(kind) {
            self.auto_balance = AutoBalance::None;
        }
        self.component_mut(kind).enabled = enabled;
        Ok(FlowEvent::ComponentChanged {
            kind,
            change: ComponentChange::Enabled(enabled),
        })
    }

    pub fn switch_mode(&mut self, kind: PaymentKind, mode: SpecMode) -> FlowEvent {
        let property_value = self.property_value;
        let component = self.component_mut(kind);
        if component.spec_mode() == mode {
            return FlowEvent::Unchanged;
        }
        resolver::switch_mode(component, mode, property_value);
        FlowEvent::ComponentChanged {
            kind,
            change: ComponentChange::Mode(mode),
        }
    }

    /// Applies a typed percentage; a manual edit releases auto-balance on this component
    pub fn set_percentage(&mut self, kind: PaymentKind, raw: &str) -> FlowEvent {
        self.release_on_manual_edit(kind);
        let property_value = self.property_value;
        resolver::set_percentage(self.component_mut(kind), raw, property_value);
        FlowEvent::ComponentChanged {
            kind,
            change: ComponentChange::Amount,
        }
    }

    /// Applies a typed amount; a manual edit releases auto-balance on this component
    pub fn set_value(&mut self, kind: PaymentKind, raw: &str) -> FlowEvent {
        self.release_on_manual_edit(kind);
        let property_value = self.property_value;
        resolver::set_value(self.component_mut(kind), raw, property_value);
        FlowEvent::ComponentChanged {
            kind,
            change: ComponentChange::Amount,
        }
    }

    /// Replaces the canonical amount directly
    pub fn set_amount(&mut self, kind: PaymentKind, amount: ComponentAmount) -> FlowEvent {
        self.release_on_manual_edit(kind);
        let component = self.component_mut(kind);
        component.amount = amount;
        component.display_input = None;
        FlowEvent::ComponentChanged {
            kind,
            change: ComponentChange::Amount,
        }
    }

    /// Sets the installment count, capped at [`MAX_INSTALLMENTS`]; ignored for
    /// single-payment kinds
    pub fn set_count(&mut self, kind: PaymentKind, count: u32) -> FlowEvent {
        if !kind.is_recurring() {
            return FlowEvent::Unchanged;
        }
        let count = count.min(MAX_INSTALLMENTS);
        self.component_mut(kind).count = count;
        FlowEvent::ComponentChanged {
            kind,
            change: ComponentChange::Count(count),
        }
    }

    pub fn set_first_due_date(&mut self, kind: PaymentKind, date: Option<NaiveDate>) -> FlowEvent {
        self.component_mut(kind).first_due_date = date;
        FlowEvent::ComponentChanged {
            kind,
            change: ComponentChange::FirstDueDate,
        }
    }

    fn release_on_manual_edit(&mut self, kind: PaymentKind) {
        if self.is_auto_balanced(kind) {
            tracing::debug!(?kind, "manual edit released auto-balance");
            self.auto_balance = AutoBalance::None;
        }
    }
}
