//! Auto-balance coordination
//!
//! At most one component of a flow absorbs "whatever is left" of the property
//! price. The coordinator is the only way to designate that component and the
//! only code that writes its balanced value.
//!
//! ```text
//! None --request(kind)--> Active(kind) --release(kind)--> None
//!                         Active(kind) --remaining <= 0, recurring kind--> None
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use core_kernel::{MoneyError, Rate};

use crate::component::{ComponentAmount, PaymentKind};
use crate::error::FlowError;
use crate::events::{FlowEvent, FlowWarning};
use crate::flow::{AutoBalance, FlowDefinition};
use crate::resolver;

/// What a recompute did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecomputeOutcome {
    /// No component is auto-balanced
    Idle,
    /// The auto-balanced component was updated
    Applied {
        kind: PaymentKind,
        /// Per-installment value for recurring kinds
        value: Decimal,
    },
    /// Nothing was written; see the warning
    Warned(FlowWarning),
}

impl RecomputeOutcome {
    pub fn warning(&self) -> Option<&FlowWarning> {
        match self {
            RecomputeOutcome::Warned(warning) => Some(warning),
            _ => None,
        }
    }
}

/// Enforces the single auto-balanced component and computes its value
#[derive(Debug, Clone, Copy, Default)]
pub struct Coordinator;

impl Coordinator {
    pub fn new() -> Self {
        Self
    }

    /// Designates `kind` as the auto-balanced component and balances it
    ///
    /// Rejected without any change when another component is already
    /// auto-balanced, when `kind` cannot absorb a balance, when the block
    /// is disabled, or when the balance leaves the decimal range.
    pub fn request_auto_calculate(
        &self,
        flow: &mut FlowDefinition,
        kind: PaymentKind,
    ) -> Result<RecomputeOutcome, FlowError> {
        if let Some(active) = flow.auto_balanced() {
            if active != kind {
                debug!(?kind, ?active, "auto-balance request rejected");
                return Err(FlowError::AutoBalanceConflict {
                    requested: kind,
                    active,
                });
            }
        }
        if !kind.supports_auto_balance() {
            return Err(FlowError::AutoBalanceUnsupported(kind));
        }
        if !flow.component(kind).is_enabled() {
            return Err(FlowError::ComponentDisabled(kind));
        }

        let previous = flow.auto_balance();
        flow.set_auto_balance(AutoBalance::Active(kind));
        let outcome = self.recompute(flow);
        if outcome.is_err() {
            flow.set_auto_balance(previous);
        }
        outcome
    }

    /// Stops auto-balancing `kind`, keeping its last value as a manual amount
    pub fn release(&self, flow: &mut FlowDefinition, kind: PaymentKind) -> FlowEvent {
        if !flow.is_auto_balanced(kind) {
            return FlowEvent::Unchanged;
        }
        flow.set_auto_balance(AutoBalance::None);
        FlowEvent::AutoBalanceReleased(kind)
    }

    /// Writes the remaining balance into the auto-balanced component
    ///
    /// Fails with [`FlowError::Money`] when the other components add up to
    /// more than the decimal range holds; the flow is left untouched.
    pub fn recompute(&self, flow: &mut FlowDefinition) -> Result<RecomputeOutcome, FlowError> {
        let Some(kind) = flow.auto_balanced() else {
            return Ok(RecomputeOutcome::Idle);
        };

        let property_value = flow.property_value();
        if property_value <= Decimal::ZERO {
            return Ok(warned(FlowWarning::NonPositivePropertyValue { kind }));
        }

        let count = flow.component(kind).installments();
        if count == 0 {
            return Ok(warned(FlowWarning::InvalidInstallmentCount { kind, count }));
        }

        let others_total = flow
            .enabled_components()
            .filter(|c| c.kind() != kind)
            .try_fold(Decimal::ZERO, |sum, c| {
                sum.checked_add(resolver::resolve_total(c, property_value)?)
                    .ok_or(MoneyError::Overflow)
            })?;
        let remaining = property_value - others_total;

        if remaining <= Decimal::ZERO {
            if kind.is_recurring() {
                flow.set_auto_balance(AutoBalance::None);
                return Ok(warned(FlowWarning::AutoBalanceDisabled { kind, remaining }));
            }
            return Ok(warned(FlowWarning::BalanceExhausted { kind, remaining }));
        }

        let value = remaining / Decimal::from(count);
        let component = flow.component_mut(kind);
        component.amount = match component.amount {
            ComponentAmount::Percentage(_) => {
                ComponentAmount::Percentage(Rate::share_of(value, property_value).as_percentage())
            }
            ComponentAmount::Absolute(_) => ComponentAmount::Absolute(value),
        };
        component.display_input = None;

        debug!(?kind, %remaining, %value, count, "auto-balanced");
        Ok(RecomputeOutcome::Applied { kind, value })
    }
}

fn warned(warning: FlowWarning) -> RecomputeOutcome {
    warn!(kind = ?warning.kind(), "{}", warning);
    RecomputeOutcome::Warned(warning)
}
