//! Flow events and warnings
//!
//! Every mutating call on a flow reports what changed as a [`FlowEvent`]. The
//! edit session subscribes to these and schedules a recompute for the ones
//! that can move the balance.
//!
//! Non-fatal conditions raised while balancing or migrating are reported as
//! [`FlowWarning`]s. They never undo a previously valid state.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::component::{PaymentKind, SpecMode, MAX_INSTALLMENTS};

/// What changed on a single component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComponentChange {
    Enabled(bool),
    Mode(SpecMode),
    /// Percentage or value edited
    Amount,
    Count(u32),
    FirstDueDate,
}

/// A change applied to a flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowEvent {
    /// The property price changed
    PropertyValueChanged {
        from: Decimal,
        to: Decimal,
    },

    /// Client name, currency or delivery date changed
    DetailsChanged,

    /// A component was edited
    ComponentChanged {
        kind: PaymentKind,
        change: ComponentChange,
    },

    /// A component now absorbs the remaining balance
    AutoBalanceActivated(PaymentKind),

    /// A component stopped absorbing the remaining balance
    AutoBalanceReleased(PaymentKind),

    /// A whole snapshot was restored
    SnapshotLoaded,

    /// The call left the flow as it was
    Unchanged,
}

impl FlowEvent {
    /// Whether the event can change the balance an auto-calculated component absorbs
    pub fn affects_balance(&self) -> bool {
        match self {
            FlowEvent::PropertyValueChanged { from, to } => from != to,
            FlowEvent::ComponentChanged { change, .. } => {
                !matches!(change, ComponentChange::FirstDueDate)
            }
            FlowEvent::SnapshotLoaded => true,
            FlowEvent::DetailsChanged
            | FlowEvent::AutoBalanceActivated(_)
            | FlowEvent::AutoBalanceReleased(_)
            | FlowEvent::Unchanged => false,
        }
    }
}

/// A non-fatal condition surfaced to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowWarning {
    /// Balancing skipped because there is no positive price to balance against
    NonPositivePropertyValue {
        kind: PaymentKind,
    },

    /// Balancing skipped until the installment count is corrected
    InvalidInstallmentCount {
        kind: PaymentKind,
        count: u32,
    },

    /// Nothing left to spread over installments; auto-calculation was turned off
    AutoBalanceDisabled {
        kind: PaymentKind,
        remaining: Decimal,
    },

    /// Nothing left for the keys payment; its last value was kept
    BalanceExhausted {
        kind: PaymentKind,
        remaining: Decimal,
    },

    /// A snapshot carried an installment count beyond the supported range; it was reset to one
    InstallmentCountReset {
        kind: PaymentKind,
        count: u32,
    },

    /// A snapshot marked more than one component as auto-calculated
    DroppedAutoFlag {
        kind: PaymentKind,
        kept: PaymentKind,
    },
}

impl FlowWarning {
    /// The component the warning is about
    pub fn kind(&self) -> PaymentKind {
        match self {
            FlowWarning::NonPositivePropertyValue { kind }
            | FlowWarning::InvalidInstallmentCount { kind, .. }
            | FlowWarning::AutoBalanceDisabled { kind, .. }
            | FlowWarning::BalanceExhausted { kind, .. }
            | FlowWarning::InstallmentCountReset { kind, .. }
            | FlowWarning::DroppedAutoFlag { kind, .. } => *kind,
        }
    }
}

impl fmt::Display for FlowWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowWarning::NonPositivePropertyValue { kind } => {
                write!(f, "{kind}: set a property value before auto-calculating")
            }
            FlowWarning::InvalidInstallmentCount { kind, count } => {
                write!(f, "{kind}: installment count must be at least 1 (got {count})")
            }
            FlowWarning::AutoBalanceDisabled { kind, remaining } => write!(
                f,
                "{kind}: no balance left to distribute ({remaining}); auto-calculation turned off"
            ),
            FlowWarning::BalanceExhausted { kind, remaining } => write!(
                f,
                "{kind}: no balance left ({remaining}); keeping the previous value"
            ),
            FlowWarning::InstallmentCountReset { kind, count } => write!(
                f,
                "{kind}: {count} installments exceeds the limit of {MAX_INSTALLMENTS}; reset to 1"
            ),
            FlowWarning::DroppedAutoFlag { kind, kept } => write!(
                f,
                "{kind}: auto-calculation dropped because {kept} is already auto-calculated"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_balance_relevant_events() {
        assert!(FlowEvent::PropertyValueChanged { from: dec!(1), to: dec!(2) }.affects_balance());
        assert!(!FlowEvent::PropertyValueChanged { from: dec!(1), to: dec!(1) }.affects_balance());
        assert!(FlowEvent::ComponentChanged {
            kind: PaymentKind::DownPayment,
            change: ComponentChange::Amount,
        }
        .affects_balance());
        assert!(FlowEvent::ComponentChanged {
            kind: PaymentKind::Monthly,
            change: ComponentChange::Count(0),
        }
        .affects_balance());
        assert!(!FlowEvent::ComponentChanged {
            kind: PaymentKind::Monthly,
            change: ComponentChange::FirstDueDate,
        }
        .affects_balance());
        assert!(!FlowEvent::DetailsChanged.affects_balance());
        assert!(!FlowEvent::Unchanged.affects_balance());
    }

    #[test]
    fn test_warning_names_the_block() {
        let warning = FlowWarning::AutoBalanceDisabled {
            kind: PaymentKind::SemiannualReinforcement,
            remaining: dec!(-100),
        };
        assert_eq!(warning.kind(), PaymentKind::SemiannualReinforcement);
        assert!(warning.to_string().starts_with("Semiannual reinforcements"));
    }
}
