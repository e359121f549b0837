//! Flow domain errors
//!
//! Only rejected requests are errors. Conditions that leave the previous valid
//! state in place are reported as [`FlowWarning`](crate::events::FlowWarning)s.

use thiserror::Error;

use core_kernel::{Money, MoneyError, TemporalError};

use crate::component::PaymentKind;

/// Errors that can occur in the payment-flow domain
#[derive(Debug, Error)]
pub enum FlowError {
    /// Another component already absorbs the remaining balance
    #[error("{active} is already auto-calculated; turn it off before auto-calculating {requested}")]
    AutoBalanceConflict {
        requested: PaymentKind,
        active: PaymentKind,
    },

    /// The component cannot absorb the remaining balance
    #[error("{0} cannot be auto-calculated")]
    AutoBalanceUnsupported(PaymentKind),

    /// The component must be enabled first
    #[error("{0} is not enabled")]
    ComponentDisabled(PaymentKind),

    /// The component is part of every flow and cannot be disabled
    #[error("{0} is required and cannot be disabled")]
    ComponentRequired(PaymentKind),

    /// The payments add up to more than the property price
    #[error("Payments exceed the property value by {exceeded_amount}")]
    ExceedsLimit {
        exceeded_amount: Money,
    },

    /// A snapshot could not be read at all
    #[error("Invalid snapshot: {0}")]
    Snapshot(String),

    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    #[error("Temporal error: {0}")]
    Temporal(#[from] TemporalError),
}

impl FlowError {
    /// Label of the component that blocked an auto-balance request
    pub fn conflicting_label(&self) -> Option<&'static str> {
        match self {
            FlowError::AutoBalanceConflict { active, .. } => Some(active.label()),
            _ => None,
        }
    }

    /// Whether this error should stop a save or export
    pub fn is_blocking(&self) -> bool {
        matches!(self, FlowError::ExceedsLimit { .. })
    }
}
