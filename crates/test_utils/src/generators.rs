//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating flows and user input.

use domain_flow::{FlowDefinition, PaymentKind};
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::builders::FlowBuilder;

/// Strategy for any payment kind
pub fn payment_kind_strategy() -> impl Strategy<Value = PaymentKind> {
    prop::sample::select(PaymentKind::ALL.to_vec())
}

/// Strategy for kinds that can absorb the remaining balance
pub fn auto_kind_strategy() -> impl Strategy<Value = PaymentKind> {
    prop::sample::select(
        PaymentKind::ALL
            .into_iter()
            .filter(PaymentKind::supports_auto_balance)
            .collect::<Vec<_>>(),
    )
}

/// Strategy for property prices between 10,000.00 and 10,000,000.00
pub fn property_value_strategy() -> impl Strategy<Value = Decimal> {
    (1_000_000i64..1_000_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for percentage input as typed by a user (0 to 100, two decimals)
pub fn percentage_input_strategy() -> impl Strategy<Value = String> {
    (0u32..=10_000u32).prop_map(|n| Decimal::new(i64::from(n), 2).to_string())
}

/// Strategy for flows with a down payment below half the price and
/// a configurable number of monthly installments
pub fn simple_flow_strategy() -> impl Strategy<Value = FlowDefinition> {
    (property_value_strategy(), 0u32..50u32, 1u32..240u32).prop_map(|(price, down, count)| {
        FlowBuilder::new(price)
            .with_percentage(PaymentKind::DownPayment, &down.to_string())
            .with_count(PaymentKind::Monthly, count)
            .build()
    })
}
