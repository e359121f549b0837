//! Custom Test Assertions
//!
//! Provides assertion helpers for amounts that give more meaningful error
//! messages than standard assertions.

use core_kernel::Money;
use domain_flow::{FlowResult, PaymentKind};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Tolerance used when an exact match is not expected
pub const AMOUNT_TOLERANCE: Decimal = dec!(0.01);

/// Asserts that two decimals are within `tolerance` of each other
pub fn assert_decimal_approx_eq(actual: Decimal, expected: Decimal, tolerance: Decimal) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= tolerance,
        "Amounts differ by more than tolerance: actual={}, expected={}, diff={}, tolerance={}",
        actual,
        expected,
        diff,
        tolerance
    );
}

/// Asserts that a Money value is approximately equal to an expected amount
pub fn assert_money_approx_eq(actual: &Money, expected: Decimal) {
    assert_decimal_approx_eq(actual.amount(), expected, AMOUNT_TOLERANCE);
}

/// Asserts that the per-installment value of a component matches
///
/// # Panics
///
/// Panics if the component is not part of the result or the value differs
pub fn assert_component_value(result: &FlowResult, kind: PaymentKind, expected: Decimal) {
    let component = result
        .component(kind)
        .unwrap_or_else(|| panic!("{kind} missing from result"));
    assert_money_approx_eq(&component.value, expected);
}

/// Asserts that the result balances exactly against the property value
pub fn assert_balanced(result: &FlowResult) {
    assert!(
        !result.exceeds_limit,
        "Expected a balanced flow, exceeded by {}",
        result.exceeded_amount
    );
    assert_money_approx_eq(&result.total_paid, result.property_value.amount());
}
