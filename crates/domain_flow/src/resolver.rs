//! Value resolution
//!
//! Converts between the percentage and absolute representations of a single
//! component and interprets raw user input. Nothing here touches the rest of
//! the flow; callers re-run the auto-balance coordinator afterwards.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::str::FromStr;

use core_kernel::MoneyError;

use crate::component::{ComponentAmount, PaymentComponent, SpecMode};

/// Largest number still read as a percentage by [`set_percentage`]
pub const PERCENTAGE_CEILING: Decimal = dec!(100);

/// Parses a user-typed number or currency amount
///
/// Accepts plain numbers and localized text such as `"R$ 1.234,56"`,
/// `"1,234.56"` or `"15%"`. When both `,` and `.` appear, the right-most one is
/// the decimal separator. A lone `,` is a decimal separator; repeated `.` with
/// no `,` are digit grouping. Text carrying the `R$` symbol follows Brazilian
/// notation, so even a single `.` groups digits there (`"R$ 1.000"` is one
/// thousand). Negative amounts are clamped to zero and anything unparseable
/// yields zero.
pub fn parse_amount(raw: &str) -> Decimal {
    let brazilian = raw.contains("R$");
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .collect();

    let last_comma = cleaned.rfind(',');
    let last_dot = cleaned.rfind('.');
    let normalized = match (last_comma, last_dot) {
        (Some(comma), Some(dot)) if comma > dot => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(_), None) if cleaned.matches(',').count() == 1 => cleaned.replace(',', "."),
        (Some(_), None) => cleaned.replace(',', ""),
        (None, Some(_)) if brazilian || cleaned.matches('.').count() > 1 => cleaned.replace('.', ""),
        _ => cleaned,
    };

    Decimal::from_str(&normalized)
        .map(|value| value.max(Decimal::ZERO))
        .unwrap_or(Decimal::ZERO)
}

/// Absolute amount per installment
pub fn resolve(component: &PaymentComponent, property_value: Decimal) -> Decimal {
    component.value(property_value)
}

/// Absolute amount across all installments of the component
///
/// Fails with [`MoneyError::Overflow`] when the total leaves the decimal range.
pub fn resolve_total(component: &PaymentComponent, property_value: Decimal) -> Result<Decimal, MoneyError> {
    resolve(component, property_value)
        .checked_mul(Decimal::from(component.installments()))
        .ok_or(MoneyError::Overflow)
}

/// Re-expresses the canonical amount in `new_mode`; a no-op if already there
pub fn switch_mode(component: &mut PaymentComponent, new_mode: SpecMode, property_value: Decimal) {
    if component.spec_mode() == new_mode {
        return;
    }
    component.amount = component.amount.in_mode(new_mode, property_value);
}

/// Applies a percentage typed by the user
///
/// Numbers strictly above [`PERCENTAGE_CEILING`] are taken as a literal
/// currency amount and switch the component to absolute mode.
pub fn set_percentage(component: &mut PaymentComponent, raw: &str, property_value: Decimal) {
    let parsed = parse_amount(raw);
    component.amount = if parsed > PERCENTAGE_CEILING {
        ComponentAmount::Absolute(parsed)
    } else {
        ComponentAmount::Percentage(parsed)
    };
    component.display_input = Some(raw.to_string());
    tracing::trace!(
        kind = ?component.kind(),
        %parsed,
        value = %component.value(property_value),
        "percentage applied"
    );
}

/// Applies a currency amount typed by the user; always switches to absolute mode
pub fn set_value(component: &mut PaymentComponent, raw: &str, property_value: Decimal) {
    let parsed = parse_amount(raw);
    component.amount = ComponentAmount::Absolute(parsed);
    component.display_input = Some(raw.to_string());
    tracing::trace!(
        kind = ?component.kind(),
        %parsed,
        percentage = %component.percentage(property_value),
        "value applied"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::PaymentKind;

    #[test]
    fn test_parse_plain_numbers() {
        assert_eq!(parse_amount("150"), dec!(150));
        assert_eq!(parse_amount("12.5"), dec!(12.5));
        assert_eq!(parse_amount(" 7 "), dec!(7));
    }

    #[test]
    fn test_parse_localized_amounts() {
        assert_eq!(parse_amount("R$ 1.234,56"), dec!(1234.56));
        assert_eq!(parse_amount("1,234.56"), dec!(1234.56));
        assert_eq!(parse_amount("12,5"), dec!(12.5));
        assert_eq!(parse_amount("1.000.000"), dec!(1000000));
        assert_eq!(parse_amount("1,000,000"), dec!(1000000));
        assert_eq!(parse_amount("15%"), dec!(15));
    }

    #[test]
    fn test_parse_single_dot() {
        assert_eq!(parse_amount("1.000"), dec!(1));
        assert_eq!(parse_amount("R$ 1.000"), dec!(1000));
        assert_eq!(parse_amount("R$ 250.000"), dec!(250000));
        assert_eq!(parse_amount("R$ 1.000,5"), dec!(1000.5));
        assert_eq!(parse_amount("R$ 99,90"), dec!(99.90));
    }

    #[test]
    fn test_parse_out_of_range_is_zero() {
        assert_eq!(parse_amount("792281625142643375935439503350"), dec!(0));
    }

    #[test]
    fn test_parse_garbage_is_zero() {
        assert_eq!(parse_amount(""), dec!(0));
        assert_eq!(parse_amount("abc"), dec!(0));
        assert_eq!(parse_amount("--"), dec!(0));
        assert_eq!(parse_amount("-50"), dec!(0));
    }

    #[test]
    fn test_threshold_rule_switches_to_absolute() {
        let mut c = PaymentComponent::new(PaymentKind::DownPayment);
        set_percentage(&mut c, "150", dec!(500000));

        assert_eq!(c.spec_mode(), SpecMode::AbsoluteValue);
        assert_eq!(c.value(dec!(500000)), dec!(150));
        assert_eq!(c.percentage(dec!(500000)), dec!(150) / dec!(500000) * dec!(100));
    }

    #[test]
    fn test_exactly_one_hundred_stays_a_percentage() {
        let mut c = PaymentComponent::new(PaymentKind::DownPayment);
        set_percentage(&mut c, "100", dec!(500000));

        assert_eq!(c.spec_mode(), SpecMode::Percentage);
        assert_eq!(c.value(dec!(500000)), dec!(500000));
    }

    #[test]
    fn test_set_value_forces_absolute() {
        let mut c = PaymentComponent::new(PaymentKind::ConstructionStart);
        set_value(&mut c, "25.000,00", dec!(500000));

        assert_eq!(c.spec_mode(), SpecMode::AbsoluteValue);
        assert_eq!(c.value(dec!(500000)), dec!(25000));
        assert_eq!(c.percentage(dec!(500000)), dec!(5));
        assert_eq!(c.display_input(), Some("25.000,00"));
    }

    #[test]
    fn test_set_value_without_price_has_zero_percentage() {
        let mut c = PaymentComponent::new(PaymentKind::ConstructionStart);
        set_value(&mut c, "1000", dec!(0));
        assert_eq!(c.percentage(dec!(0)), dec!(0));
    }

    #[test]
    fn test_switch_mode_is_noop_in_same_mode() {
        let mut c = PaymentComponent::new(PaymentKind::DownPayment);
        set_percentage(&mut c, "10", dec!(500000));
        let before = c.clone();
        switch_mode(&mut c, SpecMode::Percentage, dec!(999));
        assert_eq!(c, before);
    }

    #[test]
    fn test_resolve_total_multiplies_installments() {
        let mut c = PaymentComponent::new(PaymentKind::Monthly);
        c.count = 100;
        set_value(&mut c, "4500", dec!(500000));
        assert_eq!(resolve_total(&c, dec!(500000)), Ok(dec!(450000)));
    }

    #[test]
    fn test_resolve_total_reports_overflow() {
        let mut c = PaymentComponent::new(PaymentKind::Monthly);
        c.count = 2;
        set_value(&mut c, "79228162514264337593543950335", dec!(500000));

        assert_eq!(c.value(dec!(500000)), Decimal::MAX);
        assert_eq!(resolve_total(&c, dec!(500000)), Err(MoneyError::Overflow));
    }

    #[test]
    fn test_huge_value_against_tiny_price_does_not_panic() {
        let mut c = PaymentComponent::new(PaymentKind::ConstructionStart);
        set_value(&mut c, "79228162514264337593543950335", dec!(0.0001));

        assert_eq!(c.percentage(dec!(0.0001)), Decimal::MAX);
        switch_mode(&mut c, SpecMode::Percentage, dec!(0.0001));
        assert_eq!(c.spec_mode(), SpecMode::Percentage);
    }
}
