//! Property Tests for Flow Balancing
//!
//! Randomized flows built through the shared generators.

use domain_flow::{Coordinator, FlowAggregator, PaymentKind, RecomputeOutcome, SpecMode};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use test_utils::{
    assert_decimal_approx_eq, auto_kind_strategy, percentage_input_strategy,
    property_value_strategy, simple_flow_strategy, FlowBuilder,
};

proptest! {
    #[test]
    fn auto_balanced_flow_totals_property_value(flow in simple_flow_strategy()) {
        let mut flow = flow;
        let outcome = Coordinator::new()
            .request_auto_calculate(&mut flow, PaymentKind::Monthly)
            .unwrap();
        let applied = matches!(outcome, RecomputeOutcome::Applied { .. });
        prop_assert!(applied);

        let result = FlowAggregator::default().evaluate(&flow).unwrap();
        assert_decimal_approx_eq(result.total_paid.amount(), flow.property_value(), dec!(0.01));
        prop_assert!(!result.exceeds_limit);
    }

    #[test]
    fn any_auto_kind_absorbs_the_balance(
        price in property_value_strategy(),
        kind in auto_kind_strategy(),
        down in percentage_input_strategy()
    ) {
        let down_pct = down.parse::<Decimal>().unwrap();
        prop_assume!(down_pct < dec!(90));

        let flow = FlowBuilder::new(price)
            .with_percentage(PaymentKind::DownPayment, &down)
            .with_auto(kind)
            .build();

        prop_assert_eq!(flow.auto_balanced(), Some(kind));
        let result = FlowAggregator::default().evaluate(&flow).unwrap();
        assert_decimal_approx_eq(result.total_paid.amount(), price, dec!(0.01));
        prop_assert!(result.remaining.amount() <= dec!(0.01));
    }

    #[test]
    fn switching_mode_keeps_the_resolved_value(
        price in property_value_strategy(),
        pct in percentage_input_strategy()
    ) {
        let mut flow = FlowBuilder::new(price)
            .with_percentage(PaymentKind::DownPayment, &pct)
            .build();
        let before = flow.component(PaymentKind::DownPayment).value(price);

        flow.switch_mode(PaymentKind::DownPayment, SpecMode::AbsoluteValue);
        flow.switch_mode(PaymentKind::DownPayment, SpecMode::Percentage);

        let component = flow.component(PaymentKind::DownPayment);
        prop_assert_eq!(component.spec_mode(), SpecMode::Percentage);
        assert_decimal_approx_eq(component.value(price), before, dec!(0.01));
    }

    #[test]
    fn paid_share_matches_totals(flow in simple_flow_strategy()) {
        let result = FlowAggregator::default().evaluate(&flow).unwrap();
        let covered = result.total_paid.amount() + result.remaining.amount();

        assert_decimal_approx_eq(covered, flow.property_value(), dec!(0.01));
        prop_assert!(result.paid_percentage <= dec!(100.0001));
    }
}
