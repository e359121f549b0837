//! Edit Session Tests
//!
//! Covers the event-driven recompute path: debouncing, bulk loads,
//! manual edits overriding auto-balance, and the save/export gates.

use core_kernel::Currency;
use domain_flow::{
    ComponentAmount, FlowError, FlowEvent, FlowSnapshot, FlowWarning, ManualClock, PaymentKind,
    RecomputeOutcome,
};
use rust_decimal_macros::dec;
use std::time::Duration;
use test_utils::{assert_balanced, assert_component_value, FlowBuilder, FlowFixtures};

fn monthly_auto() -> FlowBuilder {
    FlowBuilder::default()
        .with_percentage(PaymentKind::DownPayment, "10")
        .with_count(PaymentKind::Monthly, 100)
        .with_auto(PaymentKind::Monthly)
}

mod debounce_tests {
    use super::*;

    #[test]
    fn test_count_edit_recomputes_after_quiet_period() {
        let clock = ManualClock::new();
        let mut session = monthly_auto().build_session(&clock);

        session.set_count(PaymentKind::Monthly, 1);
        session.set_count(PaymentKind::Monthly, 12);
        session.set_count(PaymentKind::Monthly, 120);
        assert!(session.is_recompute_pending());
        assert_eq!(session.tick().unwrap(), None);

        clock.advance(FlowFixtures::debounce());
        let outcome = session.tick().unwrap().expect("recompute should fire");
        assert_eq!(
            outcome,
            RecomputeOutcome::Applied { kind: PaymentKind::Monthly, value: dec!(3750) }
        );
    }

    #[test]
    fn test_next_deadline_tracks_last_trigger() {
        let clock = ManualClock::new();
        let mut session = FlowBuilder::default().build_session(&clock);

        session.set_percentage(PaymentKind::DownPayment, "5");
        let first = session.next_deadline().unwrap();
        clock.advance(Duration::from_millis(40));
        session.set_percentage(PaymentKind::DownPayment, "50");
        let second = session.next_deadline().unwrap();

        assert_eq!(second - first, Duration::from_millis(40));
    }

    #[test]
    fn test_evaluate_settles_pending_recompute() {
        let clock = ManualClock::new();
        let mut session = monthly_auto().build_session(&clock);

        session.set_property_value(dec!(1000000));
        let result = session.evaluate().unwrap();

        assert_component_value(&result, PaymentKind::Monthly, dec!(9000));
        assert_balanced(&result);
        assert!(!session.is_recompute_pending());
    }
}

mod editing_tests {
    use super::*;

    #[test]
    fn test_manual_edit_of_auto_component_releases_it() {
        let clock = ManualClock::new();
        let mut session = monthly_auto().build_session(&clock);

        session.set_value(PaymentKind::Monthly, "1000");
        session.set_percentage(PaymentKind::DownPayment, "20");
        let result = session.evaluate().unwrap();

        assert_eq!(session.flow().auto_balanced(), None);
        assert_component_value(&result, PaymentKind::Monthly, dec!(1000));
        assert_eq!(result.total_paid.amount(), dec!(200000));
    }

    #[test]
    fn test_set_amount_replaces_canonical_amount() {
        let clock = ManualClock::new();
        let mut session = FlowBuilder::default().build_session(&clock);

        let event =
            session.set_amount(PaymentKind::DownPayment, ComponentAmount::Percentage(dec!(12.5)));
        assert!(event.affects_balance());

        let result = session.evaluate().unwrap();
        assert_component_value(&result, PaymentKind::DownPayment, dec!(62500));
    }

    #[test]
    fn test_release_then_request_other_block() {
        let clock = ManualClock::new();
        let mut session = monthly_auto()
            .with_count(PaymentKind::AnnualReinforcement, 5)
            .build_session(&clock);

        assert!(matches!(
            session.request_auto_calculate(PaymentKind::AnnualReinforcement),
            Err(FlowError::AutoBalanceConflict { active: PaymentKind::Monthly, .. })
        ));

        let event = session.release_auto_calculate(PaymentKind::Monthly);
        assert_eq!(event, FlowEvent::AutoBalanceReleased(PaymentKind::Monthly));
        session.set_count(PaymentKind::Monthly, 0);

        let outcome = session.request_auto_calculate(PaymentKind::AnnualReinforcement).unwrap();
        assert_eq!(
            outcome,
            RecomputeOutcome::Applied { kind: PaymentKind::AnnualReinforcement, value: dec!(90000) }
        );
    }

    #[test]
    fn test_disabling_required_block_is_rejected() {
        let clock = ManualClock::new();
        let mut session = FlowBuilder::default().build_session(&clock);

        assert!(matches!(
            session.set_enabled(PaymentKind::DownPayment, false),
            Err(FlowError::ComponentRequired(PaymentKind::DownPayment))
        ));
        assert!(!session.is_recompute_pending());
    }

    #[test]
    fn test_zero_price_warns_without_mutation() {
        let clock = ManualClock::new();
        let mut session = monthly_auto().build_session(&clock);
        let before = session.flow().component(PaymentKind::Monthly).clone();

        session.set_property_value(dec!(0));
        let outcome = session.flush().unwrap().unwrap();

        assert_eq!(
            outcome.warning(),
            Some(&FlowWarning::NonPositivePropertyValue { kind: PaymentKind::Monthly })
        );
        assert_eq!(session.flow().component(PaymentKind::Monthly), &before);
    }
}

mod snapshot_session_tests {
    use super::*;

    #[test]
    fn test_legacy_snapshot_loads_and_balances() {
        let clock = ManualClock::new();
        let mut session = FlowBuilder::default().build_session(&clock);
        let snapshot = FlowSnapshot::from_json(FlowFixtures::legacy_snapshot_json()).unwrap();

        let outcome = session.load_snapshot(&snapshot, Currency::BRL).unwrap();

        assert_eq!(
            outcome,
            RecomputeOutcome::Applied { kind: PaymentKind::Monthly, value: dec!(4500) }
        );
        let warnings = session.take_warnings();
        assert_eq!(
            warnings,
            vec![FlowWarning::DroppedAutoFlag {
                kind: PaymentKind::SemiannualReinforcement,
                kept: PaymentKind::Monthly,
            }]
        );
        assert_eq!(session.flow().client_name(), "João");
        assert_balanced(&session.evaluate().unwrap());
    }

    #[test]
    fn test_saved_snapshot_restores_same_result() {
        let clock = ManualClock::new();
        let mut session = FlowBuilder::default().build_session(&clock);
        session
            .load_snapshot(&FlowFixtures::full_flow().to_snapshot(), Currency::BRL)
            .unwrap();
        let saved = session.snapshot_for_save().unwrap();
        let before = session.evaluate().unwrap();

        let mut restored = FlowBuilder::default().build_session(&clock);
        restored.load_snapshot(&saved, Currency::USD).unwrap();
        let after = restored.evaluate().unwrap();

        assert_eq!(after.total_paid, before.total_paid);
        assert_eq!(after.components.len(), before.components.len());
        assert_eq!(restored.flow().auto_balanced(), Some(PaymentKind::KeysPayment));
    }

    #[test]
    fn test_snapshot_currency_wins_over_default() {
        let clock = ManualClock::new();
        let mut session = FlowBuilder::default()
            .with_currency(Currency::EUR)
            .with_percentage(PaymentKind::DownPayment, "30")
            .with_auto(PaymentKind::KeysPayment)
            .build_session(&clock);
        let saved = session.snapshot_for_save().unwrap();

        let mut restored = FlowBuilder::default().build_session(&clock);
        restored.load_snapshot(&saved, Currency::BRL).unwrap();

        let result = restored.evaluate().unwrap();
        assert_eq!(result.currency(), Currency::EUR);
        assert_component_value(&result, PaymentKind::KeysPayment, dec!(350000));
    }

    #[test]
    fn test_schedule_from_session() {
        let clock = ManualClock::new();
        let mut session = FlowBuilder::default().build_session(&clock);
        session
            .load_snapshot(&FlowFixtures::full_flow().to_snapshot(), Currency::BRL)
            .unwrap();

        let schedule = session.schedule().unwrap();
        assert_eq!(schedule.total.amount(), dec!(500000));
    }
}
