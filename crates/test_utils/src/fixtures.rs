//! Pre-built Test Fixtures
//!
//! Provides ready-to-use flows and snapshots for the reference scenarios.

use chrono::NaiveDate;
use domain_flow::{EngineConfig, FlowDefinition, PaymentKind};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::time::Duration;

use crate::builders::FlowBuilder;

/// Fixture for flow test data
pub struct FlowFixtures;

impl FlowFixtures {
    /// Standard property price
    pub fn property_value() -> Decimal {
        dec!(500000)
    }

    /// Engine configuration with the default tolerance and a 100 ms window
    pub fn engine_config() -> EngineConfig {
        EngineConfig::default()
            .with_tolerance(dec!(0.01))
            .with_debounce(Self::debounce())
    }

    pub fn debounce() -> Duration {
        Duration::from_millis(100)
    }

    /// First monthly installment date
    pub fn first_due_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 10).expect("valid date")
    }

    /// Keys delivery date
    pub fn delivery_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2028, 6, 30).expect("valid date")
    }

    /// 10% down payment with 100 auto-balanced monthly installments
    pub fn monthly_auto_flow() -> FlowDefinition {
        FlowBuilder::new(Self::property_value())
            .with_percentage(PaymentKind::DownPayment, "10")
            .with_count(PaymentKind::Monthly, 100)
            .with_auto(PaymentKind::Monthly)
            .build()
    }

    /// Two manual payments adding up to 600,000 on a 500,000 property
    pub fn overpaid_flow() -> FlowDefinition {
        FlowBuilder::new(Self::property_value())
            .with_value(PaymentKind::DownPayment, "300000")
            .with_value(PaymentKind::ConstructionStart, "300000")
            .build()
    }

    /// A typical proposal with every block in use and the keys payment balanced
    pub fn full_flow() -> FlowDefinition {
        FlowBuilder::new(Self::property_value())
            .with_client_name("Maria Souza")
            .with_delivery_date(Self::delivery_date())
            .with_percentage(PaymentKind::DownPayment, "10")
            .with_first_due_date(PaymentKind::DownPayment, Self::first_due_date())
            .with_value(PaymentKind::ConstructionStart, "25000")
            .with_count(PaymentKind::Monthly, 36)
            .with_value(PaymentKind::Monthly, "2500")
            .with_first_due_date(PaymentKind::Monthly, Self::first_due_date())
            .with_count(PaymentKind::SemiannualReinforcement, 6)
            .with_value(PaymentKind::SemiannualReinforcement, "10000")
            .with_first_due_date(PaymentKind::SemiannualReinforcement, Self::first_due_date())
            .with_count(PaymentKind::AnnualReinforcement, 3)
            .with_value(PaymentKind::AnnualReinforcement, "20000")
            .with_first_due_date(PaymentKind::AnnualReinforcement, Self::first_due_date())
            .with_auto(PaymentKind::KeysPayment)
            .build()
    }

    /// A legacy snapshot missing most fields and carrying numbers as strings
    pub fn legacy_snapshot_json() -> &'static str {
        r#"{
            "propertyValue": "500.000,00",
            "clientName": "João",
            "downPayment": { "percentage": "10" },
            "monthly": { "enabled": true, "count": "100", "autoCalculate": true },
            "semiannual": { "enabled": true, "autoCalculate": true }
        }"#
    }
}
