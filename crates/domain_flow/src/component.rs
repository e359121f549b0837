//! Payment components
//!
//! A flow is made of one component per [`PaymentKind`]. Each component stores a
//! single canonical amount, either a percentage of the property price or an
//! absolute currency value. The other representation is always derived from
//! the canonical one, so the two can never disagree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{MonthStep, Rate};

/// Largest installment count a component accepts (50 years of monthly payments)
pub const MAX_INSTALLMENTS: u32 = 600;

/// The line items of a payment flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PaymentKind {
    /// Entry payment at signing
    DownPayment,
    /// Payment due when construction starts
    ConstructionStart,
    /// Monthly installments
    Monthly,
    /// Reinforcement installments every six months
    SemiannualReinforcement,
    /// Reinforcement installments every twelve months
    AnnualReinforcement,
    /// Payment on delivery of the keys
    KeysPayment,
}

impl PaymentKind {
    /// Every kind, in flow order
    pub const ALL: [PaymentKind; 6] = [
        PaymentKind::DownPayment,
        PaymentKind::ConstructionStart,
        PaymentKind::Monthly,
        PaymentKind::SemiannualReinforcement,
        PaymentKind::AnnualReinforcement,
        PaymentKind::KeysPayment,
    ];

    pub(crate) fn index(&self) -> usize {
        match self {
            PaymentKind::DownPayment => 0,
            PaymentKind::ConstructionStart => 1,
            PaymentKind::Monthly => 2,
            PaymentKind::SemiannualReinforcement => 3,
            PaymentKind::AnnualReinforcement => 4,
            PaymentKind::KeysPayment => 5,
        }
    }

    /// Label shown to users and in conflict messages
    pub fn label(&self) -> &'static str {
        match self {
            PaymentKind::DownPayment => "Down payment",
            PaymentKind::ConstructionStart => "Construction start",
            PaymentKind::Monthly => "Monthly installments",
            PaymentKind::SemiannualReinforcement => "Semiannual reinforcements",
            PaymentKind::AnnualReinforcement => "Annual reinforcements",
            PaymentKind::KeysPayment => "Keys payment",
        }
    }

    /// Whether the component is paid in `count` installments
    pub fn is_recurring(&self) -> bool {
        self.step().is_some()
    }

    /// Spacing between installments of recurring kinds
    pub fn step(&self) -> Option<MonthStep> {
        match self {
            PaymentKind::Monthly => Some(MonthStep::MONTHLY),
            PaymentKind::SemiannualReinforcement => Some(MonthStep::SEMIANNUAL),
            PaymentKind::AnnualReinforcement => Some(MonthStep::ANNUAL),
            _ => None,
        }
    }

    /// Optional blocks can be switched off; the down payment and the keys
    /// payment are always part of a flow.
    pub fn is_optional(&self) -> bool {
        !matches!(self, PaymentKind::DownPayment | PaymentKind::KeysPayment)
    }

    /// Whether the component may absorb the remaining balance
    pub fn supports_auto_balance(&self) -> bool {
        self.is_recurring() || *self == PaymentKind::KeysPayment
    }
}

impl fmt::Display for PaymentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which representation of a component's amount is authoritative
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SpecMode {
    Percentage,
    AbsoluteValue,
}

/// The canonical amount of a component
///
/// For recurring kinds the amount is per installment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "amount", rename_all = "camelCase")]
pub enum ComponentAmount {
    /// Percentage of the property price (e.g. 10 for 10%)
    Percentage(Decimal),
    /// Absolute currency amount
    Absolute(Decimal),
}

impl ComponentAmount {
    pub fn mode(&self) -> SpecMode {
        match self {
            ComponentAmount::Percentage(_) => SpecMode::Percentage,
            ComponentAmount::Absolute(_) => SpecMode::AbsoluteValue,
        }
    }

    /// Absolute amount against the given property price
    pub fn value(&self, property_value: Decimal) -> Decimal {
        match *self {
            ComponentAmount::Percentage(percentage) => {
                Rate::from_percentage(percentage).apply_to(property_value)
            }
            ComponentAmount::Absolute(value) => value,
        }
    }

    /// Percentage of the given property price; zero when the price is not positive
    pub fn percentage(&self, property_value: Decimal) -> Decimal {
        match *self {
            ComponentAmount::Percentage(percentage) => percentage,
            ComponentAmount::Absolute(value) => {
                Rate::share_of(value, property_value).as_percentage()
            }
        }
    }

    /// The same amount expressed in `mode`, priced against `property_value`
    pub fn in_mode(&self, mode: SpecMode, property_value: Decimal) -> ComponentAmount {
        match mode {
            SpecMode::Percentage => ComponentAmount::Percentage(self.percentage(property_value)),
            SpecMode::AbsoluteValue => ComponentAmount::Absolute(self.value(property_value)),
        }
    }
}

impl Default for ComponentAmount {
    fn default() -> Self {
        ComponentAmount::Percentage(Decimal::ZERO)
    }
}

/// One line item of a payment flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentComponent {
    kind: PaymentKind,
    pub(crate) enabled: bool,
    pub(crate) amount: ComponentAmount,
    pub(crate) count: u32,
    pub(crate) first_due_date: Option<NaiveDate>,
    /// Last raw text the user typed; display metadata only
    pub(crate) display_input: Option<String>,
}

impl PaymentComponent {
    /// Creates a component with default settings: optional blocks disabled,
    /// zero percentage, a single installment
    pub fn new(kind: PaymentKind) -> Self {
        Self {
            kind,
            enabled: !kind.is_optional(),
            amount: ComponentAmount::default(),
            count: 1,
            first_due_date: None,
            display_input: None,
        }
    }

    pub fn kind(&self) -> PaymentKind {
        self.kind
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn amount(&self) -> ComponentAmount {
        self.amount
    }

    pub fn spec_mode(&self) -> SpecMode {
        self.amount.mode()
    }

    /// Configured installment count; may be zero for unvalidated input
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Number of payments this component contributes: `count` for recurring
    /// kinds (at most [`MAX_INSTALLMENTS`]), one otherwise
    pub fn installments(&self) -> u32 {
        if self.kind.is_recurring() {
            self.count.min(MAX_INSTALLMENTS)
        } else {
            1
        }
    }

    pub fn first_due_date(&self) -> Option<NaiveDate> {
        self.first_due_date
    }

    pub fn display_input(&self) -> Option<&str> {
        self.display_input.as_deref()
    }

    /// Absolute amount per installment
    pub fn value(&self, property_value: Decimal) -> Decimal {
        self.amount.value(property_value)
    }

    /// Percentage of the property price per installment
    pub fn percentage(&self, property_value: Decimal) -> Decimal {
        self.amount.percentage(property_value)
    }
}
