//! Flow aggregation and validation
//!
//! Produces a [`FlowResult`] from a flow on demand. Results are never cached:
//! callers pull a fresh one after every change they care about.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{Currency, Money, Rate};

use crate::component::{PaymentComponent, PaymentKind, SpecMode};
use crate::config::DEFAULT_TOLERANCE;
use crate::error::FlowError;
use crate::flow::FlowDefinition;
use crate::resolver;

/// A single payment of a component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installment {
    /// Position within the component (1, 2, 3, ...)
    pub sequence: u32,
    pub due_date: Option<NaiveDate>,
    pub amount: Money,
}

/// Resolved figures for one enabled component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentResult {
    pub kind: PaymentKind,
    pub spec_mode: SpecMode,
    /// Percentage of the price per installment
    pub percentage: Decimal,
    /// Value per installment
    pub value: Money,
    /// Number of installments (1 for single payments)
    pub count: u32,
    /// Value across all installments
    pub total: Money,
    pub auto_balanced: bool,
    pub installments: Vec<Installment>,
}

/// Totals and overage for a flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowResult {
    pub property_value: Money,
    pub components: Vec<ComponentResult>,
    pub total_paid: Money,
    /// Part of the price not yet covered by any component
    pub remaining: Money,
    /// Share of the price covered by the components
    pub paid_percentage: Decimal,
    pub exceeds_limit: bool,
    pub exceeded_amount: Money,
}

impl FlowResult {
    pub fn currency(&self) -> Currency {
        self.property_value.currency()
    }

    pub fn component(&self, kind: PaymentKind) -> Option<&ComponentResult> {
        self.components.iter().find(|c| c.kind == kind)
    }

    /// Gate for saving or exporting a proposal
    pub fn ensure_within_limit(&self) -> Result<(), FlowError> {
        if self.exceeds_limit {
            return Err(FlowError::ExceedsLimit {
                exceeded_amount: self.exceeded_amount,
            });
        }
        Ok(())
    }
}

/// Builds and validates flow results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowAggregator {
    tolerance: Decimal,
}

impl Default for FlowAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE)
    }
}

impl FlowAggregator {
    pub fn new(tolerance: Decimal) -> Self {
        Self {
            tolerance: tolerance.max(Decimal::ZERO),
        }
    }

    pub fn tolerance(&self) -> Decimal {
        self.tolerance
    }

    /// Resolves every enabled component and enumerates its installments
    ///
    /// Totals are left at zero; [`FlowAggregator::validate`] fills them in.
    pub fn aggregate(&self, flow: &FlowDefinition) -> Result<FlowResult, FlowError> {
        let currency = flow.currency();
        let components = flow
            .enabled_components()
            .map(|component| self.component_result(flow, component))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(FlowResult {
            property_value: Money::new(flow.property_value(), currency),
            components,
            total_paid: Money::zero(currency),
            remaining: Money::zero(currency),
            paid_percentage: Decimal::ZERO,
            exceeds_limit: false,
            exceeded_amount: Money::zero(currency),
        })
    }

    /// Sums the component totals and flags overage beyond the tolerance
    pub fn validate(&self, flow: &FlowDefinition, mut result: FlowResult) -> Result<FlowResult, FlowError> {
        let currency = flow.currency();
        let property_value = Money::new(flow.property_value(), currency);

        let mut total_paid = Money::zero(currency);
        for component in &result.components {
            total_paid = total_paid.checked_add(&component.total)?;
        }
        let difference = total_paid.checked_sub(&property_value)?;

        result.property_value = property_value;
        result.total_paid = total_paid;
        result.exceeded_amount = difference.floor_zero();
        result.remaining = property_value.checked_sub(&total_paid)?.floor_zero();
        result.exceeds_limit = difference.amount() > self.tolerance;
        result.paid_percentage =
            Rate::share_of(total_paid.amount(), property_value.amount()).as_percentage();

        if result.exceeds_limit {
            tracing::debug!(
                exceeded = %result.exceeded_amount,
                total = %total_paid,
                "payments exceed property value"
            );
        }
        Ok(result)
    }

    /// Aggregates and validates in one step
    pub fn evaluate(&self, flow: &FlowDefinition) -> Result<FlowResult, FlowError> {
        let result = self.aggregate(flow)?;
        self.validate(flow, result)
    }

    fn component_result(
        &self,
        flow: &FlowDefinition,
        component: &PaymentComponent,
    ) -> Result<ComponentResult, FlowError> {
        let currency = flow.currency();
        let property_value = flow.property_value();
        let kind = component.kind();
        let count = component.installments();

        let value = Money::new(resolver::resolve(component, property_value), currency);
        let total = Money::new(resolver::resolve_total(component, property_value)?, currency);

        let first_due = component.first_due_date().or_else(|| match kind {
            PaymentKind::KeysPayment => flow.delivery_date(),
            _ => None,
        });
        let due_dates: Vec<Option<NaiveDate>> = match (kind.step(), first_due) {
            (Some(step), Some(first)) => step.series(first, count)?.into_iter().map(Some).collect(),
            _ => vec![first_due; count as usize],
        };

        let installments = due_dates
            .into_iter()
            .zip(1..)
            .map(|(due_date, sequence)| Installment {
                sequence,
                due_date,
                amount: value,
            })
            .collect();

        Ok(ComponentResult {
            kind,
            spec_mode: component.spec_mode(),
            percentage: component.percentage(property_value),
            value,
            count,
            total,
            auto_balanced: flow.is_auto_balanced(kind),
            installments,
        })
    }
}
