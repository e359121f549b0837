//! Installment schedule for export consumers
//!
//! Flattens a validated [`FlowResult`] into a single dated list of payments.
//! A schedule is refused while the payments exceed the property value.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::Money;

use crate::aggregator::FlowResult;
use crate::component::PaymentKind;
use crate::error::FlowError;
use crate::flow::FlowDefinition;

/// One payment in the schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub kind: PaymentKind,
    pub label: String,
    /// Position within the component (1-based)
    pub sequence: u32,
    /// Installments of the component
    pub of: u32,
    pub due_date: Option<NaiveDate>,
    pub amount: Money,
}

/// Every payment of a proposal, earliest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSchedule {
    pub client_name: String,
    pub property_value: Money,
    pub total: Money,
    pub delivery_date: Option<NaiveDate>,
    pub entries: Vec<ScheduleEntry>,
}

impl PaymentSchedule {
    /// Builds the schedule from a validated result
    ///
    /// Entries are ordered by due date; undated entries come last, in flow order.
    pub fn build(flow: &FlowDefinition, result: &FlowResult) -> Result<Self, FlowError> {
        result.ensure_within_limit()?;

        let mut entries: Vec<ScheduleEntry> = result
            .components
            .iter()
            .flat_map(|component| {
                component.installments.iter().map(move |installment| ScheduleEntry {
                    kind: component.kind,
                    label: component.kind.label().to_string(),
                    sequence: installment.sequence,
                    of: component.count,
                    due_date: installment.due_date,
                    amount: installment.amount,
                })
            })
            .collect();

        // stable: ties keep flow order
        entries.sort_by_key(|entry| (entry.due_date.is_none(), entry.due_date));

        Ok(Self {
            client_name: flow.client_name().to_string(),
            property_value: result.property_value,
            total: result.total_paid,
            delivery_date: flow.delivery_date(),
            entries,
        })
    }

    /// Entries belonging to one component
    pub fn entries_for(&self, kind: PaymentKind) -> impl Iterator<Item = &ScheduleEntry> {
        self.entries.iter().filter(move |entry| entry.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::FlowAggregator;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_schedule_is_ordered_by_due_date() {
        let mut flow = FlowDefinition::new(dec!(100000), Currency::BRL);
        flow.set_value(PaymentKind::DownPayment, "10000");
        flow.set_first_due_date(PaymentKind::DownPayment, date(2025, 1, 5));
        flow.set_enabled(PaymentKind::Monthly, true).unwrap();
        flow.set_count(PaymentKind::Monthly, 2);
        flow.set_value(PaymentKind::Monthly, "5000");
        flow.set_first_due_date(PaymentKind::Monthly, date(2025, 2, 5));
        flow.set_value(PaymentKind::KeysPayment, "80000");
        flow.set_delivery_date(date(2026, 12, 1));

        let result = FlowAggregator::default().evaluate(&flow).unwrap();
        let schedule = PaymentSchedule::build(&flow, &result).unwrap();

        let kinds: Vec<_> = schedule.entries.iter().map(|e| (e.kind, e.sequence)).collect();
        assert_eq!(
            kinds,
            vec![
                (PaymentKind::DownPayment, 1),
                (PaymentKind::Monthly, 1),
                (PaymentKind::Monthly, 2),
                (PaymentKind::KeysPayment, 1),
            ]
        );
        assert_eq!(schedule.total.amount(), dec!(100000));
        assert_eq!(schedule.entries_for(PaymentKind::Monthly).count(), 2);
    }

    #[test]
    fn test_undated_entries_come_last() {
        let mut flow = FlowDefinition::new(dec!(1000), Currency::BRL);
        flow.set_value(PaymentKind::DownPayment, "100");
        flow.set_first_due_date(PaymentKind::KeysPayment, date(2025, 3, 1));

        let result = FlowAggregator::default().evaluate(&flow).unwrap();
        let schedule = PaymentSchedule::build(&flow, &result).unwrap();

        assert_eq!(schedule.entries[0].kind, PaymentKind::KeysPayment);
        assert_eq!(schedule.entries[1].kind, PaymentKind::DownPayment);
        assert_eq!(schedule.entries[1].due_date, None);
    }

    #[test]
    fn test_schedule_refused_when_exceeding() {
        let mut flow = FlowDefinition::new(dec!(1000), Currency::BRL);
        flow.set_value(PaymentKind::DownPayment, "2000");

        let result = FlowAggregator::default().evaluate(&flow).unwrap();
        let err = PaymentSchedule::build(&flow, &result).unwrap_err();
        assert!(err.is_blocking());
    }
}
