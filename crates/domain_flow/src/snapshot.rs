//! Saved proposal snapshots
//!
//! Snapshots are the camelCase JSON documents the surrounding application
//! persists. Older snapshots may lack fields or carry them with the wrong JSON
//! type, so every field is decoded leniently and [`migrate`] backfills
//! defaults before the engine sees the flow.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::Currency;

use crate::component::{ComponentAmount, PaymentKind, SpecMode, MAX_INSTALLMENTS};
use crate::error::FlowError;
use crate::events::FlowWarning;
use crate::flow::{AutoBalance, FlowDefinition};

/// Persisted form of one component
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSnapshot {
    #[serde(default, deserialize_with = "lenient::boolean", skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub spec_mode: Option<String>,
    #[serde(default, deserialize_with = "lenient::decimal", skip_serializing_if = "Option::is_none")]
    pub percentage: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient::decimal", skip_serializing_if = "Option::is_none")]
    pub value: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient::count", skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(default, deserialize_with = "lenient::date", skip_serializing_if = "Option::is_none")]
    pub first_due_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::boolean", skip_serializing_if = "Option::is_none")]
    pub auto_calculate: Option<bool>,
    #[serde(default, deserialize_with = "lenient::boolean", skip_serializing_if = "Option::is_none")]
    pub is_saldo_mode: Option<bool>,
}

/// Persisted form of a whole flow
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowSnapshot {
    #[serde(default, deserialize_with = "lenient::decimal", skip_serializing_if = "Option::is_none")]
    pub property_value: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "lenient::date", skip_serializing_if = "Option::is_none")]
    pub delivery_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::object", skip_serializing_if = "Option::is_none")]
    pub down_payment: Option<ComponentSnapshot>,
    #[serde(default, deserialize_with = "lenient::object", skip_serializing_if = "Option::is_none")]
    pub construction_start: Option<ComponentSnapshot>,
    #[serde(default, deserialize_with = "lenient::object", skip_serializing_if = "Option::is_none")]
    pub monthly: Option<ComponentSnapshot>,
    #[serde(default, deserialize_with = "lenient::object", skip_serializing_if = "Option::is_none")]
    pub semiannual: Option<ComponentSnapshot>,
    #[serde(default, deserialize_with = "lenient::object", skip_serializing_if = "Option::is_none")]
    pub annual: Option<ComponentSnapshot>,
    #[serde(default, deserialize_with = "lenient::object", skip_serializing_if = "Option::is_none")]
    pub keys: Option<ComponentSnapshot>,
}

impl FlowSnapshot {
    /// Parses a snapshot document; only a document that is not a JSON object is rejected
    pub fn from_json(json: &str) -> Result<Self, FlowError> {
        serde_json::from_str(json).map_err(|e| FlowError::Snapshot(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, FlowError> {
        serde_json::to_string_pretty(self).map_err(|e| FlowError::Snapshot(e.to_string()))
    }

    pub fn component(&self, kind: PaymentKind) -> Option<&ComponentSnapshot> {
        match kind {
            PaymentKind::DownPayment => self.down_payment.as_ref(),
            PaymentKind::ConstructionStart => self.construction_start.as_ref(),
            PaymentKind::Monthly => self.monthly.as_ref(),
            PaymentKind::SemiannualReinforcement => self.semiannual.as_ref(),
            PaymentKind::AnnualReinforcement => self.annual.as_ref(),
            PaymentKind::KeysPayment => self.keys.as_ref(),
        }
    }

    fn component_slot(&mut self, kind: PaymentKind) -> &mut Option<ComponentSnapshot> {
        match kind {
            PaymentKind::DownPayment => &mut self.down_payment,
            PaymentKind::ConstructionStart => &mut self.construction_start,
            PaymentKind::Monthly => &mut self.monthly,
            PaymentKind::SemiannualReinforcement => &mut self.semiannual,
            PaymentKind::AnnualReinforcement => &mut self.annual,
            PaymentKind::KeysPayment => &mut self.keys,
        }
    }
}

impl ComponentSnapshot {
    fn auto_flag(&self, kind: PaymentKind) -> bool {
        let flag = match kind {
            PaymentKind::KeysPayment => self.is_saldo_mode.or(self.auto_calculate),
            _ => self.auto_calculate,
        };
        flag.unwrap_or(false)
    }

    fn mode(&self) -> SpecMode {
        match self.spec_mode.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("percentage" | "percent" | "%") => SpecMode::Percentage,
            Some("value" | "absolute" | "absolutevalue" | "amount") => SpecMode::AbsoluteValue,
            _ => {
                let percentage = self.percentage.unwrap_or_default();
                let value = self.value.unwrap_or_default();
                if value > Decimal::ZERO && percentage.is_zero() {
                    SpecMode::AbsoluteValue
                } else {
                    SpecMode::Percentage
                }
            }
        }
    }
}

/// A flow rebuilt from a snapshot, with anything that had to be corrected
#[derive(Debug, Clone)]
pub struct Migration {
    pub flow: FlowDefinition,
    pub warnings: Vec<FlowWarning>,
}

/// Normalizes a snapshot into a complete flow
///
/// Missing or malformed amounts become zero, missing counts become one
/// (as do counts above [`MAX_INSTALLMENTS`], with a warning),
/// unknown currencies fall back to `default_currency`, and when several
/// components claim auto-balance the first in flow order keeps it.
pub fn migrate(snapshot: &FlowSnapshot, default_currency: Currency) -> Migration {
    let currency = snapshot
        .currency
        .as_deref()
        .and_then(|code| code.parse().ok())
        .unwrap_or(default_currency);
    let mut flow = FlowDefinition::new(snapshot.property_value.unwrap_or_default(), currency);
    flow.set_client_name(snapshot.client_name.clone().unwrap_or_default());
    flow.set_delivery_date(snapshot.delivery_date);

    let mut warnings = Vec::new();
    for kind in PaymentKind::ALL {
        let Some(saved) = snapshot.component(kind) else {
            continue;
        };

        let component = flow.component_mut(kind);
        if kind.is_optional() {
            component.enabled = saved.enabled.unwrap_or(false);
        }
        component.amount = match saved.mode() {
            SpecMode::Percentage => {
                ComponentAmount::Percentage(saved.percentage.unwrap_or_default().max(Decimal::ZERO))
            }
            SpecMode::AbsoluteValue => {
                ComponentAmount::Absolute(saved.value.unwrap_or_default().max(Decimal::ZERO))
            }
        };
        if kind.is_recurring() {
            component.count = match saved.count {
                Some(count) if count > MAX_INSTALLMENTS => {
                    let warning = FlowWarning::InstallmentCountReset { kind, count };
                    tracing::warn!(?kind, count, "{}", warning);
                    warnings.push(warning);
                    1
                }
                Some(count) => count,
                None => 1,
            };
        }
        component.first_due_date = saved.first_due_date;

        if !saved.auto_flag(kind) || !kind.supports_auto_balance() || !component.is_enabled() {
            continue;
        }
        match flow.auto_balanced() {
            None => flow.set_auto_balance(AutoBalance::Active(kind)),
            Some(kept) => {
                let warning = FlowWarning::DroppedAutoFlag { kind, kept };
                tracing::warn!(?kind, ?kept, "{}", warning);
                warnings.push(warning);
            }
        }
    }

    tracing::info!(
        property_value = %flow.property_value(),
        currency = %flow.currency(),
        auto_balanced = ?flow.auto_balanced(),
        "snapshot migrated"
    );
    Migration { flow, warnings }
}

impl FlowDefinition {
    /// Serializable form of the flow, with both percentage and value written out
    pub fn to_snapshot(&self) -> FlowSnapshot {
        let property_value = self.property_value();
        let mut snapshot = FlowSnapshot {
            property_value: Some(property_value),
            client_name: Some(self.client_name().to_string()),
            currency: Some(self.currency().code().to_string()),
            delivery_date: self.delivery_date(),
            ..FlowSnapshot::default()
        };

        for component in self.components() {
            let kind = component.kind();
            let auto = self.is_auto_balanced(kind);
            let keys = kind == PaymentKind::KeysPayment;
            *snapshot.component_slot(kind) = Some(ComponentSnapshot {
                enabled: Some(component.is_enabled()),
                spec_mode: Some(
                    match component.spec_mode() {
                        SpecMode::Percentage => "percentage",
                        SpecMode::AbsoluteValue => "value",
                    }
                    .to_string(),
                ),
                percentage: Some(component.percentage(property_value)),
                value: Some(component.value(property_value)),
                count: kind.is_recurring().then_some(component.count()),
                first_due_date: component.first_due_date(),
                auto_calculate: (!keys).then_some(auto),
                is_saldo_mode: keys.then_some(auto),
            });
        }
        snapshot
    }
}

/// Field decoders that never fail; anything unusable decodes as `None`
mod lenient {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;
    use std::str::FromStr;

    use crate::resolver::parse_amount;

    pub fn decimal<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Decimal>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Number(n) => {
                let text = n.to_string();
                Some(
                    Decimal::from_str(&text)
                        .or_else(|_| Decimal::from_scientific(&text))
                        .unwrap_or_default(),
                )
            }
            Value::String(s) => Some(parse_amount(&s)),
            _ => None,
        })
    }

    pub fn count<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Number(n) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
                .or(Some(0))
                .map(|c| u32::try_from(c).unwrap_or(u32::MAX)),
            Value::String(s) => s.trim().parse::<u32>().ok(),
            _ => None,
        })
    }

    pub fn boolean<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Bool(b) => Some(b),
            Value::Number(n) => n.as_f64().map(|f| f != 0.0),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Some(true),
                "false" | "0" | "no" | "off" | "" => Some(false),
                _ => None,
            },
            _ => None,
        })
    }

    pub fn date<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::String(s) => s
                .get(..10)
                .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()),
            _ => None,
        })
    }

    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }

    pub fn object<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let value = Value::deserialize(d)?;
        if !value.is_object() {
            return Ok(None);
        }
        Ok(serde_json::from_value(value).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_empty_snapshot_yields_defaults() {
        let snapshot = FlowSnapshot::from_json("{}").unwrap();
        let migration = migrate(&snapshot, Currency::BRL);

        assert_eq!(migration.flow, FlowDefinition::default());
        assert!(migration.warnings.is_empty());
    }

    #[test]
    fn test_non_object_snapshot_is_rejected() {
        assert!(matches!(FlowSnapshot::from_json("[1,2]"), Err(FlowError::Snapshot(_))));
    }

    #[test]
    fn test_malformed_fields_default() {
        let json = r#"{
            "propertyValue": "abc",
            "currency": "XYZ",
            "deliveryDate": "not a date",
            "monthly": { "enabled": "yes", "value": null, "count": "many" },
            "annual": 42
        }"#;
        let snapshot = FlowSnapshot::from_json(json).unwrap();
        let flow = migrate(&snapshot, Currency::USD).flow;

        assert_eq!(flow.property_value(), dec!(0));
        assert_eq!(flow.currency(), Currency::USD);
        assert_eq!(flow.delivery_date(), None);
        let monthly = flow.component(PaymentKind::Monthly);
        assert!(monthly.is_enabled());
        assert_eq!(monthly.count(), 1);
        assert_eq!(monthly.value(dec!(0)), dec!(0));
        assert!(!flow.component(PaymentKind::AnnualReinforcement).is_enabled());
    }

    #[test]
    fn test_out_of_range_count_is_reset() {
        let json = r#"{
            "propertyValue": 1000,
            "monthly": { "enabled": true, "count": 4294967295, "value": 0 },
            "annual": { "enabled": true, "count": 600 }
        }"#;
        let migration = migrate(&FlowSnapshot::from_json(json).unwrap(), Currency::BRL);

        assert_eq!(migration.flow.component(PaymentKind::Monthly).count(), 1);
        assert_eq!(
            migration.flow.component(PaymentKind::AnnualReinforcement).count(),
            MAX_INSTALLMENTS
        );
        assert_eq!(
            migration.warnings,
            vec![FlowWarning::InstallmentCountReset {
                kind: PaymentKind::Monthly,
                count: u32::MAX,
            }]
        );

        let result = crate::aggregator::FlowAggregator::default()
            .evaluate(&migration.flow)
            .unwrap();
        let monthly = result.component(PaymentKind::Monthly).unwrap();
        assert_eq!(monthly.installments.len(), 1);
    }

    #[test]
    fn test_missing_spec_mode_is_inferred() {
        let json = r#"{
            "propertyValue": 500000,
            "downPayment": { "value": 50000 },
            "keys": { "percentage": 20, "value": 100000 }
        }"#;
        let flow = migrate(&FlowSnapshot::from_json(json).unwrap(), Currency::BRL).flow;

        assert_eq!(flow.component(PaymentKind::DownPayment).spec_mode(), SpecMode::AbsoluteValue);
        assert_eq!(flow.component(PaymentKind::KeysPayment).spec_mode(), SpecMode::Percentage);
        assert_eq!(flow.component(PaymentKind::KeysPayment).value(dec!(500000)), dec!(100000));
    }

    #[test]
    fn test_only_first_auto_flag_survives() {
        let json = r#"{
            "propertyValue": 500000,
            "monthly": { "enabled": true, "autoCalculate": true, "count": 10 },
            "annual": { "enabled": true, "autoCalculate": true },
            "keys": { "isSaldoMode": true }
        }"#;
        let migration = migrate(&FlowSnapshot::from_json(json).unwrap(), Currency::BRL);

        assert_eq!(migration.flow.auto_balanced(), Some(PaymentKind::Monthly));
        assert_eq!(migration.warnings.len(), 2);
        assert!(migration.warnings.iter().all(|w| matches!(
            w,
            FlowWarning::DroppedAutoFlag { kept: PaymentKind::Monthly, .. }
        )));
    }

    #[test]
    fn test_auto_flag_on_disabled_block_is_ignored() {
        let json = r#"{ "monthly": { "enabled": false, "autoCalculate": true } }"#;
        let migration = migrate(&FlowSnapshot::from_json(json).unwrap(), Currency::BRL);
        assert_eq!(migration.flow.auto_balanced(), None);
        assert!(migration.warnings.is_empty());
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut flow = FlowDefinition::new(dec!(350000), Currency::EUR);
        flow.set_client_name("Ana");
        flow.set_delivery_date(NaiveDate::from_ymd_opt(2027, 3, 1));
        flow.set_percentage(PaymentKind::DownPayment, "15");
        flow.set_enabled(PaymentKind::Monthly, true).unwrap();
        flow.set_count(PaymentKind::Monthly, 36);
        flow.set_value(PaymentKind::Monthly, "2500");
        flow.set_first_due_date(PaymentKind::Monthly, NaiveDate::from_ymd_opt(2025, 2, 10));
        flow.set_auto_balance(AutoBalance::Active(PaymentKind::KeysPayment));

        let json = flow.to_snapshot().to_json().unwrap();
        let restored = migrate(&FlowSnapshot::from_json(&json).unwrap(), Currency::BRL).flow;

        assert_eq!(restored.property_value(), flow.property_value());
        assert_eq!(restored.currency(), Currency::EUR);
        assert_eq!(restored.client_name(), "Ana");
        assert_eq!(restored.auto_balanced(), Some(PaymentKind::KeysPayment));
        for kind in PaymentKind::ALL {
            let (a, b) = (restored.component(kind), flow.component(kind));
            assert_eq!(a.is_enabled(), b.is_enabled(), "{kind}");
            assert_eq!(a.spec_mode(), b.spec_mode(), "{kind}");
            assert_eq!(a.value(dec!(350000)), b.value(dec!(350000)), "{kind}");
            assert_eq!(a.first_due_date(), b.first_due_date(), "{kind}");
        }
    }
}
