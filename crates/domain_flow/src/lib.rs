//! Payment-Flow Domain
//!
//! This crate implements the payment-flow calculator used when a property is
//! offered to a client: given the property price it derives a consistent
//! payment schedule made of a down payment, a construction-start payment,
//! monthly installments, semiannual and annual reinforcements, and the keys
//! payment.
//!
//! # Components
//!
//! - **Value Resolver** ([`resolver`]): percentage ↔ absolute conversion for one component
//! - **Auto-Balance Coordinator** ([`coordinator`]): at most one component absorbs
//!   the remaining balance
//! - **Flow Aggregator & Validator** ([`aggregator`]): totals, installments and overage
//!
//! # Control Flow
//!
//! ```text
//! edit -> FlowEvent -> Debouncer (quiet period) -> Coordinator::recompute
//!                                                       |
//!                            FlowAggregator::evaluate <-+ (pulled on demand)
//! ```
//!
//! # Example
//!
//! ```rust
//! use core_kernel::Currency;
//! use domain_flow::{EngineConfig, FlowDefinition, FlowSession, PaymentKind};
//! use rust_decimal_macros::dec;
//!
//! let flow = FlowDefinition::new(dec!(500000), Currency::BRL);
//! let mut session = FlowSession::new(flow, &EngineConfig::default());
//!
//! session.set_percentage(PaymentKind::DownPayment, "10");
//! session.set_enabled(PaymentKind::Monthly, true)?;
//! session.set_count(PaymentKind::Monthly, 100);
//! session.request_auto_calculate(PaymentKind::Monthly)?;
//!
//! let result = session.evaluate()?;
//! assert_eq!(result.total_paid.amount(), dec!(500000));
//! assert!(!result.exceeds_limit);
//! # Ok::<(), domain_flow::FlowError>(())
//! ```

pub mod component;
pub mod resolver;
pub mod flow;
pub mod coordinator;
pub mod aggregator;
pub mod schedule;
pub mod snapshot;
pub mod session;
pub mod events;
pub mod config;
pub mod error;

pub use component::{ComponentAmount, PaymentComponent, PaymentKind, SpecMode, MAX_INSTALLMENTS};
pub use flow::{AutoBalance, FlowDefinition};
pub use coordinator::{Coordinator, RecomputeOutcome};
pub use aggregator::{ComponentResult, FlowAggregator, FlowResult, Installment};
pub use schedule::{PaymentSchedule, ScheduleEntry};
pub use snapshot::{migrate, ComponentSnapshot, FlowSnapshot, Migration};
pub use session::{Clock, Debouncer, FlowSession, ManualClock, SystemClock};
pub use events::{ComponentChange, FlowEvent, FlowWarning};
pub use config::EngineConfig;
pub use error::FlowError;
