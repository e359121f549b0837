//! Core Kernel - Foundational types for the payment-flow calculator
//!
//! This crate provides the building blocks shared by the flow engine and its callers:
//! - Money and Rate types with precise decimal arithmetic
//! - Calendar month arithmetic for installment due dates

pub mod money;
pub mod temporal;

pub use money::{Money, Currency, MoneyError, Rate};
pub use temporal::{MonthStep, TemporalError, add_months};
