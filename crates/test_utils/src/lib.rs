//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! payment-flow test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built flows and snapshots for the reference scenarios
//! - `builders`: Builder for flows with only the relevant fields set
//! - `assertions`: Tolerance-aware assertion helpers for amounts
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use assertions::*;
pub use generators::*;
