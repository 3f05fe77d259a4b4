//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! benefit simulator test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built plans and scenarios, including the reference cliff plan
//! - `builders`: Builder patterns for plan products and scenarios
//! - `assertions`: Custom assertion helpers for money and band tables
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use assertions::*;
pub use generators::*;
