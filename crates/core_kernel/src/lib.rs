//! Core Kernel - Foundational types shared by the benefit simulator
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money types with precise decimal arithmetic and half-up reporting rounds
//! - Percentage rates for co-payments and materiality ratios
//! - Code identifiers for plans, schemes, scenarios and conditions
//! - The billing category taxonomy shared by plans and scenarios

pub mod money;
pub mod identifiers;
pub mod error;
pub mod category;

pub use money::{Money, Currency, MoneyError, Rate, INTERNAL_PRECISION};
pub use identifiers::{PlanCode, SchemeCode, ScenarioCode, ConditionCode};
pub use error::CoreError;
pub use category::BillingCategory;
