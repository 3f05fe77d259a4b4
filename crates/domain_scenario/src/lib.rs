//! Clinical Scenario Domain
//!
//! A clinical scenario is an ordered list of billable events (consultations,
//! admissions, medicine, scans) that a simulation runs against a plan.
//!
//! # Ordering
//!
//! ```text
//! item[0] -> item[1] -> ... -> item[n]   (pools are consumed in this order)
//! ```
//!
//! Running the same items in a different order may fund them differently;
//! that order sensitivity is part of the model.

pub mod scenario;
pub mod catalog;
pub mod error;

pub use core_kernel::BillingCategory;
pub use scenario::{CarePhase, ClinicalScenario, LineItem};
pub use catalog::ScenarioCatalog;
pub use error::ScenarioError;
