//! Plan Benefit Domain
//!
//! This crate turns plan product records into the strongly typed benefit
//! model the simulator runs against.
//!
//! # Architecture
//!
//! - **Modules**: a plan arrives as a tagged list of benefit modules
//!   (`MedicalSavingsAccount`, `AboveThresholdBenefit`, `ChronicBenefit`, ...)
//! - **Benefit model**: `PlanBenefitModel::resolve` folds the list into
//!   pools, network rules, formulary, sub-limits and an income-band table,
//!   and validates the result
//! - **Catalog**: `PlanCatalog` loads JSON plan files and serves resolved
//!   plans by code
//!
//! # Pool invariants
//!
//! ```text
//! savings_annual_allocation + self_payment_gap == annual_threshold
//! income bands: [0, b1) [b1, b2) ... [bn, ∞)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_plan::PlanCatalog;
//!
//! let mut catalog = PlanCatalog::new();
//! catalog.load_from_dir(Path::new("data/plans"))?;
//! let plan = catalog.get(&"classic-saver-2025".parse()?)?;
//! ```

pub mod module;
pub mod income_band;
pub mod benefit_model;
pub mod catalog;
pub mod error;

pub use module::{PlanModule, PlanProduct, IncomeBandSpec, SublimitStage};
pub use income_band::{Household, IncomeBand, IncomeBandTable, MemberPremium, BandTableDefect};
pub use benefit_model::{
    PlanBenefitModel, PlanIdentity, AboveThresholdBenefit, BenefitCap, NetworkRules,
    ChronicFormulary, RiskSublimit, NetworkPenalty,
};
pub use catalog::PlanCatalog;
pub use error::PlanError;
