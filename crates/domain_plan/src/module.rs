//! Plan product records as supplied by the data loader
//!
//! A plan arrives as a list of benefit modules. Each module is a tagged
//! variant carrying only the fields that module needs; nothing is probed
//! ad hoc at simulation time. `PlanBenefitModel::resolve` folds the list
//! into the strongly typed model once, at load time.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use core_kernel::{BillingCategory, ConditionCode, Currency, PlanCode, SchemeCode};

/// When a risk sub-limit is drawn on
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SublimitStage {
    /// Day-one risk benefit, used before savings are touched
    BeforeSavings,
    /// Catches what the above-threshold benefit did not fund
    #[default]
    AfterAboveThreshold,
}

/// One row of an income-banded contribution table, as loaded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeBandSpec {
    pub min_income: Decimal,
    /// Exclusive upper bound; absent for the top band
    #[serde(default)]
    pub max_income: Option<Decimal>,
    pub main: Decimal,
    #[serde(default)]
    pub adult: Decimal,
    #[serde(default)]
    pub child: Decimal,
}

/// A single benefit module of a plan product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlanModule {
    /// Annual medical savings account allocation
    MedicalSavingsAccount {
        annual_allocation: Decimal,
    },
    /// Member-funded band between savings exhaustion and the threshold
    SelfPaymentGap {
        amount: Decimal,
    },
    /// Claims level unlocking the above-threshold benefit
    AnnualThreshold {
        amount: Decimal,
    },
    /// Risk-funded day-to-day benefit after the threshold
    AboveThresholdBenefit {
        /// Absent means unlimited
        #[serde(default)]
        cap: Option<Decimal>,
        #[serde(default)]
        co_payment_percent: Decimal,
        #[serde(default)]
        category_limits: BTreeMap<BillingCategory, Decimal>,
    },
    HospitalNetwork {
        network_required: bool,
        #[serde(default)]
        non_network_co_payment_percent: Decimal,
    },
    GpNetwork {
        network_required: bool,
        #[serde(default)]
        non_network_family_cap: Decimal,
    },
    ChronicBenefit {
        dsp_required: bool,
        #[serde(default)]
        non_formulary_co_payment_percent: Decimal,
        /// Conditions whose chronic medicine is a prescribed minimum benefit
        #[serde(default)]
        conditions: BTreeSet<ConditionCode>,
    },
    RiskSublimit {
        category: BillingCategory,
        /// Absent means unlimited
        #[serde(default)]
        limit: Option<Decimal>,
        #[serde(default)]
        stage: SublimitStage,
        #[serde(default)]
        pmb_exempt: bool,
    },
    IncomeBandedContributions {
        bands: Vec<IncomeBandSpec>,
    },
    FlatContribution {
        main: Decimal,
        #[serde(default)]
        adult: Decimal,
        #[serde(default)]
        child: Decimal,
    },
    PmbPolicy {
        fund_from_risk: bool,
    },
}

impl PlanModule {
    /// Returns the module's tag, as used in data files
    pub fn kind(&self) -> &'static str {
        match self {
            PlanModule::MedicalSavingsAccount { .. } => "medical_savings_account",
            PlanModule::SelfPaymentGap { .. } => "self_payment_gap",
            PlanModule::AnnualThreshold { .. } => "annual_threshold",
            PlanModule::AboveThresholdBenefit { .. } => "above_threshold_benefit",
            PlanModule::HospitalNetwork { .. } => "hospital_network",
            PlanModule::GpNetwork { .. } => "gp_network",
            PlanModule::ChronicBenefit { .. } => "chronic_benefit",
            PlanModule::RiskSublimit { .. } => "risk_sublimit",
            PlanModule::IncomeBandedContributions { .. } => "income_banded_contributions",
            PlanModule::FlatContribution { .. } => "flat_contribution",
            PlanModule::PmbPolicy { .. } => "pmb_policy",
        }
    }

    /// Returns true for modules a plan may carry at most once
    pub fn is_singleton(&self) -> bool {
        !matches!(self, PlanModule::RiskSublimit { .. })
    }
}

/// A plan product record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanProduct {
    pub code: PlanCode,
    pub scheme: SchemeCode,
    pub option_name: String,
    pub benefit_year: i32,
    #[serde(default)]
    pub currency: Currency,
    /// Headline hospital co-payment, used to order related plans
    #[serde(default)]
    pub headline_copayment: Option<Decimal>,
    pub modules: Vec<PlanModule>,
}
