//! Pre-built Test Fixtures
//!
//! Provides ready-to-use plans and scenarios. Amounts are in rand and
//! chosen so expected allocations can be worked out by hand.

use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{BillingCategory, ConditionCode, Currency, Money};
use domain_plan::{PlanBenefitModel, PlanCatalog, PlanProduct, SublimitStage};
use domain_scenario::{CarePhase, ClinicalScenario};

use crate::builders::{line_item, TestPlanProductBuilder, TestScenarioBuilder};

/// Creates a rand amount
pub fn zar(amount: Decimal) -> Money {
    Money::new(amount, Currency::ZAR)
}

/// Fixture plans
pub struct PlanFixtures;

impl PlanFixtures {
    /// Bands `[0, 11930) -> R1730`, `[11930, 19350) -> R2111`,
    /// `[19350, ∞) -> R2650`, main member only
    pub fn cliff_plan() -> PlanProduct {
        TestPlanProductBuilder::new("cliff-plan")
            .with_scheme("meridian", 2025)
            .with_bands(&[
                (dec!(0), Some(dec!(11930)), dec!(1730)),
                (dec!(11930), Some(dec!(19350)), dec!(2111)),
                (dec!(19350), None, dec!(2650)),
            ])
            .build()
    }

    /// A savings plan with every pool:
    /// - savings R9 000, gap R3 000, threshold R12 000
    /// - ATB capped at R20 000 with a 10% co-payment, dental limited to R4 000
    /// - 30% non-network hospital co-payment
    /// - chronic DSP with a 20% co-payment; hypertension and type 2 diabetes are PMB
    /// - chronic medicine risk sub-limit of R5 000
    pub fn saver_plan() -> PlanProduct {
        TestPlanProductBuilder::new("classic-saver")
            .with_scheme("meridian", 2025)
            .with_headline_copayment(dec!(0))
            .with_savings(dec!(9000))
            .with_gap(dec!(3000))
            .with_threshold(dec!(12000))
            .with_atb(Some(dec!(20000)), dec!(10))
            .with_atb_category_limit(BillingCategory::Dental, dec!(4000))
            .with_hospital_network(dec!(30))
            .with_chronic_dsp(dec!(20), &["hypertension", "diabetes-type-2"])
            .with_sublimit(
                BillingCategory::ChronicMedicine,
                Some(dec!(5000)),
                SublimitStage::AfterAboveThreshold,
                false,
            )
            .with_flat_contribution(dec!(2890), dec!(2270), dec!(880))
            .build()
    }

    /// A hospital plan: no savings, unlimited day-one hospital cover,
    /// 30% non-network hospital co-payment and a R1 500 out-of-network GP cap
    pub fn hospital_plan() -> PlanProduct {
        TestPlanProductBuilder::new("hospital-core")
            .with_scheme("meridian", 2025)
            .with_headline_copayment(dec!(5000))
            .with_sublimit(BillingCategory::Hospital, None, SublimitStage::BeforeSavings, true)
            .with_sublimit(BillingCategory::Maternity, Some(dec!(40000)), SublimitStage::BeforeSavings, false)
            .with_hospital_network(dec!(30))
            .with_gp_network(dec!(1500))
            .with_flat_contribution(dec!(1650), dec!(1300), dec!(660))
            .build()
    }

    /// A savings plan with an unlimited, co-payment-free ATB
    pub fn comprehensive_plan() -> PlanProduct {
        TestPlanProductBuilder::new("meridian-comprehensive")
            .with_scheme("meridian", 2025)
            .with_savings(dec!(6000))
            .with_gap(dec!(2000))
            .with_atb(None, dec!(0))
            .with_flat_contribution(dec!(4200), dec!(3900), dec!(1100))
            .build()
    }

    pub fn all() -> Vec<PlanProduct> {
        vec![
            Self::cliff_plan(),
            Self::saver_plan(),
            Self::hospital_plan(),
            Self::comprehensive_plan(),
        ]
    }

    /// Resolves a fixture product
    pub fn model(product: PlanProduct) -> PlanBenefitModel {
        PlanBenefitModel::resolve(&product)
            .unwrap_or_else(|e| panic!("fixture plan {} failed to resolve: {}", product.code, e))
    }
}

/// Every fixture plan, resolved once
pub static FIXTURE_CATALOG: Lazy<PlanCatalog> = Lazy::new(|| {
    PlanCatalog::from_products(PlanFixtures::all()).expect("fixture plans resolve")
});

/// Fixture scenarios
pub struct ScenarioFixtures;

impl ScenarioFixtures {
    /// No line items
    pub fn empty() -> ClinicalScenario {
        TestScenarioBuilder::new("empty").build()
    }

    /// Day-to-day care totalling R4 000
    pub fn routine_care() -> ClinicalScenario {
        TestScenarioBuilder::new("routine-care")
            .item("GP consultation", BillingCategory::GP, dec!(650))
            .item("Blood tests", BillingCategory::Diagnostic, dec!(1350))
            .item("Specialist consultation", BillingCategory::Specialist, dec!(2000))
            .build()
    }

    /// A year of type 2 diabetes care that runs past the threshold
    pub fn diabetes_year() -> ClinicalScenario {
        let diabetes = ConditionCode::new("diabetes-type-2").expect("valid condition code");
        TestScenarioBuilder::new("diabetes-year")
            .with_item(
                line_item("Diagnosis consultation", BillingCategory::GP, dec!(650))
                    .with_phase(CarePhase::Diagnosis),
            )
            .with_item(
                line_item("HbA1c and lipid panel", BillingCategory::Diagnostic, dec!(1850))
                    .with_phase(CarePhase::Diagnosis),
            )
            .with_item(
                line_item("Metformin, 12 months", BillingCategory::ChronicMedicine, dec!(7200))
                    .with_phase(CarePhase::Ongoing)
                    .requiring_network()
                    .with_condition(diabetes),
            )
            .with_item(
                line_item("Endocrinologist follow-ups", BillingCategory::Specialist, dec!(6400))
                    .with_phase(CarePhase::Ongoing),
            )
            .with_item(
                line_item("Dental work", BillingCategory::Dental, dec!(5000))
                    .with_phase(CarePhase::Treatment),
            )
            .assuming_network_compliance()
            .build()
    }

    /// A planned hip replacement, admitted out of network
    pub fn hip_replacement_out_of_network() -> ClinicalScenario {
        TestScenarioBuilder::new("hip-replacement")
            .item("Orthopaedic consultation", BillingCategory::Specialist, dec!(1800))
            .item("X-rays", BillingCategory::Diagnostic, dec!(1200))
            .out_of_network_item("Hip replacement admission", BillingCategory::Hospital, dec!(10000))
            .item("Physiotherapy", BillingCategory::Other, dec!(2400))
            .build()
    }
}
