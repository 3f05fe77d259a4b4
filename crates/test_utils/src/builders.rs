//! Test Data Builders
//!
//! Provides builder patterns for constructing plan products and scenarios
//! with sensible defaults. Tests specify only the modules and items they
//! care about.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::{BTreeMap, BTreeSet};

use core_kernel::{BillingCategory, ConditionCode, Currency, Money, PlanCode, ScenarioCode, SchemeCode};
use domain_plan::{IncomeBandSpec, PlanBenefitModel, PlanModule, PlanProduct, SublimitStage};
use domain_scenario::{ClinicalScenario, LineItem};

/// Builder for plan products
///
/// Without any contribution module the built plan gets a flat R1 000
/// contribution so that it resolves.
pub struct TestPlanProductBuilder {
    code: String,
    scheme: String,
    option_name: String,
    benefit_year: i32,
    currency: Currency,
    headline_copayment: Option<Decimal>,
    savings: Option<Decimal>,
    gap: Option<Decimal>,
    threshold: Option<Decimal>,
    atb: Option<(Option<Decimal>, Decimal)>,
    atb_category_limits: BTreeMap<BillingCategory, Decimal>,
    contributions: Option<PlanModule>,
    modules: Vec<PlanModule>,
}

impl Default for TestPlanProductBuilder {
    fn default() -> Self {
        Self::new("test-plan")
    }
}

impl TestPlanProductBuilder {
    /// Creates a builder for an empty plan
    pub fn new(code: &str) -> Self {
        Self {
            code: code.to_string(),
            scheme: "test-scheme".to_string(),
            option_name: code.to_string(),
            benefit_year: 2025,
            currency: Currency::ZAR,
            headline_copayment: None,
            savings: None,
            gap: None,
            threshold: None,
            atb: None,
            atb_category_limits: BTreeMap::new(),
            contributions: None,
            modules: Vec::new(),
        }
    }

    pub fn with_scheme(mut self, scheme: &str, benefit_year: i32) -> Self {
        self.scheme = scheme.to_string();
        self.benefit_year = benefit_year;
        self
    }

    pub fn with_headline_copayment(mut self, amount: Decimal) -> Self {
        self.headline_copayment = Some(amount);
        self
    }

    /// Sets the medical savings account allocation
    pub fn with_savings(mut self, amount: Decimal) -> Self {
        self.savings = Some(amount);
        self
    }

    /// Sets the self-payment gap
    pub fn with_gap(mut self, amount: Decimal) -> Self {
        self.gap = Some(amount);
        self
    }

    /// Sets an explicit annual threshold
    pub fn with_threshold(mut self, amount: Decimal) -> Self {
        self.threshold = Some(amount);
        self
    }

    /// Adds an above-threshold benefit; `None` cap means unlimited
    pub fn with_atb(mut self, cap: Option<Decimal>, co_payment_percent: Decimal) -> Self {
        self.atb = Some((cap, co_payment_percent));
        self
    }

    pub fn with_atb_category_limit(mut self, category: BillingCategory, limit: Decimal) -> Self {
        self.atb_category_limits.insert(category, limit);
        self
    }

    pub fn with_hospital_network(mut self, co_payment_percent: Decimal) -> Self {
        self.modules.push(PlanModule::HospitalNetwork {
            network_required: true,
            non_network_co_payment_percent: co_payment_percent,
        });
        self
    }

    pub fn with_gp_network(mut self, family_cap: Decimal) -> Self {
        self.modules.push(PlanModule::GpNetwork {
            network_required: true,
            non_network_family_cap: family_cap,
        });
        self
    }

    /// Adds a chronic benefit with a DSP requirement and PMB condition list
    pub fn with_chronic_dsp(mut self, co_payment_percent: Decimal, conditions: &[&str]) -> Self {
        let conditions: BTreeSet<ConditionCode> = conditions
            .iter()
            .map(|c| ConditionCode::new(c).expect("valid condition code"))
            .collect();
        self.modules.push(PlanModule::ChronicBenefit {
            dsp_required: true,
            non_formulary_co_payment_percent: co_payment_percent,
            conditions,
        });
        self
    }

    /// Adds a risk sub-limit; `None` limit means unlimited
    pub fn with_sublimit(
        mut self,
        category: BillingCategory,
        limit: Option<Decimal>,
        stage: SublimitStage,
        pmb_exempt: bool,
    ) -> Self {
        self.modules.push(PlanModule::RiskSublimit { category, limit, stage, pmb_exempt });
        self
    }

    /// Sets banded contributions from `(min, max, main)` rows
    pub fn with_bands(mut self, bands: &[(Decimal, Option<Decimal>, Decimal)]) -> Self {
        self.contributions = Some(PlanModule::IncomeBandedContributions {
            bands: bands
                .iter()
                .map(|(min, max, main)| IncomeBandSpec {
                    min_income: *min,
                    max_income: *max,
                    main: *main,
                    adult: dec!(0),
                    child: dec!(0),
                })
                .collect(),
        });
        self
    }

    pub fn with_flat_contribution(mut self, main: Decimal, adult: Decimal, child: Decimal) -> Self {
        self.contributions = Some(PlanModule::FlatContribution { main, adult, child });
        self
    }

    /// PMB items go through the normal waterfall
    pub fn without_pmb_risk_funding(mut self) -> Self {
        self.modules.push(PlanModule::PmbPolicy { fund_from_risk: false });
        self
    }

    /// Builds the product record
    pub fn build(self) -> PlanProduct {
        let mut modules = Vec::new();
        if let Some(amount) = self.savings {
            modules.push(PlanModule::MedicalSavingsAccount { annual_allocation: amount });
        }
        if let Some(amount) = self.gap {
            modules.push(PlanModule::SelfPaymentGap { amount });
        }
        if let Some(amount) = self.threshold {
            modules.push(PlanModule::AnnualThreshold { amount });
        }
        if self.atb.is_some() || !self.atb_category_limits.is_empty() {
            let (cap, co_payment_percent) = self.atb.unwrap_or((None, dec!(0)));
            modules.push(PlanModule::AboveThresholdBenefit {
                cap,
                co_payment_percent,
                category_limits: self.atb_category_limits,
            });
        }
        modules.extend(self.modules);
        modules.push(self.contributions.unwrap_or(PlanModule::FlatContribution {
            main: dec!(1000),
            adult: dec!(0),
            child: dec!(0),
        }));

        PlanProduct {
            code: PlanCode::new(&self.code).expect("valid plan code"),
            scheme: SchemeCode::new(&self.scheme).expect("valid scheme code"),
            option_name: self.option_name,
            benefit_year: self.benefit_year,
            currency: self.currency,
            headline_copayment: self.headline_copayment,
            modules,
        }
    }

    /// Builds and resolves the benefit model, panicking if it is invalid
    pub fn resolve(self) -> PlanBenefitModel {
        let product = self.build();
        PlanBenefitModel::resolve(&product)
            .unwrap_or_else(|e| panic!("test plan {} failed to resolve: {}", product.code, e))
    }
}

/// Builder for clinical scenarios priced in rand
pub struct TestScenarioBuilder {
    code: String,
    name: String,
    currency: Currency,
    assume_network_compliance: bool,
    items: Vec<LineItem>,
}

impl Default for TestScenarioBuilder {
    fn default() -> Self {
        Self::new("test-scenario")
    }
}

impl TestScenarioBuilder {
    pub fn new(code: &str) -> Self {
        Self {
            code: code.to_string(),
            name: code.to_string(),
            currency: Currency::ZAR,
            assume_network_compliance: false,
            items: Vec::new(),
        }
    }

    /// Adds a plain item
    pub fn item(mut self, label: &str, category: BillingCategory, cost: Decimal) -> Self {
        self.items.push(line_item(label, category, cost));
        self
    }

    /// Adds a prescribed-minimum-benefit item
    pub fn pmb_item(mut self, label: &str, category: BillingCategory, cost: Decimal) -> Self {
        self.items.push(line_item(label, category, cost).pmb());
        self
    }

    /// Adds an item that must be obtained in network, obtained out of network
    pub fn out_of_network_item(mut self, label: &str, category: BillingCategory, cost: Decimal) -> Self {
        self.items.push(
            line_item(label, category, cost)
                .requiring_network()
                .with_network_compliance(false),
        );
        self
    }

    pub fn with_item(mut self, item: LineItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn assuming_network_compliance(mut self) -> Self {
        self.assume_network_compliance = true;
        self
    }

    pub fn build(self) -> ClinicalScenario {
        let mut scenario = ClinicalScenario::new(
            ScenarioCode::new(&self.code).expect("valid scenario code"),
            self.name,
            self.currency,
        );
        scenario.assume_network_compliance = self.assume_network_compliance;
        scenario.line_items = self.items;
        scenario
    }
}

/// A rand-priced line item
pub fn line_item(label: &str, category: BillingCategory, cost: Decimal) -> LineItem {
    LineItem::new(label, category, Money::new(cost, Currency::ZAR))
}
