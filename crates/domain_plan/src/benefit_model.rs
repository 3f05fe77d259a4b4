//! The strongly typed plan benefit model
//!
//! `PlanBenefitModel` is what the waterfall allocator and the band resolver
//! consume. It is resolved once from a `PlanProduct`'s module list and
//! validated before any simulation touches it.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use core_kernel::{BillingCategory, ConditionCode, Currency, Money, PlanCode, Rate, SchemeCode};

use crate::error::PlanError;
use crate::income_band::{IncomeBand, IncomeBandTable, MemberPremium};
use crate::module::{PlanModule, PlanProduct, SublimitStage};

/// A funding limit that may be unlimited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "amount", rename_all = "snake_case")]
pub enum BenefitCap {
    Limited(Money),
    Unlimited,
}

impl BenefitCap {
    /// Remaining headroom after `used`; `None` when unlimited
    pub fn headroom(&self, used: &Money) -> Option<Money> {
        match self {
            BenefitCap::Limited(cap) => Some(cap.saturating_sub(used).unwrap_or(Money::zero(cap.currency()))),
            BenefitCap::Unlimited => None,
        }
    }

    /// How much of `requested` fits under the cap given prior `used`
    pub fn fundable(&self, used: &Money, requested: &Money) -> Money {
        match self.headroom(used) {
            Some(headroom) if headroom < *requested => headroom,
            _ => *requested,
        }
    }

    fn from_optional(amount: Option<Decimal>, currency: Currency) -> Self {
        match amount {
            Some(amount) => BenefitCap::Limited(Money::new(amount, currency)),
            None => BenefitCap::Unlimited,
        }
    }
}

/// Risk-funded benefit active once the annual threshold is reached
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AboveThresholdBenefit {
    pub cap: BenefitCap,
    /// Fraction of every ATB-approved amount the member still bears
    pub co_payment_rate: Rate,
    /// Per-category limits applied before the co-payment
    pub category_limits: BTreeMap<BillingCategory, Money>,
}

impl AboveThresholdBenefit {
    /// An ATB that never pays
    pub fn none(currency: Currency) -> Self {
        Self {
            cap: BenefitCap::Limited(Money::zero(currency)),
            co_payment_rate: Rate::ZERO,
            category_limits: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkRules {
    pub hospital_network_required: bool,
    pub non_network_co_payment_rate: Rate,
    pub gp_network_required: bool,
    /// Family limit on out-of-network GP visits
    pub non_network_gp_family_cap: Money,
}

impl NetworkRules {
    pub fn open(currency: Currency) -> Self {
        Self {
            hospital_network_required: false,
            non_network_co_payment_rate: Rate::ZERO,
            gp_network_required: false,
            non_network_gp_family_cap: Money::zero(currency),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChronicFormulary {
    pub dsp_required: bool,
    pub non_formulary_co_payment_rate: Rate,
    /// Conditions whose chronic medicine counts as PMB
    pub condition_list: BTreeSet<ConditionCode>,
}

impl Default for ChronicFormulary {
    fn default() -> Self {
        Self {
            dsp_required: false,
            non_formulary_co_payment_rate: Rate::ZERO,
            condition_list: BTreeSet::new(),
        }
    }
}

/// Category-specific risk benefit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskSublimit {
    pub category: BillingCategory,
    pub limit: BenefitCap,
    pub stage: SublimitStage,
    /// PMB items may draw on this limit without being capped by it
    pub pmb_exempt: bool,
}

/// What a plan imposes on an item that skips the network
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkPenalty {
    /// A fixed fraction of cost charged to the member
    CoPayment(Rate),
    /// Plan funding limited to a family cap; the excess is charged to the member
    FamilyCap(Money),
}

/// Descriptive identity of a plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanIdentity {
    pub code: PlanCode,
    pub scheme: SchemeCode,
    pub option_name: String,
    pub benefit_year: i32,
    pub headline_copayment: Option<Money>,
}

/// Normalized representation of a plan's funding pools and rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanBenefitModel {
    pub identity: PlanIdentity,
    pub currency: Currency,
    pub savings_annual_allocation: Money,
    pub self_payment_gap: Money,
    pub annual_threshold: Money,
    pub above_threshold_benefit: AboveThresholdBenefit,
    pub network_rules: NetworkRules,
    pub chronic_formulary: ChronicFormulary,
    pub risk_sublimits: Vec<RiskSublimit>,
    pub income_bands: IncomeBandTable,
    /// PMB items are funded in full from risk unless the plan says otherwise
    pub pmb_funded_from_risk: bool,
}

impl PlanBenefitModel {
    /// Resolves a product's module list into a validated benefit model
    ///
    /// # Errors
    ///
    /// Returns `PlanError::Configuration` for duplicate singleton modules,
    /// missing or conflicting contribution tables, out-of-range rates, and
    /// anything `validate` rejects.
    pub fn resolve(product: &PlanProduct) -> Result<Self, PlanError> {
        let code = &product.code;
        let currency = product.currency;
        let money = |amount: Decimal| Money::new(amount, currency);

        let mut seen = BTreeSet::new();
        for module in product.modules.iter().filter(|m| m.is_singleton()) {
            if !seen.insert(module.kind()) {
                return Err(PlanError::configuration(
                    code,
                    format!("module {} appears more than once", module.kind()),
                ));
            }
        }

        let mut savings = Money::zero(currency);
        let mut gap = Money::zero(currency);
        let mut threshold = None;
        let mut atb = AboveThresholdBenefit::none(currency);
        let mut network_rules = NetworkRules::open(currency);
        let mut chronic_formulary = ChronicFormulary::default();
        let mut risk_sublimits = Vec::new();
        let mut income_bands = None;
        let mut pmb_funded_from_risk = true;

        for module in &product.modules {
            match module {
                PlanModule::MedicalSavingsAccount { annual_allocation } => {
                    savings = money(*annual_allocation);
                }
                PlanModule::SelfPaymentGap { amount } => gap = money(*amount),
                PlanModule::AnnualThreshold { amount } => threshold = Some(money(*amount)),
                PlanModule::AboveThresholdBenefit { cap, co_payment_percent, category_limits } => {
                    atb = AboveThresholdBenefit {
                        cap: BenefitCap::from_optional(*cap, currency),
                        co_payment_rate: percent(code, "above_threshold_benefit", *co_payment_percent)?,
                        category_limits: category_limits
                            .iter()
                            .map(|(category, limit)| (*category, money(*limit)))
                            .collect(),
                    };
                }
                PlanModule::HospitalNetwork { network_required, non_network_co_payment_percent } => {
                    network_rules.hospital_network_required = *network_required;
                    network_rules.non_network_co_payment_rate =
                        percent(code, "hospital_network", *non_network_co_payment_percent)?;
                }
                PlanModule::GpNetwork { network_required, non_network_family_cap } => {
                    network_rules.gp_network_required = *network_required;
                    network_rules.non_network_gp_family_cap = money(*non_network_family_cap);
                }
                PlanModule::ChronicBenefit { dsp_required, non_formulary_co_payment_percent, conditions } => {
                    chronic_formulary = ChronicFormulary {
                        dsp_required: *dsp_required,
                        non_formulary_co_payment_rate:
                            percent(code, "chronic_benefit", *non_formulary_co_payment_percent)?,
                        condition_list: conditions.clone(),
                    };
                }
                PlanModule::RiskSublimit { category, limit, stage, pmb_exempt } => {
                    risk_sublimits.push(RiskSublimit {
                        category: *category,
                        limit: BenefitCap::from_optional(*limit, currency),
                        stage: *stage,
                        pmb_exempt: *pmb_exempt,
                    });
                }
                PlanModule::IncomeBandedContributions { bands } => {
                    if income_bands.is_some() {
                        return Err(PlanError::configuration(
                            code,
                            "plan carries both banded and flat contributions",
                        ));
                    }
                    income_bands = Some(IncomeBandTable::from_bands(
                        bands
                            .iter()
                            .map(|spec| IncomeBand {
                                min_income: money(spec.min_income),
                                max_income: spec.max_income.map(money),
                                premium: MemberPremium {
                                    main: money(spec.main),
                                    adult: money(spec.adult),
                                    child: money(spec.child),
                                },
                            })
                            .collect(),
                    ));
                }
                PlanModule::FlatContribution { main, adult, child } => {
                    if income_bands.is_some() {
                        return Err(PlanError::configuration(
                            code,
                            "plan carries both banded and flat contributions",
                        ));
                    }
                    income_bands = Some(IncomeBandTable::flat(MemberPremium {
                        main: money(*main),
                        adult: money(*adult),
                        child: money(*child),
                    }));
                }
                PlanModule::PmbPolicy { fund_from_risk } => pmb_funded_from_risk = *fund_from_risk,
            }
        }

        let income_bands = income_bands
            .ok_or_else(|| PlanError::configuration(code, "plan has no contribution table"))?;

        let model = Self {
            identity: PlanIdentity {
                code: product.code.clone(),
                scheme: product.scheme.clone(),
                option_name: product.option_name.clone(),
                benefit_year: product.benefit_year,
                headline_copayment: product.headline_copayment.map(money),
            },
            currency,
            savings_annual_allocation: savings,
            self_payment_gap: gap,
            // Plans without a threshold module reach it once savings and gap are used up
            annual_threshold: threshold.unwrap_or(savings + gap),
            above_threshold_benefit: atb,
            network_rules,
            chronic_formulary,
            risk_sublimits,
            income_bands,
            pmb_funded_from_risk,
        };

        model.validate()?;

        debug!(
            plan = %model.identity.code,
            savings = %model.savings_annual_allocation,
            threshold = %model.annual_threshold,
            bands = model.income_bands.len(),
            sublimits = model.risk_sublimits.len(),
            "Resolved plan benefit model"
        );

        Ok(model)
    }

    /// Checks the model's structural invariants
    ///
    /// # Errors
    ///
    /// Returns `PlanError::Configuration` naming the first problem found.
    pub fn validate(&self) -> Result<(), PlanError> {
        let code = &self.identity.code;
        let fail = |message: String| Err(PlanError::configuration(code, message));

        let pools = [
            ("savings_annual_allocation", self.savings_annual_allocation),
            ("self_payment_gap", self.self_payment_gap),
            ("annual_threshold", self.annual_threshold),
            ("non_network_gp_family_cap", self.network_rules.non_network_gp_family_cap),
        ];
        for (name, amount) in pools {
            if amount.currency() != self.currency {
                return fail(format!("{} is not in plan currency {}", name, self.currency));
            }
            if amount.is_negative() {
                return fail(format!("{} must not be negative, got {}", name, amount));
            }
        }

        if self.savings_annual_allocation + self.self_payment_gap != self.annual_threshold {
            return fail(format!(
                "savings {} plus self-payment gap {} must equal the annual threshold {}",
                self.savings_annual_allocation, self.self_payment_gap, self.annual_threshold
            ));
        }

        let atb = &self.above_threshold_benefit;
        let mut limits: Vec<(String, Money)> = atb
            .category_limits
            .iter()
            .map(|(category, limit)| (format!("above-threshold {} limit", category), *limit))
            .collect();
        if let BenefitCap::Limited(cap) = atb.cap {
            limits.push(("above-threshold cap".to_string(), cap));
        }
        for sublimit in &self.risk_sublimits {
            if let BenefitCap::Limited(limit) = sublimit.limit {
                limits.push((format!("{} risk sub-limit", sublimit.category), limit));
            }
        }
        if let Some(copayment) = self.identity.headline_copayment {
            limits.push(("headline co-payment".to_string(), copayment));
        }
        for (name, amount) in limits {
            if amount.currency() != self.currency {
                return fail(format!("{} is not in plan currency {}", name, self.currency));
            }
            if amount.is_negative() {
                return fail(format!("{} must not be negative, got {}", name, amount));
            }
        }

        let rates = [
            ("above-threshold co-payment", atb.co_payment_rate),
            ("non-network co-payment", self.network_rules.non_network_co_payment_rate),
            ("non-formulary co-payment", self.chronic_formulary.non_formulary_co_payment_rate),
        ];
        for (name, rate) in rates {
            if !rate.is_fraction() {
                return fail(format!("{} rate {} is outside 0-100%", name, rate));
            }
        }

        let mut keys = BTreeSet::new();
        for sublimit in &self.risk_sublimits {
            if !keys.insert((sublimit.category, sublimit.stage == SublimitStage::BeforeSavings)) {
                return fail(format!(
                    "duplicate {} risk sub-limit for the same stage",
                    sublimit.category
                ));
            }
        }

        if let Some(defect) = self.income_bands.defects(self.currency).into_iter().next() {
            return fail(defect.to_string());
        }

        Ok(())
    }

    pub fn code(&self) -> &PlanCode {
        &self.identity.code
    }

    /// The risk sub-limit for a category at a stage, if the plan has one
    pub fn sublimit(&self, category: BillingCategory, stage: SublimitStage) -> Option<&RiskSublimit> {
        self.risk_sublimits
            .iter()
            .find(|s| s.category == category && s.stage == stage)
    }

    /// Returns true if chronic medicine for `condition` is a prescribed minimum benefit
    pub fn is_pmb_condition(&self, condition: &ConditionCode) -> bool {
        self.chronic_formulary.condition_list.contains(condition)
    }

    /// The penalty for using a non-network provider in `category`, when the
    /// plan's relevant network flag is set
    pub fn network_penalty(&self, category: BillingCategory) -> Option<NetworkPenalty> {
        match category {
            BillingCategory::Hospital | BillingCategory::Maternity
                if self.network_rules.hospital_network_required =>
            {
                Some(NetworkPenalty::CoPayment(self.network_rules.non_network_co_payment_rate))
            }
            BillingCategory::GP if self.network_rules.gp_network_required => {
                Some(NetworkPenalty::FamilyCap(self.network_rules.non_network_gp_family_cap))
            }
            BillingCategory::ChronicMedicine if self.chronic_formulary.dsp_required => Some(
                NetworkPenalty::CoPayment(self.chronic_formulary.non_formulary_co_payment_rate),
            ),
            _ => None,
        }
    }
}

fn percent(code: &PlanCode, module: &str, value: Decimal) -> Result<Rate, PlanError> {
    if value < Decimal::ZERO || value > dec!(100) {
        return Err(PlanError::configuration(
            code,
            format!("{} percentage {} is outside 0-100", module, value),
        ));
    }
    Ok(Rate::from_percentage(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::IncomeBandSpec;

    fn product(modules: Vec<PlanModule>) -> PlanProduct {
        PlanProduct {
            code: PlanCode::new("test-saver").unwrap(),
            scheme: SchemeCode::new("test-scheme").unwrap(),
            option_name: "Test Saver".to_string(),
            benefit_year: 2025,
            currency: Currency::ZAR,
            headline_copayment: None,
            modules,
        }
    }

    fn flat() -> PlanModule {
        PlanModule::FlatContribution { main: dec!(2000), adult: dec!(1500), child: dec!(600) }
    }

    #[test]
    fn test_threshold_defaults_to_savings_plus_gap() {
        let model = PlanBenefitModel::resolve(&product(vec![
            PlanModule::MedicalSavingsAccount { annual_allocation: dec!(8000) },
            PlanModule::SelfPaymentGap { amount: dec!(2000) },
            flat(),
        ]))
        .unwrap();

        assert_eq!(model.annual_threshold.amount(), dec!(10000));
        assert!(model.pmb_funded_from_risk);
        assert_eq!(model.above_threshold_benefit.cap, BenefitCap::Limited(Money::zero(Currency::ZAR)));
    }

    #[test]
    fn test_inconsistent_threshold_rejected() {
        let result = PlanBenefitModel::resolve(&product(vec![
            PlanModule::MedicalSavingsAccount { annual_allocation: dec!(8000) },
            PlanModule::AnnualThreshold { amount: dec!(12000) },
            flat(),
        ]));

        assert!(matches!(result, Err(PlanError::Configuration { .. })));
    }

    #[test]
    fn test_duplicate_singleton_rejected() {
        let result = PlanBenefitModel::resolve(&product(vec![
            PlanModule::MedicalSavingsAccount { annual_allocation: dec!(8000) },
            PlanModule::MedicalSavingsAccount { annual_allocation: dec!(9000) },
            flat(),
        ]));

        assert!(matches!(result, Err(PlanError::Configuration { .. })));
    }

    #[test]
    fn test_missing_contributions_rejected() {
        let result = PlanBenefitModel::resolve(&product(vec![
            PlanModule::MedicalSavingsAccount { annual_allocation: dec!(8000) },
        ]));

        assert!(matches!(result, Err(PlanError::Configuration { .. })));
    }

    #[test]
    fn test_negative_pool_rejected() {
        let result = PlanBenefitModel::resolve(&product(vec![
            PlanModule::MedicalSavingsAccount { annual_allocation: dec!(-1) },
            flat(),
        ]));

        assert!(matches!(result, Err(PlanError::Configuration { .. })));
    }

    #[test]
    fn test_rate_out_of_range_rejected() {
        let result = PlanBenefitModel::resolve(&product(vec![
            PlanModule::HospitalNetwork { network_required: true, non_network_co_payment_percent: dec!(130) },
            flat(),
        ]));

        assert!(matches!(result, Err(PlanError::Configuration { .. })));
    }

    #[test]
    fn test_non_contiguous_bands_rejected() {
        let result = PlanBenefitModel::resolve(&product(vec![
            PlanModule::IncomeBandedContributions {
                bands: vec![
                    IncomeBandSpec { min_income: dec!(0), max_income: Some(dec!(10000)), main: dec!(1000), adult: dec!(0), child: dec!(0) },
                    IncomeBandSpec { min_income: dec!(10500), max_income: None, main: dec!(1500), adult: dec!(0), child: dec!(0) },
                ],
            },
        ]));

        match result {
            Err(PlanError::Configuration { message, .. }) => assert!(message.contains("gap")),
            other => panic!("expected configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_network_penalty_by_category() {
        let model = PlanBenefitModel::resolve(&product(vec![
            PlanModule::HospitalNetwork { network_required: true, non_network_co_payment_percent: dec!(30) },
            PlanModule::GpNetwork { network_required: true, non_network_family_cap: dec!(1200) },
            flat(),
        ]))
        .unwrap();

        assert_eq!(
            model.network_penalty(BillingCategory::Maternity),
            Some(NetworkPenalty::CoPayment(Rate::from_percentage(dec!(30))))
        );
        assert_eq!(
            model.network_penalty(BillingCategory::GP),
            Some(NetworkPenalty::FamilyCap(Money::new(dec!(1200), Currency::ZAR)))
        );
        assert_eq!(model.network_penalty(BillingCategory::ChronicMedicine), None);
        assert_eq!(model.network_penalty(BillingCategory::Dental), None);
    }

    #[test]
    fn test_benefit_cap_fundable() {
        let zar = |a| Money::new(a, Currency::ZAR);
        let cap = BenefitCap::Limited(zar(dec!(1000)));

        assert_eq!(cap.fundable(&zar(dec!(600)), &zar(dec!(500))), zar(dec!(400)));
        assert_eq!(cap.fundable(&zar(dec!(1200)), &zar(dec!(500))), zar(dec!(0)));
        assert_eq!(BenefitCap::Unlimited.fundable(&zar(dec!(1000000)), &zar(dec!(500))), zar(dec!(500)));
    }
}
