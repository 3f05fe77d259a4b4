//! Pool-state accumulator
//!
//! A `PoolLedger` carries the running balances of one simulation: what is
//! left in savings and the self-payment gap, how much of the above-threshold
//! benefit and each sub-limit has been drawn, and the claims accrued toward
//! the annual threshold. Each simulation builds its own ledger.
//!
//! Every `draw_*` method returns the amount actually granted, which is never
//! more than requested.

use std::collections::BTreeMap;

use core_kernel::{BillingCategory, Money};
use domain_plan::{BenefitCap, PlanBenefitModel, SublimitStage};

use crate::allocation::PoolSnapshot;

/// What constrained an above-threshold draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AtbConstraint {
    CategoryLimit,
    Cap,
}

/// Result of drawing on the above-threshold benefit
#[derive(Debug, Clone, Copy)]
pub(crate) struct AtbDraw {
    /// Amount approved by the benefit, before the co-payment
    pub approved: Money,
    pub constrained_by: Option<AtbConstraint>,
}

#[derive(Debug)]
pub struct PoolLedger<'a> {
    plan: &'a PlanBenefitModel,
    savings_remaining: Money,
    gap_remaining: Money,
    cumulative_claims: Money,
    atb_used: Money,
    atb_category_used: BTreeMap<BillingCategory, Money>,
    sublimit_used: BTreeMap<(BillingCategory, SublimitStage), Money>,
    gp_non_network_used: Money,
}

impl<'a> PoolLedger<'a> {
    /// Opens a ledger with the plan's full annual pools
    pub fn new(plan: &'a PlanBenefitModel) -> Self {
        let zero = Money::zero(plan.currency);
        Self {
            plan,
            savings_remaining: plan.savings_annual_allocation,
            gap_remaining: plan.self_payment_gap,
            cumulative_claims: zero,
            atb_used: zero,
            atb_category_used: BTreeMap::new(),
            sublimit_used: BTreeMap::new(),
            gp_non_network_used: zero,
        }
    }

    pub fn plan(&self) -> &'a PlanBenefitModel {
        self.plan
    }

    /// False for plans whose above-threshold benefit never pays
    pub fn has_above_threshold_benefit(&self) -> bool {
        match self.plan.above_threshold_benefit.cap {
            BenefitCap::Limited(cap) => cap.is_positive(),
            BenefitCap::Unlimited => true,
        }
    }

    /// Claims still needed before the threshold is reached
    pub fn headroom_to_threshold(&self) -> Money {
        floor_sub(&self.plan.annual_threshold, &self.cumulative_claims)
    }

    pub fn threshold_reached(&self) -> bool {
        self.cumulative_claims >= self.plan.annual_threshold
    }

    /// Adds claims toward the threshold
    pub fn accrue(&mut self, amount: Money) {
        self.cumulative_claims = self.cumulative_claims + amount;
    }

    pub fn draw_savings(&mut self, requested: Money) -> Money {
        let granted = lesser(requested, self.savings_remaining);
        self.savings_remaining = self.savings_remaining - granted;
        granted
    }

    pub fn draw_gap(&mut self, requested: Money) -> Money {
        let granted = lesser(requested, self.gap_remaining);
        self.gap_remaining = self.gap_remaining - granted;
        granted
    }

    /// Draws on the plan's sub-limit for `category` at `stage`
    ///
    /// PMB items draw on a PMB-exempt sub-limit in full; the usage is still
    /// recorded so later non-PMB items see less headroom.
    pub fn draw_sublimit(
        &mut self,
        category: BillingCategory,
        stage: SublimitStage,
        requested: Money,
        is_pmb: bool,
    ) -> Money {
        let plan = self.plan;
        let Some(sublimit) = plan.sublimit(category, stage) else {
            return Money::zero(self.plan.currency);
        };

        let used = self
            .sublimit_used
            .entry((category, stage))
            .or_insert(Money::zero(self.plan.currency));
        let granted = if is_pmb && sublimit.pmb_exempt {
            requested
        } else {
            sublimit.limit.fundable(used, &requested)
        };
        *used = *used + granted;
        granted
    }

    /// Records a PMB payment against the category's PMB-exempt sub-limit, if any
    pub fn record_pmb_usage(&mut self, category: BillingCategory, amount: Money) {
        let plan = self.plan;
        let stage = [SublimitStage::BeforeSavings, SublimitStage::AfterAboveThreshold]
            .into_iter()
            .find(|stage| plan.sublimit(category, *stage).is_some_and(|sublimit| sublimit.pmb_exempt));

        if let Some(stage) = stage {
            let used = self
                .sublimit_used
                .entry((category, stage))
                .or_insert(Money::zero(self.plan.currency));
            *used = *used + amount;
        }
    }

    /// Draws on the above-threshold benefit, category limit first, then the cap
    pub(crate) fn draw_atb(&mut self, category: BillingCategory, requested: Money) -> AtbDraw {
        let plan = self.plan;
        let atb = &plan.above_threshold_benefit;
        let mut constrained_by = None;

        let mut approved = requested;
        if let Some(limit) = atb.category_limits.get(&category) {
            let used = self
                .atb_category_used
                .get(&category)
                .copied()
                .unwrap_or(Money::zero(self.plan.currency));
            let headroom = floor_sub(limit, &used);
            if headroom < approved {
                approved = headroom;
                constrained_by = Some(AtbConstraint::CategoryLimit);
            }
        }

        let capped = atb.cap.fundable(&self.atb_used, &approved);
        if capped < approved {
            approved = capped;
            constrained_by = Some(AtbConstraint::Cap);
        }

        self.atb_used = self.atb_used + approved;
        if atb.category_limits.contains_key(&category) {
            let used = self
                .atb_category_used
                .entry(category)
                .or_insert(Money::zero(self.plan.currency));
            *used = *used + approved;
        }

        AtbDraw { approved, constrained_by }
    }

    /// Draws on the family limit for out-of-network GP visits
    pub fn draw_gp_family_cap(&mut self, requested: Money) -> Money {
        let cap = self.plan.network_rules.non_network_gp_family_cap;
        let granted = lesser(requested, floor_sub(&cap, &self.gp_non_network_used));
        self.gp_non_network_used = self.gp_non_network_used + granted;
        granted
    }

    pub fn snapshot(&self) -> PoolSnapshot {
        let atb_remaining = match self.plan.above_threshold_benefit.cap {
            BenefitCap::Limited(cap) => Some(floor_sub(&cap, &self.atb_used)),
            BenefitCap::Unlimited => None,
        };

        PoolSnapshot {
            savings_remaining: self.savings_remaining,
            gap_remaining: self.gap_remaining,
            atb_remaining,
            cumulative_claims: self.cumulative_claims,
            threshold_reached: self.threshold_reached(),
        }
    }
}

/// Ties resolve toward the pool, so an exact balance empties it
fn lesser(a: Money, b: Money) -> Money {
    if a <= b {
        a
    } else {
        b
    }
}

fn floor_sub(a: &Money, b: &Money) -> Money {
    let difference = *a - *b;
    if difference.is_negative() {
        Money::zero(a.currency())
    } else {
        difference
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{Currency, PlanCode, SchemeCode};
    use domain_plan::{PlanModule, PlanProduct};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn zar(amount: Decimal) -> Money {
        Money::new(amount, Currency::ZAR)
    }

    fn plan(modules: Vec<PlanModule>) -> PlanBenefitModel {
        let mut all = modules;
        all.push(PlanModule::FlatContribution { main: dec!(1000), adult: dec!(0), child: dec!(0) });
        PlanBenefitModel::resolve(&PlanProduct {
            code: PlanCode::new("ledger-plan").unwrap(),
            scheme: SchemeCode::new("ledger").unwrap(),
            option_name: "Ledger".to_string(),
            benefit_year: 2025,
            currency: Currency::ZAR,
            headline_copayment: None,
            modules: all,
        })
        .unwrap()
    }

    #[test]
    fn test_exact_balance_empties_savings() {
        let plan = plan(vec![PlanModule::MedicalSavingsAccount { annual_allocation: dec!(5000) }]);
        let mut ledger = PoolLedger::new(&plan);

        assert_eq!(ledger.draw_savings(zar(dec!(5000))), zar(dec!(5000)));
        assert!(ledger.snapshot().savings_remaining.is_zero());
        assert!(ledger.draw_savings(zar(dec!(1))).is_zero());
    }

    #[test]
    fn test_category_limit_applies_before_cap() {
        let mut limits = std::collections::BTreeMap::new();
        limits.insert(BillingCategory::Dental, dec!(3000));
        let plan = plan(vec![PlanModule::AboveThresholdBenefit {
            cap: Some(dec!(10000)),
            co_payment_percent: dec!(0),
            category_limits: limits,
        }]);
        let mut ledger = PoolLedger::new(&plan);

        let draw = ledger.draw_atb(BillingCategory::Dental, zar(dec!(4000)));
        assert_eq!(draw.approved, zar(dec!(3000)));
        assert_eq!(draw.constrained_by, Some(AtbConstraint::CategoryLimit));
        assert_eq!(ledger.snapshot().atb_remaining, Some(zar(dec!(7000))));

        let draw = ledger.draw_atb(BillingCategory::Specialist, zar(dec!(8000)));
        assert_eq!(draw.approved, zar(dec!(7000)));
        assert_eq!(draw.constrained_by, Some(AtbConstraint::Cap));
    }

    #[test]
    fn test_pmb_exempt_sublimit_records_usage_without_capping() {
        let plan = plan(vec![PlanModule::RiskSublimit {
            category: BillingCategory::ChronicMedicine,
            limit: Some(dec!(2000)),
            stage: SublimitStage::AfterAboveThreshold,
            pmb_exempt: true,
        }]);
        let mut ledger = PoolLedger::new(&plan);

        ledger.record_pmb_usage(BillingCategory::ChronicMedicine, zar(dec!(1500)));
        let granted = ledger.draw_sublimit(
            BillingCategory::ChronicMedicine,
            SublimitStage::AfterAboveThreshold,
            zar(dec!(1000)),
            false,
        );
        assert_eq!(granted, zar(dec!(500)));
    }

    #[test]
    fn test_gp_family_cap_runs_out() {
        let plan = plan(vec![PlanModule::GpNetwork { network_required: true, non_network_family_cap: dec!(1000) }]);
        let mut ledger = PoolLedger::new(&plan);

        assert_eq!(ledger.draw_gp_family_cap(zar(dec!(700))), zar(dec!(700)));
        assert_eq!(ledger.draw_gp_family_cap(zar(dec!(700))), zar(dec!(300)));
        assert!(ledger.draw_gp_family_cap(zar(dec!(700))).is_zero());
    }
}
