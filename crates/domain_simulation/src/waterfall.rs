//! The benefit waterfall allocator
//!
//! Each line item is funded in scenario order against a running
//! [`PoolLedger`]:
//!
//! ```text
//! network co-payment
//!   -> PMB override (risk pool, 100%)
//!   -> day-one risk sub-limit
//!   -> savings -> self-payment gap            (nominal cost accrues toward threshold)
//!   -> above-threshold benefit (limit, cap, co-payment)
//!   -> risk sub-limit
//!   -> shortfall
//! ```
//!
//! Items are never reordered, so the same items in a different order may
//! be funded differently.

use tracing::{debug, trace};

use core_kernel::Money;
use domain_plan::{NetworkPenalty, PlanBenefitModel, SublimitStage};
use domain_scenario::{BillingCategory, ClinicalScenario, LineItem};

use crate::aggregator::{Financials, SimulationResult};
use crate::allocation::{AllocationReason, AllocationRecord, FundingSource, SplitCollector};
use crate::error::SimulationError;
use crate::ledger::{AtbConstraint, PoolLedger};

/// Runs a scenario against a plan
///
/// Both inputs are validated before any allocation; a single bad line
/// item fails the whole simulation.
///
/// # Errors
///
/// * `SimulationError::Configuration` - the plan is malformed
/// * `SimulationError::Validation` - a line item is malformed, or the
///   scenario and plan currencies differ
pub fn run_simulation(
    scenario: &ClinicalScenario,
    plan: &PlanBenefitModel,
) -> Result<SimulationResult, SimulationError> {
    plan.validate()?;
    scenario.validate()?;
    if scenario.currency != plan.currency {
        return Err(SimulationError::Validation(format!(
            "scenario {} is priced in {} but plan {} is in {}",
            scenario.code, scenario.currency, plan.identity.code, plan.currency
        )));
    }

    let mut ledger = PoolLedger::new(plan);
    let timeline: Vec<AllocationRecord> = scenario
        .line_items
        .iter()
        .enumerate()
        .map(|(index, item)| allocate_item(&mut ledger, scenario, index, item))
        .collect();

    let financials = Financials::from_timeline(&timeline, plan.currency, ledger.snapshot());

    debug!(
        plan = %plan.identity.code,
        scenario = %scenario.code,
        items = timeline.len(),
        total = %financials.total_event_cost,
        plan_pays = %financials.plan_pays,
        shortfall = %financials.shortfall,
        "Simulation complete"
    );

    Ok(SimulationResult {
        plan_code: plan.identity.code.clone(),
        plan_name: plan.identity.option_name.clone(),
        scenario_code: scenario.code.clone(),
        currency: plan.currency,
        timeline,
        financials,
    })
}

/// Returns true if the item is a prescribed minimum benefit on this plan
pub fn is_pmb(plan: &PlanBenefitModel, item: &LineItem) -> bool {
    item.is_pmb
        || (item.category == BillingCategory::ChronicMedicine
            && item
                .condition
                .as_ref()
                .is_some_and(|condition| plan.is_pmb_condition(condition)))
}

fn allocate_item(
    ledger: &mut PoolLedger<'_>,
    scenario: &ClinicalScenario,
    index: usize,
    item: &LineItem,
) -> AllocationRecord {
    let plan = ledger.plan();
    let mut splits = SplitCollector::new(plan.currency);

    let reason = if item.cost.is_zero() {
        AllocationReason::ZeroCost
    } else {
        let pmb = is_pmb(plan, item);

        let network_co_payment = if item.requires_network && !scenario.is_network_compliant(item) {
            network_co_payment(ledger, item.category, item.cost)
        } else {
            Money::zero(plan.currency)
        };
        splits.co_pay(network_co_payment);
        let payable = item.cost - network_co_payment;

        if pmb && plan.pmb_funded_from_risk {
            ledger.record_pmb_usage(item.category, payable);
            splits.push(FundingSource::RiskPool, payable);
            AllocationReason::PrescribedMinimumBenefit
        } else {
            let claim = Claim {
                nominal: item.cost,
                co_payment: network_co_payment,
            };
            let reason = fund_through_pools(ledger, item.category, pmb, claim, &mut splits);
            if network_co_payment.is_positive() {
                AllocationReason::NonNetworkCoPayment
            } else {
                reason
            }
        }
    };

    let funded_from = if item.cost.is_zero() {
        FundingSource::Savings
    } else {
        splits.dominant_source()
    };

    let record = AllocationRecord {
        index,
        line_item: item.clone(),
        funded_from,
        amount_funded: splits.funded(),
        member_shortfall: splits.member_borne(),
        co_payment_applied: splits.co_payment(),
        reason,
        splits: splits.into_splits(),
        pools_after: ledger.snapshot(),
    };

    trace!(
        index,
        label = %item.label,
        cost = %item.cost,
        funded_from = ?record.funded_from,
        funded = %record.amount_funded,
        member = %record.member_shortfall,
        reason = ?record.reason,
        "Allocated line item"
    );

    record
}

/// Member co-payment for skipping the network
fn network_co_payment(ledger: &mut PoolLedger<'_>, category: BillingCategory, cost: Money) -> Money {
    match ledger.plan().network_penalty(category) {
        Some(NetworkPenalty::CoPayment(rate)) => rate.apply(&cost),
        Some(NetworkPenalty::FamilyCap(_)) => cost - ledger.draw_gp_family_cap(cost),
        None => Money::zero(cost.currency()),
    }
}

/// An item's cost and the network co-payment already charged on it
#[derive(Debug, Clone, Copy)]
struct Claim {
    nominal: Money,
    co_payment: Money,
}

impl Claim {
    /// Splits the claim at `headroom` into the amounts left to fund on each
    /// side of the threshold, sharing the co-payment in proportion
    fn split_at(&self, headroom: Money) -> (Money, Money) {
        let pre = if self.nominal <= headroom { self.nominal } else { headroom };
        let post = self.nominal - pre;
        if self.co_payment.is_zero() {
            return (pre, post);
        }

        let pre_co_payment = self
            .co_payment
            .multiply(pre.amount() / self.nominal.amount());
        let post_co_payment = self.co_payment - pre_co_payment;
        (pre - pre_co_payment, post - post_co_payment)
    }
}

/// The non-PMB stages of the waterfall
fn fund_through_pools(
    ledger: &mut PoolLedger<'_>,
    category: BillingCategory,
    pmb: bool,
    claim: Claim,
    splits: &mut SplitCollector,
) -> AllocationReason {
    let plan = ledger.plan();

    let payable = claim.nominal - claim.co_payment;
    let day_one = ledger.draw_sublimit(category, SublimitStage::BeforeSavings, payable, pmb);
    splits.push(FundingSource::RiskPool, day_one);

    // The day-one draw never exceeds the payable part, so the co-payment
    // always fits inside what is left of the nominal claim
    let claim = Claim {
        nominal: claim.nominal - day_one,
        co_payment: claim.co_payment,
    };
    let (pre_threshold, post_threshold) = claim.split_at(ledger.headroom_to_threshold());
    ledger.accrue(claim.nominal);

    let from_savings = ledger.draw_savings(pre_threshold);
    splits.push(FundingSource::Savings, from_savings);
    let from_gap = ledger.draw_gap(pre_threshold - from_savings);
    splits.push(FundingSource::SelfPaymentGap, from_gap);
    splits.push(FundingSource::Shortfall, pre_threshold - from_savings - from_gap);

    let mut constraint = None;
    let mut from_sublimit = Money::zero(plan.currency);
    if post_threshold.is_positive() {
        let draw = ledger.draw_atb(category, post_threshold);
        // Co-payment is charged on the amount the limits approved
        let co_payment = plan.above_threshold_benefit.co_payment_rate.apply(&draw.approved);
        splits.push(FundingSource::AboveThresholdBenefit, draw.approved - co_payment);
        splits.co_pay(co_payment);
        constraint = draw.constrained_by;

        let unfunded = post_threshold - draw.approved;
        from_sublimit = ledger.draw_sublimit(category, SublimitStage::AfterAboveThreshold, unfunded, pmb);
        splits.push(FundingSource::RiskPool, from_sublimit);
        splits.push(FundingSource::Shortfall, unfunded - from_sublimit);
    }

    if pre_threshold.is_positive() && post_threshold.is_positive() {
        return AllocationReason::ThresholdCrossed;
    }
    match constraint {
        Some(AtbConstraint::CategoryLimit) => return AllocationReason::CategoryLimitReached,
        Some(AtbConstraint::Cap) if ledger.has_above_threshold_benefit() => {
            return AllocationReason::CapExhausted;
        }
        _ => {}
    }

    match splits.dominant_source() {
        FundingSource::Savings if from_gap.is_positive() => AllocationReason::SavingsExhausted,
        FundingSource::Savings => AllocationReason::FundedFromSavings,
        FundingSource::SelfPaymentGap if from_savings.is_positive() => AllocationReason::SavingsExhausted,
        FundingSource::SelfPaymentGap => AllocationReason::SelfPaymentGap,
        FundingSource::AboveThresholdBenefit => AllocationReason::AboveThresholdBenefit,
        FundingSource::RiskPool if day_one.is_positive() && from_sublimit.is_zero() => {
            AllocationReason::DayOneRiskBenefit
        }
        FundingSource::RiskPool => AllocationReason::RiskSublimit,
        FundingSource::Shortfall => AllocationReason::NoBenefit,
    }
}
