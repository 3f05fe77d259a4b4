//! Result aggregation
//!
//! Rolls per-item allocation records into the simulation's financial
//! summary. This is the only place amounts are rounded: each total is
//! rounded half-up to the currency's minor unit, and the member shortfall
//! is derived as `total - plan_pays` so the two always reconcile exactly.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use core_kernel::{Currency, Money, PlanCode, ScenarioCode};

use crate::allocation::{AllocationRecord, FundingSource, PoolSnapshot};

/// Totals for a simulation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Financials {
    pub total_event_cost: Money,
    pub plan_pays: Money,
    /// Everything the member pays: self-payment gap, co-payments and
    /// uncovered amounts
    pub shortfall: Money,
    pub co_payments: Money,
    pub by_source: BTreeMap<FundingSource, Money>,
    pub closing_pools: PoolSnapshot,
}

impl Financials {
    /// Aggregates a timeline
    pub fn from_timeline(timeline: &[AllocationRecord], currency: Currency, closing_pools: PoolSnapshot) -> Self {
        let zero = Money::zero(currency);
        let mut total = zero;
        let mut plan_pays = zero;
        let mut co_payments = zero;
        let mut by_source: BTreeMap<FundingSource, Money> = BTreeMap::new();

        for record in timeline {
            total = total + record.line_item.cost;
            plan_pays = plan_pays + record.amount_funded;
            co_payments = co_payments + record.co_payment_applied;
            for split in &record.splits {
                let entry = by_source.entry(split.source).or_insert(zero);
                *entry = *entry + split.amount;
            }
        }

        let total_event_cost = total.round_half_up();
        let plan_pays = plan_pays.round_half_up();

        Self {
            total_event_cost,
            plan_pays,
            shortfall: total_event_cost - plan_pays,
            co_payments: co_payments.round_half_up(),
            by_source: by_source
                .into_iter()
                .map(|(source, amount)| (source, amount.round_half_up()))
                .collect(),
            closing_pools,
        }
    }

    /// An empty summary
    pub fn zero(currency: Currency, closing_pools: PoolSnapshot) -> Self {
        Self::from_timeline(&[], currency, closing_pools)
    }

    /// `plan_pays + shortfall == total_event_cost`
    pub fn is_conserved(&self) -> bool {
        self.plan_pays.checked_add(&self.shortfall) == Ok(self.total_event_cost)
    }
}

/// Outcome of running a scenario against a plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub plan_code: PlanCode,
    pub plan_name: String,
    pub scenario_code: ScenarioCode,
    pub currency: Currency,
    /// One record per line item, in scenario order
    pub timeline: Vec<AllocationRecord>,
    pub financials: Financials,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::{AllocationReason, FundingSplit};
    use core_kernel::BillingCategory;
    use domain_scenario::LineItem;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn zar(amount: Decimal) -> Money {
        Money::new(amount, Currency::ZAR)
    }

    fn pools() -> PoolSnapshot {
        PoolSnapshot {
            savings_remaining: zar(dec!(0)),
            gap_remaining: zar(dec!(0)),
            atb_remaining: None,
            cumulative_claims: zar(dec!(0)),
            threshold_reached: false,
        }
    }

    fn record(cost: Decimal, funded: Decimal) -> AllocationRecord {
        let member = cost - funded;
        AllocationRecord {
            index: 0,
            line_item: LineItem::new("Item", BillingCategory::Specialist, zar(cost)),
            funded_from: FundingSource::Savings,
            amount_funded: zar(funded),
            member_shortfall: zar(member),
            co_payment_applied: zar(member),
            reason: AllocationReason::FundedFromSavings,
            splits: vec![
                FundingSplit { source: FundingSource::Savings, amount: zar(funded), member_borne: false },
                FundingSplit { source: FundingSource::Shortfall, amount: zar(member), member_borne: true },
            ],
            pools_after: pools(),
        }
    }

    #[test]
    fn test_rounding_happens_once_and_reconciles() {
        let timeline = vec![
            record(dec!(100.005), dec!(66.6683)),
            record(dec!(100.005), dec!(66.6683)),
            record(dec!(100.005), dec!(66.6683)),
        ];
        let financials = Financials::from_timeline(&timeline, Currency::ZAR, pools());

        assert_eq!(financials.total_event_cost, zar(dec!(300.02)));
        assert_eq!(financials.plan_pays, zar(dec!(200.00)));
        assert_eq!(financials.shortfall, zar(dec!(100.02)));
        assert!(financials.is_conserved());
    }

    #[test]
    fn test_empty_timeline_is_all_zero() {
        let financials = Financials::zero(Currency::ZAR, pools());

        assert!(financials.total_event_cost.is_zero());
        assert!(financials.plan_pays.is_zero());
        assert!(financials.shortfall.is_zero());
        assert!(financials.by_source.is_empty());
    }
}
