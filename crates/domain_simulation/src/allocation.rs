//! Per-item allocation records

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use core_kernel::{Currency, Money};
use domain_scenario::LineItem;

/// Where a portion of a line item's cost was funded from
///
/// Variant order is waterfall stage order and breaks ties when choosing
/// a record's dominant source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FundingSource {
    Savings,
    SelfPaymentGap,
    AboveThresholdBenefit,
    RiskPool,
    Shortfall,
}

impl FundingSource {
    /// True for sources paid by the member rather than the plan
    pub fn is_member_borne(&self) -> bool {
        matches!(self, FundingSource::SelfPaymentGap | FundingSource::Shortfall)
    }
}

/// Why an item was funded the way it was
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationReason {
    ZeroCost,
    FundedFromSavings,
    /// Savings ran out part-way through the item
    SavingsExhausted,
    SelfPaymentGap,
    /// The item carried cumulative claims across the annual threshold
    ThresholdCrossed,
    AboveThresholdBenefit,
    /// Paid from a risk benefit available before savings
    DayOneRiskBenefit,
    RiskSublimit,
    PrescribedMinimumBenefit,
    NonNetworkCoPayment,
    CategoryLimitReached,
    CapExhausted,
    /// Nothing on the plan covered the item
    NoBenefit,
}

/// One slice of an item's cost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingSplit {
    pub source: FundingSource,
    pub amount: Money,
    /// Paid by the member: self-payment gap, co-payments and shortfall
    pub member_borne: bool,
}

/// Running pool state after an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub savings_remaining: Money,
    pub gap_remaining: Money,
    /// `None` when the above-threshold benefit is unlimited
    pub atb_remaining: Option<Money>,
    /// Claims accrued toward the annual threshold
    pub cumulative_claims: Money,
    pub threshold_reached: bool,
}

/// How a single line item was funded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationRecord {
    /// Position of the item in the scenario
    pub index: usize,
    pub line_item: LineItem,
    pub funded_from: FundingSource,
    /// Paid by the plan
    pub amount_funded: Money,
    /// Paid by the member, co-payments included
    pub member_shortfall: Money,
    /// Network and above-threshold co-payments charged on the item
    pub co_payment_applied: Money,
    pub reason: AllocationReason,
    pub splits: Vec<FundingSplit>,
    pub pools_after: PoolSnapshot,
}

impl AllocationRecord {
    /// Totals the record's splits per source
    pub fn by_source(&self) -> BTreeMap<FundingSource, Money> {
        let mut totals = BTreeMap::new();
        for split in &self.splits {
            let entry = totals
                .entry(split.source)
                .or_insert_with(|| Money::zero(split.amount.currency()));
            *entry = *entry + split.amount;
        }
        totals
    }
}

/// Collects the splits of one item while the waterfall runs
#[derive(Debug)]
pub(crate) struct SplitCollector {
    currency: Currency,
    splits: Vec<FundingSplit>,
    co_payment: Money,
}

impl SplitCollector {
    pub(crate) fn new(currency: Currency) -> Self {
        Self {
            currency,
            splits: Vec::new(),
            co_payment: Money::zero(currency),
        }
    }

    /// Records a slice; zero slices are dropped
    pub(crate) fn push(&mut self, source: FundingSource, amount: Money) {
        if amount.is_zero() {
            return;
        }
        self.splits.push(FundingSplit {
            source,
            amount,
            member_borne: source.is_member_borne(),
        });
    }

    /// Records a co-payment charged to the member
    pub(crate) fn co_pay(&mut self, amount: Money) {
        self.push(FundingSource::Shortfall, amount);
        self.co_payment = self.co_payment + amount;
    }

    pub(crate) fn co_payment(&self) -> Money {
        self.co_payment
    }

    pub(crate) fn funded(&self) -> Money {
        self.sum(|split| !split.member_borne)
    }

    pub(crate) fn member_borne(&self) -> Money {
        self.sum(|split| split.member_borne)
    }

    /// The source carrying the largest share, earliest stage on ties
    pub(crate) fn dominant_source(&self) -> FundingSource {
        let mut totals: BTreeMap<FundingSource, Money> = BTreeMap::new();
        for split in &self.splits {
            let entry = totals.entry(split.source).or_insert(Money::zero(self.currency));
            *entry = *entry + split.amount;
        }

        let mut best: Option<(FundingSource, Money)> = None;
        for (source, amount) in totals {
            match best {
                Some((_, best_amount)) if amount <= best_amount => {}
                _ => best = Some((source, amount)),
            }
        }
        best.map(|(source, _)| source).unwrap_or(FundingSource::Shortfall)
    }

    pub(crate) fn into_splits(self) -> Vec<FundingSplit> {
        self.splits
    }

    fn sum(&self, keep: impl Fn(&FundingSplit) -> bool) -> Money {
        self.splits
            .iter()
            .filter(|split| keep(split))
            .fold(Money::zero(self.currency), |acc, split| acc + split.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn zar(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount, Currency::ZAR)
    }

    #[test]
    fn test_dominant_source_prefers_earliest_stage_on_ties() {
        let mut splits = SplitCollector::new(Currency::ZAR);
        splits.push(FundingSource::SelfPaymentGap, zar(dec!(500)));
        splits.push(FundingSource::Savings, zar(dec!(500)));

        assert_eq!(splits.dominant_source(), FundingSource::Savings);
    }

    #[test]
    fn test_dominant_source_sums_repeated_sources() {
        let mut splits = SplitCollector::new(Currency::ZAR);
        splits.push(FundingSource::AboveThresholdBenefit, zar(dec!(900)));
        splits.co_pay(zar(dec!(500)));
        splits.push(FundingSource::Savings, zar(dec!(700)));
        splits.co_pay(zar(dec!(500)));

        assert_eq!(splits.dominant_source(), FundingSource::Shortfall);
        assert_eq!(splits.co_payment(), zar(dec!(1000)));
        assert_eq!(splits.funded(), zar(dec!(1600)));
        assert_eq!(splits.member_borne(), zar(dec!(1000)));
    }

    #[test]
    fn test_empty_collector_reports_shortfall() {
        assert_eq!(SplitCollector::new(Currency::ZAR).dominant_source(), FundingSource::Shortfall);
    }

    #[test]
    fn test_zero_splits_dropped() {
        let mut splits = SplitCollector::new(Currency::ZAR);
        splits.push(FundingSource::Savings, Money::zero(Currency::ZAR));

        assert!(splits.into_splits().is_empty());
    }

    #[test]
    fn test_reason_serializes_snake_case() {
        let json = serde_json::to_string(&AllocationReason::PrescribedMinimumBenefit).unwrap();
        assert_eq!(json, "\"prescribed_minimum_benefit\"");
    }
}
