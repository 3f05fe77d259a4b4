//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating scenarios, band tables and
//! household inputs that maintain domain invariants. Amounts are whole
//! rand so that reported totals never need rounding.

use proptest::prelude::*;
use rust_decimal::Decimal;

use core_kernel::{BillingCategory, Currency, Money, ScenarioCode};
use domain_plan::{Household, IncomeBandSpec};
use domain_scenario::{ClinicalScenario, LineItem};

/// Strategy for generating billing categories
pub fn billing_category_strategy() -> impl Strategy<Value = BillingCategory> {
    prop::sample::select(BillingCategory::ALL.to_vec())
}

/// Strategy for generating whole-rand costs, zero included
pub fn cost_strategy() -> impl Strategy<Value = Decimal> {
    prop_oneof![
        1 => Just(Decimal::ZERO),
        9 => (1i64..25_000i64).prop_map(Decimal::from),
    ]
}

/// Strategy for generating plain line items: no PMB flag, no network requirement
pub fn line_item_strategy() -> impl Strategy<Value = LineItem> {
    (billing_category_strategy(), cost_strategy()).prop_map(|(category, cost)| {
        LineItem::new(
            format!("{} item", category),
            category,
            Money::new(cost, Currency::ZAR),
        )
    })
}

/// Strategy for generating line items that may be PMB or out of network
pub fn flagged_line_item_strategy() -> impl Strategy<Value = LineItem> {
    (line_item_strategy(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(mut item, pmb, requires_network, compliant)| {
            item.is_pmb = pmb;
            item.requires_network = requires_network;
            item.network_compliance = Some(compliant);
            item
        },
    )
}

/// Strategy for generating scenarios of up to `max_items` plain items
pub fn scenario_strategy(max_items: usize) -> impl Strategy<Value = ClinicalScenario> {
    prop::collection::vec(line_item_strategy(), 0..=max_items).prop_map(scenario_from)
}

/// Strategy for generating scenarios of up to `max_items` flagged items
pub fn flagged_scenario_strategy(max_items: usize) -> impl Strategy<Value = ClinicalScenario> {
    prop::collection::vec(flagged_line_item_strategy(), 0..=max_items).prop_map(scenario_from)
}

/// Wraps items in a rand scenario
pub fn scenario_from(items: Vec<LineItem>) -> ClinicalScenario {
    let mut scenario = ClinicalScenario::new(
        ScenarioCode::new("generated").expect("valid scenario code"),
        "Generated scenario",
        Currency::ZAR,
    );
    scenario.line_items = items;
    scenario
}

/// Strategy for generating contiguous band tables with an unbounded top band
pub fn band_table_strategy() -> impl Strategy<Value = Vec<IncomeBandSpec>> {
    (
        prop::collection::vec(1u32..30_000u32, 0..6),
        prop::collection::vec(500u32..6_000u32, 7),
    )
        .prop_map(|(widths, premiums)| {
            let mut bands = Vec::with_capacity(widths.len() + 1);
            let mut lower = Decimal::ZERO;
            for (i, width) in widths.iter().enumerate() {
                let upper = lower + Decimal::from(*width);
                bands.push(IncomeBandSpec {
                    min_income: lower,
                    max_income: Some(upper),
                    main: Decimal::from(premiums[i]),
                    adult: Decimal::from(premiums[i] / 2),
                    child: Decimal::from(premiums[i] / 5),
                });
                lower = upper;
            }
            let top = premiums[widths.len()];
            bands.push(IncomeBandSpec {
                min_income: lower,
                max_income: None,
                main: Decimal::from(top),
                adult: Decimal::from(top / 2),
                child: Decimal::from(top / 5),
            });
            bands
        })
}

/// Strategy for generating non-negative monthly incomes in rand
pub fn income_strategy() -> impl Strategy<Value = Money> {
    (0i64..250_000i64).prop_map(|amount| Money::new(Decimal::from(amount), Currency::ZAR))
}

/// Strategy for generating household compositions
pub fn household_strategy() -> impl Strategy<Value = Household> {
    (0u32..3, 0u32..5).prop_map(|(adults, children)| Household::new(adults, children))
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn generated_band_tables_start_at_zero(bands in band_table_strategy()) {
            prop_assert!(bands[0].min_income.is_zero());
            prop_assert!(bands.last().unwrap().max_income.is_none());
        }

        #[test]
        fn generated_scenarios_are_valid(scenario in flagged_scenario_strategy(8)) {
            prop_assert!(scenario.validate().is_ok());
        }
    }
}
