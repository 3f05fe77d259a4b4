//! Integration tests for domain_simulation

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

use core_kernel::{BillingCategory, Currency};
use domain_plan::{Household, PlanBenefitModel, SublimitStage};
use domain_scenario::LineItem;
use domain_simulation::{
    check_income_volatility, compare_plans, resolve_premium, run_simulation, AllocationReason,
    FundingSource, HouseholdIncome, SimulationConfig, SimulationError,
};
use test_utils::{
    assert_money_zero, assert_reconciles, band_table_strategy, household_strategy, income_strategy,
    scenario_from, flagged_scenario_strategy, zar, PlanFixtures,
    ScenarioFixtures, TestPlanProductBuilder, TestScenarioBuilder, FIXTURE_CATALOG,
};

fn saver() -> PlanBenefitModel {
    PlanFixtures::model(PlanFixtures::saver_plan())
}

fn hospital() -> PlanBenefitModel {
    PlanFixtures::model(PlanFixtures::hospital_plan())
}

// ============================================================================
// Waterfall ordering
// ============================================================================

mod waterfall_tests {
    use super::*;

    #[test]
    fn test_costs_below_savings_are_funded_from_savings() {
        let result = run_simulation(&ScenarioFixtures::routine_care(), &saver()).unwrap();

        assert!(result.timeline.iter().all(|r| r.funded_from == FundingSource::Savings));
        assert_eq!(result.financials.plan_pays, zar(dec!(4000)));
        assert_money_zero(&result.financials.shortfall);
        assert_eq!(result.financials.closing_pools.savings_remaining, zar(dec!(5000)));
    }

    #[test]
    fn test_reaching_threshold_exactly_uses_savings_and_gap_only() {
        let scenario = TestScenarioBuilder::new("to-threshold")
            .item("Specialist", BillingCategory::Specialist, dec!(5000))
            .item("MRI", BillingCategory::Diagnostic, dec!(7000))
            .build();
        let result = run_simulation(&scenario, &saver()).unwrap();
        let by_source = &result.financials.by_source;

        assert_eq!(by_source.get(&FundingSource::Savings), Some(&zar(dec!(9000))));
        assert_eq!(by_source.get(&FundingSource::SelfPaymentGap), Some(&zar(dec!(3000))));
        assert!(by_source.get(&FundingSource::AboveThresholdBenefit).is_none());

        let closing = result.financials.closing_pools;
        assert_eq!(closing.cumulative_claims, zar(dec!(12000)));
        assert!(closing.threshold_reached);
        assert_eq!(closing.atb_remaining, Some(zar(dec!(20000))));

        assert_eq!(result.timeline[1].reason, AllocationReason::SavingsExhausted);
        assert_eq!(result.timeline[1].funded_from, FundingSource::Savings);
        assert_eq!(result.timeline[1].member_shortfall, zar(dec!(3000)));
    }

    #[test]
    fn test_diabetes_year_on_saver_plan() {
        let result = run_simulation(&ScenarioFixtures::diabetes_year(), &saver()).unwrap();
        let timeline = &result.timeline;

        // Metformin for a listed condition is PMB and funded in full from risk
        assert_eq!(timeline[2].reason, AllocationReason::PrescribedMinimumBenefit);
        assert_eq!(timeline[2].funded_from, FundingSource::RiskPool);
        assert_eq!(timeline[2].amount_funded, zar(dec!(7200)));
        assert_eq!(timeline[2].pools_after.cumulative_claims, zar(dec!(2500)));

        // Dental crosses the threshold: R100 savings, R3 000 gap, R1 900 ATB less 10%
        let dental = &timeline[4];
        assert_eq!(dental.reason, AllocationReason::ThresholdCrossed);
        assert_eq!(dental.funded_from, FundingSource::SelfPaymentGap);
        assert_eq!(dental.amount_funded, zar(dec!(1810)));
        assert_eq!(dental.member_shortfall, zar(dec!(3190)));
        assert_eq!(dental.co_payment_applied, zar(dec!(190)));

        let financials = &result.financials;
        assert_eq!(financials.total_event_cost, zar(dec!(21100)));
        assert_eq!(financials.plan_pays, zar(dec!(17910)));
        assert_eq!(financials.shortfall, zar(dec!(3190)));
        assert_eq!(financials.co_payments, zar(dec!(190)));
    }

    #[test]
    fn test_timeline_preserves_input_order() {
        let scenario = ScenarioFixtures::diabetes_year();
        let result = run_simulation(&scenario, &saver()).unwrap();

        assert_eq!(result.timeline.len(), scenario.line_items.len());
        for (index, (record, item)) in result.timeline.iter().zip(&scenario.line_items).enumerate() {
            assert_eq!(record.index, index);
            assert_eq!(&record.line_item, item);
        }
    }

    #[test]
    fn test_zero_cost_item() {
        let scenario = TestScenarioBuilder::new("free-screening")
            .item("Screening", BillingCategory::Other, dec!(0))
            .build();
        let result = run_simulation(&scenario, &saver()).unwrap();
        let record = &result.timeline[0];

        assert_eq!(record.funded_from, FundingSource::Savings);
        assert_eq!(record.reason, AllocationReason::ZeroCost);
        assert_money_zero(&record.amount_funded);
        assert_money_zero(&record.member_shortfall);
        assert!(record.splits.is_empty());
    }

    #[test]
    fn test_empty_scenario_has_zero_totals() {
        let result = run_simulation(&ScenarioFixtures::empty(), &saver()).unwrap();

        assert!(result.timeline.is_empty());
        assert_money_zero(&result.financials.total_event_cost);
        assert_money_zero(&result.financials.plan_pays);
        assert_money_zero(&result.financials.shortfall);
    }

    #[test]
    fn test_order_changes_funding() {
        let plan = TestPlanProductBuilder::new("small-saver")
            .with_savings(dec!(1000))
            .with_atb(None, dec!(0))
            .resolve();
        let first = TestScenarioBuilder::new("dental-first")
            .item("Dental", BillingCategory::Dental, dec!(1000))
            .item("GP", BillingCategory::GP, dec!(1000))
            .build();
        let mut second = first.clone();
        second.line_items.reverse();

        let a = run_simulation(&first, &plan).unwrap();
        let b = run_simulation(&second, &plan).unwrap();

        // The GP visit takes savings only when it comes first
        assert_eq!(a.timeline[1].line_item.category, BillingCategory::GP);
        assert_eq!(a.timeline[1].funded_from, FundingSource::AboveThresholdBenefit);
        assert_eq!(b.timeline[0].line_item.category, BillingCategory::GP);
        assert_eq!(b.timeline[0].funded_from, FundingSource::Savings);
        assert_eq!(a.financials.plan_pays, b.financials.plan_pays);
    }
}

// ============================================================================
// Above-threshold benefit limits
// ============================================================================

mod above_threshold_tests {
    use super::*;

    #[test]
    fn test_category_limit_applies_before_co_payment() {
        let plan = TestPlanProductBuilder::new("dental-limited")
            .with_atb(None, dec!(20))
            .with_atb_category_limit(BillingCategory::Dental, dec!(3000))
            .resolve();
        let scenario = TestScenarioBuilder::new("crowns")
            .item("Crowns", BillingCategory::Dental, dec!(5000))
            .build();
        let record = &run_simulation(&scenario, &plan).unwrap().timeline[0];

        // Co-payment is 20% of the R3 000 the limit approved, not of R5 000
        assert_eq!(record.co_payment_applied, zar(dec!(600)));
        assert_eq!(record.amount_funded, zar(dec!(2400)));
        assert_eq!(record.member_shortfall, zar(dec!(2600)));
        assert_eq!(record.reason, AllocationReason::CategoryLimitReached);
    }

    #[test]
    fn test_exhausted_cap_falls_through_to_sublimit() {
        let plan = TestPlanProductBuilder::new("capped")
            .with_savings(dec!(1000))
            .with_atb(Some(dec!(2000)), dec!(0))
            .with_sublimit(BillingCategory::Specialist, Some(dec!(800)), SublimitStage::AfterAboveThreshold, false)
            .resolve();
        let scenario = TestScenarioBuilder::new("specialists")
            .item("Surgeon", BillingCategory::Specialist, dec!(4000))
            .item("Follow-up", BillingCategory::Specialist, dec!(500))
            .build();
        let result = run_simulation(&scenario, &plan).unwrap();

        let first = &result.timeline[0];
        let first_sources = first.by_source();
        assert_eq!(first_sources.get(&FundingSource::Savings), Some(&zar(dec!(1000))));
        assert_eq!(first_sources.get(&FundingSource::AboveThresholdBenefit), Some(&zar(dec!(2000))));
        assert_eq!(first_sources.get(&FundingSource::RiskPool), Some(&zar(dec!(800))));
        assert_eq!(first_sources.get(&FundingSource::Shortfall), Some(&zar(dec!(200))));
        assert_eq!(first.pools_after.atb_remaining, Some(zar(dec!(0))));

        let second = &result.timeline[1];
        assert_eq!(second.reason, AllocationReason::CapExhausted);
        assert_eq!(second.member_shortfall, zar(dec!(500)));
    }

    #[test]
    fn test_plan_without_benefits_reports_no_benefit() {
        let scenario = TestScenarioBuilder::new("consult")
            .item("Specialist", BillingCategory::Specialist, dec!(1800))
            .build();
        let record = &run_simulation(&scenario, &hospital()).unwrap().timeline[0];

        assert_eq!(record.funded_from, FundingSource::Shortfall);
        assert_eq!(record.reason, AllocationReason::NoBenefit);
        assert_eq!(record.member_shortfall, zar(dec!(1800)));
    }
}

// ============================================================================
// Network rules, PMB and day-one benefits
// ============================================================================

mod network_and_pmb_tests {
    use super::*;

    #[test]
    fn test_out_of_network_admission_carries_co_payment() {
        let scenario = TestScenarioBuilder::new("admission")
            .out_of_network_item("Admission", BillingCategory::Hospital, dec!(10000))
            .build();

        for plan in [saver(), hospital()] {
            let result = run_simulation(&scenario, &plan).unwrap();
            let record = &result.timeline[0];

            assert_eq!(record.co_payment_applied, zar(dec!(3000)));
            assert_eq!(record.reason, AllocationReason::NonNetworkCoPayment);
            assert!(result.financials.shortfall >= zar(dec!(3000)));
        }
    }

    #[test]
    fn test_hip_replacement_on_saver_plan() {
        let result = run_simulation(&ScenarioFixtures::hip_replacement_out_of_network(), &saver()).unwrap();

        // R10 000 admission against R9 000 headroom: the 30% co-payment is
        // shared 2 700 / 300 across the threshold
        let admission = &result.timeline[2];
        assert_eq!(admission.funded_from, FundingSource::Savings);
        assert_eq!(admission.co_payment_applied, zar(dec!(3000)));
        assert_eq!(admission.amount_funded, zar(dec!(6630)));
        assert_eq!(admission.member_shortfall, zar(dec!(3370)));
        assert_eq!(admission.pools_after.cumulative_claims, zar(dec!(13000)));

        let physio = &result.timeline[3];
        assert_eq!(physio.reason, AllocationReason::AboveThresholdBenefit);
        assert_eq!(physio.amount_funded, zar(dec!(2160)));

        assert_eq!(result.financials.total_event_cost, zar(dec!(15400)));
        assert_eq!(result.financials.plan_pays, zar(dec!(11790)));
        assert_eq!(result.financials.shortfall, zar(dec!(3610)));
    }

    #[test]
    fn test_co_payment_still_accrues_toward_threshold() {
        let plan = TestPlanProductBuilder::new("gap-only")
            .with_gap(dec!(10000))
            .with_atb(None, dec!(0))
            .with_hospital_network(dec!(30))
            .resolve();
        let scenario = TestScenarioBuilder::new("admission-then-specialist")
            .out_of_network_item("Admission", BillingCategory::Hospital, dec!(10000))
            .item("Specialist", BillingCategory::Specialist, dec!(3000))
            .build();
        let result = run_simulation(&scenario, &plan).unwrap();

        let admission = &result.timeline[0];
        assert_eq!(admission.co_payment_applied, zar(dec!(3000)));
        assert_eq!(admission.member_shortfall, zar(dec!(10000)));
        assert_eq!(admission.pools_after.cumulative_claims, zar(dec!(10000)));
        assert!(admission.pools_after.threshold_reached);

        let specialist = &result.timeline[1];
        assert_eq!(specialist.funded_from, FundingSource::AboveThresholdBenefit);
        assert_eq!(specialist.amount_funded, zar(dec!(3000)));
        assert_money_zero(&specialist.member_shortfall);

        assert_eq!(result.financials.plan_pays, zar(dec!(3000)));
        assert_eq!(result.financials.shortfall, zar(dec!(10000)));
    }

    #[test]
    fn test_non_formulary_chronic_medicine_co_payment() {
        let scenario = TestScenarioBuilder::new("chronic")
            .with_item(
                test_utils::line_item("Statins", BillingCategory::ChronicMedicine, dec!(2000))
                    .requiring_network()
                    .with_network_compliance(false),
            )
            .build();
        let record = &run_simulation(&scenario, &saver()).unwrap().timeline[0];

        assert_eq!(record.co_payment_applied, zar(dec!(400)));
        assert_eq!(record.amount_funded, zar(dec!(1600)));
        assert_eq!(record.funded_from, FundingSource::Savings);
        assert_eq!(record.reason, AllocationReason::NonNetworkCoPayment);
        assert_eq!(record.pools_after.savings_remaining, zar(dec!(7400)));
        assert_eq!(record.pools_after.cumulative_claims, zar(dec!(2000)));
    }

    #[test]
    fn test_network_compliance_avoids_co_payment() {
        let scenario = TestScenarioBuilder::new("admission")
            .with_item(test_utils::line_item("Admission", BillingCategory::Hospital, dec!(10000)).requiring_network())
            .assuming_network_compliance()
            .build();
        let record = &run_simulation(&scenario, &hospital()).unwrap().timeline[0];

        assert_money_zero(&record.co_payment_applied);
        assert_eq!(record.reason, AllocationReason::DayOneRiskBenefit);
        assert_eq!(record.amount_funded, zar(dec!(10000)));
    }

    #[test]
    fn test_day_one_limit_then_shortfall() {
        let scenario = TestScenarioBuilder::new("birth")
            .item("Caesarean delivery", BillingCategory::Maternity, dec!(50000))
            .build();
        let record = &run_simulation(&scenario, &hospital()).unwrap().timeline[0];

        assert_eq!(record.amount_funded, zar(dec!(40000)));
        assert_eq!(record.member_shortfall, zar(dec!(10000)));
        assert_eq!(record.reason, AllocationReason::DayOneRiskBenefit);
    }

    #[test]
    fn test_gp_family_cap() {
        let plan = TestPlanProductBuilder::new("gp-network")
            .with_savings(dec!(5000))
            .with_gp_network(dec!(1500))
            .resolve();
        let scenario = TestScenarioBuilder::new("gp-visits")
            .out_of_network_item("GP visit", BillingCategory::GP, dec!(1000))
            .out_of_network_item("GP visit", BillingCategory::GP, dec!(1000))
            .build();
        let result = run_simulation(&scenario, &plan).unwrap();

        assert_money_zero(&result.timeline[0].co_payment_applied);
        assert_eq!(result.timeline[1].co_payment_applied, zar(dec!(500)));
        assert_eq!(result.timeline[1].amount_funded, zar(dec!(500)));
        assert_eq!(result.timeline[1].reason, AllocationReason::NonNetworkCoPayment);
    }

    #[test]
    fn test_pmb_exceeding_chronic_sublimit_is_fully_funded() {
        let scenario = TestScenarioBuilder::new("chronic")
            .with_item(
                test_utils::line_item("Insulin", BillingCategory::ChronicMedicine, dec!(9000))
                    .pmb()
                    .requiring_network()
                    .with_network_compliance(false),
            )
            .build();
        let record = &run_simulation(&scenario, &saver()).unwrap().timeline[0];

        // Only the 20% non-DSP co-payment is left to the member
        assert_eq!(record.co_payment_applied, zar(dec!(1800)));
        assert_eq!(record.amount_funded, zar(dec!(7200)));
        assert_eq!(record.member_shortfall, zar(dec!(1800)));
        assert_eq!(record.reason, AllocationReason::PrescribedMinimumBenefit);
        assert_eq!(record.pools_after.savings_remaining, zar(dec!(9000)));
    }

    #[test]
    fn test_pmb_through_waterfall_when_plan_says_so() {
        let plan = TestPlanProductBuilder::new("no-pmb-risk")
            .with_savings(dec!(5000))
            .without_pmb_risk_funding()
            .resolve();
        let scenario = TestScenarioBuilder::new("pmb")
            .pmb_item("Appendectomy", BillingCategory::Hospital, dec!(8000))
            .build();
        let record = &run_simulation(&scenario, &plan).unwrap().timeline[0];

        assert_eq!(record.amount_funded, zar(dec!(5000)));
        assert_eq!(record.member_shortfall, zar(dec!(3000)));
        assert_ne!(record.reason, AllocationReason::PrescribedMinimumBenefit);
    }
}

// ============================================================================
// Failure semantics
// ============================================================================

mod failure_tests {
    use super::*;

    #[test]
    fn test_negative_cost_fails_whole_simulation() {
        let scenario = TestScenarioBuilder::new("refund")
            .item("Consult", BillingCategory::GP, dec!(500))
            .item("Refund", BillingCategory::Other, dec!(-100))
            .build();

        assert!(matches!(run_simulation(&scenario, &saver()), Err(SimulationError::Validation(_))));
    }

    #[test]
    fn test_currency_mismatch_rejected() {
        let mut scenario = ScenarioFixtures::empty();
        scenario.currency = Currency::USD;

        assert!(matches!(run_simulation(&scenario, &saver()), Err(SimulationError::Validation(_))));
    }

    #[test]
    fn test_malformed_plan_fails_fast() {
        let mut plan = saver();
        plan.self_payment_gap = zar(dec!(500));

        let result = run_simulation(&ScenarioFixtures::routine_care(), &plan);
        assert!(matches!(result, Err(SimulationError::Configuration(_))));
    }
}

// ============================================================================
// Premiums and comparison
// ============================================================================

mod premium_tests {
    use super::*;

    #[test]
    fn test_cliff_example() {
        let plan = PlanFixtures::model(PlanFixtures::cliff_plan());
        let income = zar(dec!(11929));

        let resolution = resolve_premium(&plan, income, &Household::single()).unwrap();
        assert_eq!(resolution.premium, zar(dec!(1730)));

        let warning = check_income_volatility(&plan, income, &Household::single())
            .unwrap()
            .unwrap();
        assert!(warning.has_cliff);
        assert_eq!(warning.premium_jump, zar(dec!(381)));
        assert_eq!(warning.cliff_amount, zar(dec!(1)));
    }

    #[test]
    fn test_compare_ranks_by_shortfall() {
        let plans: Vec<Arc<PlanBenefitModel>> = FIXTURE_CATALOG.plans().cloned().collect();
        let comparison = compare_plans(
            &ScenarioFixtures::diabetes_year(),
            &plans,
            None,
            &SimulationConfig::default(),
        );

        let codes: Vec<&str> = comparison.entries.iter().map(|e| e.plan_code.as_str()).collect();
        assert_eq!(codes, vec!["meridian-comprehensive", "classic-saver", "cliff-plan", "hospital-core"]);
        assert_eq!(comparison.entries[0].financials.shortfall, zar(dec!(2000)));
        assert!(comparison.omitted.is_empty());
    }

    #[test]
    fn test_compare_omits_failing_plans() {
        let mut broken = saver();
        broken.savings_annual_allocation = zar(dec!(-1));
        let plans = vec![Arc::new(broken), Arc::new(hospital())];

        let comparison = compare_plans(
            &ScenarioFixtures::routine_care(),
            &plans,
            None,
            &SimulationConfig::default(),
        );

        assert_eq!(comparison.entries.len(), 1);
        assert_eq!(comparison.omitted.len(), 1);
        assert_eq!(comparison.omitted[0].plan_code.as_str(), "classic-saver");
    }

    #[test]
    fn test_compare_with_pricing() {
        let plans = vec![Arc::new(PlanFixtures::model(PlanFixtures::cliff_plan()))];
        let pricing = HouseholdIncome {
            income: zar(dec!(11929)),
            household: Household::single(),
        };

        let comparison = compare_plans(
            &ScenarioFixtures::routine_care(),
            &plans,
            Some(&pricing),
            &SimulationConfig::default(),
        );
        let entry = &comparison.entries[0];

        assert_eq!(entry.monthly_premium, Some(zar(dec!(1730))));
        assert_eq!(entry.annual_cost, Some(zar(dec!(24760))));
        assert!(entry.cliff_warning.is_some_and(|warning| warning.has_cliff));
    }
}

// ============================================================================
// Properties
// ============================================================================

mod property_tests {
    use super::*;

    fn plans() -> Vec<PlanBenefitModel> {
        PlanFixtures::all().into_iter().map(PlanFixtures::model).collect()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn plan_pays_plus_shortfall_equals_total(scenario in flagged_scenario_strategy(12)) {
            for plan in plans() {
                let result = run_simulation(&scenario, &plan).unwrap();
                let f = &result.financials;
                assert_reconciles(&f.plan_pays, &f.shortfall, &f.total_event_cost);
                prop_assert_eq!(f.total_event_cost, scenario.total_cost().round_half_up());

                for record in &result.timeline {
                    prop_assert_eq!(record.amount_funded + record.member_shortfall, record.line_item.cost);
                    prop_assert!(!record.member_shortfall.is_negative());
                }
            }
        }

        #[test]
        fn raising_a_cost_never_lowers_shortfall(
            scenario in flagged_scenario_strategy(10),
            pick in any::<prop::sample::Index>(),
            bump in 1i64..10_000i64,
        ) {
            prop_assume!(!scenario.line_items.is_empty());
            let index = pick.index(scenario.line_items.len());

            let mut raised = scenario.clone();
            let item = &mut raised.line_items[index];
            item.cost = item.cost + zar(Decimal::from(bump));

            for plan in plans() {
                let before = run_simulation(&scenario, &plan).unwrap().financials;
                let after = run_simulation(&raised, &plan).unwrap().financials;
                prop_assert!(after.shortfall >= before.shortfall);
                prop_assert!(after.total_event_cost > before.total_event_cost);
            }
        }

        #[test]
        fn costs_below_savings_come_from_savings(costs in prop::collection::vec(0i64..1_000i64, 0..9)) {
            let items: Vec<LineItem> = costs
                .iter()
                .map(|cost| test_utils::line_item("Item", BillingCategory::Specialist, Decimal::from(*cost)))
                .collect();
            let result = run_simulation(&scenario_from(items), &saver()).unwrap();

            for record in &result.timeline {
                prop_assert_eq!(record.funded_from, FundingSource::Savings);
            }
        }

        #[test]
        fn well_formed_bands_cover_every_income(
            bands in band_table_strategy(),
            income in income_strategy(),
            household in household_strategy(),
        ) {
            let mut product = TestPlanProductBuilder::new("generated-bands").build();
            product.modules = vec![domain_plan::PlanModule::IncomeBandedContributions { bands }];
            let plan = PlanBenefitModel::resolve(&product).unwrap();

            let resolution = resolve_premium(&plan, income, &household);
            prop_assert!(resolution.is_ok());
            let volatility = check_income_volatility(&plan, income, &household).unwrap();
            if let Some(warning) = volatility {
                prop_assert!(warning.cliff_amount.is_positive());
            }
        }
    }
}
