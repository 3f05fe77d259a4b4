//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for domain types that give
//! more meaningful error messages than standard assertions.

use rust_decimal::Decimal;

use core_kernel::Money;
use domain_plan::{PlanBenefitModel, PlanProduct};

/// Asserts that two Money values are approximately equal within a tolerance
///
/// # Panics
///
/// Panics if the currencies don't match or the amounts differ by more than tolerance
pub fn assert_money_approx_eq(actual: &Money, expected: &Money, tolerance: Decimal) {
    assert_eq!(
        actual.currency(),
        expected.currency(),
        "Currency mismatch: actual={}, expected={}",
        actual.currency(),
        expected.currency()
    );

    let diff = (actual.amount() - expected.amount()).abs();
    assert!(
        diff <= tolerance,
        "Money amounts differ by more than tolerance: actual={}, expected={}, diff={}, tolerance={}",
        actual.amount(),
        expected.amount(),
        diff,
        tolerance
    );
}

/// Asserts that a Money value is zero
pub fn assert_money_zero(money: &Money) {
    assert!(money.is_zero(), "Expected zero money, got {}", money);
}

/// Asserts that a Money value is positive
pub fn assert_money_positive(money: &Money) {
    assert!(money.is_positive(), "Expected positive money, got {}", money);
}

/// Asserts that money values sum to a total
///
/// # Panics
///
/// Panics if the sum doesn't equal the total
pub fn assert_money_sum_equals(parts: &[Money], total: &Money) {
    let sum = Money::sum(parts, total.currency()).expect("parts share the total's currency");
    assert_eq!(sum, *total, "Parts sum to {}, expected {}", sum, total);
}

/// Asserts the conservation identity `plan_pays + shortfall == total`
pub fn assert_reconciles(plan_pays: &Money, shortfall: &Money, total: &Money) {
    let sum = plan_pays
        .checked_add(shortfall)
        .expect("plan pays and shortfall share a currency");
    assert_eq!(
        sum, *total,
        "plan pays {} + shortfall {} = {}, expected total {}",
        plan_pays, shortfall, sum, total
    );
}

/// Asserts that a product fails to resolve with a configuration error
/// mentioning `needle`
pub fn assert_configuration_error(product: &PlanProduct, needle: &str) {
    match PlanBenefitModel::resolve(product) {
        Err(domain_plan::PlanError::Configuration { message, .. }) => assert!(
            message.contains(needle),
            "Configuration error {:?} does not mention {:?}",
            message,
            needle
        ),
        other => panic!("Expected configuration error mentioning {:?}, got {:?}", needle, other),
    }
}

/// Asserts that a resolved plan's band table has no defects
pub fn assert_bands_well_formed(plan: &PlanBenefitModel) {
    let defects = plan.income_bands.defects(plan.currency);
    assert!(defects.is_empty(), "Band table defects on {}: {:?}", plan.identity.code, defects);
}
