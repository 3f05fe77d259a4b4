//! Tests for core_kernel error types

use core_kernel::error::CoreError;
use core_kernel::money::MoneyError;
use core_kernel::{ConditionCode, PlanCode};

#[test]
fn test_empty_code_is_validation_error() {
    match PlanCode::new("   ") {
        Err(CoreError::Validation(msg)) => assert!(msg.contains("plan code must not be empty")),
        other => panic!("Expected Validation error, got {:?}", other),
    }
}

#[test]
fn test_code_with_whitespace_names_the_kind() {
    let error = ConditionCode::new("type 2 diabetes").unwrap_err();

    assert!(error.to_string().contains("condition code must not contain whitespace"));
}

#[test]
fn test_core_error_from_money_error() {
    let money_error = MoneyError::CurrencyMismatch("ZAR".to_string(), "USD".to_string());
    let core_error: CoreError = money_error.into();

    assert!(matches!(core_error, CoreError::Money(_)));
    assert!(core_error.to_string().starts_with("Money error"));
}
