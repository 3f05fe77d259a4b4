//! Comprehensive unit tests for the Money module
//!
//! Tests cover money creation, arithmetic operations, half-up rounding,
//! rates, currency handling, and edge cases.

use core_kernel::{Money, Currency, MoneyError, Rate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

mod creation {
    use super::*;

    #[test]
    fn test_new_creates_money_with_correct_amount() {
        let m = Money::new(dec!(100.50), Currency::ZAR);
        assert_eq!(m.amount(), dec!(100.50));
        assert_eq!(m.currency(), Currency::ZAR);
    }

    #[test]
    fn test_new_rounds_to_four_decimal_places() {
        let m = Money::new(dec!(100.123456789), Currency::ZAR);
        assert_eq!(m.amount(), dec!(100.1235));
    }

    #[test]
    fn test_from_minor_converts_cents_correctly() {
        let m = Money::from_minor(10050, Currency::ZAR);
        assert_eq!(m.amount(), dec!(100.50));
    }

    #[test]
    fn test_zero_creates_zero_amount() {
        let m = Money::zero(Currency::EUR);
        assert!(m.is_zero());
        assert!(!m.is_negative());
        assert_eq!(m.currency(), Currency::EUR);
    }

    #[test]
    fn test_negative_amount_creation() {
        let m = Money::new(dec!(-100.00), Currency::ZAR);
        assert!(m.is_negative());
        assert!(!m.is_positive());
    }
}

mod arithmetic {
    use super::*;

    #[test]
    fn test_checked_add_same_currency() {
        let a = Money::new(dec!(100.00), Currency::ZAR);
        let b = Money::new(dec!(50.00), Currency::ZAR);
        assert_eq!(a.checked_add(&b).unwrap().amount(), dec!(150.00));
    }

    #[test]
    fn test_checked_sub_currency_mismatch() {
        let a = Money::new(dec!(100.00), Currency::ZAR);
        let b = Money::new(dec!(50.00), Currency::USD);
        assert!(matches!(a.checked_sub(&b), Err(MoneyError::CurrencyMismatch(_, _))));
    }

    #[test]
    fn test_checked_min_picks_smaller() {
        let a = Money::new(dec!(100.00), Currency::ZAR);
        let b = Money::new(dec!(30.00), Currency::ZAR);
        assert_eq!(a.checked_min(&b).unwrap(), b);
        assert_eq!(b.checked_min(&a).unwrap(), b);
    }

    #[test]
    fn test_saturating_sub_never_negative() {
        let a = Money::new(dec!(30.00), Currency::ZAR);
        let b = Money::new(dec!(100.00), Currency::ZAR);
        assert!(a.saturating_sub(&b).unwrap().is_zero());
    }

    #[test]
    fn test_operators() {
        let a = Money::new(dec!(100.00), Currency::ZAR);
        let b = Money::new(dec!(30.00), Currency::ZAR);
        assert_eq!((a + b).amount(), dec!(130.00));
        assert_eq!((a - b).amount(), dec!(70.00));
        assert_eq!((-a).amount(), dec!(-100.00));
        assert_eq!((a * dec!(2)).amount(), dec!(200.00));
    }

    #[test]
    fn test_divide_by_zero_error() {
        let m = Money::new(dec!(100.00), Currency::ZAR);
        assert!(matches!(m.divide(dec!(0)), Err(MoneyError::DivisionByZero)));
        assert_eq!(m.divide(dec!(4)).unwrap().amount(), dec!(25.00));
    }

    #[test]
    fn test_sum_of_amounts() {
        let items = vec![
            Money::new(dec!(10.25), Currency::ZAR),
            Money::new(dec!(4.75), Currency::ZAR),
        ];
        assert_eq!(Money::sum(&items, Currency::ZAR).unwrap().amount(), dec!(15.00));
        assert!(Money::sum(&items, Currency::USD).is_err());
    }

    #[test]
    fn test_sum_of_empty_is_zero() {
        let items: Vec<Money> = Vec::new();
        assert!(Money::sum(&items, Currency::ZAR).unwrap().is_zero());
    }
}

mod ordering {
    use super::*;

    #[test]
    fn test_same_currency_ordering() {
        let a = Money::new(dec!(1), Currency::ZAR);
        let b = Money::new(dec!(2), Currency::ZAR);
        assert!(a < b);
        assert!(b >= a);
    }

    #[test]
    fn test_cross_currency_unordered() {
        let a = Money::new(dec!(1), Currency::ZAR);
        let b = Money::new(dec!(2), Currency::USD);
        assert!(!(a < b));
        assert!(!(a > b));
    }
}

mod rounding {
    use super::*;

    #[test]
    fn test_round_half_up_rounds_midpoint_up() {
        let m = Money::new(dec!(0.125), Currency::ZAR);
        assert_eq!(m.round_half_up().amount(), dec!(0.13));
    }

    #[test]
    fn test_round_half_up_differs_from_bankers() {
        // Banker's rounding would give 0.12
        let m = Money::new(dec!(0.125), Currency::ZAR);
        assert_ne!(m.round_half_up().amount(), dec!(0.12));
    }

    #[test]
    fn test_round_half_up_below_midpoint() {
        let m = Money::new(dec!(99.9949), Currency::ZAR);
        assert_eq!(m.round_half_up().amount(), dec!(99.99));
    }
}

mod currency {
    use super::*;

    #[test]
    fn test_currency_codes_and_symbols() {
        assert_eq!(Currency::ZAR.code(), "ZAR");
        assert_eq!(Currency::ZAR.symbol(), "R");
        assert_eq!(Currency::NAD.symbol(), "N$");
        assert_eq!(Currency::default(), Currency::ZAR);
    }

    #[test]
    fn test_money_display() {
        let m = Money::new(dec!(1730), Currency::ZAR);
        assert_eq!(m.to_string(), "R 1730.00");
    }
}

mod rate {
    use super::*;

    #[test]
    fn test_rate_from_percentage() {
        let rate = Rate::from_percentage(dec!(25));
        assert_eq!(rate.as_decimal(), dec!(0.25));
        assert_eq!(rate.as_percentage(), dec!(25));
        assert!(rate.is_fraction());
    }

    #[test]
    fn test_rate_out_of_range() {
        assert!(!Rate::from_percentage(dec!(120)).is_fraction());
        assert!(!Rate::new(dec!(-0.1)).is_fraction());
    }

    #[test]
    fn test_zero_rate_applies_nothing() {
        let m = Money::new(dec!(500), Currency::ZAR);
        assert!(Rate::ZERO.apply(&m).is_zero());
        assert!(Rate::default().is_zero());
    }

    #[test]
    fn test_rate_keeps_fractional_cents() {
        let m = Money::new(dec!(333.33), Currency::ZAR);
        let applied = Rate::from_percentage(dec!(15)).apply(&m);
        assert_eq!(applied.amount(), dec!(49.9995));
    }
}

mod serialization {
    use super::*;

    #[test]
    fn test_money_json_roundtrip() {
        let m = Money::new(dec!(1234.56), Currency::ZAR);
        let json = serde_json::to_string(&m).unwrap();
        let back: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(m, back);
    }

    #[test]
    fn test_rate_serializes_as_bare_decimal() {
        let rate = Rate::new(Decimal::new(3, 1));
        let json = serde_json::to_string(&rate).unwrap();
        assert_eq!(json, "\"0.3\"");
    }
}
