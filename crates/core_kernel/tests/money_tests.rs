//! Money and Rate tests
//!
//! Covers the rounding rule and arithmetic invariants the billing and
//! reimbursement domains rely on:
//! - round-half-up on whole pesos
//! - deterministic rate application
//! - checked arithmetic across currencies

use core_kernel::{Currency, Money, MoneyError, Rate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

mod rounding_tests {
    use super::*;

    /// The documented rounding rule: half a peso rounds up
    #[test]
    fn test_half_peso_rounds_up() {
        let cases = [
            (dec!(100.5), dec!(101)),
            (dec!(100.4999), dec!(100)),
            (dec!(0.5), dec!(1)),
            (dec!(6862.5), dec!(6863)),
        ];

        for (input, expected) in cases {
            let m = Money::new(input, Currency::Clp).round_half_up();
            assert_eq!(m.amount(), expected, "rounding {input}");
        }
    }

    /// USD keeps two decimal places when rounding
    #[test]
    fn test_usd_rounds_to_cents() {
        let m = Money::new(dec!(10.005), Currency::Usd).round_half_up();
        assert_eq!(m.amount(), dec!(10.01));
    }

    /// Rounding an already-whole amount is a no-op
    #[test]
    fn test_rounding_idempotent() {
        let m = Money::pesos(45000);
        assert_eq!(m.round_half_up(), m);
        assert_eq!(m.round_half_up().round_half_up(), m);
    }
}

mod rate_tests {
    use super::*;

    /// The SII retention rate worked example from the platform docs
    #[test]
    fn test_sii_retention_example() {
        let retention = Rate::from_percentage(dec!(15.25));
        let gross = Money::pesos(45000);

        // 45000 * 0.1525 = 6862.5 -> 6863
        assert_eq!(retention.apply(&gross), Money::pesos(6863));
    }

    /// Commission tiers applied to a typical session price
    #[test]
    fn test_commission_tier_rates() {
        let gross = Money::pesos(45000);

        assert_eq!(Rate::new(dec!(0.12)).apply(&gross), Money::pesos(5400));
        assert_eq!(Rate::new(dec!(0.08)).apply(&gross), Money::pesos(3600));
        assert_eq!(Rate::new(dec!(0.05)).apply(&gross), Money::pesos(2250));
    }

    #[test]
    fn test_percentage_round_trip() {
        let rate = Rate::from_percentage(dec!(11.4));
        assert_eq!(rate.as_decimal(), dec!(0.114));
        assert_eq!(rate.as_percentage(), dec!(11.4));
    }
}

mod arithmetic_tests {
    use super::*;

    #[test]
    fn test_subtraction_conserves_total() {
        let gross = Money::pesos(45000);
        let commission = Money::pesos(2250);
        let net = gross - commission;

        assert_eq!(net + commission, gross);
    }

    #[test]
    fn test_checked_ops_reject_currency_mix() {
        let clp = Money::pesos(1000);
        let uf = Money::new(dec!(1.5), Currency::Uf);

        assert!(matches!(
            clp.checked_add(&uf),
            Err(MoneyError::CurrencyMismatch(_, _))
        ));
        assert!(matches!(
            clp.checked_sub(&uf),
            Err(MoneyError::CurrencyMismatch(_, _))
        ));
    }

    #[test]
    fn test_divide_by_zero_rejected() {
        let m = Money::pesos(1000);
        assert_eq!(m.divide(Decimal::ZERO), Err(MoneyError::DivisionByZero));
    }

    #[test]
    fn test_sign_predicates() {
        assert!(Money::pesos(1).is_positive());
        assert!(Money::pesos(0).is_zero());
        assert!((-Money::pesos(1)).is_negative());
        assert!(!Money::pesos(0).is_negative());
    }
}
