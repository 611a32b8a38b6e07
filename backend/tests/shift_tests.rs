//! Shift cash reconciliation tests
//!
//! Tests for drawer accountability including:
//! - Expected closing cash as opening cash plus all cash inflows
//! - Signed cash difference at close
//! - Commutativity of concurrent inflows

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::models::{cash_difference, expected_after_inflow, ShiftStatus};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Opening 1000, one cash sale of 200, one cash credit payment of 50:
    /// expected closing cash is 1250; counting 1245 leaves a -5 difference
    #[test]
    fn test_shift_reconciliation_scenario() {
        let mut expected = dec("1000");

        // Cash sale recorded during the shift
        expected = expected_after_inflow(expected, dec("200"));
        // Cash credit-account payment collected during the shift
        expected = expected_after_inflow(expected, dec("50"));

        assert_eq!(expected, dec("1250"));
        assert_eq!(cash_difference(dec("1245"), expected), dec("-5"));
    }

    /// A drawer with more cash than expected reports a positive difference
    #[test]
    fn test_over_drawer() {
        assert_eq!(cash_difference(dec("1010"), dec("1000")), dec("10"));
    }

    /// An untouched shift expects exactly its opening cash
    #[test]
    fn test_no_inflows() {
        let expected = dec("500");
        assert_eq!(cash_difference(dec("500"), expected), Decimal::ZERO);
    }

    /// Non-cash sales never move the expectation
    #[test]
    fn test_only_cash_counts() {
        let mut expected = dec("1000");
        // A transfer sale is handled outside the drawer; nothing to add
        expected = expected_after_inflow(expected, dec("0"));
        assert_eq!(expected, dec("1000"));
    }

    /// Shift status round-trips through wire strings
    #[test]
    fn test_shift_status_round_trip() {
        for s in ["open", "closed"] {
            assert_eq!(ShiftStatus::from_str(s).unwrap().as_str(), s);
        }
        assert!(ShiftStatus::from_str("suspended").is_none());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for money amounts
    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..=1000000i64).prop_map(|n| Decimal::new(n, 2))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Expected closing cash equals opening cash plus all inflows
        #[test]
        fn prop_expectation_accumulates(
            opening in amount_strategy(),
            inflows in prop::collection::vec(amount_strategy(), 0..20)
        ) {
            let mut expected = opening;
            for inflow in &inflows {
                expected = expected_after_inflow(expected, *inflow);
            }
            let total: Decimal = inflows.iter().sum();
            prop_assert_eq!(expected, opening + total);
        }

        /// Inflow order never changes the expectation (updates commute)
        #[test]
        fn prop_inflows_commute(
            opening in amount_strategy(),
            mut inflows in prop::collection::vec(amount_strategy(), 0..10)
        ) {
            let forward = inflows
                .iter()
                .fold(opening, |acc, x| expected_after_inflow(acc, *x));
            inflows.reverse();
            let backward = inflows
                .iter()
                .fold(opening, |acc, x| expected_after_inflow(acc, *x));
            prop_assert_eq!(forward, backward);
        }

        /// The difference is zero exactly when the drawer matches
        #[test]
        fn prop_difference_sign(
            actual in amount_strategy(),
            expected in amount_strategy()
        ) {
            let diff = cash_difference(actual, expected);
            prop_assert_eq!(diff.is_zero(), actual == expected);
            prop_assert_eq!(diff > Decimal::ZERO, actual > expected);
            prop_assert_eq!(actual, expected + diff);
        }
    }
}
