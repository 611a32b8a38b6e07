//! Purchase breakdown tests
//!
//! Tests for breakdown processing including:
//! - Wastage snapshot ordering (spoilage is recorded against post-usable stock)
//! - Purchase status derivation and no-regression
//! - Input validation boundaries

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::models::{derive_purchase_status, reconcile_stock, LineItemStatus, PurchaseStatus};
use shared::validation::{
    validate_non_negative_quantity, validate_positive_price, validate_positive_quantity,
};

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

    /// Breakdown with usable=100, wastage=10 on stock=0: the spoilage
    /// adjustment must snapshot the stock after the usable addition
    #[test]
    fn test_wastage_snapshot_after_usable_addition() {
        let starting_stock = dec("0");
        let usable = dec("100");
        let wastage = dec("10");

        let stock_after_usable = starting_stock + usable;
        let reconciliation = reconcile_stock(stock_after_usable, stock_after_usable - wastage);

        assert_eq!(reconciliation.system_stock, dec("100"));
        assert_eq!(reconciliation.actual_stock, dec("90"));
        assert_eq!(reconciliation.difference, dec("-10"));
    }

    /// Wastage applied on top of existing stock
    #[test]
    fn test_wastage_with_existing_stock() {
        let stock_after_usable = dec("25") + dec("40");
        let reconciliation = reconcile_stock(stock_after_usable, stock_after_usable - dec("5"));

        assert_eq!(reconciliation.system_stock, dec("65"));
        assert_eq!(reconciliation.actual_stock, dec("60"));
        assert_eq!(reconciliation.difference, dec("-5"));
    }

    /// Wastage larger than post-usable stock floors at zero, and the
    /// recorded difference reflects the clamped value
    #[test]
    fn test_wastage_exceeding_stock_clamps_at_zero() {
        // Stock was driven negative before the breakdown
        let stock_after_usable = dec("-50") + dec("100");
        let reconciliation = reconcile_stock(stock_after_usable, stock_after_usable - dec("60"));

        assert_eq!(reconciliation.system_stock, dec("50"));
        assert_eq!(reconciliation.actual_stock, dec("0"));
        assert_eq!(reconciliation.difference, dec("-50"));
    }

    /// A purchase completes only when no pending lines remain
    #[test]
    fn test_purchase_completes_when_all_lines_broken_down() {
        assert_eq!(
            derive_purchase_status(0, PurchaseStatus::Partial),
            PurchaseStatus::Complete
        );
    }

    /// The first of several breakdowns moves the purchase to partial
    #[test]
    fn test_first_breakdown_moves_to_partial() {
        assert_eq!(
            derive_purchase_status(2, PurchaseStatus::Pending),
            PurchaseStatus::Partial
        );
    }

    /// A purchase never regresses from complete
    #[test]
    fn test_purchase_never_regresses() {
        assert_eq!(
            derive_purchase_status(1, PurchaseStatus::Complete),
            PurchaseStatus::Complete
        );
    }

    /// The processor only accepts pending lines; a confirmed breakdown
    /// flips the status so a second attempt is rejected
    #[test]
    fn test_second_breakdown_rejected_by_status_guard() {
        let before = LineItemStatus::Pending;
        let after = LineItemStatus::BrokenDown;

        assert_ne!(before, after);
        assert_eq!(after.as_str(), "broken_down");
        // Round-trip through the wire string the guard compares against
        assert_eq!(
            LineItemStatus::from_str(after.as_str()),
            Some(LineItemStatus::BrokenDown)
        );
    }

    /// Breakdown input boundaries
    #[test]
    fn test_breakdown_input_validation() {
        // Usable quantity must be strictly positive
        assert!(validate_positive_quantity(dec("0.001")).is_ok());
        assert!(validate_positive_quantity(Decimal::ZERO).is_err());

        // Wastage may be zero but not negative
        assert!(validate_non_negative_quantity(Decimal::ZERO).is_ok());
        assert!(validate_non_negative_quantity(dec("-0.5")).is_err());

        // Buy price must be strictly positive
        assert!(validate_positive_price(dec("12.50")).is_ok());
        assert!(validate_positive_price(Decimal::ZERO).is_err());
    }

    /// A batch starts with remaining equal to the usable quantity
    #[test]
    fn test_batch_seeded_from_usable_quantity() {
        let usable = dec("42.5");
        let initial_quantity = usable;
        let quantity_remaining = usable;

        assert_eq!(initial_quantity, quantity_remaining);
        assert!(quantity_remaining <= initial_quantity);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for generating valid quantities (positive decimals)
    fn quantity_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=10000i64).prop_map(|n| Decimal::new(n, 1)) // 0.1 to 1000.0
    }

    /// Strategy for generating wastage (non-negative decimals)
    fn wastage_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..=5000i64).prop_map(|n| Decimal::new(n, 1)) // 0.0 to 500.0
    }

    /// Strategy for generating signed starting stock
    fn stock_strategy() -> impl Strategy<Value = Decimal> {
        (-5000i64..=10000i64).prop_map(|n| Decimal::new(n, 1))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Final stock is post-usable stock minus wastage, floored at zero
        #[test]
        fn prop_final_stock_after_breakdown(
            starting in stock_strategy(),
            usable in quantity_strategy(),
            wastage in wastage_strategy()
        ) {
            let after_usable = starting + usable;
            let r = reconcile_stock(after_usable, after_usable - wastage);

            prop_assert_eq!(r.system_stock, after_usable);
            prop_assert_eq!(r.actual_stock, (after_usable - wastage).max(Decimal::ZERO));
            prop_assert!(r.actual_stock >= Decimal::ZERO);
        }

        /// Unclamped spoilage removes exactly the wastage; a clamped one
        /// floors the stock at zero
        #[test]
        fn prop_spoilage_difference_exact_or_clamped(
            starting in stock_strategy(),
            usable in quantity_strategy(),
            wastage in wastage_strategy()
        ) {
            let after_usable = starting + usable;
            let r = reconcile_stock(after_usable, after_usable - wastage);

            if after_usable - wastage >= Decimal::ZERO {
                prop_assert_eq!(r.difference, -wastage);
            } else {
                prop_assert_eq!(r.actual_stock, Decimal::ZERO);
                prop_assert_eq!(r.difference, -after_usable);
            }
        }

        /// Status derivation is monotone: fewer pending lines never weakens it
        #[test]
        fn prop_status_monotone(pending in 0i64..20) {
            let from_pending = derive_purchase_status(pending, PurchaseStatus::Pending);
            let from_partial = derive_purchase_status(pending, PurchaseStatus::Partial);

            if pending == 0 {
                prop_assert_eq!(from_pending, PurchaseStatus::Complete);
                prop_assert_eq!(from_partial, PurchaseStatus::Complete);
            } else {
                prop_assert_eq!(from_pending, PurchaseStatus::Partial);
                prop_assert_eq!(from_partial, PurchaseStatus::Partial);
            }

            // Complete never regresses regardless of the pending count
            prop_assert_eq!(
                derive_purchase_status(pending, PurchaseStatus::Complete),
                PurchaseStatus::Complete
            );
        }
    }
}
