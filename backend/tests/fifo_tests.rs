//! FIFO consumption selector tests
//!
//! Tests for batch selection including:
//! - Oldest-first consumption order
//! - Exact quantity accounting across batches
//! - Shortfall as a signaled outcome, never an error

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

use shared::models::{plan_fifo_consumption, InventoryBatch};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// Helper to create a batch received `seq` hours after a fixed epoch
fn batch(seq: i64, remaining: &str, price: &str) -> InventoryBatch {
    InventoryBatch {
        id: Uuid::from_u128(seq as u128),
        business_id: Uuid::from_u128(900),
        item_id: Uuid::from_u128(901),
        breakdown_id: None,
        initial_quantity: dec(remaining),
        quantity_remaining: dec(remaining),
        buy_price_per_unit: dec(price),
        received_at: Utc.timestamp_opt(1_700_000_000 + seq * 3600, 0).unwrap(),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// A sale spanning two batches must drain the earliest batch first
    #[test]
    fn test_earliest_batch_fully_consumed_before_next() {
        let batches = vec![
            batch(1, "10.0", "40.0"),
            batch(2, "10.0", "45.0"),
            batch(3, "10.0", "50.0"),
        ];

        let plan = plan_fifo_consumption(&batches, dec("15.0"));

        assert_eq!(plan.entries.len(), 2);
        // First entry takes everything the oldest batch holds
        assert_eq!(plan.entries[0].batch_id, Uuid::from_u128(1));
        assert_eq!(plan.entries[0].quantity, dec("10.0"));
        assert_eq!(plan.entries[0].buy_price_per_unit, dec("40.0"));
        // Second entry takes only the remainder
        assert_eq!(plan.entries[1].batch_id, Uuid::from_u128(2));
        assert_eq!(plan.entries[1].quantity, dec("5.0"));
        // The newest batch is untouched
        assert!(plan.entries.iter().all(|e| e.batch_id != Uuid::from_u128(3)));
    }

    /// Consumption quantities must sum exactly to the requested quantity
    #[test]
    fn test_consumption_sums_to_request_when_stock_suffices() {
        let batches = vec![batch(1, "3.5", "40.0"), batch(2, "8.0", "45.0")];

        let plan = plan_fifo_consumption(&batches, dec("7.25"));

        assert_eq!(plan.consumed_quantity(), dec("7.25"));
        assert!(plan.is_fully_satisfied());
    }

    /// Requesting more than total stock returns the total, not the request
    #[test]
    fn test_shortfall_returns_partial_consumption() {
        let batches = vec![batch(1, "4.0", "40.0"), batch(2, "2.0", "45.0")];

        let plan = plan_fifo_consumption(&batches, dec("10.0"));

        assert_eq!(plan.consumed_quantity(), dec("6.0"));
        assert_eq!(plan.shortfall, dec("4.0"));
        assert!(!plan.is_fully_satisfied());
    }

    /// Exhausted batches are excluded from selection
    #[test]
    fn test_exhausted_batches_excluded() {
        let mut empty = batch(1, "5.0", "40.0");
        empty.quantity_remaining = Decimal::ZERO;
        let batches = vec![empty, batch(2, "5.0", "45.0")];

        let plan = plan_fifo_consumption(&batches, dec("5.0"));

        assert_eq!(plan.entries.len(), 1);
        assert_eq!(plan.entries[0].batch_id, Uuid::from_u128(2));
    }

    /// No batches at all means the full request is shortfall
    #[test]
    fn test_no_batches_is_full_shortfall() {
        let plan = plan_fifo_consumption(&[], dec("5.0"));
        assert!(plan.entries.is_empty());
        assert_eq!(plan.shortfall, dec("5.0"));
    }

    /// Consumed cost follows each batch's own price
    #[test]
    fn test_consumed_cost_uses_per_batch_prices() {
        let batches = vec![batch(1, "5.0", "40.0"), batch(2, "10.0", "50.0")];

        let plan = plan_fifo_consumption(&batches, dec("8.0"));

        // 5 x 40 + 3 x 50 = 350
        assert_eq!(plan.consumed_cost(), dec("350.0"));
    }

    /// A partially drained batch is consumed from its remaining quantity
    #[test]
    fn test_partially_drained_batch() {
        let mut partial = batch(1, "10.0", "40.0");
        partial.quantity_remaining = dec("2.0");
        let batches = vec![partial, batch(2, "10.0", "45.0")];

        let plan = plan_fifo_consumption(&batches, dec("5.0"));

        assert_eq!(plan.entries[0].quantity, dec("2.0"));
        assert_eq!(plan.entries[1].quantity, dec("3.0"));
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

    /// Strategy for generating valid unit prices
    fn price_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=100000i64).prop_map(|n| Decimal::new(n, 2)) // 0.01 to 1000.00
    }

    /// Strategy for generating a batch list in receipt order
    fn batches_strategy() -> impl Strategy<Value = Vec<InventoryBatch>> {
        prop::collection::vec((quantity_strategy(), price_strategy()), 0..8).prop_map(|specs| {
            specs
                .into_iter()
                .enumerate()
                .map(|(i, (qty, price))| InventoryBatch {
                    id: Uuid::from_u128(i as u128 + 1),
                    business_id: Uuid::from_u128(900),
                    item_id: Uuid::from_u128(901),
                    breakdown_id: None,
                    initial_quantity: qty,
                    quantity_remaining: qty,
                    buy_price_per_unit: price,
                    received_at: Utc
                        .timestamp_opt(1_700_000_000 + i as i64 * 3600, 0)
                        .unwrap(),
                })
                .collect()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Consumed plus shortfall always equals the requested quantity
        #[test]
        fn prop_consumed_plus_shortfall_equals_request(
            batches in batches_strategy(),
            requested in quantity_strategy()
        ) {
            let plan = plan_fifo_consumption(&batches, requested);
            prop_assert_eq!(plan.consumed_quantity() + plan.shortfall, requested);
        }

        /// No entry ever exceeds its batch's remaining quantity
        #[test]
        fn prop_no_batch_overdrawn(
            batches in batches_strategy(),
            requested in quantity_strategy()
        ) {
            let plan = plan_fifo_consumption(&batches, requested);
            for entry in &plan.entries {
                let source = batches.iter().find(|b| b.id == entry.batch_id).unwrap();
                prop_assert!(entry.quantity <= source.quantity_remaining);
                prop_assert!(entry.quantity > Decimal::ZERO);
            }
        }

        /// Every entry except the last drains its batch completely
        #[test]
        fn prop_only_last_entry_partial(
            batches in batches_strategy(),
            requested in quantity_strategy()
        ) {
            let plan = plan_fifo_consumption(&batches, requested);
            if plan.entries.len() > 1 {
                for entry in &plan.entries[..plan.entries.len() - 1] {
                    let source = batches.iter().find(|b| b.id == entry.batch_id).unwrap();
                    prop_assert_eq!(entry.quantity, source.quantity_remaining);
                }
            }
        }

        /// Entries appear in receipt order
        #[test]
        fn prop_entries_in_receipt_order(
            batches in batches_strategy(),
            requested in quantity_strategy()
        ) {
            let plan = plan_fifo_consumption(&batches, requested);
            let positions: Vec<usize> = plan
                .entries
                .iter()
                .map(|e| batches.iter().position(|b| b.id == e.batch_id).unwrap())
                .collect();
            for pair in positions.windows(2) {
                prop_assert!(pair[0] < pair[1]);
            }
        }

        /// Shortfall is exactly the uncovered portion of the request
        #[test]
        fn prop_shortfall_matches_available_stock(
            batches in batches_strategy(),
            requested in quantity_strategy()
        ) {
            let total: Decimal = batches.iter().map(|b| b.quantity_remaining).sum();
            let plan = plan_fifo_consumption(&batches, requested);
            if requested <= total {
                prop_assert_eq!(plan.shortfall, Decimal::ZERO);
            } else {
                prop_assert_eq!(plan.shortfall, requested - total);
            }
        }
    }
}
