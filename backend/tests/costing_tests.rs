//! Cost resolution chain tests
//!
//! Tests for report-time unit-cost resolution including:
//! - Fixed precedence: recorded price, latest batch, latest breakdown, zero
//! - Zero candidates treated as missing
//! - Weighted cost capture at sale time

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::models::{resolve_unit_cost, weighted_unit_cost, CostSource};

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

    /// A non-zero recorded price short-circuits the chain
    #[test]
    fn test_recorded_price_wins() {
        let (cost, source) = resolve_unit_cost(dec("35"), Some(dec("50")), Some(dec("40")));
        assert_eq!(cost, dec("35"));
        assert_eq!(source, CostSource::Recorded);
    }

    /// With no recorded price, the latest batch beats an older breakdown:
    /// batch at 50 and breakdown at 40 must resolve to 50
    #[test]
    fn test_latest_batch_beats_breakdown() {
        let (cost, source) = resolve_unit_cost(Decimal::ZERO, Some(dec("50")), Some(dec("40")));
        assert_eq!(cost, dec("50"));
        assert_eq!(source, CostSource::LatestBatch);
    }

    /// Without batches the breakdown cost is used
    #[test]
    fn test_breakdown_fallback() {
        let (cost, source) = resolve_unit_cost(Decimal::ZERO, None, Some(dec("40")));
        assert_eq!(cost, dec("40"));
        assert_eq!(source, CostSource::LatestBreakdown);
    }

    /// A zero batch cost is treated as missing, not as an answer
    #[test]
    fn test_zero_batch_cost_skipped() {
        let (cost, source) =
            resolve_unit_cost(Decimal::ZERO, Some(Decimal::ZERO), Some(dec("40")));
        assert_eq!(cost, dec("40"));
        assert_eq!(source, CostSource::LatestBreakdown);
    }

    /// The chain exhausts to zero with an explicit Unknown source
    #[test]
    fn test_chain_exhausts_to_zero() {
        let (cost, source) = resolve_unit_cost(Decimal::ZERO, None, None);
        assert_eq!(cost, Decimal::ZERO);
        assert_eq!(source, CostSource::Unknown);
    }

    /// An unknown cost reports as 100% margin: revenue with zero cost
    #[test]
    fn test_unknown_cost_is_full_margin() {
        let (cost, _) = resolve_unit_cost(Decimal::ZERO, None, None);
        let revenue = dec("8") * dec("25");
        let profit = revenue - dec("8") * cost;
        assert_eq!(profit, revenue);
    }

    /// Sale-time capture spreads the consumed cost over the sold quantity
    #[test]
    fn test_weighted_cost_across_batches() {
        // 5 units at 40 plus 3 units at 50, sold quantity 8
        let consumed_cost = dec("5") * dec("40") + dec("3") * dec("50");
        let unit = weighted_unit_cost(consumed_cost, dec("8"));
        assert_eq!(unit, dec("43.75"));
    }

    /// A shortfall portion carries no cost, diluting the weighted price
    #[test]
    fn test_weighted_cost_with_shortfall() {
        // Only 4 of 10 sold units were covered by a batch at 30
        let consumed_cost = dec("4") * dec("30");
        let unit = weighted_unit_cost(consumed_cost, dec("10"));
        assert_eq!(unit, dec("12"));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for generating valid unit prices
    fn price_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=100000i64).prop_map(|n| Decimal::new(n, 2)) // 0.01 to 1000.00
    }

    /// Strategy for optional candidate costs, including explicit zeros
    fn candidate_strategy() -> impl Strategy<Value = Option<Decimal>> {
        prop_oneof![
            Just(None),
            Just(Some(Decimal::ZERO)),
            price_strategy().prop_map(Some),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// The resolved cost is always one of the candidates or zero
        #[test]
        fn prop_resolution_picks_a_candidate(
            recorded in prop_oneof![Just(Decimal::ZERO), price_strategy()],
            batch in candidate_strategy(),
            breakdown in candidate_strategy()
        ) {
            let (cost, source) = resolve_unit_cost(recorded, batch, breakdown);
            match source {
                CostSource::Recorded => prop_assert_eq!(cost, recorded),
                CostSource::LatestBatch => prop_assert_eq!(Some(cost), batch),
                CostSource::LatestBreakdown => prop_assert_eq!(Some(cost), breakdown),
                CostSource::Unknown => prop_assert_eq!(cost, Decimal::ZERO),
            }
        }

        /// The chain never resolves to a zero cost with a non-Unknown source
        #[test]
        fn prop_non_unknown_sources_are_non_zero(
            recorded in prop_oneof![Just(Decimal::ZERO), price_strategy()],
            batch in candidate_strategy(),
            breakdown in candidate_strategy()
        ) {
            let (cost, source) = resolve_unit_cost(recorded, batch, breakdown);
            if source != CostSource::Unknown {
                prop_assert!(!cost.is_zero());
            }
        }

        /// Precedence is strict: a recorded price hides both fallbacks
        #[test]
        fn prop_recorded_price_has_priority(
            recorded in price_strategy(),
            batch in candidate_strategy(),
            breakdown in candidate_strategy()
        ) {
            let (cost, source) = resolve_unit_cost(recorded, batch, breakdown);
            prop_assert_eq!(cost, recorded);
            prop_assert_eq!(source, CostSource::Recorded);
        }

        /// Weighted cost times quantity reproduces the consumed cost
        #[test]
        fn prop_weighted_cost_round_trip(
            unit_cost in price_strategy(),
            quantity in (1i64..=1000i64).prop_map(Decimal::from)
        ) {
            let consumed = unit_cost * quantity;
            let weighted = weighted_unit_cost(consumed, quantity);
            prop_assert_eq!(weighted * quantity, consumed);
        }
    }
}
