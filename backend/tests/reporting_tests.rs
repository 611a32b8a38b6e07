//! Profit reporting tests
//!
//! Tests for report aggregation including:
//! - Margin defined as zero when revenue is zero
//! - Day-level summarization of daily profit series

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::models::{margin_of, summarize_days, DailyProfit};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// Helper to build a day entry with a given profit
fn day(ord: u32, revenue: &str, cost: &str, transactions: i64) -> DailyProfit {
    let revenue = dec(revenue);
    let cost = dec(cost);
    DailyProfit {
        date: NaiveDate::from_ymd_opt(2025, 6, ord).unwrap(),
        revenue,
        cost,
        profit: revenue - cost,
        transactions,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// A group with zero revenue reports margin 0, never division by zero
    #[test]
    fn test_margin_zero_revenue() {
        assert_eq!(margin_of(dec("0"), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(margin_of(dec("-15"), Decimal::ZERO), Decimal::ZERO);
    }

    /// Ordinary margin computation
    #[test]
    fn test_margin_computation() {
        assert_eq!(margin_of(dec("50"), dec("200")), dec("0.25"));
        assert_eq!(margin_of(dec("-20"), dec("100")), dec("-0.2"));
    }

    /// Profit is revenue minus cost per day
    #[test]
    fn test_daily_profit_arithmetic() {
        let d = day(1, "1200", "800", 14);
        assert_eq!(d.profit, dec("400"));
    }

    /// Day summary counts profitable, loss, and neutral days
    #[test]
    fn test_day_summary_counts() {
        let days = vec![
            day(1, "1000", "700", 10),  // +300
            day(2, "500", "650", 6),    // -150
            day(3, "0", "0", 0),        // neutral
            day(4, "800", "800", 9),    // neutral
            day(5, "900", "500", 11),   // +400
        ];

        let s = summarize_days(&days);
        assert_eq!(s.profitable_days, 2);
        assert_eq!(s.loss_days, 1);
        assert_eq!(s.neutral_days, 2);
        assert_eq!(s.best_day_profit, dec("400"));
        assert_eq!(s.worst_day_profit, dec("-150"));
    }

    /// Best and worst track a single loss-only series correctly
    #[test]
    fn test_day_summary_all_losses() {
        let days = vec![day(1, "100", "180", 2), day(2, "50", "300", 1)];
        let s = summarize_days(&days);
        assert_eq!(s.profitable_days, 0);
        assert_eq!(s.best_day_profit, dec("-80"));
        assert_eq!(s.worst_day_profit, dec("-250"));
    }

    /// An empty series summarizes to all zeros
    #[test]
    fn test_day_summary_empty() {
        let s = summarize_days(&[]);
        assert_eq!(s.profitable_days, 0);
        assert_eq!(s.loss_days, 0);
        assert_eq!(s.neutral_days, 0);
        assert_eq!(s.best_day_profit, Decimal::ZERO);
        assert_eq!(s.worst_day_profit, Decimal::ZERO);
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

    /// Strategy for a daily series
    fn days_strategy() -> impl Strategy<Value = Vec<DailyProfit>> {
        prop::collection::vec((amount_strategy(), amount_strategy(), 0i64..100), 0..30).prop_map(
            |entries| {
                entries
                    .into_iter()
                    .enumerate()
                    .map(|(i, (revenue, cost, transactions))| DailyProfit {
                        date: NaiveDate::from_ymd_opt(2025, 1, 1)
                            .unwrap()
                            .checked_add_days(chrono::Days::new(i as u64))
                            .unwrap(),
                        revenue,
                        cost,
                        profit: revenue - cost,
                        transactions,
                    })
                    .collect()
            },
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Margin never divides by zero and recovers an exact ratio
        #[test]
        fn prop_margin_recovers_ratio(
            revenue in (1i64..=1000000i64).prop_map(|n| Decimal::new(n, 2)),
            margin_bp in -10000i64..=10000i64
        ) {
            let expected_margin = Decimal::new(margin_bp, 4);
            let profit = revenue * expected_margin;
            prop_assert_eq!(margin_of(profit, revenue), expected_margin);
        }

        /// Zero revenue always yields a zero margin
        #[test]
        fn prop_margin_zero_revenue(profit in amount_strategy()) {
            prop_assert_eq!(margin_of(profit, Decimal::ZERO), Decimal::ZERO);
            prop_assert_eq!(margin_of(-profit, Decimal::ZERO), Decimal::ZERO);
        }

        /// Day-kind counts always partition the series
        #[test]
        fn prop_day_counts_partition(days in days_strategy()) {
            let s = summarize_days(&days);
            prop_assert_eq!(
                (s.profitable_days + s.loss_days + s.neutral_days) as usize,
                days.len()
            );
        }

        /// Best and worst bound every day's profit
        #[test]
        fn prop_best_worst_bound_series(days in days_strategy()) {
            let s = summarize_days(&days);
            for d in &days {
                prop_assert!(d.profit <= s.best_day_profit);
                prop_assert!(d.profit >= s.worst_day_profit);
            }
        }
    }
}
