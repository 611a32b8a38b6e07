//! Profit report types and day-level aggregation

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Axis a profit report is grouped on
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReportGrouping {
    Item,
    Category,
}

impl ReportGrouping {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "item" => Some(ReportGrouping::Item),
            "category" => Some(ReportGrouping::Category),
            _ => None,
        }
    }
}

/// One group (item or category) in a profit report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfitGroup {
    /// Item id when grouping by item
    pub item_id: Option<Uuid>,
    /// Item name or category label
    pub label: String,
    pub units_sold: Decimal,
    pub revenue: Decimal,
    pub cost: Decimal,
    pub profit: Decimal,
    pub margin: Decimal,
}

/// Aggregated profit report over a date range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfitReport {
    pub total_sales: Decimal,
    pub total_cost: Decimal,
    pub total_profit: Decimal,
    pub margin: Decimal,
    pub groups: Vec<ProfitGroup>,
}

/// Revenue, cost, and profit for one calendar day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyProfit {
    pub date: NaiveDate,
    pub revenue: Decimal,
    pub cost: Decimal,
    pub profit: Decimal,
    pub transactions: i64,
}

/// Day-level summary across a daily profit series
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DaySummary {
    pub profitable_days: i64,
    pub loss_days: i64,
    pub neutral_days: i64,
    pub best_day_profit: Decimal,
    pub worst_day_profit: Decimal,
}

/// Margin as profit over revenue, defined as zero when revenue is zero
pub fn margin_of(profit: Decimal, revenue: Decimal) -> Decimal {
    if revenue.is_zero() {
        Decimal::ZERO
    } else {
        profit / revenue
    }
}

/// Summarize a daily series into profitable/loss/neutral counts and the
/// best and worst single-day profit. An empty series yields all zeros.
pub fn summarize_days(days: &[DailyProfit]) -> DaySummary {
    let mut summary = DaySummary {
        profitable_days: 0,
        loss_days: 0,
        neutral_days: 0,
        best_day_profit: Decimal::ZERO,
        worst_day_profit: Decimal::ZERO,
    };

    for (i, day) in days.iter().enumerate() {
        if day.profit > Decimal::ZERO {
            summary.profitable_days += 1;
        } else if day.profit < Decimal::ZERO {
            summary.loss_days += 1;
        } else {
            summary.neutral_days += 1;
        }
        if i == 0 || day.profit > summary.best_day_profit {
            summary.best_day_profit = day.profit;
        }
        if i == 0 || day.profit < summary.worst_day_profit {
            summary.worst_day_profit = day.profit;
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(n: i64) -> Decimal {
        Decimal::from(n)
    }

    fn day(d: u32, profit: i64) -> DailyProfit {
        DailyProfit {
            date: NaiveDate::from_ymd_opt(2025, 1, d).unwrap(),
            revenue: dec(profit.max(0) * 2),
            cost: dec(profit.max(0)),
            profit: dec(profit),
            transactions: 3,
        }
    }

    #[test]
    fn test_margin_zero_revenue_is_zero() {
        assert_eq!(margin_of(dec(10), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_margin_of_half() {
        assert_eq!(margin_of(dec(50), dec(100)), Decimal::new(5, 1));
    }

    #[test]
    fn test_summarize_counts_day_kinds() {
        let days = vec![day(1, 100), day(2, -30), day(3, 0), day(4, 70)];
        let s = summarize_days(&days);
        assert_eq!(s.profitable_days, 2);
        assert_eq!(s.loss_days, 1);
        assert_eq!(s.neutral_days, 1);
        assert_eq!(s.best_day_profit, dec(100));
        assert_eq!(s.worst_day_profit, dec(-30));
    }

    #[test]
    fn test_summarize_all_losses() {
        let days = vec![day(1, -10), day(2, -40)];
        let s = summarize_days(&days);
        assert_eq!(s.profitable_days, 0);
        assert_eq!(s.best_day_profit, dec(-10));
        assert_eq!(s.worst_day_profit, dec(-40));
    }

    #[test]
    fn test_summarize_empty_series() {
        let s = summarize_days(&[]);
        assert_eq!(s.profitable_days + s.loss_days + s.neutral_days, 0);
        assert_eq!(s.best_day_profit, Decimal::ZERO);
    }
}
