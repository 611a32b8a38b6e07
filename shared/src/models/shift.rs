//! Cashier shift models and cash accountability math

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Shift lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ShiftStatus {
    Open,
    Closed,
}

impl ShiftStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShiftStatus::Open => "open",
            ShiftStatus::Closed => "closed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "open" => Some(ShiftStatus::Open),
            "closed" => Some(ShiftStatus::Closed),
            _ => None,
        }
    }
}

/// A cashier work session
///
/// `expected_closing_cash` is a running total seeded at opening cash and
/// incremented by every cash inflow recorded during the session (cash sales
/// and cash credit-account payments). A closed shift is immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shift {
    pub id: Uuid,
    pub business_id: Uuid,
    pub user_id: Uuid,
    pub opening_cash: Decimal,
    pub expected_closing_cash: Decimal,
    pub actual_closing_cash: Option<Decimal>,
    pub cash_difference: Option<Decimal>,
    pub status: ShiftStatus,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

/// Expected closing cash after a cash inflow
pub fn expected_after_inflow(expected_closing_cash: Decimal, inflow: Decimal) -> Decimal {
    expected_closing_cash + inflow
}

/// Signed difference between the counted drawer and the running expectation
pub fn cash_difference(actual_closing_cash: Decimal, expected_closing_cash: Decimal) -> Decimal {
    actual_closing_cash - expected_closing_cash
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(n: i64) -> Decimal {
        Decimal::from(n)
    }

    #[test]
    fn test_inflows_accumulate_from_opening_cash() {
        let mut expected = dec(1000);
        expected = expected_after_inflow(expected, dec(200));
        expected = expected_after_inflow(expected, dec(50));
        assert_eq!(expected, dec(1250));
    }

    #[test]
    fn test_cash_difference_short_drawer() {
        assert_eq!(cash_difference(dec(1245), dec(1250)), dec(-5));
    }

    #[test]
    fn test_cash_difference_over_drawer() {
        assert_eq!(cash_difference(dec(1260), dec(1250)), dec(10));
    }

    #[test]
    fn test_inflow_order_is_immaterial() {
        let a = expected_after_inflow(expected_after_inflow(dec(500), dec(75)), dec(25));
        let b = expected_after_inflow(expected_after_inflow(dec(500), dec(25)), dec(75));
        assert_eq!(a, b);
    }
}
