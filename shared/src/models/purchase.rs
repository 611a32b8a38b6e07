//! Purchase and breakdown models
//!
//! A purchase records what was bought from a supplier in free-text terms.
//! Breaking a line item down converts it into a priced inventory batch plus
//! wastage; only then does it affect stock.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a purchase, derived from its line items
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseStatus {
    Pending,
    Partial,
    Complete,
}

impl PurchaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseStatus::Pending => "pending",
            PurchaseStatus::Partial => "partial",
            PurchaseStatus::Complete => "complete",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PurchaseStatus::Pending),
            "partial" => Some(PurchaseStatus::Partial),
            "complete" => Some(PurchaseStatus::Complete),
            _ => None,
        }
    }
}

/// Status of a single purchase line item
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LineItemStatus {
    Pending,
    BrokenDown,
}

impl LineItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineItemStatus::Pending => "pending",
            LineItemStatus::BrokenDown => "broken_down",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(LineItemStatus::Pending),
            "broken_down" => Some(LineItemStatus::BrokenDown),
            _ => None,
        }
    }
}

/// A supplier transaction header
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Purchase {
    pub id: Uuid,
    pub business_id: Uuid,
    pub recorded_by: Uuid,
    pub supplier_name: Option<String>,
    pub purchase_date: NaiveDate,
    pub total_amount: Decimal,
    pub extra_costs: Decimal,
    pub status: PurchaseStatus,
    pub created_at: DateTime<Utc>,
}

/// One line within a purchase
///
/// The quantity is a human description ("2 crates"), not a structured
/// amount; the breakdown supplies the precise usable quantity later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseLineItem {
    pub id: Uuid,
    pub purchase_id: Uuid,
    pub item_name: String,
    pub item_id: Option<Uuid>,
    pub quantity_description: String,
    pub amount: Decimal,
    pub status: LineItemStatus,
}

/// The confirmed conversion of a line item into usable stock plus wastage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Breakdown {
    pub id: Uuid,
    pub line_item_id: Uuid,
    pub item_id: Uuid,
    pub usable_quantity: Decimal,
    pub wastage_quantity: Decimal,
    pub buy_price_per_unit: Decimal,
    pub notes: Option<String>,
    pub confirmed_by: Uuid,
    pub confirmed_at: DateTime<Utc>,
}

/// Derive the purchase status from its line-item counts.
///
/// A purchase never regresses: once any line is broken down the status is at
/// least `Partial`, and it only reaches `Complete` when no pending lines
/// remain.
pub fn derive_purchase_status(pending_lines: i64, current: PurchaseStatus) -> PurchaseStatus {
    if pending_lines == 0 {
        PurchaseStatus::Complete
    } else if current == PurchaseStatus::Complete {
        // Complete with pending lines should not happen; keep the stronger
        // status rather than regress.
        PurchaseStatus::Complete
    } else {
        PurchaseStatus::Partial
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_complete_when_no_pending_lines() {
        assert_eq!(
            derive_purchase_status(0, PurchaseStatus::Pending),
            PurchaseStatus::Complete
        );
        assert_eq!(
            derive_purchase_status(0, PurchaseStatus::Partial),
            PurchaseStatus::Complete
        );
    }

    #[test]
    fn test_status_partial_while_lines_remain() {
        assert_eq!(
            derive_purchase_status(2, PurchaseStatus::Pending),
            PurchaseStatus::Partial
        );
        assert_eq!(
            derive_purchase_status(1, PurchaseStatus::Partial),
            PurchaseStatus::Partial
        );
    }

    #[test]
    fn test_status_never_regresses_from_complete() {
        assert_eq!(
            derive_purchase_status(3, PurchaseStatus::Complete),
            PurchaseStatus::Complete
        );
    }

    #[test]
    fn test_status_round_trip() {
        for s in ["pending", "partial", "complete"] {
            assert_eq!(PurchaseStatus::from_str(s).unwrap().as_str(), s);
        }
        assert!(PurchaseStatus::from_str("done").is_none());
    }
}
