//! Stock adjustment models and reconciliation math

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Why a stock correction was made
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentReason {
    Restock,
    Spoilage,
    Theft,
    CountingError,
    Damage,
    Other,
}

impl AdjustmentReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustmentReason::Restock => "restock",
            AdjustmentReason::Spoilage => "spoilage",
            AdjustmentReason::Theft => "theft",
            AdjustmentReason::CountingError => "counting_error",
            AdjustmentReason::Damage => "damage",
            AdjustmentReason::Other => "other",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "restock" => Some(AdjustmentReason::Restock),
            "spoilage" => Some(AdjustmentReason::Spoilage),
            "theft" => Some(AdjustmentReason::Theft),
            "counting_error" => Some(AdjustmentReason::CountingError),
            "damage" => Some(AdjustmentReason::Damage),
            "other" => Some(AdjustmentReason::Other),
            _ => None,
        }
    }
}

/// An audited correction between believed and actual stock
///
/// Immutable once created; the item's stock is set to `actual_stock` as a
/// side effect of recording it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockAdjustment {
    pub id: Uuid,
    pub business_id: Uuid,
    pub item_id: Uuid,
    pub system_stock: Decimal,
    pub actual_stock: Decimal,
    pub difference: Decimal,
    pub reason: AdjustmentReason,
    pub notes: Option<String>,
    pub adjusted_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Outcome of reconciling a counted quantity against system stock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciliation {
    pub system_stock: Decimal,
    pub actual_stock: Decimal,
    pub difference: Decimal,
}

impl Reconciliation {
    /// A zero difference needs no adjustment row
    pub fn is_noop(&self) -> bool {
        self.difference.is_zero()
    }
}

/// Reconcile a counted (or computed) actual stock against system stock.
///
/// The stored actual is clamped at zero; the difference is taken against the
/// clamped value so the adjustment row and the item update always agree.
pub fn reconcile_stock(system_stock: Decimal, counted: Decimal) -> Reconciliation {
    let actual = counted.max(Decimal::ZERO);
    Reconciliation {
        system_stock,
        actual_stock: actual,
        difference: actual - system_stock,
    }
}

/// Reconciliation for delta mode: a signed change applied to system stock.
pub fn apply_stock_delta(system_stock: Decimal, signed_delta: Decimal) -> Reconciliation {
    reconcile_stock(system_stock, system_stock + signed_delta)
}
