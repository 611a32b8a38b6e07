//! Sale models and report-time cost resolution

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a sale was paid for
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Transfer,
    Credit,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Transfer => "transfer",
            PaymentMethod::Credit => "credit",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "cash" => Some(PaymentMethod::Cash),
            "transfer" => Some(PaymentMethod::Transfer),
            "credit" => Some(PaymentMethod::Credit),
            _ => None,
        }
    }
}

/// Sale lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    Completed,
    Voided,
}

impl SaleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::Completed => "completed",
            SaleStatus::Voided => "voided",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "completed" => Some(SaleStatus::Completed),
            "voided" => Some(SaleStatus::Voided),
            _ => None,
        }
    }
}

/// A point-of-sale transaction header
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    pub id: Uuid,
    pub business_id: Uuid,
    pub sold_by: Uuid,
    pub shift_id: Option<Uuid>,
    pub total_amount: Decimal,
    pub payment_method: PaymentMethod,
    pub status: SaleStatus,
    pub sold_at: DateTime<Utc>,
}

/// One sold line
///
/// `buy_price_per_unit` is the unit cost captured at sale time from the
/// consumed batches; zero means no cost was obtainable and the resolution
/// chain supplies one at report time. It is never backfilled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleItem {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub item_id: Uuid,
    pub quantity: Decimal,
    pub sell_price_per_unit: Decimal,
    pub buy_price_per_unit: Decimal,
}

/// Where a resolved unit cost came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CostSource {
    /// The sale line's own recorded buy price
    Recorded,
    /// Most recently received batch for the item
    LatestBatch,
    /// Most recently confirmed purchase breakdown for the item
    LatestBreakdown,
    /// Nothing available; the line reports as 100% margin
    Unknown,
}

/// Resolve a sale line's unit buy cost from the fixed precedence chain.
///
/// First non-zero of: the recorded price, the latest-batch cost, the latest
/// breakdown cost. Falls back to zero with `Unknown`. Note this is the
/// reporting policy (latest-known price); physical depletion at sale time
/// uses FIFO order instead, and the two are intentionally different.
pub fn resolve_unit_cost(
    recorded: Decimal,
    latest_batch_cost: Option<Decimal>,
    latest_breakdown_cost: Option<Decimal>,
) -> (Decimal, CostSource) {
    if !recorded.is_zero() {
        return (recorded, CostSource::Recorded);
    }
    if let Some(cost) = latest_batch_cost.filter(|c| !c.is_zero()) {
        return (cost, CostSource::LatestBatch);
    }
    if let Some(cost) = latest_breakdown_cost.filter(|c| !c.is_zero()) {
        return (cost, CostSource::LatestBreakdown);
    }
    (Decimal::ZERO, CostSource::Unknown)
}

/// Quantity-weighted unit cost of a consumed quantity.
///
/// Used when a sale consumes across batches with different prices: the line
/// stores one unit cost, so the consumed cost is spread over the full sold
/// quantity (including any shortfall portion, which carried no cost).
pub fn weighted_unit_cost(consumed_cost: Decimal, sold_quantity: Decimal) -> Decimal {
    if sold_quantity.is_zero() {
        Decimal::ZERO
    } else {
        consumed_cost / sold_quantity
    }
}
