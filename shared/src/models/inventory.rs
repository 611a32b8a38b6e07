//! Inventory batch models and FIFO consumption planning

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A priced, depletable slice of stock received at one time
///
/// Batches are append-only: the buy price is fixed at receipt and
/// `quantity_remaining` only ever decreases (stock adjustments correct the
/// item total, not the batch). An empty batch stays on record for costing
/// history but is excluded from FIFO selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryBatch {
    pub id: Uuid,
    pub business_id: Uuid,
    pub item_id: Uuid,
    /// Originating breakdown; `None` for restock top-ups recorded outside a
    /// purchase.
    pub breakdown_id: Option<Uuid>,
    pub initial_quantity: Decimal,
    pub quantity_remaining: Decimal,
    pub buy_price_per_unit: Decimal,
    pub received_at: DateTime<Utc>,
}

/// One batch's contribution toward satisfying a sale quantity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConsumption {
    pub batch_id: Uuid,
    pub quantity: Decimal,
    pub buy_price_per_unit: Decimal,
}

/// Result of planning a FIFO consumption
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumptionPlan {
    pub entries: Vec<BatchConsumption>,
    /// Quantity the available batches could not cover. Zero when the plan
    /// fully satisfies the request.
    pub shortfall: Decimal,
}

impl ConsumptionPlan {
    /// Total quantity the plan actually consumes
    pub fn consumed_quantity(&self) -> Decimal {
        self.entries.iter().map(|e| e.quantity).sum()
    }

    /// Total buy cost of the planned consumption
    pub fn consumed_cost(&self) -> Decimal {
        self.entries
            .iter()
            .map(|e| e.quantity * e.buy_price_per_unit)
            .sum()
    }

    pub fn is_fully_satisfied(&self) -> bool {
        self.shortfall.is_zero()
    }
}

/// Plan which batches satisfy a sale of `requested` units, oldest first.
///
/// `batches` must already be ordered by `received_at` ascending with ties
/// broken by identifier, which is how the batch store returns them. Batches
/// with nothing remaining are skipped. Running out of batches is not an
/// error: the plan simply reports the uncovered quantity as shortfall and
/// the caller decides how to proceed.
pub fn plan_fifo_consumption(batches: &[InventoryBatch], requested: Decimal) -> ConsumptionPlan {
    let mut remaining = requested;
    let mut entries = Vec::new();

    for batch in batches {
        if remaining <= Decimal::ZERO {
            break;
        }
        if batch.quantity_remaining <= Decimal::ZERO {
            continue;
        }
        let take = batch.quantity_remaining.min(remaining);
        entries.push(BatchConsumption {
            batch_id: batch.id,
            quantity: take,
            buy_price_per_unit: batch.buy_price_per_unit,
        });
        remaining -= take;
    }

    ConsumptionPlan {
        entries,
        shortfall: remaining.max(Decimal::ZERO),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn batch(seq: i64, remaining: i64, price: i64) -> InventoryBatch {
        InventoryBatch {
            id: Uuid::from_u128(seq as u128),
            business_id: Uuid::from_u128(1),
            item_id: Uuid::from_u128(2),
            breakdown_id: None,
            initial_quantity: Decimal::from(remaining),
            quantity_remaining: Decimal::from(remaining),
            buy_price_per_unit: Decimal::from(price),
            received_at: Utc.timestamp_opt(1_700_000_000 + seq * 3600, 0).unwrap(),
        }
    }

    #[test]
    fn test_single_batch_covers_request() {
        let batches = vec![batch(1, 10, 50)];
        let plan = plan_fifo_consumption(&batches, Decimal::from(4));
        assert_eq!(plan.entries.len(), 1);
        assert_eq!(plan.entries[0].quantity, Decimal::from(4));
        assert!(plan.is_fully_satisfied());
    }

    #[test]
    fn test_oldest_batch_drained_before_next() {
        let batches = vec![batch(1, 5, 40), batch(2, 10, 50)];
        let plan = plan_fifo_consumption(&batches, Decimal::from(8));
        assert_eq!(plan.entries.len(), 2);
        assert_eq!(plan.entries[0].batch_id, Uuid::from_u128(1));
        assert_eq!(plan.entries[0].quantity, Decimal::from(5));
        assert_eq!(plan.entries[1].quantity, Decimal::from(3));
        assert_eq!(plan.consumed_quantity(), Decimal::from(8));
    }

    #[test]
    fn test_shortfall_reported_not_raised() {
        let batches = vec![batch(1, 3, 40)];
        let plan = plan_fifo_consumption(&batches, Decimal::from(10));
        assert_eq!(plan.consumed_quantity(), Decimal::from(3));
        assert_eq!(plan.shortfall, Decimal::from(7));
    }

    #[test]
    fn test_empty_batches_skipped() {
        let mut drained = batch(1, 0, 40);
        drained.quantity_remaining = Decimal::ZERO;
        let batches = vec![drained, batch(2, 6, 50)];
        let plan = plan_fifo_consumption(&batches, Decimal::from(4));
        assert_eq!(plan.entries.len(), 1);
        assert_eq!(plan.entries[0].batch_id, Uuid::from_u128(2));
    }

    #[test]
    fn test_no_batches_full_shortfall() {
        let plan = plan_fifo_consumption(&[], Decimal::from(5));
        assert!(plan.entries.is_empty());
        assert_eq!(plan.shortfall, Decimal::from(5));
    }
}
