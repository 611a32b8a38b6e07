//! Report-time cost resolution
//!
//! A sale line that carries no recorded buy price still needs a cost when
//! profit is computed. The chain falls back from the line's own price to the
//! most recently received batch, then to the most recently confirmed
//! purchase breakdown, then to zero. This is the latest-known-price policy
//! used for reporting; it is intentionally different from the FIFO order
//! used for physical depletion at sale time, and the two must not be
//! unified. Resolution happens per query so it always reflects current
//! batch and breakdown data.

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use shared::models::{resolve_unit_cost, CostSource};

/// Cost resolution service
#[derive(Clone)]
pub struct CostingService {
    db: PgPool,
}

/// A resolved unit cost and where it came from
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedCost {
    pub unit_cost: Decimal,
    pub source: CostSource,
}

impl CostingService {
    /// Create a new CostingService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Resolve the unit buy cost for a sale line
    pub async fn resolve_sale_line_cost(
        &self,
        business_id: Uuid,
        item_id: Uuid,
        recorded_buy_price: Decimal,
    ) -> AppResult<ResolvedCost> {
        // The recorded price short-circuits the chain without any queries
        if !recorded_buy_price.is_zero() {
            let (unit_cost, source) = resolve_unit_cost(recorded_buy_price, None, None);
            return Ok(ResolvedCost { unit_cost, source });
        }

        let latest_batch = self.latest_batch_cost(business_id, item_id).await?;
        let latest_breakdown = if latest_batch.filter(|c| !c.is_zero()).is_some() {
            None
        } else {
            self.latest_breakdown_cost(business_id, item_id).await?
        };

        let (unit_cost, source) =
            resolve_unit_cost(recorded_buy_price, latest_batch, latest_breakdown);
        Ok(ResolvedCost { unit_cost, source })
    }

    /// Cost of the most recently received batch for an item
    pub async fn latest_batch_cost(
        &self,
        business_id: Uuid,
        item_id: Uuid,
    ) -> AppResult<Option<Decimal>> {
        let cost = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT buy_price_per_unit
            FROM inventory_batches
            WHERE item_id = $1 AND business_id = $2
            ORDER BY received_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(item_id)
        .bind(business_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(cost)
    }

    /// Cost of the most recently confirmed purchase breakdown for an item
    pub async fn latest_breakdown_cost(
        &self,
        business_id: Uuid,
        item_id: Uuid,
    ) -> AppResult<Option<Decimal>> {
        let cost = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT pb.buy_price_per_unit
            FROM purchase_breakdowns pb
            JOIN items i ON i.id = pb.item_id
            WHERE pb.item_id = $1 AND i.business_id = $2
            ORDER BY pb.confirmed_at DESC, pb.id DESC
            LIMIT 1
            "#,
        )
        .bind(item_id)
        .bind(business_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(cost)
    }
}
