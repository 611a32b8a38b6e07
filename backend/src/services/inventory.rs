//! Inventory batch store and FIFO consumption selector
//!
//! Batches are the priced slices of stock the costing chain is built on.
//! The store is append-only: a batch is never re-ordered or re-priced after
//! creation, so its buy price stays historically accurate even as purchase
//! prices fluctuate. Depletion is a conditional single-row decrement keyed
//! by batch identifier, which keeps concurrent sales from spending the same
//! quantity twice.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{plan_fifo_consumption, ConsumptionPlan, InventoryBatch};

/// Inventory batch service
#[derive(Clone)]
pub struct InventoryService {
    db: PgPool,
}

/// Input for recording a batch outside the purchase flow (restock top-up)
#[derive(Debug, Deserialize)]
pub struct CreateBatchInput {
    pub item_id: Uuid,
    pub quantity: Decimal,
    pub buy_price_per_unit: Decimal,
}

/// Database row for an inventory batch
#[derive(Debug, FromRow)]
pub(crate) struct BatchRow {
    pub id: Uuid,
    pub business_id: Uuid,
    pub item_id: Uuid,
    pub breakdown_id: Option<Uuid>,
    pub initial_quantity: Decimal,
    pub quantity_remaining: Decimal,
    pub buy_price_per_unit: Decimal,
    pub received_at: DateTime<Utc>,
}

impl From<BatchRow> for InventoryBatch {
    fn from(row: BatchRow) -> Self {
        InventoryBatch {
            id: row.id,
            business_id: row.business_id,
            item_id: row.item_id,
            breakdown_id: row.breakdown_id,
            initial_quantity: row.initial_quantity,
            quantity_remaining: row.quantity_remaining,
            buy_price_per_unit: row.buy_price_per_unit,
            received_at: row.received_at,
        }
    }
}

impl InventoryService {
    /// Create a new InventoryService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record a batch that did not come from a purchase breakdown
    pub async fn create_batch(
        &self,
        business_id: Uuid,
        input: CreateBatchInput,
    ) -> AppResult<InventoryBatch> {
        if input.quantity <= Decimal::ZERO {
            return Err(AppError::Validation {
                field: "quantity".to_string(),
                message: "Quantity must be positive".to_string(),
                message_th: "ปริมาณต้องเป็นค่าบวก".to_string(),
            });
        }
        if input.buy_price_per_unit <= Decimal::ZERO {
            return Err(AppError::Validation {
                field: "buy_price_per_unit".to_string(),
                message: "Buy price must be positive".to_string(),
                message_th: "ราคาซื้อต้องเป็นค่าบวก".to_string(),
            });
        }

        // Validate item belongs to business
        let item_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM items WHERE id = $1 AND business_id = $2)",
        )
        .bind(input.item_id)
        .bind(business_id)
        .fetch_one(&self.db)
        .await?;

        if !item_exists {
            return Err(AppError::NotFound("Item".to_string()));
        }

        let row = sqlx::query_as::<_, BatchRow>(
            r#"
            INSERT INTO inventory_batches
                (business_id, item_id, initial_quantity, quantity_remaining, buy_price_per_unit)
            VALUES ($1, $2, $3, $3, $4)
            RETURNING id, business_id, item_id, breakdown_id, initial_quantity,
                      quantity_remaining, buy_price_per_unit, received_at
            "#,
        )
        .bind(business_id)
        .bind(input.item_id)
        .bind(input.quantity)
        .bind(input.buy_price_per_unit)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// List all batches for an item, oldest first
    pub async fn list_batches(
        &self,
        business_id: Uuid,
        item_id: Uuid,
    ) -> AppResult<Vec<InventoryBatch>> {
        let rows = sqlx::query_as::<_, BatchRow>(
            r#"
            SELECT id, business_id, item_id, breakdown_id, initial_quantity,
                   quantity_remaining, buy_price_per_unit, received_at
            FROM inventory_batches
            WHERE item_id = $1 AND business_id = $2
            ORDER BY received_at ASC, id ASC
            "#,
        )
        .bind(item_id)
        .bind(business_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Batches still holding stock, in FIFO consumption order
    pub async fn available_batches(
        &self,
        business_id: Uuid,
        item_id: Uuid,
    ) -> AppResult<Vec<InventoryBatch>> {
        let rows = sqlx::query_as::<_, BatchRow>(
            r#"
            SELECT id, business_id, item_id, breakdown_id, initial_quantity,
                   quantity_remaining, buy_price_per_unit, received_at
            FROM inventory_batches
            WHERE item_id = $1 AND business_id = $2 AND quantity_remaining > 0
            ORDER BY received_at ASC, id ASC
            "#,
        )
        .bind(item_id)
        .bind(business_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Plan which batches would satisfy a sale, without depleting anything.
    ///
    /// A shortfall in the returned plan is a normal outcome, not an error;
    /// the caller decides whether to proceed with a partial or synthetic
    /// cost.
    pub async fn select_batches_for_sale(
        &self,
        business_id: Uuid,
        item_id: Uuid,
        quantity: Decimal,
    ) -> AppResult<ConsumptionPlan> {
        if quantity <= Decimal::ZERO {
            return Err(AppError::Validation {
                field: "quantity".to_string(),
                message: "Quantity must be positive".to_string(),
                message_th: "ปริมาณต้องเป็นค่าบวก".to_string(),
            });
        }

        let item_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM items WHERE id = $1 AND business_id = $2)",
        )
        .bind(item_id)
        .bind(business_id)
        .fetch_one(&self.db)
        .await?;

        if !item_exists {
            return Err(AppError::NotFound("Item".to_string()));
        }

        let batches = self.available_batches(business_id, item_id).await?;
        Ok(plan_fifo_consumption(&batches, quantity))
    }

    /// Deplete a batch by exactly `quantity`.
    ///
    /// Returns false when the batch no longer holds that much, so a caller
    /// racing another sale can re-read and re-plan instead of overdrawing.
    pub async fn deplete_batch(
        &self,
        business_id: Uuid,
        batch_id: Uuid,
        quantity: Decimal,
    ) -> AppResult<bool> {
        if quantity <= Decimal::ZERO {
            return Err(AppError::Validation {
                field: "quantity".to_string(),
                message: "Quantity must be positive".to_string(),
                message_th: "ปริมาณต้องเป็นค่าบวก".to_string(),
            });
        }

        let result = sqlx::query(
            r#"
            UPDATE inventory_batches
            SET quantity_remaining = quantity_remaining - $1
            WHERE id = $2 AND business_id = $3 AND quantity_remaining >= $1
            "#,
        )
        .bind(quantity)
        .bind(batch_id)
        .bind(business_id)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
