//! Stock adjustment recording and stock takes
//!
//! Reconciles a counted or computed actual stock level against the system's
//! believed level, leaving an immutable audit row for every correction. A
//! stock take processes items independently: one bad entry never aborts the
//! rest of the count.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{apply_stock_delta, reconcile_stock, AdjustmentReason, StockAdjustment};

/// Stock adjustment service
#[derive(Clone)]
pub struct StockAdjustmentService {
    db: PgPool,
}

/// Direction of a delta-mode adjustment
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentType {
    Increase,
    Decrease,
}

/// Input for a delta-mode adjustment
#[derive(Debug, Deserialize)]
pub struct AdjustStockInput {
    pub item_id: Uuid,
    pub adjustment_type: AdjustmentType,
    pub quantity: Decimal,
    pub reason: AdjustmentReason,
    pub notes: Option<String>,
    /// For restock increases: also record the received quantity as a priced
    /// batch so FIFO costing can consume it later.
    pub buy_price_per_unit: Option<Decimal>,
}

/// Outcome of a single adjustment
#[derive(Debug, Serialize)]
pub struct AdjustmentOutcome {
    /// Absent when the adjustment was a no-op (zero difference)
    pub adjustment_id: Option<Uuid>,
    pub item_id: Uuid,
    pub system_stock: Decimal,
    pub actual_stock: Decimal,
    pub difference: Decimal,
}

/// One entry of a stock take
#[derive(Debug, Deserialize)]
pub struct StockTakeEntry {
    pub item_id: Uuid,
    pub actual_stock: Decimal,
    pub reason: AdjustmentReason,
    pub notes: Option<String>,
}

/// Per-item outcome of a stock take entry
#[derive(Debug, Serialize)]
pub struct StockTakeResult {
    pub item_id: Uuid,
    pub adjustment_id: Option<Uuid>,
    pub system_stock: Option<Decimal>,
    pub actual_stock: Option<Decimal>,
    pub difference: Option<Decimal>,
    /// Failure message for skipped entries
    pub error: Option<String>,
}

/// Aggregate report for a stock take batch
#[derive(Debug, Serialize)]
pub struct StockTakeReport {
    pub processed: usize,
    pub adjusted: usize,
    pub skipped: usize,
    pub results: Vec<StockTakeResult>,
}

#[derive(Debug, FromRow)]
struct AdjustmentRow {
    id: Uuid,
    business_id: Uuid,
    item_id: Uuid,
    system_stock: Decimal,
    actual_stock: Decimal,
    difference: Decimal,
    reason: String,
    notes: Option<String>,
    adjusted_by: Uuid,
    created_at: DateTime<Utc>,
}

impl From<AdjustmentRow> for StockAdjustment {
    fn from(row: AdjustmentRow) -> Self {
        StockAdjustment {
            id: row.id,
            business_id: row.business_id,
            item_id: row.item_id,
            system_stock: row.system_stock,
            actual_stock: row.actual_stock,
            difference: row.difference,
            reason: AdjustmentReason::from_str(&row.reason).unwrap_or(AdjustmentReason::Other),
            notes: row.notes,
            adjusted_by: row.adjusted_by,
            created_at: row.created_at,
        }
    }
}

impl StockAdjustmentService {
    /// Create a new StockAdjustmentService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Apply a signed delta to an item's stock with an audit row
    pub async fn adjust_stock(
        &self,
        business_id: Uuid,
        user_id: Uuid,
        input: AdjustStockInput,
    ) -> AppResult<AdjustmentOutcome> {
        if input.quantity <= Decimal::ZERO {
            return Err(AppError::Validation {
                field: "quantity".to_string(),
                message: "Quantity must be positive".to_string(),
                message_th: "ปริมาณต้องเป็นค่าบวก".to_string(),
            });
        }
        if let Some(price) = input.buy_price_per_unit {
            if price <= Decimal::ZERO {
                return Err(AppError::Validation {
                    field: "buy_price_per_unit".to_string(),
                    message: "Buy price must be positive".to_string(),
                    message_th: "ราคาซื้อต้องเป็นค่าบวก".to_string(),
                });
            }
        }

        // Start transaction
        let mut tx = self.db.begin().await?;

        let system_stock = sqlx::query_scalar::<_, Decimal>(
            "SELECT current_stock FROM items WHERE id = $1 AND business_id = $2 FOR UPDATE",
        )
        .bind(input.item_id)
        .bind(business_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Item".to_string()))?;

        let signed_delta = match input.adjustment_type {
            AdjustmentType::Increase => input.quantity,
            AdjustmentType::Decrease => -input.quantity,
        };
        let reconciliation = apply_stock_delta(system_stock, signed_delta);

        if reconciliation.is_noop() {
            tx.commit().await?;
            return Ok(AdjustmentOutcome {
                adjustment_id: None,
                item_id: input.item_id,
                system_stock: reconciliation.system_stock,
                actual_stock: reconciliation.actual_stock,
                difference: Decimal::ZERO,
            });
        }

        let adjustment_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO stock_adjustments
                (business_id, item_id, system_stock, actual_stock, difference,
                 reason, notes, adjusted_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(business_id)
        .bind(input.item_id)
        .bind(reconciliation.system_stock)
        .bind(reconciliation.actual_stock)
        .bind(reconciliation.difference)
        .bind(input.reason.as_str())
        .bind(&input.notes)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE items
            SET current_stock = $1, updated_at = NOW()
            WHERE id = $2 AND business_id = $3
            "#,
        )
        .bind(reconciliation.actual_stock)
        .bind(input.item_id)
        .bind(business_id)
        .execute(&mut *tx)
        .await?;

        // A priced restock also lands as a consumable batch
        if input.adjustment_type == AdjustmentType::Increase
            && input.reason == AdjustmentReason::Restock
        {
            if let Some(price) = input.buy_price_per_unit {
                sqlx::query(
                    r#"
                    INSERT INTO inventory_batches
                        (business_id, item_id, initial_quantity, quantity_remaining,
                         buy_price_per_unit)
                    VALUES ($1, $2, $3, $3, $4)
                    "#,
                )
                .bind(business_id)
                .bind(input.item_id)
                .bind(input.quantity)
                .bind(price)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        Ok(AdjustmentOutcome {
            adjustment_id: Some(adjustment_id),
            item_id: input.item_id,
            system_stock: reconciliation.system_stock,
            actual_stock: reconciliation.actual_stock,
            difference: reconciliation.difference,
        })
    }

    /// Apply a stock take: reconcile each counted item independently.
    ///
    /// Entries are processed with skip-and-continue semantics. A matching
    /// count is reported as processed with a zero difference and no
    /// adjustment row; an unknown item or invalid count is reported as
    /// skipped without touching the remaining entries.
    pub async fn stock_take(
        &self,
        business_id: Uuid,
        user_id: Uuid,
        entries: Vec<StockTakeEntry>,
    ) -> AppResult<StockTakeReport> {
        if entries.is_empty() {
            return Err(AppError::Validation {
                field: "entries".to_string(),
                message: "A stock take needs at least one entry".to_string(),
                message_th: "ต้องมีรายการนับสต็อกอย่างน้อยหนึ่งรายการ".to_string(),
            });
        }

        let mut results = Vec::with_capacity(entries.len());
        let mut adjusted = 0usize;
        let mut skipped = 0usize;

        for entry in &entries {
            match self.apply_stock_take_entry(business_id, user_id, entry).await {
                Ok(outcome) => {
                    if outcome.adjustment_id.is_some() {
                        adjusted += 1;
                    }
                    results.push(StockTakeResult {
                        item_id: entry.item_id,
                        adjustment_id: outcome.adjustment_id,
                        system_stock: Some(outcome.system_stock),
                        actual_stock: Some(outcome.actual_stock),
                        difference: Some(outcome.difference),
                        error: None,
                    });
                }
                Err(err) => {
                    skipped += 1;
                    tracing::warn!("Stock take entry for item {} skipped: {}", entry.item_id, err);
                    results.push(StockTakeResult {
                        item_id: entry.item_id,
                        adjustment_id: None,
                        system_stock: None,
                        actual_stock: None,
                        difference: None,
                        error: Some(err.to_string()),
                    });
                }
            }
        }

        Ok(StockTakeReport {
            processed: results.len() - skipped,
            adjusted,
            skipped,
            results,
        })
    }

    /// Reconcile one stock take entry in its own transaction
    async fn apply_stock_take_entry(
        &self,
        business_id: Uuid,
        user_id: Uuid,
        entry: &StockTakeEntry,
    ) -> AppResult<AdjustmentOutcome> {
        if entry.actual_stock < Decimal::ZERO {
            return Err(AppError::Validation {
                field: "actual_stock".to_string(),
                message: "Counted stock cannot be negative".to_string(),
                message_th: "สต็อกที่นับได้ต้องไม่ติดลบ".to_string(),
            });
        }

        let mut tx = self.db.begin().await?;

        let system_stock = sqlx::query_scalar::<_, Decimal>(
            "SELECT current_stock FROM items WHERE id = $1 AND business_id = $2 FOR UPDATE",
        )
        .bind(entry.item_id)
        .bind(business_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Item".to_string()))?;

        let reconciliation = reconcile_stock(system_stock, entry.actual_stock);

        if reconciliation.is_noop() {
            tx.commit().await?;
            return Ok(AdjustmentOutcome {
                adjustment_id: None,
                item_id: entry.item_id,
                system_stock: reconciliation.system_stock,
                actual_stock: reconciliation.actual_stock,
                difference: Decimal::ZERO,
            });
        }

        let adjustment_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO stock_adjustments
                (business_id, item_id, system_stock, actual_stock, difference,
                 reason, notes, adjusted_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(business_id)
        .bind(entry.item_id)
        .bind(reconciliation.system_stock)
        .bind(reconciliation.actual_stock)
        .bind(reconciliation.difference)
        .bind(entry.reason.as_str())
        .bind(&entry.notes)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE items
            SET current_stock = $1, updated_at = NOW()
            WHERE id = $2 AND business_id = $3
            "#,
        )
        .bind(reconciliation.actual_stock)
        .bind(entry.item_id)
        .bind(business_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(AdjustmentOutcome {
            adjustment_id: Some(adjustment_id),
            item_id: entry.item_id,
            system_stock: reconciliation.system_stock,
            actual_stock: reconciliation.actual_stock,
            difference: reconciliation.difference,
        })
    }

    /// List adjustments for a business, optionally filtered by item
    pub async fn list_adjustments(
        &self,
        business_id: Uuid,
        item_id: Option<Uuid>,
    ) -> AppResult<Vec<StockAdjustment>> {
        let rows = sqlx::query_as::<_, AdjustmentRow>(
            r#"
            SELECT id, business_id, item_id, system_stock, actual_stock, difference,
                   reason, notes, adjusted_by, created_at
            FROM stock_adjustments
            WHERE business_id = $1 AND ($2::uuid IS NULL OR item_id = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(business_id)
        .bind(item_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
