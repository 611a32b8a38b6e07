//! Purchase recording and breakdown processing
//!
//! A purchase is captured in the supplier's own terms ("2 crates of limes,
//! 500 baht"). Breaking a line item down is the moment it becomes priced,
//! consumable inventory: one breakdown creates exactly one batch, raises the
//! item's stock by the usable quantity, and records any wastage as a
//! spoilage adjustment layered on top of that increase. The whole sequence
//! runs in a single transaction.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{
    derive_purchase_status, reconcile_stock, AdjustmentReason, Breakdown, LineItemStatus,
    Purchase, PurchaseLineItem, PurchaseStatus,
};

/// Purchase and breakdown service
#[derive(Clone)]
pub struct PurchaseService {
    db: PgPool,
}

/// One line of a new purchase
#[derive(Debug, Deserialize)]
pub struct CreatePurchaseLineInput {
    pub item_name: String,
    pub item_id: Option<Uuid>,
    pub quantity_description: String,
    pub amount: Decimal,
}

/// Input for recording a purchase
#[derive(Debug, Deserialize)]
pub struct CreatePurchaseInput {
    pub supplier_name: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub total_amount: Decimal,
    #[serde(default)]
    pub extra_costs: Decimal,
    pub line_items: Vec<CreatePurchaseLineInput>,
}

/// Input for breaking down a purchase line item
#[derive(Debug, Deserialize)]
pub struct BreakdownInput {
    pub item_id: Uuid,
    pub usable_quantity: Decimal,
    #[serde(default)]
    pub wastage_quantity: Decimal,
    pub buy_price_per_unit: Decimal,
    pub notes: Option<String>,
}

/// Result of a breakdown: the records created and the purchase's new status
#[derive(Debug, Serialize)]
pub struct BreakdownOutcome {
    pub breakdown_id: Uuid,
    pub batch_id: Uuid,
    pub purchase_status: PurchaseStatus,
}

/// A purchase together with its line items
#[derive(Debug, Serialize)]
pub struct PurchaseWithLines {
    #[serde(flatten)]
    pub purchase: Purchase,
    pub line_items: Vec<PurchaseLineItem>,
}

#[derive(Debug, FromRow)]
struct PurchaseRow {
    id: Uuid,
    business_id: Uuid,
    recorded_by: Uuid,
    supplier_name: Option<String>,
    purchase_date: NaiveDate,
    total_amount: Decimal,
    extra_costs: Decimal,
    status: String,
    created_at: DateTime<Utc>,
}

impl From<PurchaseRow> for Purchase {
    fn from(row: PurchaseRow) -> Self {
        Purchase {
            id: row.id,
            business_id: row.business_id,
            recorded_by: row.recorded_by,
            supplier_name: row.supplier_name,
            purchase_date: row.purchase_date,
            total_amount: row.total_amount,
            extra_costs: row.extra_costs,
            status: PurchaseStatus::from_str(&row.status).unwrap_or(PurchaseStatus::Pending),
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct LineItemRow {
    id: Uuid,
    purchase_id: Uuid,
    item_name: String,
    item_id: Option<Uuid>,
    quantity_description: String,
    amount: Decimal,
    status: String,
}

impl From<LineItemRow> for PurchaseLineItem {
    fn from(row: LineItemRow) -> Self {
        PurchaseLineItem {
            id: row.id,
            purchase_id: row.purchase_id,
            item_name: row.item_name,
            item_id: row.item_id,
            quantity_description: row.quantity_description,
            amount: row.amount,
            status: LineItemStatus::from_str(&row.status).unwrap_or(LineItemStatus::Pending),
        }
    }
}

#[derive(Debug, FromRow)]
struct BreakdownRow {
    id: Uuid,
    line_item_id: Uuid,
    item_id: Uuid,
    usable_quantity: Decimal,
    wastage_quantity: Decimal,
    buy_price_per_unit: Decimal,
    notes: Option<String>,
    confirmed_by: Uuid,
    confirmed_at: DateTime<Utc>,
}

impl From<BreakdownRow> for Breakdown {
    fn from(row: BreakdownRow) -> Self {
        Breakdown {
            id: row.id,
            line_item_id: row.line_item_id,
            item_id: row.item_id,
            usable_quantity: row.usable_quantity,
            wastage_quantity: row.wastage_quantity,
            buy_price_per_unit: row.buy_price_per_unit,
            notes: row.notes,
            confirmed_by: row.confirmed_by,
            confirmed_at: row.confirmed_at,
        }
    }
}

impl PurchaseService {
    /// Create a new PurchaseService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record a purchase with its line items
    pub async fn create_purchase(
        &self,
        business_id: Uuid,
        user_id: Uuid,
        input: CreatePurchaseInput,
    ) -> AppResult<PurchaseWithLines> {
        if input.line_items.is_empty() {
            return Err(AppError::Validation {
                field: "line_items".to_string(),
                message: "A purchase needs at least one line item".to_string(),
                message_th: "ต้องมีรายการสินค้าอย่างน้อยหนึ่งรายการ".to_string(),
            });
        }
        if input.total_amount < Decimal::ZERO || input.extra_costs < Decimal::ZERO {
            return Err(AppError::Validation {
                field: "total_amount".to_string(),
                message: "Amounts cannot be negative".to_string(),
                message_th: "จำนวนเงินต้องไม่ติดลบ".to_string(),
            });
        }
        for line in &input.line_items {
            if line.item_name.trim().is_empty() {
                return Err(AppError::Validation {
                    field: "item_name".to_string(),
                    message: "Line item name is required".to_string(),
                    message_th: "ต้องระบุชื่อสินค้าในรายการ".to_string(),
                });
            }
            if line.amount < Decimal::ZERO {
                return Err(AppError::Validation {
                    field: "amount".to_string(),
                    message: "Line amount cannot be negative".to_string(),
                    message_th: "จำนวนเงินของรายการต้องไม่ติดลบ".to_string(),
                });
            }
        }

        let purchase_date = input
            .purchase_date
            .unwrap_or_else(|| Utc::now().date_naive());

        // Start transaction
        let mut tx = self.db.begin().await?;

        let purchase_row = sqlx::query_as::<_, PurchaseRow>(
            r#"
            INSERT INTO purchases
                (business_id, recorded_by, supplier_name, purchase_date, total_amount, extra_costs)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, business_id, recorded_by, supplier_name, purchase_date,
                      total_amount, extra_costs, status, created_at
            "#,
        )
        .bind(business_id)
        .bind(user_id)
        .bind(&input.supplier_name)
        .bind(purchase_date)
        .bind(input.total_amount)
        .bind(input.extra_costs)
        .fetch_one(&mut *tx)
        .await?;

        let mut lines = Vec::with_capacity(input.line_items.len());
        for line in &input.line_items {
            let line_row = sqlx::query_as::<_, LineItemRow>(
                r#"
                INSERT INTO purchase_items
                    (purchase_id, item_name, item_id, quantity_description, amount)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, purchase_id, item_name, item_id, quantity_description, amount, status
                "#,
            )
            .bind(purchase_row.id)
            .bind(line.item_name.trim())
            .bind(line.item_id)
            .bind(&line.quantity_description)
            .bind(line.amount)
            .fetch_one(&mut *tx)
            .await?;
            lines.push(line_row.into());
        }

        tx.commit().await?;

        Ok(PurchaseWithLines {
            purchase: purchase_row.into(),
            line_items: lines,
        })
    }

    /// Get a purchase with its line items
    pub async fn get_purchase(
        &self,
        business_id: Uuid,
        purchase_id: Uuid,
    ) -> AppResult<PurchaseWithLines> {
        let purchase_row = sqlx::query_as::<_, PurchaseRow>(
            r#"
            SELECT id, business_id, recorded_by, supplier_name, purchase_date,
                   total_amount, extra_costs, status, created_at
            FROM purchases
            WHERE id = $1 AND business_id = $2
            "#,
        )
        .bind(purchase_id)
        .bind(business_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Purchase".to_string()))?;

        let lines = sqlx::query_as::<_, LineItemRow>(
            r#"
            SELECT id, purchase_id, item_name, item_id, quantity_description, amount, status
            FROM purchase_items
            WHERE purchase_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(purchase_id)
        .fetch_all(&self.db)
        .await?;

        Ok(PurchaseWithLines {
            purchase: purchase_row.into(),
            line_items: lines.into_iter().map(Into::into).collect(),
        })
    }

    /// List purchases for a business, newest first
    pub async fn list_purchases(&self, business_id: Uuid) -> AppResult<Vec<Purchase>> {
        let rows = sqlx::query_as::<_, PurchaseRow>(
            r#"
            SELECT id, business_id, recorded_by, supplier_name, purchase_date,
                   total_amount, extra_costs, status, created_at
            FROM purchases
            WHERE business_id = $1
            ORDER BY purchase_date DESC, created_at DESC
            "#,
        )
        .bind(business_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Break a pending line item down into a priced batch plus wastage.
    ///
    /// The wastage adjustment is snapshotted against the stock level after
    /// the usable quantity has been added; the two writes must stay in this
    /// order for the before/after fields to be meaningful.
    pub async fn breakdown_line_item(
        &self,
        business_id: Uuid,
        user_id: Uuid,
        line_item_id: Uuid,
        input: BreakdownInput,
    ) -> AppResult<BreakdownOutcome> {
        if input.usable_quantity <= Decimal::ZERO {
            return Err(AppError::Validation {
                field: "usable_quantity".to_string(),
                message: "Usable quantity must be positive".to_string(),
                message_th: "ปริมาณที่ใช้ได้ต้องเป็นค่าบวก".to_string(),
            });
        }
        if input.wastage_quantity < Decimal::ZERO {
            return Err(AppError::Validation {
                field: "wastage_quantity".to_string(),
                message: "Wastage cannot be negative".to_string(),
                message_th: "ของเสียต้องไม่ติดลบ".to_string(),
            });
        }
        if input.buy_price_per_unit <= Decimal::ZERO {
            return Err(AppError::Validation {
                field: "buy_price_per_unit".to_string(),
                message: "Buy price must be positive".to_string(),
                message_th: "ราคาซื้อต้องเป็นค่าบวก".to_string(),
            });
        }

        // Start transaction
        let mut tx = self.db.begin().await?;

        // Fetch the line item and its purchase, scoped to the business
        let line: Option<(Uuid, String, String)> = sqlx::query_as(
            r#"
            SELECT pi.purchase_id, pi.status, p.status AS purchase_status
            FROM purchase_items pi
            JOIN purchases p ON p.id = pi.purchase_id
            WHERE pi.id = $1 AND p.business_id = $2
            FOR UPDATE OF pi, p
            "#,
        )
        .bind(line_item_id)
        .bind(business_id)
        .fetch_optional(&mut *tx)
        .await?;

        let (purchase_id, line_status, purchase_status) =
            line.ok_or_else(|| AppError::NotFound("Purchase line item".to_string()))?;

        if line_status != LineItemStatus::Pending.as_str() {
            return Err(AppError::Conflict {
                resource: "purchase_line_item".to_string(),
                message: "Line item has already been broken down".to_string(),
                message_th: "รายการนี้ถูกแตกรายการไปแล้ว".to_string(),
            });
        }

        // Validate the target item belongs to the business
        let item_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM items WHERE id = $1 AND business_id = $2)",
        )
        .bind(input.item_id)
        .bind(business_id)
        .fetch_one(&mut *tx)
        .await?;

        if !item_exists {
            return Err(AppError::NotFound("Item".to_string()));
        }

        // Create the breakdown record
        let breakdown_row = sqlx::query_as::<_, BreakdownRow>(
            r#"
            INSERT INTO purchase_breakdowns
                (line_item_id, item_id, usable_quantity, wastage_quantity,
                 buy_price_per_unit, notes, confirmed_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, line_item_id, item_id, usable_quantity, wastage_quantity,
                      buy_price_per_unit, notes, confirmed_by, confirmed_at
            "#,
        )
        .bind(line_item_id)
        .bind(input.item_id)
        .bind(input.usable_quantity)
        .bind(input.wastage_quantity)
        .bind(input.buy_price_per_unit)
        .bind(&input.notes)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        // Create exactly one batch for the usable quantity
        let batch_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO inventory_batches
                (business_id, item_id, breakdown_id, initial_quantity,
                 quantity_remaining, buy_price_per_unit, received_at)
            VALUES ($1, $2, $3, $4, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(business_id)
        .bind(input.item_id)
        .bind(breakdown_row.id)
        .bind(input.usable_quantity)
        .bind(input.buy_price_per_unit)
        .bind(breakdown_row.confirmed_at)
        .fetch_one(&mut *tx)
        .await?;

        // Add the usable quantity to the item's stock
        let stock_after_usable = sqlx::query_scalar::<_, Decimal>(
            r#"
            UPDATE items
            SET current_stock = current_stock + $1, updated_at = NOW()
            WHERE id = $2 AND business_id = $3
            RETURNING current_stock
            "#,
        )
        .bind(input.usable_quantity)
        .bind(input.item_id)
        .bind(business_id)
        .fetch_one(&mut *tx)
        .await?;

        // Record wastage as a spoilage adjustment against the post-usable stock
        if input.wastage_quantity > Decimal::ZERO {
            let reconciliation =
                reconcile_stock(stock_after_usable, stock_after_usable - input.wastage_quantity);

            sqlx::query(
                r#"
                INSERT INTO stock_adjustments
                    (business_id, item_id, system_stock, actual_stock, difference,
                     reason, notes, adjusted_by)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(business_id)
            .bind(input.item_id)
            .bind(reconciliation.system_stock)
            .bind(reconciliation.actual_stock)
            .bind(reconciliation.difference)
            .bind(AdjustmentReason::Spoilage.as_str())
            .bind(format!("Wastage from purchase breakdown {}", breakdown_row.id))
            .bind(user_id)
            .execute(&mut *tx)
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
        }

        // Mark the line item broken down and backfill the item link
        sqlx::query(
            r#"
            UPDATE purchase_items
            SET status = $1, item_id = COALESCE(item_id, $2)
            WHERE id = $3
            "#,
        )
        .bind(LineItemStatus::BrokenDown.as_str())
        .bind(input.item_id)
        .bind(line_item_id)
        .execute(&mut *tx)
        .await?;

        // Recompute the purchase status from remaining pending lines
        let pending_lines = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM purchase_items
            WHERE purchase_id = $1 AND status = 'pending'
            "#,
        )
        .bind(purchase_id)
        .fetch_one(&mut *tx)
        .await?;

        let current_status =
            PurchaseStatus::from_str(&purchase_status).unwrap_or(PurchaseStatus::Pending);
        let new_status = derive_purchase_status(pending_lines, current_status);

        sqlx::query("UPDATE purchases SET status = $1 WHERE id = $2")
            .bind(new_status.as_str())
            .bind(purchase_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            "Breakdown {} confirmed: batch {} of {} x {} for item {}",
            breakdown_row.id,
            batch_id,
            input.usable_quantity,
            input.buy_price_per_unit,
            input.item_id
        );

        Ok(BreakdownOutcome {
            breakdown_id: breakdown_row.id,
            batch_id,
            purchase_status: new_status,
        })
    }

    /// Get the breakdown for a line item, if it has been confirmed
    pub async fn get_breakdown(
        &self,
        business_id: Uuid,
        line_item_id: Uuid,
    ) -> AppResult<Option<Breakdown>> {
        let row = sqlx::query_as::<_, BreakdownRow>(
            r#"
            SELECT pb.id, pb.line_item_id, pb.item_id, pb.usable_quantity, pb.wastage_quantity,
                   pb.buy_price_per_unit, pb.notes, pb.confirmed_by, pb.confirmed_at
            FROM purchase_breakdowns pb
            JOIN purchase_items pi ON pi.id = pb.line_item_id
            JOIN purchases p ON p.id = pi.purchase_id
            WHERE pb.line_item_id = $1 AND p.business_id = $2
            "#,
        )
        .bind(line_item_id)
        .bind(business_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Into::into))
    }
}
