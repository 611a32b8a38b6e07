//! Point-of-sale transaction recording
//!
//! Recording a sale is the consumer side of the batch ledger: each line
//! FIFO-consumes the item's batches, captures the consumed cost onto the
//! line as a quantity-weighted unit buy price, and decrements item stock.
//! Stock is allowed to go negative when batches run dry; the uncovered
//! quantity simply carries no cost and is reported back as a shortfall.
//! Cash sales add their total to the cashier's open shift inside the same
//! transaction.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{
    plan_fifo_consumption, weighted_unit_cost, BatchConsumption, InventoryBatch, PaymentMethod,
    Sale, SaleItem, SaleStatus,
};
use shared::types::{PaginatedResponse, Pagination, PaginationMeta};

/// Sale recording service
#[derive(Clone)]
pub struct SaleService {
    db: PgPool,
}

/// One line of a new sale
#[derive(Debug, Deserialize)]
pub struct SaleLineInput {
    pub item_id: Uuid,
    pub quantity: Decimal,
    /// Defaults to the item's current selling price
    pub sell_price_per_unit: Option<Decimal>,
}

/// Input for recording a sale
#[derive(Debug, Deserialize)]
pub struct RecordSaleInput {
    pub lines: Vec<SaleLineInput>,
    pub payment_method: PaymentMethod,
    /// Required when paying on a credit account
    pub credit_account_id: Option<Uuid>,
}

/// Quantity a line could not cover from batches
#[derive(Debug, Serialize)]
pub struct LineShortfall {
    pub item_id: Uuid,
    pub quantity: Decimal,
}

/// A recorded sale with its lines
#[derive(Debug, Serialize)]
pub struct SaleReceipt {
    #[serde(flatten)]
    pub sale: Sale,
    pub items: Vec<SaleItem>,
    /// Lines whose batches ran dry; empty when fully covered
    pub shortfalls: Vec<LineShortfall>,
}

#[derive(Debug, FromRow)]
struct SaleRow {
    id: Uuid,
    business_id: Uuid,
    sold_by: Uuid,
    shift_id: Option<Uuid>,
    total_amount: Decimal,
    payment_method: String,
    status: String,
    sold_at: DateTime<Utc>,
}

impl From<SaleRow> for Sale {
    fn from(row: SaleRow) -> Self {
        Sale {
            id: row.id,
            business_id: row.business_id,
            sold_by: row.sold_by,
            shift_id: row.shift_id,
            total_amount: row.total_amount,
            payment_method: PaymentMethod::from_str(&row.payment_method)
                .unwrap_or(PaymentMethod::Cash),
            status: SaleStatus::from_str(&row.status).unwrap_or(SaleStatus::Completed),
            sold_at: row.sold_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct SaleItemRow {
    id: Uuid,
    sale_id: Uuid,
    item_id: Uuid,
    quantity: Decimal,
    sell_price_per_unit: Decimal,
    buy_price_per_unit: Decimal,
}

impl From<SaleItemRow> for SaleItem {
    fn from(row: SaleItemRow) -> Self {
        SaleItem {
            id: row.id,
            sale_id: row.sale_id,
            item_id: row.item_id,
            quantity: row.quantity,
            sell_price_per_unit: row.sell_price_per_unit,
            buy_price_per_unit: row.buy_price_per_unit,
        }
    }
}

#[derive(Debug, FromRow)]
struct AvailableBatchRow {
    id: Uuid,
    business_id: Uuid,
    item_id: Uuid,
    breakdown_id: Option<Uuid>,
    initial_quantity: Decimal,
    quantity_remaining: Decimal,
    buy_price_per_unit: Decimal,
    received_at: DateTime<Utc>,
}

impl From<AvailableBatchRow> for InventoryBatch {
    fn from(row: AvailableBatchRow) -> Self {
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

impl SaleService {
    /// Create a new SaleService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record a completed sale
    pub async fn record_sale(
        &self,
        business_id: Uuid,
        user_id: Uuid,
        input: RecordSaleInput,
    ) -> AppResult<SaleReceipt> {
        if input.lines.is_empty() {
            return Err(AppError::Validation {
                field: "lines".to_string(),
                message: "A sale needs at least one line".to_string(),
                message_th: "ต้องมีรายการขายอย่างน้อยหนึ่งรายการ".to_string(),
            });
        }
        let credit_account_id = match (input.payment_method, input.credit_account_id) {
            (PaymentMethod::Credit, Some(account_id)) => Some(account_id),
            (PaymentMethod::Credit, None) => {
                return Err(AppError::Validation {
                    field: "credit_account_id".to_string(),
                    message: "Credit sales need a credit account".to_string(),
                    message_th: "การขายเงินเชื่อต้องระบุบัญชีลูกหนี้".to_string(),
                });
            }
            _ => None,
        };
        for line in &input.lines {
            if line.quantity <= Decimal::ZERO {
                return Err(AppError::Validation {
                    field: "quantity".to_string(),
                    message: "Quantity must be positive".to_string(),
                    message_th: "ปริมาณต้องเป็นค่าบวก".to_string(),
                });
            }
            if let Some(price) = line.sell_price_per_unit {
                if price < Decimal::ZERO {
                    return Err(AppError::Validation {
                        field: "sell_price_per_unit".to_string(),
                        message: "Sell price cannot be negative".to_string(),
                        message_th: "ราคาขายต้องไม่ติดลบ".to_string(),
                    });
                }
            }
        }

        // Start transaction
        let mut tx = self.db.begin().await?;

        // Resolve sell prices and the sale total up front
        let mut priced_lines = Vec::with_capacity(input.lines.len());
        let mut total = Decimal::ZERO;
        for line in &input.lines {
            let item: Option<(Decimal, bool)> = sqlx::query_as(
                "SELECT selling_price, is_active FROM items WHERE id = $1 AND business_id = $2",
            )
            .bind(line.item_id)
            .bind(business_id)
            .fetch_optional(&mut *tx)
            .await?;

            let (selling_price, is_active) =
                item.ok_or_else(|| AppError::NotFound("Item".to_string()))?;
            if !is_active {
                return Err(AppError::Validation {
                    field: "item_id".to_string(),
                    message: "Item is not active".to_string(),
                    message_th: "สินค้านี้ถูกปิดการใช้งานแล้ว".to_string(),
                });
            }

            let sell_price = line.sell_price_per_unit.unwrap_or(selling_price);
            total += line.quantity * sell_price;
            priced_lines.push((line.item_id, line.quantity, sell_price));
        }

        // Cash received during an open shift raises its expected drawer
        let shift_id = if input.payment_method == PaymentMethod::Cash {
            sqlx::query_scalar::<_, Uuid>(
                r#"
                UPDATE shifts
                SET expected_closing_cash = expected_closing_cash + $1
                WHERE business_id = $2 AND user_id = $3 AND status = 'open'
                RETURNING id
                "#,
            )
            .bind(total)
            .bind(business_id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
        } else {
            None
        };

        // A credit sale raises the account's outstanding balance
        if let Some(account_id) = credit_account_id.filter(|_| total > Decimal::ZERO) {
            let updated = sqlx::query(
                r#"
                UPDATE credit_accounts
                SET balance = balance + $1
                WHERE id = $2 AND business_id = $3
                "#,
            )
            .bind(total)
            .bind(account_id)
            .bind(business_id)
            .execute(&mut *tx)
            .await?;
            if updated.rows_affected() == 0 {
                return Err(AppError::NotFound("Credit account".to_string()));
            }

            sqlx::query(
                r#"
                INSERT INTO credit_transactions (account_id, transaction_type, amount, recorded_by)
                VALUES ($1, 'sale', $2, $3)
                "#,
            )
            .bind(account_id)
            .bind(total)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        }

        let sale_row = sqlx::query_as::<_, SaleRow>(
            r#"
            INSERT INTO sales (business_id, sold_by, shift_id, total_amount, payment_method)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, business_id, sold_by, shift_id, total_amount, payment_method,
                      status, sold_at
            "#,
        )
        .bind(business_id)
        .bind(user_id)
        .bind(shift_id)
        .bind(total)
        .bind(input.payment_method.as_str())
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(priced_lines.len());
        let mut shortfalls = Vec::new();

        for (item_id, quantity, sell_price) in priced_lines {
            let (consumed, shortfall) =
                consume_item_batches(&mut tx, business_id, item_id, quantity).await?;

            let consumed_cost: Decimal = consumed
                .iter()
                .map(|c| c.quantity * c.buy_price_per_unit)
                .sum();
            let buy_price = weighted_unit_cost(consumed_cost, quantity);

            if shortfall > Decimal::ZERO {
                shortfalls.push(LineShortfall {
                    item_id,
                    quantity: shortfall,
                });
            }

            // Stock follows the sold quantity, not the consumed one: running
            // out of batches is how stock goes negative.
            sqlx::query(
                r#"
                UPDATE items
                SET current_stock = current_stock - $1, updated_at = NOW()
                WHERE id = $2 AND business_id = $3
                "#,
            )
            .bind(quantity)
            .bind(item_id)
            .bind(business_id)
            .execute(&mut *tx)
            .await?;

            let item_row = sqlx::query_as::<_, SaleItemRow>(
                r#"
                INSERT INTO sale_items
                    (sale_id, item_id, quantity, sell_price_per_unit, buy_price_per_unit)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, sale_id, item_id, quantity, sell_price_per_unit, buy_price_per_unit
                "#,
            )
            .bind(sale_row.id)
            .bind(item_id)
            .bind(quantity)
            .bind(sell_price)
            .bind(buy_price)
            .fetch_one(&mut *tx)
            .await?;
            items.push(item_row.into());
        }

        tx.commit().await?;

        tracing::info!(
            "Sale {} recorded: {} lines, total {}",
            sale_row.id,
            items.len(),
            total
        );

        Ok(SaleReceipt {
            sale: sale_row.into(),
            items,
            shortfalls,
        })
    }

    /// Void a completed sale.
    ///
    /// Voided sales vanish from every profit computation. Stock and batches
    /// are not restored; corrections go through a stock adjustment.
    pub async fn void_sale(&self, business_id: Uuid, sale_id: Uuid) -> AppResult<Sale> {
        let row = sqlx::query_as::<_, SaleRow>(
            r#"
            UPDATE sales
            SET status = 'voided'
            WHERE id = $1 AND business_id = $2 AND status = 'completed'
            RETURNING id, business_id, sold_by, shift_id, total_amount, payment_method,
                      status, sold_at
            "#,
        )
        .bind(sale_id)
        .bind(business_id)
        .fetch_optional(&self.db)
        .await?;

        match row {
            Some(row) => Ok(row.into()),
            None => {
                let exists = sqlx::query_scalar::<_, bool>(
                    "SELECT EXISTS(SELECT 1 FROM sales WHERE id = $1 AND business_id = $2)",
                )
                .bind(sale_id)
                .bind(business_id)
                .fetch_one(&self.db)
                .await?;
                if exists {
                    Err(AppError::Conflict {
                        resource: "sale".to_string(),
                        message: "Sale has already been voided".to_string(),
                        message_th: "การขายนี้ถูกยกเลิกไปแล้ว".to_string(),
                    })
                } else {
                    Err(AppError::NotFound("Sale".to_string()))
                }
            }
        }
    }

    /// Get a sale with its lines
    pub async fn get_sale(&self, business_id: Uuid, sale_id: Uuid) -> AppResult<SaleReceipt> {
        let sale_row = sqlx::query_as::<_, SaleRow>(
            r#"
            SELECT id, business_id, sold_by, shift_id, total_amount, payment_method,
                   status, sold_at
            FROM sales
            WHERE id = $1 AND business_id = $2
            "#,
        )
        .bind(sale_id)
        .bind(business_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Sale".to_string()))?;

        let items = sqlx::query_as::<_, SaleItemRow>(
            r#"
            SELECT id, sale_id, item_id, quantity, sell_price_per_unit, buy_price_per_unit
            FROM sale_items
            WHERE sale_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.db)
        .await?;

        Ok(SaleReceipt {
            sale: sale_row.into(),
            items: items.into_iter().map(Into::into).collect(),
            shortfalls: Vec::new(),
        })
    }

    /// List sales for a business, newest first
    pub async fn list_sales(
        &self,
        business_id: Uuid,
        pagination: &Pagination,
    ) -> AppResult<PaginatedResponse<Sale>> {
        let page = pagination.page.max(1);
        let per_page = pagination.per_page.clamp(1, 200);
        let offset = (page - 1) * per_page;

        let total_items = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM sales WHERE business_id = $1",
        )
        .bind(business_id)
        .fetch_one(&self.db)
        .await?;

        let rows = sqlx::query_as::<_, SaleRow>(
            r#"
            SELECT id, business_id, sold_by, shift_id, total_amount, payment_method,
                   status, sold_at
            FROM sales
            WHERE business_id = $1
            ORDER BY sold_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(business_id)
        .bind(per_page as i64)
        .bind(offset as i64)
        .fetch_all(&self.db)
        .await?;

        let total_items = total_items.max(0) as u64;
        let total_pages = total_items.div_ceil(per_page as u64) as u32;

        Ok(PaginatedResponse {
            data: rows.into_iter().map(Into::into).collect(),
            pagination: PaginationMeta {
                page,
                per_page,
                total_items,
                total_pages,
            },
        })
    }
}

/// FIFO-consume an item's batches inside the sale transaction.
///
/// Each planned entry is applied as a conditional decrement; an entry that
/// loses to a concurrent sale is dropped and the remainder re-planned from a
/// fresh snapshot. After the bounded retries, whatever is still uncovered is
/// returned as shortfall.
async fn consume_item_batches(
    tx: &mut Transaction<'_, Postgres>,
    business_id: Uuid,
    item_id: Uuid,
    quantity: Decimal,
) -> AppResult<(Vec<BatchConsumption>, Decimal)> {
    let mut needed = quantity;
    let mut consumed = Vec::new();

    for _ in 0..3 {
        if needed <= Decimal::ZERO {
            break;
        }

        let rows = sqlx::query_as::<_, AvailableBatchRow>(
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
        .fetch_all(&mut **tx)
        .await?;

        let batches: Vec<InventoryBatch> = rows.into_iter().map(Into::into).collect();
        let plan = plan_fifo_consumption(&batches, needed);
        if plan.entries.is_empty() {
            break;
        }

        let mut progressed = false;
        for entry in plan.entries {
            let result = sqlx::query(
                r#"
                UPDATE inventory_batches
                SET quantity_remaining = quantity_remaining - $1
                WHERE id = $2 AND quantity_remaining >= $1
                "#,
            )
            .bind(entry.quantity)
            .bind(entry.batch_id)
            .execute(&mut **tx)
            .await?;

            if result.rows_affected() == 1 {
                needed -= entry.quantity;
                consumed.push(entry);
                progressed = true;
            }
        }

        if !progressed {
            break;
        }
    }

    Ok((consumed, needed.max(Decimal::ZERO)))
}
