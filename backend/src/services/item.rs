//! Item catalog service
//!
//! Items are the sellable products of a business. They are never deleted,
//! only deactivated, so historical sales and batches keep a valid reference.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{Item, UnitOfMeasure};

/// Item catalog service
#[derive(Clone)]
pub struct ItemService {
    db: PgPool,
}

/// Input for creating an item
#[derive(Debug, Deserialize)]
pub struct CreateItemInput {
    pub name: String,
    pub category: Option<String>,
    pub unit: UnitOfMeasure,
    pub selling_price: Decimal,
    pub minimum_stock: Option<Decimal>,
}

/// Input for updating an item
#[derive(Debug, Deserialize)]
pub struct UpdateItemInput {
    pub name: Option<String>,
    pub category: Option<String>,
    pub selling_price: Option<Decimal>,
    pub minimum_stock: Option<Decimal>,
}

/// Database row for an item
#[derive(Debug, FromRow)]
pub(crate) struct ItemRow {
    pub id: Uuid,
    pub business_id: Uuid,
    pub name: String,
    pub category: Option<String>,
    pub unit: String,
    pub current_stock: Decimal,
    pub selling_price: Decimal,
    pub minimum_stock: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        Item {
            id: row.id,
            business_id: row.business_id,
            name: row.name,
            category: row.category,
            unit: UnitOfMeasure::from_str(&row.unit).unwrap_or(UnitOfMeasure::Piece),
            current_stock: row.current_stock,
            selling_price: row.selling_price,
            minimum_stock: row.minimum_stock,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl ItemService {
    /// Create a new ItemService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a new item
    pub async fn create_item(&self, business_id: Uuid, input: CreateItemInput) -> AppResult<Item> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Item name is required".to_string(),
                message_th: "ต้องระบุชื่อสินค้า".to_string(),
            });
        }

        if input.selling_price < Decimal::ZERO {
            return Err(AppError::Validation {
                field: "selling_price".to_string(),
                message: "Selling price cannot be negative".to_string(),
                message_th: "ราคาขายต้องไม่ติดลบ".to_string(),
            });
        }

        let minimum_stock = input.minimum_stock.unwrap_or(Decimal::ZERO);
        if minimum_stock < Decimal::ZERO {
            return Err(AppError::Validation {
                field: "minimum_stock".to_string(),
                message: "Minimum stock cannot be negative".to_string(),
                message_th: "สต็อกขั้นต่ำต้องไม่ติดลบ".to_string(),
            });
        }

        let row = sqlx::query_as::<_, ItemRow>(
            r#"
            INSERT INTO items (business_id, name, category, unit, selling_price, minimum_stock)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, business_id, name, category, unit, current_stock, selling_price,
                      minimum_stock, is_active, created_at, updated_at
            "#,
        )
        .bind(business_id)
        .bind(input.name.trim())
        .bind(&input.category)
        .bind(input.unit.as_str())
        .bind(input.selling_price)
        .bind(minimum_stock)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Update an item's descriptive fields and pricing
    pub async fn update_item(
        &self,
        business_id: Uuid,
        item_id: Uuid,
        input: UpdateItemInput,
    ) -> AppResult<Item> {
        let existing = self.get_item(business_id, item_id).await?;

        let name = input.name.unwrap_or(existing.name);
        let category = input.category.or(existing.category);
        let selling_price = input.selling_price.unwrap_or(existing.selling_price);
        let minimum_stock = input.minimum_stock.unwrap_or(existing.minimum_stock);

        if selling_price < Decimal::ZERO {
            return Err(AppError::Validation {
                field: "selling_price".to_string(),
                message: "Selling price cannot be negative".to_string(),
                message_th: "ราคาขายต้องไม่ติดลบ".to_string(),
            });
        }

        let row = sqlx::query_as::<_, ItemRow>(
            r#"
            UPDATE items
            SET name = $1, category = $2, selling_price = $3, minimum_stock = $4, updated_at = NOW()
            WHERE id = $5 AND business_id = $6
            RETURNING id, business_id, name, category, unit, current_stock, selling_price,
                      minimum_stock, is_active, created_at, updated_at
            "#,
        )
        .bind(&name)
        .bind(&category)
        .bind(selling_price)
        .bind(minimum_stock)
        .bind(item_id)
        .bind(business_id)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Deactivate an item (items are never deleted)
    pub async fn deactivate_item(&self, business_id: Uuid, item_id: Uuid) -> AppResult<Item> {
        let row = sqlx::query_as::<_, ItemRow>(
            r#"
            UPDATE items
            SET is_active = false, updated_at = NOW()
            WHERE id = $1 AND business_id = $2
            RETURNING id, business_id, name, category, unit, current_stock, selling_price,
                      minimum_stock, is_active, created_at, updated_at
            "#,
        )
        .bind(item_id)
        .bind(business_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Item".to_string()))?;

        Ok(row.into())
    }

    /// Get an item by ID
    pub async fn get_item(&self, business_id: Uuid, item_id: Uuid) -> AppResult<Item> {
        let row = sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT id, business_id, name, category, unit, current_stock, selling_price,
                   minimum_stock, is_active, created_at, updated_at
            FROM items
            WHERE id = $1 AND business_id = $2
            "#,
        )
        .bind(item_id)
        .bind(business_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Item".to_string()))?;

        Ok(row.into())
    }

    /// List items for a business
    pub async fn list_items(
        &self,
        business_id: Uuid,
        include_inactive: bool,
    ) -> AppResult<Vec<Item>> {
        let rows = sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT id, business_id, name, category, unit, current_stock, selling_price,
                   minimum_stock, is_active, created_at, updated_at
            FROM items
            WHERE business_id = $1 AND (is_active = true OR $2)
            ORDER BY name ASC
            "#,
        )
        .bind(business_id)
        .bind(include_inactive)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// List active items at or below their reorder threshold
    pub async fn list_low_stock(&self, business_id: Uuid) -> AppResult<Vec<Item>> {
        let rows = sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT id, business_id, name, category, unit, current_stock, selling_price,
                   minimum_stock, is_active, created_at, updated_at
            FROM items
            WHERE business_id = $1 AND is_active = true AND current_stock <= minimum_stock
            ORDER BY current_stock ASC
            "#,
        )
        .bind(business_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
