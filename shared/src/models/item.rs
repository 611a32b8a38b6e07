//! Sellable item models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Units of measure an item can be sold in
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum UnitOfMeasure {
    #[serde(rename = "kg")]
    Kilogram,
    #[serde(rename = "g")]
    Gram,
    #[serde(rename = "piece")]
    Piece,
    #[serde(rename = "bunch")]
    Bunch,
    #[serde(rename = "tray")]
    Tray,
    #[serde(rename = "litre")]
    Litre,
    #[serde(rename = "ml")]
    Millilitre,
}

impl UnitOfMeasure {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitOfMeasure::Kilogram => "kg",
            UnitOfMeasure::Gram => "g",
            UnitOfMeasure::Piece => "piece",
            UnitOfMeasure::Bunch => "bunch",
            UnitOfMeasure::Tray => "tray",
            UnitOfMeasure::Litre => "litre",
            UnitOfMeasure::Millilitre => "ml",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "kg" => Some(UnitOfMeasure::Kilogram),
            "g" => Some(UnitOfMeasure::Gram),
            "piece" => Some(UnitOfMeasure::Piece),
            "bunch" => Some(UnitOfMeasure::Bunch),
            "tray" => Some(UnitOfMeasure::Tray),
            "litre" => Some(UnitOfMeasure::Litre),
            "ml" => Some(UnitOfMeasure::Millilitre),
            _ => None,
        }
    }
}

/// A sellable product
///
/// Items are never deleted, only deactivated. Current stock is a signed
/// quantity: sales against exhausted batches may drive it negative until a
/// stock take corrects it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    pub business_id: Uuid,
    pub name: String,
    pub category: Option<String>,
    pub unit: UnitOfMeasure,
    pub current_stock: Decimal,
    pub selling_price: Decimal,
    pub minimum_stock: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// True when stock has fallen to or below the reorder threshold
    pub fn is_low_stock(&self) -> bool {
        self.current_stock <= self.minimum_stock
    }
}
