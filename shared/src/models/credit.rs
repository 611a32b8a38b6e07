//! Customer credit account models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A customer account that may carry an outstanding balance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditAccount {
    pub id: Uuid,
    pub business_id: Uuid,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Type of a credit account movement
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CreditTransactionType {
    /// A sale put on the account (balance increases)
    Sale,
    /// A payment against the balance (balance decreases)
    Payment,
}

impl CreditTransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CreditTransactionType::Sale => "sale",
            CreditTransactionType::Payment => "payment",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "sale" => Some(CreditTransactionType::Sale),
            "payment" => Some(CreditTransactionType::Payment),
            _ => None,
        }
    }
}

/// A movement on a credit account
///
/// A `payment` collected in cash also adds its amount to the recording
/// user's open shift, exactly once, at the moment it is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditTransaction {
    pub id: Uuid,
    pub account_id: Uuid,
    pub transaction_type: CreditTransactionType,
    pub amount: Decimal,
    pub payment_method: Option<String>,
    pub recorded_by: Uuid,
    pub created_at: DateTime<Utc>,
}
