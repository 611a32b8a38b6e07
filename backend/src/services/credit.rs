//! Customer credit accounts
//!
//! Credit sales raise an account's outstanding balance; payments lower it.
//! A payment collected in cash also belongs in the drawer, so it adds its
//! amount to the recording user's open shift exactly once, inside the same
//! transaction as the payment itself.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{CreditAccount, CreditTransaction, CreditTransactionType};

/// Credit account service
#[derive(Clone)]
pub struct CreditService {
    db: PgPool,
}

/// Input for creating a credit account
#[derive(Debug, Deserialize)]
pub struct CreateAccountInput {
    pub customer_name: String,
    pub customer_phone: Option<String>,
}

/// How a credit payment was collected
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CreditPaymentMethod {
    Cash,
    Transfer,
}

impl CreditPaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CreditPaymentMethod::Cash => "cash",
            CreditPaymentMethod::Transfer => "transfer",
        }
    }
}

/// Input for recording a payment against an account
#[derive(Debug, Deserialize)]
pub struct RecordPaymentInput {
    pub amount: Decimal,
    pub payment_method: CreditPaymentMethod,
}

/// Result of a recorded payment
#[derive(Debug, Serialize)]
pub struct PaymentOutcome {
    pub transaction: CreditTransaction,
    pub balance: Decimal,
    /// The open shift credited with the cash, when the payment was cash
    pub shift_id: Option<Uuid>,
}

#[derive(Debug, FromRow)]
struct AccountRow {
    id: Uuid,
    business_id: Uuid,
    customer_name: String,
    customer_phone: Option<String>,
    balance: Decimal,
    created_at: DateTime<Utc>,
}

impl From<AccountRow> for CreditAccount {
    fn from(row: AccountRow) -> Self {
        CreditAccount {
            id: row.id,
            business_id: row.business_id,
            customer_name: row.customer_name,
            customer_phone: row.customer_phone,
            balance: row.balance,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct TransactionRow {
    id: Uuid,
    account_id: Uuid,
    transaction_type: String,
    amount: Decimal,
    payment_method: Option<String>,
    recorded_by: Uuid,
    created_at: DateTime<Utc>,
}

impl From<TransactionRow> for CreditTransaction {
    fn from(row: TransactionRow) -> Self {
        CreditTransaction {
            id: row.id,
            account_id: row.account_id,
            transaction_type: CreditTransactionType::from_str(&row.transaction_type)
                .unwrap_or(CreditTransactionType::Payment),
            amount: row.amount,
            payment_method: row.payment_method,
            recorded_by: row.recorded_by,
            created_at: row.created_at,
        }
    }
}

impl CreditService {
    /// Create a new CreditService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a credit account
    pub async fn create_account(
        &self,
        business_id: Uuid,
        input: CreateAccountInput,
    ) -> AppResult<CreditAccount> {
        if input.customer_name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "customer_name".to_string(),
                message: "Customer name is required".to_string(),
                message_th: "ต้องระบุชื่อลูกค้า".to_string(),
            });
        }

        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            INSERT INTO credit_accounts (business_id, customer_name, customer_phone)
            VALUES ($1, $2, $3)
            RETURNING id, business_id, customer_name, customer_phone, balance, created_at
            "#,
        )
        .bind(business_id)
        .bind(input.customer_name.trim())
        .bind(&input.customer_phone)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// List credit accounts for a business
    pub async fn list_accounts(&self, business_id: Uuid) -> AppResult<Vec<CreditAccount>> {
        let rows = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, business_id, customer_name, customer_phone, balance, created_at
            FROM credit_accounts
            WHERE business_id = $1
            ORDER BY customer_name ASC
            "#,
        )
        .bind(business_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Record a payment against a credit account.
    ///
    /// A cash payment also raises the recording user's open shift
    /// expectation, once, in the same transaction. Without an open shift the
    /// payment still applies; there is simply no drawer to credit.
    pub async fn record_payment(
        &self,
        business_id: Uuid,
        user_id: Uuid,
        account_id: Uuid,
        input: RecordPaymentInput,
    ) -> AppResult<PaymentOutcome> {
        if input.amount <= Decimal::ZERO {
            return Err(AppError::Validation {
                field: "amount".to_string(),
                message: "Amount must be positive".to_string(),
                message_th: "จำนวนเงินต้องเป็นค่าบวก".to_string(),
            });
        }

        // Start transaction
        let mut tx = self.db.begin().await?;

        let balance = sqlx::query_scalar::<_, Decimal>(
            r#"
            UPDATE credit_accounts
            SET balance = balance - $1
            WHERE id = $2 AND business_id = $3
            RETURNING balance
            "#,
        )
        .bind(input.amount)
        .bind(account_id)
        .bind(business_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Credit account".to_string()))?;

        let transaction_row = sqlx::query_as::<_, TransactionRow>(
            r#"
            INSERT INTO credit_transactions
                (account_id, transaction_type, amount, payment_method, recorded_by)
            VALUES ($1, 'payment', $2, $3, $4)
            RETURNING id, account_id, transaction_type, amount, payment_method,
                      recorded_by, created_at
            "#,
        )
        .bind(account_id)
        .bind(input.amount)
        .bind(input.payment_method.as_str())
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let shift_id = if input.payment_method == CreditPaymentMethod::Cash {
            sqlx::query_scalar::<_, Uuid>(
                r#"
                UPDATE shifts
                SET expected_closing_cash = expected_closing_cash + $1
                WHERE business_id = $2 AND user_id = $3 AND status = 'open'
                RETURNING id
                "#,
            )
            .bind(input.amount)
            .bind(business_id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
        } else {
            None
        };

        tx.commit().await?;

        Ok(PaymentOutcome {
            transaction: transaction_row.into(),
            balance,
            shift_id,
        })
    }

    /// List transactions for an account
    pub async fn list_transactions(
        &self,
        business_id: Uuid,
        account_id: Uuid,
    ) -> AppResult<Vec<CreditTransaction>> {
        let account_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM credit_accounts WHERE id = $1 AND business_id = $2)",
        )
        .bind(account_id)
        .bind(business_id)
        .fetch_one(&self.db)
        .await?;

        if !account_exists {
            return Err(AppError::NotFound("Credit account".to_string()));
        }

        let rows = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT id, account_id, transaction_type, amount, payment_method,
                   recorded_by, created_at
            FROM credit_transactions
            WHERE account_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(account_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
