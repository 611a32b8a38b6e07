//! Cashier shift cash reconciliation
//!
//! A shift tracks how much cash should be in the drawer: the expectation is
//! seeded at opening cash and raised by every cash inflow recorded during
//! the session (cash sales and cash credit payments). Closing compares the
//! counted drawer against that expectation and freezes the shift.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{cash_difference, Shift, ShiftStatus};

/// Shift service
#[derive(Clone)]
pub struct ShiftService {
    db: PgPool,
}

/// Input for opening a shift
#[derive(Debug, Deserialize)]
pub struct OpenShiftInput {
    pub opening_cash: Decimal,
}

/// Input for closing a shift
#[derive(Debug, Deserialize)]
pub struct CloseShiftInput {
    pub actual_closing_cash: Decimal,
}

/// Input for a manual cash inflow
#[derive(Debug, Deserialize)]
pub struct CashInflowInput {
    pub amount: Decimal,
}

#[derive(Debug, FromRow)]
struct ShiftRow {
    id: Uuid,
    business_id: Uuid,
    user_id: Uuid,
    opening_cash: Decimal,
    expected_closing_cash: Decimal,
    actual_closing_cash: Option<Decimal>,
    cash_difference: Option<Decimal>,
    status: String,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
}

impl From<ShiftRow> for Shift {
    fn from(row: ShiftRow) -> Self {
        Shift {
            id: row.id,
            business_id: row.business_id,
            user_id: row.user_id,
            opening_cash: row.opening_cash,
            expected_closing_cash: row.expected_closing_cash,
            actual_closing_cash: row.actual_closing_cash,
            cash_difference: row.cash_difference,
            status: ShiftStatus::from_str(&row.status).unwrap_or(ShiftStatus::Open),
            started_at: row.started_at,
            ended_at: row.ended_at,
        }
    }
}

impl ShiftService {
    /// Create a new ShiftService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Open a shift for a user.
    ///
    /// Only one shift per (business, user) may be open at a time; the
    /// expectation starts at the opening cash.
    pub async fn open_shift(
        &self,
        business_id: Uuid,
        user_id: Uuid,
        input: OpenShiftInput,
    ) -> AppResult<Shift> {
        if input.opening_cash < Decimal::ZERO {
            return Err(AppError::Validation {
                field: "opening_cash".to_string(),
                message: "Opening cash cannot be negative".to_string(),
                message_th: "เงินสดเปิดกะต้องไม่ติดลบ".to_string(),
            });
        }

        let already_open = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM shifts
                WHERE business_id = $1 AND user_id = $2 AND status = 'open'
            )
            "#,
        )
        .bind(business_id)
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        if already_open {
            return Err(AppError::Conflict {
                resource: "shift".to_string(),
                message: "An open shift already exists for this user".to_string(),
                message_th: "ผู้ใช้นี้มีกะที่เปิดอยู่แล้ว".to_string(),
            });
        }

        let row = sqlx::query_as::<_, ShiftRow>(
            r#"
            INSERT INTO shifts (business_id, user_id, opening_cash, expected_closing_cash)
            VALUES ($1, $2, $3, $3)
            RETURNING id, business_id, user_id, opening_cash, expected_closing_cash,
                      actual_closing_cash, cash_difference, status, started_at, ended_at
            "#,
        )
        .bind(business_id)
        .bind(user_id)
        .bind(input.opening_cash)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Close an open shift with the counted drawer amount
    pub async fn close_shift(
        &self,
        business_id: Uuid,
        shift_id: Uuid,
        input: CloseShiftInput,
    ) -> AppResult<Shift> {
        if input.actual_closing_cash < Decimal::ZERO {
            return Err(AppError::Validation {
                field: "actual_closing_cash".to_string(),
                message: "Closing cash cannot be negative".to_string(),
                message_th: "เงินสดปิดกะต้องไม่ติดลบ".to_string(),
            });
        }

        // Start transaction
        let mut tx = self.db.begin().await?;

        let shift = sqlx::query_as::<_, ShiftRow>(
            r#"
            SELECT id, business_id, user_id, opening_cash, expected_closing_cash,
                   actual_closing_cash, cash_difference, status, started_at, ended_at
            FROM shifts
            WHERE id = $1 AND business_id = $2
            FOR UPDATE
            "#,
        )
        .bind(shift_id)
        .bind(business_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Shift".to_string()))?;

        if shift.status != ShiftStatus::Open.as_str() {
            return Err(AppError::Conflict {
                resource: "shift".to_string(),
                message: "Shift has already been closed".to_string(),
                message_th: "กะนี้ถูกปิดไปแล้ว".to_string(),
            });
        }

        let difference = cash_difference(input.actual_closing_cash, shift.expected_closing_cash);

        let row = sqlx::query_as::<_, ShiftRow>(
            r#"
            UPDATE shifts
            SET actual_closing_cash = $1, cash_difference = $2, status = 'closed',
                ended_at = NOW()
            WHERE id = $3
            RETURNING id, business_id, user_id, opening_cash, expected_closing_cash,
                      actual_closing_cash, cash_difference, status, started_at, ended_at
            "#,
        )
        .bind(input.actual_closing_cash)
        .bind(difference)
        .bind(shift_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            "Shift {} closed with difference {}",
            shift_id,
            difference
        );

        Ok(row.into())
    }

    /// Record a cash inflow against an open shift.
    ///
    /// The increment is a single additive update, so concurrent inflows
    /// commute.
    pub async fn record_cash_inflow(
        &self,
        business_id: Uuid,
        shift_id: Uuid,
        input: CashInflowInput,
    ) -> AppResult<Shift> {
        if input.amount <= Decimal::ZERO {
            return Err(AppError::Validation {
                field: "amount".to_string(),
                message: "Amount must be positive".to_string(),
                message_th: "จำนวนเงินต้องเป็นค่าบวก".to_string(),
            });
        }

        let row = sqlx::query_as::<_, ShiftRow>(
            r#"
            UPDATE shifts
            SET expected_closing_cash = expected_closing_cash + $1
            WHERE id = $2 AND business_id = $3 AND status = 'open'
            RETURNING id, business_id, user_id, opening_cash, expected_closing_cash,
                      actual_closing_cash, cash_difference, status, started_at, ended_at
            "#,
        )
        .bind(input.amount)
        .bind(shift_id)
        .bind(business_id)
        .fetch_optional(&self.db)
        .await?;

        match row {
            Some(row) => Ok(row.into()),
            None => {
                let exists = sqlx::query_scalar::<_, bool>(
                    "SELECT EXISTS(SELECT 1 FROM shifts WHERE id = $1 AND business_id = $2)",
                )
                .bind(shift_id)
                .bind(business_id)
                .fetch_one(&self.db)
                .await?;
                if exists {
                    Err(AppError::Conflict {
                        resource: "shift".to_string(),
                        message: "Shift has already been closed".to_string(),
                        message_th: "กะนี้ถูกปิดไปแล้ว".to_string(),
                    })
                } else {
                    Err(AppError::NotFound("Shift".to_string()))
                }
            }
        }
    }

    /// The user's currently open shift, if any
    pub async fn current_shift(
        &self,
        business_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<Option<Shift>> {
        let row = sqlx::query_as::<_, ShiftRow>(
            r#"
            SELECT id, business_id, user_id, opening_cash, expected_closing_cash,
                   actual_closing_cash, cash_difference, status, started_at, ended_at
            FROM shifts
            WHERE business_id = $1 AND user_id = $2 AND status = 'open'
            "#,
        )
        .bind(business_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Into::into))
    }

    /// List shifts for a business, newest first
    pub async fn list_shifts(&self, business_id: Uuid) -> AppResult<Vec<Shift>> {
        let rows = sqlx::query_as::<_, ShiftRow>(
            r#"
            SELECT id, business_id, user_id, opening_cash, expected_closing_cash,
                   actual_closing_cash, cash_difference, status, started_at, ended_at
            FROM shifts
            WHERE business_id = $1
            ORDER BY started_at DESC
            "#,
        )
        .bind(business_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
