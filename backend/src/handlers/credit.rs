//! HTTP handlers for credit account endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::credit::{
    CreateAccountInput, CreditService, PaymentOutcome, RecordPaymentInput,
};
use crate::AppState;
use shared::models::{CreditAccount, CreditTransaction};

/// Create a credit account
pub async fn create_credit_account(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateAccountInput>,
) -> AppResult<Json<CreditAccount>> {
    let service = CreditService::new(state.db);
    let account = service
        .create_account(current_user.0.business_id, input)
        .await?;
    Ok(Json(account))
}

/// List credit accounts
pub async fn list_credit_accounts(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<CreditAccount>>> {
    let service = CreditService::new(state.db);
    let accounts = service.list_accounts(current_user.0.business_id).await?;
    Ok(Json(accounts))
}

/// Record a payment against a credit account
pub async fn record_credit_payment(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(account_id): Path<Uuid>,
    Json(input): Json<RecordPaymentInput>,
) -> AppResult<Json<PaymentOutcome>> {
    let service = CreditService::new(state.db);
    let outcome = service
        .record_payment(
            current_user.0.business_id,
            current_user.0.user_id,
            account_id,
            input,
        )
        .await?;
    Ok(Json(outcome))
}

/// List transactions for a credit account
pub async fn list_credit_transactions(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(account_id): Path<Uuid>,
) -> AppResult<Json<Vec<CreditTransaction>>> {
    let service = CreditService::new(state.db);
    let transactions = service
        .list_transactions(current_user.0.business_id, account_id)
        .await?;
    Ok(Json(transactions))
}
