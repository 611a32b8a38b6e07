//! HTTP handlers for purchase and breakdown endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::purchase::{
    BreakdownInput, BreakdownOutcome, CreatePurchaseInput, PurchaseService, PurchaseWithLines,
};
use crate::AppState;
use shared::models::Purchase;

/// Record a purchase with its line items
pub async fn create_purchase(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreatePurchaseInput>,
) -> AppResult<Json<PurchaseWithLines>> {
    let service = PurchaseService::new(state.db);
    let purchase = service
        .create_purchase(current_user.0.business_id, current_user.0.user_id, input)
        .await?;
    Ok(Json(purchase))
}

/// List purchases for the business
pub async fn list_purchases(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Purchase>>> {
    let service = PurchaseService::new(state.db);
    let purchases = service.list_purchases(current_user.0.business_id).await?;
    Ok(Json(purchases))
}

/// Get a purchase with its line items
pub async fn get_purchase(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(purchase_id): Path<Uuid>,
) -> AppResult<Json<PurchaseWithLines>> {
    let service = PurchaseService::new(state.db);
    let purchase = service
        .get_purchase(current_user.0.business_id, purchase_id)
        .await?;
    Ok(Json(purchase))
}

/// Break a pending line item down into usable stock plus wastage
pub async fn breakdown_line_item(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(line_item_id): Path<Uuid>,
    Json(input): Json<BreakdownInput>,
) -> AppResult<Json<BreakdownOutcome>> {
    let service = PurchaseService::new(state.db);
    let outcome = service
        .breakdown_line_item(
            current_user.0.business_id,
            current_user.0.user_id,
            line_item_id,
            input,
        )
        .await?;
    Ok(Json(outcome))
}
