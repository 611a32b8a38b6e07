//! HTTP handlers for inventory batch and adjustment endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::adjustment::{
    AdjustStockInput, AdjustmentOutcome, StockAdjustmentService, StockTakeEntry, StockTakeReport,
};
use crate::services::costing::{CostingService, ResolvedCost};
use crate::services::inventory::{CreateBatchInput, InventoryService};
use crate::AppState;
use shared::models::{ConsumptionPlan, InventoryBatch, StockAdjustment};

/// Query parameters for the FIFO preview
#[derive(Debug, Deserialize)]
pub struct FifoPreviewQuery {
    pub quantity: Decimal,
}

/// Query parameters for listing adjustments
#[derive(Debug, Deserialize)]
pub struct ListAdjustmentsQuery {
    pub item_id: Option<Uuid>,
}

/// Record a batch outside the purchase flow
pub async fn create_batch(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateBatchInput>,
) -> AppResult<Json<InventoryBatch>> {
    let service = InventoryService::new(state.db);
    let batch = service.create_batch(current_user.0.business_id, input).await?;
    Ok(Json(batch))
}

/// List batches for an item, oldest first
pub async fn list_item_batches(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(item_id): Path<Uuid>,
) -> AppResult<Json<Vec<InventoryBatch>>> {
    let service = InventoryService::new(state.db);
    let batches = service
        .list_batches(current_user.0.business_id, item_id)
        .await?;
    Ok(Json(batches))
}

/// Preview which batches a sale quantity would consume
pub async fn fifo_preview(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(item_id): Path<Uuid>,
    Query(query): Query<FifoPreviewQuery>,
) -> AppResult<Json<ConsumptionPlan>> {
    let service = InventoryService::new(state.db);
    let plan = service
        .select_batches_for_sale(current_user.0.business_id, item_id, query.quantity)
        .await?;
    Ok(Json(plan))
}

/// Apply a delta-mode stock adjustment
pub async fn adjust_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<AdjustStockInput>,
) -> AppResult<Json<AdjustmentOutcome>> {
    let service = StockAdjustmentService::new(state.db);
    let outcome = service
        .adjust_stock(current_user.0.business_id, current_user.0.user_id, input)
        .await?;
    Ok(Json(outcome))
}

/// Apply a stock take across many items
pub async fn stock_take(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(entries): Json<Vec<StockTakeEntry>>,
) -> AppResult<Json<StockTakeReport>> {
    let service = StockAdjustmentService::new(state.db);
    let report = service
        .stock_take(current_user.0.business_id, current_user.0.user_id, entries)
        .await?;
    Ok(Json(report))
}

/// Resolve the current reporting cost for an item
pub async fn resolved_item_cost(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(item_id): Path<Uuid>,
) -> AppResult<Json<ResolvedCost>> {
    let service = CostingService::new(state.db);
    let cost = service
        .resolve_sale_line_cost(current_user.0.business_id, item_id, Decimal::ZERO)
        .await?;
    Ok(Json(cost))
}

/// List stock adjustments
pub async fn list_adjustments(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ListAdjustmentsQuery>,
) -> AppResult<Json<Vec<StockAdjustment>>> {
    let service = StockAdjustmentService::new(state.db);
    let adjustments = service
        .list_adjustments(current_user.0.business_id, query.item_id)
        .await?;
    Ok(Json(adjustments))
}
