//! HTTP handlers for sale endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::sale::{RecordSaleInput, SaleReceipt, SaleService};
use crate::AppState;
use shared::models::Sale;
use shared::types::{PaginatedResponse, Pagination};

/// Query parameters for listing sales
#[derive(Debug, Deserialize)]
pub struct ListSalesQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Record a completed sale
pub async fn record_sale(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<RecordSaleInput>,
) -> AppResult<Json<SaleReceipt>> {
    let service = SaleService::new(state.db);
    let receipt = service
        .record_sale(current_user.0.business_id, current_user.0.user_id, input)
        .await?;
    Ok(Json(receipt))
}

/// List sales for the business
pub async fn list_sales(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ListSalesQuery>,
) -> AppResult<Json<PaginatedResponse<Sale>>> {
    let defaults = Pagination::default();
    let pagination = Pagination {
        page: query.page.unwrap_or(defaults.page),
        per_page: query.per_page.unwrap_or(defaults.per_page),
    };
    let service = SaleService::new(state.db);
    let sales = service
        .list_sales(current_user.0.business_id, &pagination)
        .await?;
    Ok(Json(sales))
}

/// Get a sale with its lines
pub async fn get_sale(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(sale_id): Path<Uuid>,
) -> AppResult<Json<SaleReceipt>> {
    let service = SaleService::new(state.db);
    let receipt = service.get_sale(current_user.0.business_id, sale_id).await?;
    Ok(Json(receipt))
}

/// Void a completed sale
pub async fn void_sale(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(sale_id): Path<Uuid>,
) -> AppResult<Json<Sale>> {
    let service = SaleService::new(state.db);
    let sale = service.void_sale(current_user.0.business_id, sale_id).await?;
    Ok(Json(sale))
}
