//! HTTP handlers for cashier shift endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::shift::{CashInflowInput, CloseShiftInput, OpenShiftInput, ShiftService};
use crate::AppState;
use shared::models::Shift;

/// Open a shift for the current user
pub async fn open_shift(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<OpenShiftInput>,
) -> AppResult<Json<Shift>> {
    let service = ShiftService::new(state.db);
    let shift = service
        .open_shift(current_user.0.business_id, current_user.0.user_id, input)
        .await?;
    Ok(Json(shift))
}

/// Close a shift with the counted drawer amount
pub async fn close_shift(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(shift_id): Path<Uuid>,
    Json(input): Json<CloseShiftInput>,
) -> AppResult<Json<Shift>> {
    let service = ShiftService::new(state.db);
    let shift = service
        .close_shift(current_user.0.business_id, shift_id, input)
        .await?;
    Ok(Json(shift))
}

/// Record a manual cash inflow against an open shift
pub async fn record_cash_inflow(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(shift_id): Path<Uuid>,
    Json(input): Json<CashInflowInput>,
) -> AppResult<Json<Shift>> {
    let service = ShiftService::new(state.db);
    let shift = service
        .record_cash_inflow(current_user.0.business_id, shift_id, input)
        .await?;
    Ok(Json(shift))
}

/// The current user's open shift, if any
pub async fn current_shift(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Option<Shift>>> {
    let service = ShiftService::new(state.db);
    let shift = service
        .current_shift(current_user.0.business_id, current_user.0.user_id)
        .await?;
    Ok(Json(shift))
}

/// List shifts for the business
pub async fn list_shifts(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Shift>>> {
    let service = ShiftService::new(state.db);
    let shifts = service.list_shifts(current_user.0.business_id).await?;
    Ok(Json(shifts))
}
