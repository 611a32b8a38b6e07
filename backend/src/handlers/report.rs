//! HTTP handlers for reporting endpoints

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::reporting::{DailyProfitReport, ReportingService};
use crate::AppState;
use shared::models::{ProfitReport, ReportGrouping};
use shared::types::DateRange;

/// Query parameters for the profit report
#[derive(Debug, Deserialize)]
pub struct ProfitReportQuery {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub group_by: Option<String>,
}

/// Query parameters for the daily profit report
#[derive(Debug, Deserialize)]
pub struct DailyProfitQuery {
    pub months_back: Option<i32>,
    pub tz_offset_minutes: Option<i32>,
}

fn parse_grouping(group_by: Option<&str>) -> AppResult<ReportGrouping> {
    match group_by {
        None => Ok(ReportGrouping::Item),
        Some(value) => ReportGrouping::from_str(value).ok_or_else(|| AppError::Validation {
            field: "group_by".to_string(),
            message: "group_by must be 'item' or 'category'".to_string(),
            message_th: "group_by ต้องเป็น 'item' หรือ 'category'".to_string(),
        }),
    }
}

/// Profit report over a date range
pub async fn profit_report(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ProfitReportQuery>,
) -> AppResult<Json<ProfitReport>> {
    let grouping = parse_grouping(query.group_by.as_deref())?;
    let range = DateRange {
        start: query.start,
        end: query.end,
    };
    let service = ReportingService::new(state.db);
    let report = service
        .profit_report(current_user.0.business_id, range, grouping)
        .await?;
    Ok(Json(report))
}

/// Export the profit report groups as CSV
pub async fn export_profit_report(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ProfitReportQuery>,
) -> AppResult<Response> {
    let grouping = parse_grouping(query.group_by.as_deref())?;
    let range = DateRange {
        start: query.start,
        end: query.end,
    };
    let service = ReportingService::new(state.db);
    let report = service
        .profit_report(current_user.0.business_id, range, grouping)
        .await?;

    let csv_data = ReportingService::export_to_csv(&report.groups)?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"profit_report.csv\"",
            ),
        ],
        csv_data,
    )
        .into_response())
}

/// Daily profit buckets in the caller's local timezone
pub async fn daily_profit(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<DailyProfitQuery>,
) -> AppResult<Json<DailyProfitReport>> {
    let service = ReportingService::new(state.db);
    let report = service
        .daily_profit(
            current_user.0.business_id,
            query.months_back.unwrap_or(3),
            query.tz_offset_minutes.unwrap_or(0),
        )
        .await?;
    Ok(Json(report))
}
