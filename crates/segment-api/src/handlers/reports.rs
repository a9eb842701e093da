//! Report handlers
//!
//! Endpoints for the membership history report.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use segment_service::{ReportResponse, ReportService};

use crate::response::{ApiResult, ErrorBody};
use crate::state::AppState;

/// Report with its generation date
#[utoipa::path(
    get,
    path = "/api/v1/reports",
    tag = "Reports",
    responses(
        (status = 200, description = "Full membership history as CSV text", body = ReportResponse),
        (status = 500, description = "Storage failure", body = ErrorBody),
    )
)]
pub async fn get_report(State(state): State<AppState>) -> ApiResult<Json<ReportResponse>> {
    let service = ReportService::new(state.service_context());
    Ok(Json(service.report_response().await?))
}

/// Report as a CSV attachment
#[utoipa::path(
    get,
    path = "/api/v1/reports/download",
    tag = "Reports",
    responses(
        (status = 200, description = "Full membership history", content_type = "text/csv", body = String),
        (status = 500, description = "Storage failure", body = ErrorBody),
    )
)]
pub async fn download_report(State(state): State<AppState>) -> ApiResult<Response> {
    let service = ReportService::new(state.service_context());
    let file = service.report_file().await?;

    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file.file_name),
        ),
    ];
    Ok((headers, file.content).into_response())
}
