//! Segment handlers
//!
//! Endpoints for segment management.

use axum::{
    extract::{Query, State},
    Json,
};
use segment_core::SegmentFilter;
use segment_service::{
    CreateSegmentRequest, CreatedSegmentResponse, SegmentListQuery, SegmentResponse,
    SegmentService,
};

use crate::extractors::{SegmentNamePath, ValidatedJson};
use crate::response::{ApiError, ApiResult, Created, ErrorBody, NoContent};
use crate::state::AppState;

/// Create a segment or recover a deleted one
#[utoipa::path(
    post,
    path = "/api/v1/segments",
    tag = "Segments",
    request_body = CreateSegmentRequest,
    responses(
        (status = 201, description = "Segment created or recovered", body = CreatedSegmentResponse),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 409, description = "A live segment already uses the name", body = ErrorBody),
    )
)]
pub async fn create_segment(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateSegmentRequest>,
) -> ApiResult<Created<Json<CreatedSegmentResponse>>> {
    let service = SegmentService::new(state.service_context());
    let response = service.create(request).await?;
    Ok(Created(Json(response)))
}

/// List segments
#[utoipa::path(
    get,
    path = "/api/v1/segments",
    tag = "Segments",
    params(
        SegmentListQuery,
    ),
    responses(
        (status = 200, description = "Segments passing the filter", body = Vec<SegmentResponse>),
        (status = 400, description = "Invalid input", body = ErrorBody),
    )
)]
pub async fn list_segments(
    State(state): State<AppState>,
    Query(query): Query<SegmentListQuery>,
) -> ApiResult<Json<Vec<SegmentResponse>>> {
    let filter = match query.segment_type.as_deref() {
        None => SegmentFilter::default(),
        Some(raw) => raw
            .parse::<SegmentFilter>()
            .map_err(|e| ApiError::invalid_query(e.to_string()))?,
    };

    let service = SegmentService::new(state.service_context());
    Ok(Json(service.list(filter).await?))
}

/// Get segment by name, deleted segments included
#[utoipa::path(
    get,
    path = "/api/v1/segments/{name}",
    tag = "Segments",
    params(
        ("name" = String, Path, description = "Segment name"),
    ),
    responses(
        (status = 200, description = "Segment found, possibly deleted", body = SegmentResponse),
        (status = 404, description = "Segment not found", body = ErrorBody),
    )
)]
pub async fn get_segment(
    State(state): State<AppState>,
    SegmentNamePath(name): SegmentNamePath,
) -> ApiResult<Json<SegmentResponse>> {
    let service = SegmentService::new(state.service_context());
    Ok(Json(service.get_by_name(&name).await?))
}

/// Soft-delete a segment
#[utoipa::path(
    delete,
    path = "/api/v1/segments/{name}",
    tag = "Segments",
    params(
        ("name" = String, Path, description = "Segment name"),
    ),
    responses(
        (status = 204, description = "Segment deleted and its memberships closed"),
        (status = 404, description = "Segment not found", body = ErrorBody),
    )
)]
pub async fn delete_segment(
    State(state): State<AppState>,
    SegmentNamePath(name): SegmentNamePath,
) -> ApiResult<NoContent> {
    let service = SegmentService::new(state.service_context());
    service.delete(&name).await?;
    Ok(NoContent)
}
