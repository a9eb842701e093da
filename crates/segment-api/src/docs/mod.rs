//! OpenAPI document and Swagger UI
//!
//! The document is served at `/api-docs/openapi.json` and browsable at `/swagger-ui`.

use segment_service::{
    AddSegmentsRequest, CreateSegmentRequest, CreateUserRequest, CreatedSegmentResponse,
    CreatedUserResponse, HealthChecks, HealthResponse, MembershipResponse,
    MembershipUpdateResponse, ReadinessResponse, RemoveSegmentsRequest, ReportResponse,
    SegmentEntry, SegmentResponse, UserResponse, UserWithSegmentsResponse,
};
use utoipa::OpenApi;

use crate::handlers::{health, reports, segments, users};
use crate::response::{ErrorBody, ErrorDetail};

/// Path of the generated OpenAPI document
pub const OPENAPI_JSON_PATH: &str = "/api-docs/openapi.json";

/// Mount point of the Swagger UI
pub const SWAGGER_UI_PATH: &str = "/swagger-ui";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Segment Service API",
        description = "User segmentation: segments, memberships with history, random percentage enrollment and CSV reports.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Users", description = "User lifecycle"),
        (name = "Memberships", description = "Adding users to and removing them from segments"),
        (name = "Segments", description = "Segment lifecycle and random enrollment"),
        (name = "Reports", description = "Membership history report"),
        (name = "Health", description = "Liveness and readiness checks"),
    ),
    paths(
        users::create_user,
        users::list_users,
        users::list_users_with_segments,
        users::get_user,
        users::delete_user,
        users::get_user_segments,
        users::add_user_segments,
        users::remove_user_segments,
        segments::create_segment,
        segments::list_segments,
        segments::get_segment,
        segments::delete_segment,
        reports::get_report,
        reports::download_report,
        health::health_check,
        health::readiness_check,
    ),
    components(schemas(
        CreateUserRequest,
        CreateSegmentRequest,
        SegmentEntry,
        AddSegmentsRequest,
        RemoveSegmentsRequest,
        UserResponse,
        CreatedUserResponse,
        MembershipResponse,
        UserWithSegmentsResponse,
        MembershipUpdateResponse,
        SegmentResponse,
        CreatedSegmentResponse,
        ReportResponse,
        HealthResponse,
        ReadinessResponse,
        HealthChecks,
        ErrorBody,
        ErrorDetail,
    ))
)]
pub struct ApiDoc;
