//! Route definitions
//!
//! All API routes live under `/api/v1`; health probes and API docs sit at the root.

use axum::{
    routing::{get, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::docs::{ApiDoc, OPENAPI_JSON_PATH, SWAGGER_UI_PATH};
use crate::handlers::{health, reports, segments, users};
use crate::state::AppState;

/// Create the main API router with all routes (excluding health)
pub fn create_router() -> Router<AppState> {
    Router::new().nest("/api/v1", api_v1_routes())
}

/// Health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

/// OpenAPI document and Swagger UI
pub fn docs_routes() -> Router<AppState> {
    Router::new().merge(SwaggerUi::new(SWAGGER_UI_PATH).url(OPENAPI_JSON_PATH, ApiDoc::openapi()))
}

/// API v1 routes
fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(user_routes())
        .merge(segment_routes())
        .merge(report_routes())
}

/// User routes
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(users::create_user).get(users::list_users))
        .route("/users/segments", get(users::list_users_with_segments))
        .route("/users/:user_id", get(users::get_user).delete(users::delete_user))
        .route(
            "/users/:user_id/segments",
            get(users::get_user_segments).post(users::add_user_segments),
        )
        .route("/users/:user_id/segments/remove", post(users::remove_user_segments))
}

/// Segment routes
fn segment_routes() -> Router<AppState> {
    Router::new()
        .route("/segments", post(segments::create_segment).get(segments::list_segments))
        .route(
            "/segments/:name",
            get(segments::get_segment).delete(segments::delete_segment),
        )
}

/// Report routes
fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/reports", get(reports::get_report))
        .route("/reports/download", get(reports::download_report))
}
