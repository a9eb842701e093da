//! User handlers
//!
//! Endpoints for users and their segment memberships.

use axum::{extract::State, Json};
use segment_service::{
    AddSegmentsRequest, CreateUserRequest, CreatedUserResponse, MembershipService,
    MembershipUpdateResponse, RemoveSegmentsRequest, UserResponse, UserService,
    UserWithSegmentsResponse,
};

use crate::extractors::{UserIdPath, ValidatedJson};
use crate::response::{ApiResult, Created, ErrorBody, NoContent};
use crate::state::AppState;

/// Create a new user
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "Users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = CreatedUserResponse),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody),
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateUserRequest>,
) -> ApiResult<Created<Json<CreatedUserResponse>>> {
    let service = UserService::new(state.service_context());
    let response = service.create(request).await?;
    Ok(Created(Json(response)))
}

/// List every user
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "Users",
    responses(
        (status = 200, description = "Every user, deleted ones included", body = Vec<UserResponse>),
        (status = 500, description = "Storage failure", body = ErrorBody),
    )
)]
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<UserResponse>>> {
    let service = UserService::new(state.service_context());
    Ok(Json(service.get_all().await?))
}

/// List every user with its active segments
#[utoipa::path(
    get,
    path = "/api/v1/users/segments",
    tag = "Users",
    responses(
        (status = 200, description = "Every user with its active segments", body = Vec<UserWithSegmentsResponse>),
        (status = 500, description = "Storage failure", body = ErrorBody),
    )
)]
pub async fn list_users_with_segments(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<UserWithSegmentsResponse>>> {
    let service = UserService::new(state.service_context());
    Ok(Json(service.get_all_with_active_segments().await?))
}

/// Get user by ID
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}",
    tag = "Users",
    params(
        ("user_id" = i64, Path, description = "User id"),
    ),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 404, description = "User not found or deleted", body = ErrorBody),
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    UserIdPath(user_id): UserIdPath,
) -> ApiResult<Json<UserResponse>> {
    let service = UserService::new(state.service_context());
    Ok(Json(service.get_by_id(user_id).await?))
}

/// Soft-delete a user
#[utoipa::path(
    delete,
    path = "/api/v1/users/{user_id}",
    tag = "Users",
    params(
        ("user_id" = i64, Path, description = "User id"),
    ),
    responses(
        (status = 204, description = "User deleted and its memberships closed"),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 404, description = "User not found or deleted", body = ErrorBody),
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    UserIdPath(user_id): UserIdPath,
) -> ApiResult<NoContent> {
    let service = UserService::new(state.service_context());
    service.delete(user_id).await?;
    Ok(NoContent)
}

/// Get a user with its active segments
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/segments",
    tag = "Memberships",
    params(
        ("user_id" = i64, Path, description = "User id"),
    ),
    responses(
        (status = 200, description = "User with its active segments", body = UserWithSegmentsResponse),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 404, description = "User not found or deleted", body = ErrorBody),
    )
)]
pub async fn get_user_segments(
    State(state): State<AppState>,
    UserIdPath(user_id): UserIdPath,
) -> ApiResult<Json<UserWithSegmentsResponse>> {
    let service = UserService::new(state.service_context());
    Ok(Json(service.get_with_segments(user_id).await?))
}

/// Add a user to segments
#[utoipa::path(
    post,
    path = "/api/v1/users/{user_id}/segments",
    tag = "Memberships",
    params(
        ("user_id" = i64, Path, description = "User id"),
    ),
    request_body = AddSegmentsRequest,
    responses(
        (status = 200, description = "Memberships opened", body = MembershipUpdateResponse),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 404, description = "User or segment not found or deleted", body = ErrorBody),
    )
)]
pub async fn add_user_segments(
    State(state): State<AppState>,
    UserIdPath(user_id): UserIdPath,
    ValidatedJson(request): ValidatedJson<AddSegmentsRequest>,
) -> ApiResult<Json<MembershipUpdateResponse>> {
    let service = MembershipService::new(state.service_context());
    let affected = service.add(user_id, request).await?;
    Ok(Json(MembershipUpdateResponse { user_id, affected }))
}

/// Remove a user from segments
#[utoipa::path(
    post,
    path = "/api/v1/users/{user_id}/segments/remove",
    tag = "Memberships",
    params(
        ("user_id" = i64, Path, description = "User id"),
    ),
    request_body = RemoveSegmentsRequest,
    responses(
        (status = 200, description = "Memberships closed", body = MembershipUpdateResponse),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 404, description = "User not found or deleted", body = ErrorBody),
    )
)]
pub async fn remove_user_segments(
    State(state): State<AppState>,
    UserIdPath(user_id): UserIdPath,
    ValidatedJson(request): ValidatedJson<RemoveSegmentsRequest>,
) -> ApiResult<Json<MembershipUpdateResponse>> {
    let service = MembershipService::new(state.service_context());
    let affected = service.remove(user_id, request).await?;
    Ok(Json(MembershipUpdateResponse { user_id, affected }))
}
