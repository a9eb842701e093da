//! Path parameter extractors

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

use crate::response::ApiError;

/// User ID taken from the `:user_id` path segment
#[derive(Debug, Clone, Copy)]
pub struct UserIdPath(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for UserIdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_path(e.body_text()))?;

        raw.parse()
            .map(UserIdPath)
            .map_err(|_| ApiError::invalid_path(format!("Invalid user_id format: {raw}")))
    }
}

/// Segment name taken from the `:name` path segment, percent-decoded
#[derive(Debug, Clone)]
pub struct SegmentNamePath(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for SegmentNamePath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(name) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_path(e.body_text()))?;

        Ok(SegmentNamePath(name))
    }
}
