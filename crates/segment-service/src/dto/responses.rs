//! Response DTOs for API endpoints
//!
//! All response DTOs implement `Serialize` for JSON output. Membership and
//! report dates use the `HH:MM:SS DD.MM.YYYY` format.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

// ============================================================================
// User Responses
// ============================================================================

/// Full user information
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    /// 0 - male, 1 - female
    pub sex: i16,
    #[schema(value_type = String)]
    pub sex_text: &'static str,
    pub age: i32,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

/// Identifier of a newly created user
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreatedUserResponse {
    pub id: i64,
}

/// A segment the user is currently in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct MembershipResponse {
    pub name: String,
    pub start_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

/// User together with its active segments
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserWithSegmentsResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub segments: Vec<MembershipResponse>,
}

/// Outcome of an add or remove request
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MembershipUpdateResponse {
    pub user_id: i64,
    /// Memberships opened or closed
    pub affected: u64,
}

// ============================================================================
// Segment Responses
// ============================================================================

/// Segment information
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SegmentResponse {
    pub id: i64,
    pub name: String,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

/// Outcome of a segment create request
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreatedSegmentResponse {
    pub name: String,
    /// The name belonged to a deleted segment which was brought back
    pub recovered: bool,
    /// Users enrolled by random sampling
    pub enrolled: u64,
}

// ============================================================================
// Report Responses
// ============================================================================

/// One line of the membership history report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub user_id: i64,
    pub segment_name: String,
    pub start_date: String,
    /// Empty while the membership is open
    pub end_date: String,
}

/// Report in its JSON form
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReportResponse {
    pub report_date: String,
    /// CSV text
    pub report: String,
}

/// Report as a downloadable file
#[derive(Debug, Clone)]
pub struct ReportFile {
    pub file_name: String,
    pub content: String,
}

// ============================================================================
// Health Responses
// ============================================================================

/// Basic health check response
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Readiness check response
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub checks: HealthChecks,
}

/// Health check status for each dependency
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthChecks {
    pub database: String,
}

impl ReadinessResponse {
    pub fn ready(database_healthy: bool) -> Self {
        Self {
            status: if database_healthy { "ready" } else { "not_ready" }.to_string(),
            timestamp: Utc::now(),
            checks: HealthChecks {
                database: if database_healthy { "healthy" } else { "unhealthy" }.to_string(),
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}
