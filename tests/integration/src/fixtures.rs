//! Test fixtures and data generators
//!
//! Provides reusable request and response shapes for integration tests.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
///
/// Mixes in the wall clock so reruns against the same database do not collide.
pub fn unique_suffix() -> String {
    let micros = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros())
        .unwrap_or_default();
    format!("{micros}_{}", COUNTER.fetch_add(1, Ordering::SeqCst))
}

/// Unique segment name with the given prefix
pub fn unique_segment(prefix: &str) -> String {
    format!("{prefix}_{}", unique_suffix())
}

/// Create user request
#[derive(Debug, Serialize)]
pub struct CreateUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub sex: i64,
    pub age: i64,
}

impl CreateUserRequest {
    pub fn unique() -> Self {
        Self {
            first_name: format!("Ann{}", unique_suffix()),
            last_name: "Lee".to_string(),
            sex: 1,
            age: 30,
        }
    }
}

/// Create segment request
#[derive(Debug, Serialize)]
pub struct CreateSegmentRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<i64>,
}

impl CreateSegmentRequest {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            percentage: None,
        }
    }
}

/// One entry of an add-segments batch
#[derive(Debug, Serialize)]
pub struct SegmentEntry {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

/// Add segments request
#[derive(Debug, Serialize)]
pub struct AddSegmentsRequest {
    pub segments: Vec<SegmentEntry>,
}

impl AddSegmentsRequest {
    pub fn names(names: &[&str]) -> Self {
        Self {
            segments: names
                .iter()
                .map(|name| SegmentEntry {
                    name: (*name).to_string(),
                    end_date: None,
                })
                .collect(),
        }
    }
}

/// Remove segments request
#[derive(Debug, Serialize)]
pub struct RemoveSegmentsRequest {
    pub segments: Vec<String>,
}

impl RemoveSegmentsRequest {
    pub fn names(names: &[&str]) -> Self {
        Self {
            segments: names.iter().map(|name| (*name).to_string()).collect(),
        }
    }
}

/// Created user response
#[derive(Debug, Deserialize)]
pub struct CreatedUserResponse {
    pub id: i64,
}

/// User response
#[derive(Debug, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub sex: i16,
    pub sex_text: String,
    pub age: i32,
    pub is_deleted: bool,
}

/// Membership as listed for a user
#[derive(Debug, Deserialize)]
pub struct MembershipResponse {
    pub name: String,
    pub start_date: String,
    pub end_date: Option<String>,
}

/// User with memberships
#[derive(Debug, Deserialize)]
pub struct UserWithSegmentsResponse {
    pub id: i64,
    pub is_deleted: bool,
    pub segments: Vec<MembershipResponse>,
}

/// Membership batch result
#[derive(Debug, Deserialize)]
pub struct MembershipUpdateResponse {
    pub user_id: i64,
    pub affected: u64,
}

/// Segment response
#[derive(Debug, Deserialize)]
pub struct SegmentResponse {
    pub id: i64,
    pub name: String,
    pub is_deleted: bool,
}

/// Created segment response
#[derive(Debug, Deserialize)]
pub struct CreatedSegmentResponse {
    pub name: String,
    pub recovered: bool,
    pub enrolled: u64,
}

/// Report response
#[derive(Debug, Deserialize)]
pub struct ReportResponse {
    pub report_date: String,
    pub report: String,
}

/// Error envelope
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}
