//! Request DTOs for API endpoints
//!
//! All request DTOs implement `Deserialize` and `Validate` for input validation.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

// ============================================================================
// User Requests
// ============================================================================

/// Create user request
///
/// `sex` and `age` are taken as wide integers so that out-of-range values
/// reach validation instead of failing deserialization.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 255, message = "\"first_name\" must be 1-255 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 255, message = "\"last_name\" must be 1-255 characters"))]
    pub last_name: String,

    /// 0 - male, 1 - female
    #[validate(range(min = 0, max = 1, message = "\"sex\" can only take a value from [0, 1]"))]
    pub sex: i64,

    #[validate(range(min = 0, max = 2_147_483_647, message = "\"age\" cannot be negative"))]
    pub age: i64,
}

// ============================================================================
// Segment Requests
// ============================================================================

/// Create segment request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateSegmentRequest {
    #[validate(length(min = 1, max = 1000, message = "\"name\" must be 1-1000 characters"))]
    pub name: String,

    /// Share of users, in percent, enrolled right after creation
    #[validate(range(min = 0, max = 100, message = "\"percentage\" must be within [0, 100]"))]
    pub percentage: Option<i64>,
}

/// Query string of the segment list endpoint
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SegmentListQuery {
    /// alive, deleted or both
    pub segment_type: Option<String>,
}

// ============================================================================
// Membership Requests
// ============================================================================

/// One segment to join
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SegmentEntry {
    pub name: String,

    /// `HH:MM:SS DD.MM.YYYY`; absent or empty means open-ended
    #[serde(default)]
    pub end_date: Option<String>,
}

/// Add a user to segments
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AddSegmentsRequest {
    #[validate(length(min = 1, message = "\"segments\" cannot be empty"))]
    pub segments: Vec<SegmentEntry>,
}

/// Remove a user from segments
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RemoveSegmentsRequest {
    #[validate(length(min = 1, message = "\"segments\" cannot be empty"))]
    pub segments: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_user_validation() {
        let valid: CreateUserRequest = serde_json::from_str(
            r#"{"first_name":"Ann","last_name":"Lee","sex":1,"age":0}"#,
        )
        .unwrap();
        assert!(valid.validate().is_ok());

        let bad_sex = CreateUserRequest { sex: 2, ..valid.clone() };
        assert!(bad_sex.validate().is_err());

        let negative_age = CreateUserRequest { age: -1, ..valid.clone() };
        assert!(negative_age.validate().is_err());

        let no_name = CreateUserRequest {
            first_name: String::new(),
            ..valid
        };
        assert!(no_name.validate().is_err());
    }

    #[test]
    fn test_segment_name_length_counts_characters() {
        let at_limit = CreateSegmentRequest {
            name: "я".repeat(1000),
            percentage: None,
        };
        assert!(at_limit.validate().is_ok());

        let over = CreateSegmentRequest {
            name: "я".repeat(1001),
            percentage: None,
        };
        assert!(over.validate().is_err());
    }

    #[test]
    fn test_percentage_bounds() {
        let request = |percentage| CreateSegmentRequest {
            name: "PROMO".to_string(),
            percentage,
        };
        assert!(request(None).validate().is_ok());
        assert!(request(Some(0)).validate().is_ok());
        assert!(request(Some(100)).validate().is_ok());
        assert!(request(Some(101)).validate().is_err());
        assert!(request(Some(-1)).validate().is_err());
    }

    #[test]
    fn test_add_segments_end_date_optional() {
        let request: AddSegmentsRequest = serde_json::from_str(
            r#"{"segments":[{"name":"PROMO"},{"name":"VOICE","end_date":"10:00:00 01.02.2030"}]}"#,
        )
        .unwrap();
        assert!(request.validate().is_ok());
        assert_eq!(request.segments[0].end_date, None);

        let empty: RemoveSegmentsRequest = serde_json::from_str(r#"{"segments":[]}"#).unwrap();
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_add_segments_rejects_empty_list() {
        let empty: AddSegmentsRequest = serde_json::from_str(r#"{"segments":[]}"#).unwrap();
        let errors = empty.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("segments"));
    }
}
