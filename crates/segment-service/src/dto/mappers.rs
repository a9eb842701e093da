//! Entity to DTO conversions

use segment_core::entities::{Membership, Segment, User};
use segment_core::format_timestamp;

use super::responses::{MembershipResponse, ReportRow, SegmentResponse, UserResponse};

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            sex: user.sex.code(),
            sex_text: user.sex.as_str(),
            age: user.age,
            is_deleted: user.is_deleted,
            created_at: user.created_at,
        }
    }
}

impl From<&Segment> for SegmentResponse {
    fn from(segment: &Segment) -> Self {
        Self {
            id: segment.id,
            name: segment.name.clone(),
            is_deleted: segment.is_deleted,
            created_at: segment.created_at,
        }
    }
}

impl From<&Membership> for MembershipResponse {
    fn from(membership: &Membership) -> Self {
        Self {
            name: membership.segment_name.clone(),
            start_date: format_timestamp(&membership.start_date),
            end_date: membership.end_date.as_ref().map(format_timestamp),
        }
    }
}

impl From<&Membership> for ReportRow {
    fn from(membership: &Membership) -> Self {
        Self {
            user_id: membership.user_id,
            segment_name: membership.segment_name.clone(),
            start_date: format_timestamp(&membership.start_date),
            end_date: membership
                .end_date
                .as_ref()
                .map(format_timestamp)
                .unwrap_or_default(),
        }
    }
}
