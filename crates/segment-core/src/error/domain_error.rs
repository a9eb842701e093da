//! Domain errors - what the storage layer reports back to the services

use thiserror::Error;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("User not found: {0}")]
    UserNotFound(i64),

    #[error("Segment not found: {0}")]
    SegmentNotFound(String),

    // =========================================================================
    // Soft-delete State Errors
    // =========================================================================
    #[error("User is deleted: {0}")]
    UserDeleted(i64),

    #[error("Segment is deleted: {0}")]
    SegmentDeleted(String),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Segment name already taken: {0}")]
    SegmentNameTaken(String),

    #[error("User {user_id} already has an open membership in one of the requested segments")]
    ActiveMembershipExists { user_id: i64 },

    #[error("User {user_id} is no longer active in one of the requested segments")]
    MembershipNotActive { user_id: i64 },

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::UserNotFound(_) => "UNKNOWN_USER",
            Self::SegmentNotFound(_) => "UNKNOWN_SEGMENT",
            Self::UserDeleted(_) => "USER_DELETED",
            Self::SegmentDeleted(_) => "SEGMENT_DELETED",
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::SegmentNameTaken(_) => "SEGMENT_ALREADY_EXISTS",
            Self::ActiveMembershipExists { .. } => "MEMBERSHIP_ALREADY_ACTIVE",
            Self::MembershipNotActive { .. } => "MEMBERSHIP_NOT_ACTIVE",
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UserNotFound(_) | Self::SegmentNotFound(_))
    }

    /// Check if the referenced entity exists but is soft-deleted
    pub fn is_deleted(&self) -> bool {
        matches!(self, Self::UserDeleted(_) | Self::SegmentDeleted(_))
    }

    /// Check if this is a conflict with existing state
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::SegmentNameTaken(_)
                | Self::ActiveMembershipExists { .. }
                | Self::MembershipNotActive { .. }
        )
    }

    /// Check if this is an infrastructure failure
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, Self::DatabaseError(_) | Self::InternalError(_))
    }
}
