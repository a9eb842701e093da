//! Service layer error types
//!
//! Every failure leaving a service is a [`ServiceError`]: a kind used for
//! status mapping, a human readable comment, the logical location of the
//! failing check, and optionally the error that caused it.

use std::error::Error as StdError;
use std::fmt;

use segment_core::DomainError;

/// Error classification carried through to the transport layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input or a membership state collision
    Validation,
    UserNotFound,
    UserDeleted,
    SegmentNotFound,
    SegmentDeleted,
    /// A live segment already uses the name
    AlreadyExists,
    /// Storage or serialization failure
    Internal,
}

impl ErrorKind {
    /// Referenced entity does not exist at all
    pub fn is_not_found(self) -> bool {
        matches!(self, Self::UserNotFound | Self::SegmentNotFound)
    }

    /// Referenced entity exists but is soft-deleted
    pub fn is_deleted(self) -> bool {
        matches!(self, Self::UserDeleted | Self::SegmentDeleted)
    }

    /// Get the HTTP status code for this kind
    pub fn status_code(self) -> u16 {
        match self {
            Self::Validation => 400,
            Self::UserNotFound | Self::SegmentNotFound => 404,
            Self::UserDeleted | Self::SegmentDeleted => 404,
            Self::AlreadyExists => 409,
            Self::Internal => 500,
        }
    }

    /// Get the error code for API responses
    pub fn error_code(self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::UserDeleted => "USER_DELETED",
            Self::SegmentNotFound => "SEGMENT_NOT_FOUND",
            Self::SegmentDeleted => "SEGMENT_DELETED",
            Self::AlreadyExists => "SEGMENT_ALREADY_EXISTS",
            Self::Internal => "INTERNAL_ERROR",
        }
    }
}

/// Service layer error type
#[derive(Debug)]
pub struct ServiceError {
    kind: ErrorKind,
    comment: String,
    location: &'static str,
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl ServiceError {
    /// Create an error of the given kind
    pub fn new(kind: ErrorKind, location: &'static str, comment: impl Into<String>) -> Self {
        Self {
            kind,
            comment: comment.into(),
            location,
            source: None,
        }
    }

    /// Create a validation error
    pub fn validation(location: &'static str, comment: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, location, comment)
    }

    /// Create an internal error
    pub fn internal(location: &'static str, comment: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, location, comment)
    }

    /// Attach the error that caused this one
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Translate a storage error, recording where it surfaced
    pub fn from_domain(err: DomainError, location: &'static str) -> Self {
        let kind = match &err {
            DomainError::UserNotFound(_) => ErrorKind::UserNotFound,
            DomainError::SegmentNotFound(_) => ErrorKind::SegmentNotFound,
            DomainError::UserDeleted(_) => ErrorKind::UserDeleted,
            DomainError::SegmentDeleted(_) => ErrorKind::SegmentDeleted,
            DomainError::ValidationError(_)
            | DomainError::ActiveMembershipExists { .. }
            | DomainError::MembershipNotActive { .. } => ErrorKind::Validation,
            DomainError::SegmentNameTaken(_) => ErrorKind::AlreadyExists,
            DomainError::DatabaseError(_) | DomainError::InternalError(_) => ErrorKind::Internal,
        };
        let comment = if err.is_infrastructure() {
            "storage request failed".to_string()
        } else {
            err.to_string()
        };
        Self::new(kind, location, comment).with_source(err)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Human readable explanation
    pub fn comment(&self) -> &str {
        &self.comment
    }

    /// Logical location of the failing check
    pub fn location(&self) -> &'static str {
        self.location
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }

    /// Get the error code for API responses
    pub fn error_code(&self) -> &'static str {
        self.kind.error_code()
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at {})", self.comment, self.location)
    }
}

impl StdError for ServiceError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn StdError + 'static))
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        Self::from_domain(err, "repository")
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Attach a location to storage results
pub(crate) trait ResultExt<T> {
    fn at(self, location: &'static str) -> ServiceResult<T>;
}

impl<T> ResultExt<T> for Result<T, DomainError> {
    fn at(self, location: &'static str) -> ServiceResult<T> {
        self.map_err(|e| ServiceError::from_domain(e, location))
    }
}
