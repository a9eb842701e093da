//! # segment-core
//!
//! Domain layer containing entities, value objects and repository traits for
//! user segmentation. This crate has zero dependencies on infrastructure
//! (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{Membership, NewMembership, NewUser, Segment, User, MAX_SEGMENT_NAME_CHARS};
pub use error::DomainError;
pub use traits::{RepoResult, ReportRepository, SegmentRepository, UserRepository};
pub use value_objects::{
    format_timestamp, parse_timestamp, SegmentFilter, SegmentFilterParseError, Sex,
    SexParseError, TIMESTAMP_FORMAT,
};
