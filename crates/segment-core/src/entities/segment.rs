//! Segment entity - a named cohort of users

use chrono::{DateTime, Utc};

/// Maximum segment name length, counted in characters
pub const MAX_SEGMENT_NAME_CHARS: usize = 1000;

/// Segment record. The name is unique across alive and deleted rows, so
/// re-creating a deleted segment recovers the same row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub id: i64,
    pub name: String,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

impl Segment {
    #[inline]
    pub fn is_alive(&self) -> bool {
        !self.is_deleted
    }
}
