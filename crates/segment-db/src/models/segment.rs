//! Segment database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for segments table
#[derive(Debug, Clone, FromRow)]
pub struct SegmentModel {
    pub id: i64,
    pub name: String,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}
