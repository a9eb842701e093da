//! Membership database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for user_segments table
#[derive(Debug, Clone, FromRow)]
pub struct MembershipModel {
    pub id: i64,
    pub user_id: i64,
    pub segment_id: i64,
    pub segment_name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
}
