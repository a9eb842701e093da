//! User database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for users table
#[derive(Debug, Clone, FromRow)]
pub struct UserModel {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub sex: i16,
    pub age: i32,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}
