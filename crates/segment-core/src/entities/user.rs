//! User entity - a person that can be placed into segments

use chrono::{DateTime, Utc};

use crate::value_objects::Sex;

/// User record. Users are never hard-deleted, only flagged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub sex: Sex,
    pub age: i32,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Full display name
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Attributes of a user that has not been stored yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub sex: Sex,
    pub age: i32,
}

impl NewUser {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>, sex: Sex, age: i32) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            sex,
            age,
        }
    }
}
