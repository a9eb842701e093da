//! Route handlers
//!
//! All HTTP request handlers organized by domain.

pub mod health;
pub mod reports;
pub mod segments;
pub mod users;
