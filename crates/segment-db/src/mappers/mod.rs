//! Model to entity mappers
//!
//! Conversions from database rows to domain entities. User rows go through
//! `TryFrom` because the stored sex code is validated on the way out.

mod membership;
mod segment;
mod user;

pub use user::users_from_models;
