//! Database models - SQLx-compatible structs for PostgreSQL tables

mod membership;
mod segment;
mod user;

pub use membership::MembershipModel;
pub use segment::SegmentModel;
pub use user::UserModel;
