//! Domain entities - core business objects

mod membership;
mod segment;
mod user;

pub use membership::{Membership, NewMembership};
pub use segment::{Segment, MAX_SEGMENT_NAME_CHARS};
pub use user::{NewUser, User};
