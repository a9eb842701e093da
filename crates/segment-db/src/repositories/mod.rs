//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in segment-core.

mod error;
mod report;
mod segment;
mod user;

pub use report::PgReportRepository;
pub use segment::PgSegmentRepository;
pub use user::PgUserRepository;
