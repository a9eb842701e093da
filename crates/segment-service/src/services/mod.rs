//! Business logic services
//!
//! This module contains all service layer implementations that handle
//! business logic, validation, and orchestration of domain operations.

pub mod context;
pub mod error;
pub mod membership;
pub mod report;
pub mod sampling;
pub mod segment;
pub mod user;

// Re-export all services for convenience
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ErrorKind, ServiceError, ServiceResult};
pub use membership::MembershipService;
pub use report::{report_file_name, Report, ReportService, REPORT_HEADER};
pub use sampling::sample_bernoulli;
pub use segment::SegmentService;
pub use user::UserService;
