//! # segment-service
//!
//! Application layer containing the membership rules, segment and user
//! lifecycle, random enrollment, report generation and DTOs.

pub mod dto;
pub mod services;

pub use dto::{
    AddSegmentsRequest, CreateSegmentRequest, CreateUserRequest, CreatedSegmentResponse,
    CreatedUserResponse, HealthChecks, HealthResponse, MembershipResponse,
    MembershipUpdateResponse, ReadinessResponse, RemoveSegmentsRequest, ReportFile,
    ReportResponse, ReportRow, SegmentEntry, SegmentListQuery, SegmentResponse, UserResponse,
    UserWithSegmentsResponse,
};
pub use services::{
    ErrorKind, MembershipService, ReportService, SegmentService, ServiceContext,
    ServiceContextBuilder, ServiceError, ServiceResult, UserService,
};

#[cfg(test)]
pub(crate) mod test_support;
