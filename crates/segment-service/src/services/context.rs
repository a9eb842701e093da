//! Service context - dependency container for services
//!
//! Holds the repositories every service reads from and writes through.

use std::sync::Arc;

use segment_core::traits::{ReportRepository, SegmentRepository, UserRepository};

use super::error::{ServiceError, ServiceResult};

/// Service context containing all dependencies
#[derive(Clone)]
pub struct ServiceContext {
    user_repo: Arc<dyn UserRepository>,
    segment_repo: Arc<dyn SegmentRepository>,
    report_repo: Arc<dyn ReportRepository>,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        segment_repo: Arc<dyn SegmentRepository>,
        report_repo: Arc<dyn ReportRepository>,
    ) -> Self {
        Self {
            user_repo,
            segment_repo,
            report_repo,
        }
    }

    /// Get the user repository
    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    /// Get the segment repository
    pub fn segment_repo(&self) -> &dyn SegmentRepository {
        self.segment_repo.as_ref()
    }

    /// Get the report repository
    pub fn report_repo(&self) -> &dyn ReportRepository {
        self.report_repo.as_ref()
    }
}

/// Builder for ServiceContext
pub struct ServiceContextBuilder {
    user_repo: Option<Arc<dyn UserRepository>>,
    segment_repo: Option<Arc<dyn SegmentRepository>>,
    report_repo: Option<Arc<dyn ReportRepository>>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self {
            user_repo: None,
            segment_repo: None,
            report_repo: None,
        }
    }

    pub fn user_repo(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.user_repo = Some(repo);
        self
    }

    pub fn segment_repo(mut self, repo: Arc<dyn SegmentRepository>) -> Self {
        self.segment_repo = Some(repo);
        self
    }

    pub fn report_repo(mut self, repo: Arc<dyn ReportRepository>) -> Self {
        self.report_repo = Some(repo);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns a validation error if any repository is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        const AT: &str = "ServiceContextBuilder::build";
        Ok(ServiceContext::new(
            self.user_repo
                .ok_or_else(|| ServiceError::validation(AT, "user_repo is required"))?,
            self.segment_repo
                .ok_or_else(|| ServiceError::validation(AT, "segment_repo is required"))?,
            self.report_repo
                .ok_or_else(|| ServiceError::validation(AT, "report_repo is required"))?,
        ))
    }
}

impl Default for ServiceContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
