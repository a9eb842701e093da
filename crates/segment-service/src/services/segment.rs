//! Segment service
//!
//! Handles segment creation and recovery, listing, soft deletion and
//! random percentage enrollment.

use chrono::Utc;
use segment_core::entities::Segment;
use segment_core::{DomainError, SegmentFilter, MAX_SEGMENT_NAME_CHARS};
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::dto::{CreateSegmentRequest, CreatedSegmentResponse, SegmentResponse};

use super::context::ServiceContext;
use super::error::{ErrorKind, ResultExt, ServiceError, ServiceResult};
use super::sampling::sample_bernoulli;

/// How often create re-reads a name whose state changed under it
const CREATE_ATTEMPTS: usize = 3;

/// Segment service
pub struct SegmentService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> SegmentService<'a> {
    /// Create a new SegmentService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create a segment, or bring back a deleted one with the same name.
    ///
    /// With a positive `percentage` the segment then receives a random
    /// sample of the users.
    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create(&self, request: CreateSegmentRequest) -> ServiceResult<CreatedSegmentResponse> {
        const AT: &str = "SegmentService::create";

        request
            .validate()
            .map_err(|e| ServiceError::validation(AT, e.to_string()).with_source(e))?;
        validate_name(&request.name, AT)?;
        let percent = validate_percent(request.percentage, AT)?;

        let (segment, recovered) = self.create_or_recover(&request.name).await?;
        if recovered {
            info!(segment_id = segment.id, "Segment recovered");
        } else {
            info!(segment_id = segment.id, "Segment created");
        }

        let enrolled = if percent > 0 {
            self.enroll_random(&segment, percent).await?
        } else {
            0
        };

        Ok(CreatedSegmentResponse {
            name: segment.name,
            recovered,
            enrolled,
        })
    }

    /// Enroll a random share of the users into an alive segment
    #[instrument(skip(self))]
    pub async fn assign_random_percent(&self, name: &str, percentage: i64) -> ServiceResult<u64> {
        const AT: &str = "SegmentService::assign_random_percent";

        let percent = validate_percent(Some(percentage), AT)?;
        let segment = self.get_alive(name, AT).await?;
        self.enroll_random(&segment, percent).await
    }

    /// List segments matching the filter
    #[instrument(skip(self))]
    pub async fn list(&self, filter: SegmentFilter) -> ServiceResult<Vec<SegmentResponse>> {
        let segments = self
            .ctx
            .segment_repo()
            .list(filter)
            .await
            .at("SegmentService::list")?;
        Ok(segments.iter().map(SegmentResponse::from).collect())
    }

    /// Get a segment by name, deleted segments included
    #[instrument(skip(self))]
    pub async fn get_by_name(&self, name: &str) -> ServiceResult<SegmentResponse> {
        const AT: &str = "SegmentService::get_by_name";

        let segment = self
            .ctx
            .segment_repo()
            .find_by_name(name)
            .await
            .at(AT)?
            .ok_or_else(|| {
                ServiceError::new(
                    ErrorKind::SegmentNotFound,
                    AT,
                    format!("Segment \"{name}\" does not exist"),
                )
            })?;
        Ok(SegmentResponse::from(&segment))
    }

    /// Soft-delete a segment and close every active membership in it
    #[instrument(skip(self))]
    pub async fn delete(&self, name: &str) -> ServiceResult<()> {
        const AT: &str = "SegmentService::delete";

        let missing = || {
            ServiceError::new(
                ErrorKind::SegmentNotFound,
                AT,
                format!("Unable to delete segment \"{name}\" because it does not exist"),
            )
        };

        let segment = self
            .ctx
            .segment_repo()
            .find_by_name(name)
            .await
            .at(AT)?
            .ok_or_else(missing)?;
        if segment.is_deleted {
            return Err(ServiceError::new(
                ErrorKind::SegmentNotFound,
                AT,
                format!(
                    "Unable to delete segment \"{name}\" because it does not exist \
                     (it was deleted earlier and not created again)"
                ),
            ));
        }

        let closed = match self.ctx.segment_repo().soft_delete(name, Utc::now()).await {
            Ok(closed) => closed,
            Err(DomainError::SegmentNotFound(_)) => return Err(missing()),
            Err(e) => return Err(ServiceError::from_domain(e, AT)),
        };

        info!(segment_id = segment.id, closed_memberships = closed, "Segment deleted");

        Ok(())
    }

    /// Insert a fresh segment or recover a deleted one.
    ///
    /// Concurrent requests on the same name can move it between states; on a
    /// lost race the name is read again and the decision retaken.
    async fn create_or_recover(&self, name: &str) -> ServiceResult<(Segment, bool)> {
        const AT: &str = "SegmentService::create";
        let repo = self.ctx.segment_repo();

        for attempt in 1..=CREATE_ATTEMPTS {
            match repo.find_by_name(name).await.at(AT)? {
                Some(existing) if existing.is_alive() => {
                    return Err(ServiceError::new(
                        ErrorKind::AlreadyExists,
                        AT,
                        format!("Segment with the name \"{name}\" already exists"),
                    ));
                }
                Some(_) => {
                    if let Some(recovered) = repo.recover(name).await.at(AT)? {
                        return Ok((recovered, true));
                    }
                }
                None => match repo.create(name).await {
                    Ok(created) => return Ok((created, false)),
                    Err(DomainError::SegmentNameTaken(_)) => {}
                    Err(e) => return Err(ServiceError::from_domain(e, AT)),
                },
            }
            warn!(attempt, "Segment changed state during create, retrying");
        }

        Err(ServiceError::internal(
            AT,
            format!("Segment \"{name}\" kept changing state, giving up"),
        ))
    }

    /// Sample alive users and open memberships for them
    async fn enroll_random(&self, segment: &Segment, percent: u32) -> ServiceResult<u64> {
        const AT: &str = "SegmentService::enroll_random";

        let candidates = self.ctx.user_repo().find_alive_ids().await.at(AT)?;
        // ThreadRng is not Send; keep it out of the awaits.
        let sampled = {
            let mut rng = rand::thread_rng();
            sample_bernoulli(&candidates, percent, &mut rng)?
        };

        let enrolled = self
            .ctx
            .segment_repo()
            .enroll_users(segment, &sampled, Utc::now())
            .await
            .at(AT)?;

        info!(
            segment_id = segment.id,
            percent,
            candidates = candidates.len(),
            enrolled,
            "Users enrolled by random sampling"
        );

        Ok(enrolled)
    }

    async fn get_alive(&self, name: &str, location: &'static str) -> ServiceResult<Segment> {
        let segment = self
            .ctx
            .segment_repo()
            .find_by_name(name)
            .await
            .at(location)?
            .ok_or_else(|| {
                ServiceError::new(
                    ErrorKind::SegmentNotFound,
                    location,
                    format!("Segment \"{name}\" does not exist"),
                )
            })?;
        if segment.is_deleted {
            return Err(ServiceError::new(
                ErrorKind::SegmentDeleted,
                location,
                format!("Segment \"{name}\" is deleted"),
            ));
        }
        Ok(segment)
    }
}

fn validate_name(name: &str, location: &'static str) -> ServiceResult<()> {
    if name.is_empty() {
        return Err(ServiceError::validation(location, "\"name\" cannot be empty"));
    }
    let chars = name.chars().count();
    if chars > MAX_SEGMENT_NAME_CHARS {
        return Err(ServiceError::validation(
            location,
            format!("\"name\" is {chars} characters long, at most {MAX_SEGMENT_NAME_CHARS} allowed"),
        ));
    }
    Ok(())
}

fn validate_percent(percentage: Option<i64>, location: &'static str) -> ServiceResult<u32> {
    match percentage {
        None => Ok(0),
        Some(p @ 0..=100) => Ok(p as u32),
        Some(p) => Err(ServiceError::validation(
            location,
            format!("\"percentage\" must be within [0, 100], got {p}"),
        )),
    }
}
