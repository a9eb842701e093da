//! Membership service
//!
//! Adds a user to segments and removes a user from segments. Every check
//! runs before anything is written, and a failing check rejects the whole
//! batch. The repository re-checks user, segment and membership state
//! inside its own transaction and writes all rows or none.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use segment_core::entities::{NewMembership, Segment};
use segment_core::parse_timestamp;
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::dto::{AddSegmentsRequest, RemoveSegmentsRequest};

use super::context::ServiceContext;
use super::error::{ErrorKind, ResultExt, ServiceError, ServiceResult};
use super::user::UserService;

/// Membership service
pub struct MembershipService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MembershipService<'a> {
    /// Create a new MembershipService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Add a user to segments.
    ///
    /// An entry with an `end_date` is inserted already scheduled to end. Fails
    /// if the user is already in any of the requested segments, naming all of
    /// them.
    #[instrument(skip(self, request), fields(segments = request.segments.len()))]
    pub async fn add(&self, user_id: i64, request: AddSegmentsRequest) -> ServiceResult<u64> {
        const AT: &str = "MembershipService::add";

        request
            .validate()
            .map_err(|e| ServiceError::validation(AT, e.to_string()).with_source(e))?;
        let names: Vec<&str> = request.segments.iter().map(|s| s.name.as_str()).collect();
        reject_repeated(&names, AT)?;

        let mut end_dates = Vec::with_capacity(request.segments.len());
        for entry in &request.segments {
            end_dates.push(parse_end_date(entry.end_date.as_deref(), AT)?);
        }

        UserService::new(self.ctx)
            .resolve_alive(user_id, AT)
            .await
            .map_err(|e| cancelled(e, user_id))?;
        let segments = self.resolve_segments(&names, user_id, AT).await?;

        let now = Utc::now();
        let active = self.active_segment_ids(user_id, now, AT).await?;
        let colliding: Vec<&str> = segments
            .iter()
            .filter(|s| active.contains(&s.id))
            .map(|s| s.name.as_str())
            .collect();
        if !colliding.is_empty() {
            warn!(user_id, ?colliding, "Add rejected, user already in segments");
            return Err(ServiceError::validation(
                AT,
                format!(
                    "Operation was canceled. Failed to add segments [{}] to user (id = {user_id}) \
                     since the user is already in them",
                    colliding.join(", ")
                ),
            ));
        }

        let entries: Vec<NewMembership> = segments
            .into_iter()
            .zip(end_dates)
            .map(|(segment, end_date)| NewMembership {
                segment_id: segment.id,
                segment_name: segment.name,
                end_date,
            })
            .collect();

        let added = self
            .ctx
            .user_repo()
            .add_memberships(user_id, &entries, now)
            .await
            .at(AT)?;

        info!(user_id, added, "User added to segments");

        Ok(added)
    }

    /// Remove a user from segments.
    ///
    /// Every active membership in the named segments is closed with one
    /// timestamp. Fails if the user is not in any of them, naming all of them.
    #[instrument(skip(self, request), fields(segments = request.segments.len()))]
    pub async fn remove(&self, user_id: i64, request: RemoveSegmentsRequest) -> ServiceResult<u64> {
        const AT: &str = "MembershipService::remove";

        request
            .validate()
            .map_err(|e| ServiceError::validation(AT, e.to_string()).with_source(e))?;
        let names: Vec<&str> = request.segments.iter().map(String::as_str).collect();
        reject_repeated(&names, AT)?;

        UserService::new(self.ctx)
            .resolve_alive(user_id, AT)
            .await
            .map_err(|e| cancelled(e, user_id))?;
        let segments = self.resolve_segments(&names, user_id, AT).await?;

        let now = Utc::now();
        let active = self
            .ctx
            .user_repo()
            .active_memberships(user_id, now)
            .await
            .at(AT)?;
        let active_ids: HashSet<i64> = active.iter().map(|m| m.segment_id).collect();

        let missing: Vec<&str> = segments
            .iter()
            .filter(|s| !active_ids.contains(&s.id))
            .map(|s| s.name.as_str())
            .collect();
        if !missing.is_empty() {
            warn!(user_id, ?missing, "Remove rejected, user not in segments");
            return Err(ServiceError::validation(
                AT,
                format!(
                    "Operation was canceled. Failed to remove user (id = {user_id}) from segments [{}] \
                     since the user is not in them",
                    missing.join(", ")
                ),
            ));
        }

        let requested: HashSet<i64> = segments.iter().map(|s| s.id).collect();
        let to_close: Vec<i64> = active
            .iter()
            .filter(|m| requested.contains(&m.segment_id))
            .map(|m| m.id)
            .collect();

        let closed = self
            .ctx
            .user_repo()
            .close_memberships(user_id, &to_close, now)
            .await
            .at(AT)?;

        info!(user_id, closed, "User removed from segments");

        Ok(closed)
    }

    /// Look up every named segment, failing on the first missing or deleted one
    async fn resolve_segments(
        &self,
        names: &[&str],
        user_id: i64,
        location: &'static str,
    ) -> ServiceResult<Vec<Segment>> {
        let mut segments = Vec::with_capacity(names.len());
        for &name in names {
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
                        format!(
                            "Operation was canceled. Segment \"{name}\" requested for user \
                             (id = {user_id}) does not exist"
                        ),
                    )
                })?;
            if segment.is_deleted {
                return Err(ServiceError::new(
                    ErrorKind::SegmentDeleted,
                    location,
                    format!(
                        "Operation was canceled. Segment \"{name}\" requested for user \
                         (id = {user_id}) was deleted and not created again"
                    ),
                ));
            }
            segments.push(segment);
        }
        Ok(segments)
    }

    async fn active_segment_ids(
        &self,
        user_id: i64,
        now: DateTime<Utc>,
        location: &'static str,
    ) -> ServiceResult<HashSet<i64>> {
        let active = self
            .ctx
            .user_repo()
            .active_memberships(user_id, now)
            .await
            .at(location)?;
        Ok(active.iter().map(|m| m.segment_id).collect())
    }
}

/// A batch naming the same segment twice is ambiguous
fn reject_repeated(names: &[&str], location: &'static str) -> ServiceResult<()> {
    let mut seen = HashSet::with_capacity(names.len());
    let mut repeated: Vec<&str> = Vec::new();
    for &name in names {
        if !seen.insert(name) && !repeated.contains(&name) {
            repeated.push(name);
        }
    }
    if repeated.is_empty() {
        Ok(())
    } else {
        Err(ServiceError::validation(
            location,
            format!("Segments listed more than once: [{}]", repeated.join(", ")),
        ))
    }
}

/// Empty means open-ended
fn parse_end_date(raw: Option<&str>, location: &'static str) -> ServiceResult<Option<DateTime<Utc>>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => parse_timestamp(text).map(Some).map_err(|e| {
            ServiceError::validation(
                location,
                format!(
                    "Operation was canceled. Invalid \"end_date\" = {text} was provided, \
                     expected HH:MM:SS DD.MM.YYYY"
                ),
            )
            .with_source(e)
        }),
    }
}

/// Reword user lookup failures for a batch that is being refused
fn cancelled(err: ServiceError, user_id: i64) -> ServiceError {
    let comment = match err.kind() {
        ErrorKind::UserNotFound => {
            format!("Operation was canceled because user with id = {user_id} does not exist")
        }
        ErrorKind::UserDeleted => {
            format!("Operation was canceled because user with id = {user_id} is deleted")
        }
        _ => return err,
    };
    ServiceError::new(err.kind(), err.location(), comment)
}
