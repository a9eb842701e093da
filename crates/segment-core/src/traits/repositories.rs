//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation. Every multi-row mutation below is atomic:
//! either all rows change or none do.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{Membership, NewMembership, NewUser, Segment, User};
use crate::error::DomainError;
use crate::value_objects::SegmentFilter;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// User Repository
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user and return the stored row
    async fn create(&self, user: &NewUser) -> RepoResult<User>;

    /// Find user by ID, soft-deleted users included
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<User>>;

    /// List every user ordered by ID
    async fn find_all(&self) -> RepoResult<Vec<User>>;

    /// IDs of users that are not soft-deleted
    async fn find_alive_ids(&self) -> RepoResult<Vec<i64>>;

    /// Memberships of one user that are active at `now`
    async fn active_memberships(&self, user_id: i64, now: DateTime<Utc>) -> RepoResult<Vec<Membership>>;

    /// Memberships of every user that are active at `now`
    async fn all_active_memberships(&self, now: DateTime<Utc>) -> RepoResult<Vec<Membership>>;

    /// Insert memberships for a user, all starting at `started_at`.
    ///
    /// The user and segments are re-checked under lock: fails with
    /// `UserNotFound`/`UserDeleted`, `SegmentDeleted`, or `ActiveMembershipExists`
    /// if any requested segment is already active for the user.
    async fn add_memberships(
        &self,
        user_id: i64,
        memberships: &[NewMembership],
        started_at: DateTime<Utc>,
    ) -> RepoResult<u64>;

    /// Close the given active memberships of a user at `closed_at`.
    ///
    /// Fails with `MembershipNotActive` if any record is no longer active.
    async fn close_memberships(
        &self,
        user_id: i64,
        membership_ids: &[i64],
        closed_at: DateTime<Utc>,
    ) -> RepoResult<u64>;

    /// Flag a user as deleted and close its active memberships at `closed_at`.
    /// Returns the number of memberships closed. Fails with `UserNotFound` or
    /// `UserDeleted` if there is no alive user with that ID.
    async fn soft_delete(&self, user_id: i64, closed_at: DateTime<Utc>) -> RepoResult<u64>;
}

// ============================================================================
// Segment Repository
// ============================================================================

#[async_trait]
pub trait SegmentRepository: Send + Sync {
    /// Insert a new alive segment. Fails with `SegmentNameTaken` if any row,
    /// deleted or not, already uses the name.
    async fn create(&self, name: &str) -> RepoResult<Segment>;

    /// Find segment by name, soft-deleted segments included
    async fn find_by_name(&self, name: &str) -> RepoResult<Option<Segment>>;

    /// List segments passing the filter, ordered by ID
    async fn list(&self, filter: SegmentFilter) -> RepoResult<Vec<Segment>>;

    /// Clear the deletion flag of a deleted segment.
    /// Returns `None` if no deleted segment with that name exists.
    async fn recover(&self, name: &str) -> RepoResult<Option<Segment>>;

    /// Flag an alive segment as deleted and close all its active memberships
    /// with the single timestamp `closed_at`. Returns the number closed.
    /// Fails with `SegmentNotFound` if no alive segment has that name.
    async fn soft_delete(&self, name: &str, closed_at: DateTime<Utc>) -> RepoResult<u64>;

    /// Open a membership in `segment` for each listed user, starting at
    /// `started_at`. Deleted users and users that already hold an open
    /// membership are skipped. Fails with `SegmentDeleted` if the segment was
    /// deleted in the meantime.
    /// Returns the number of memberships created.
    async fn enroll_users(
        &self,
        segment: &Segment,
        user_ids: &[i64],
        started_at: DateTime<Utc>,
    ) -> RepoResult<u64>;
}

// ============================================================================
// Report Repository
// ============================================================================

#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Every membership record ever created, ordered by start date then ID
    async fn membership_history(&self) -> RepoResult<Vec<Membership>>;
}
