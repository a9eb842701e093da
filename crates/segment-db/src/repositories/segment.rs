//! PostgreSQL implementation of SegmentRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use segment_core::entities::Segment;
use segment_core::error::DomainError;
use segment_core::traits::{RepoResult, SegmentRepository};
use segment_core::value_objects::SegmentFilter;

use crate::models::SegmentModel;

use super::error::{map_check_violation, map_db_error};

/// PostgreSQL implementation of SegmentRepository
#[derive(Clone)]
pub struct PgSegmentRepository {
    pool: PgPool,
}

impl PgSegmentRepository {
    /// Create a new PgSegmentRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// `is_deleted` value a filter selects, `None` for every row
fn deleted_flag(filter: SegmentFilter) -> Option<bool> {
    match filter {
        SegmentFilter::Alive => Some(false),
        SegmentFilter::Deleted => Some(true),
        SegmentFilter::Both => None,
    }
}

#[async_trait]
impl SegmentRepository for PgSegmentRepository {
    #[instrument(skip(self))]
    async fn create(&self, name: &str) -> RepoResult<Segment> {
        let model = sqlx::query_as::<_, SegmentModel>(
            r"
            INSERT INTO segments (name)
            VALUES ($1)
            RETURNING id, name, is_deleted, created_at
            ",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if e.as_database_error().is_some_and(|db_err| db_err.is_unique_violation()) {
                DomainError::SegmentNameTaken(name.to_string())
            } else {
                map_check_violation(e)
            }
        })?;

        Ok(model.into())
    }

    #[instrument(skip(self))]
    async fn find_by_name(&self, name: &str) -> RepoResult<Option<Segment>> {
        let result = sqlx::query_as::<_, SegmentModel>(
            r"
            SELECT id, name, is_deleted, created_at
            FROM segments
            WHERE name = $1
            ",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: SegmentFilter) -> RepoResult<Vec<Segment>> {
        let results = sqlx::query_as::<_, SegmentModel>(
            r"
            SELECT id, name, is_deleted, created_at
            FROM segments
            WHERE $1::BOOLEAN IS NULL OR is_deleted = $1
            ORDER BY id
            ",
        )
        .bind(deleted_flag(filter))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn recover(&self, name: &str) -> RepoResult<Option<Segment>> {
        let result = sqlx::query_as::<_, SegmentModel>(
            r"
            UPDATE segments
            SET is_deleted = FALSE
            WHERE name = $1 AND is_deleted = TRUE
            RETURNING id, name, is_deleted, created_at
            ",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn soft_delete(&self, name: &str, closed_at: DateTime<Utc>) -> RepoResult<u64> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let segment_id = sqlx::query_scalar::<_, i64>(
            r"
            UPDATE segments
            SET is_deleted = TRUE
            WHERE name = $1 AND is_deleted = FALSE
            RETURNING id
            ",
        )
        .bind(name)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| DomainError::SegmentNotFound(name.to_string()))?;

        let closed = sqlx::query(
            r"
            UPDATE user_segments
            SET end_date = $2
            WHERE segment_id = $1 AND (end_date IS NULL OR end_date > $2)
            ",
        )
        .bind(segment_id)
        .bind(closed_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(closed.rows_affected())
    }

    #[instrument(skip(self, segment, user_ids), fields(segment = %segment.name, candidates = user_ids.len()))]
    async fn enroll_users(
        &self,
        segment: &Segment,
        user_ids: &[i64],
        started_at: DateTime<Utc>,
    ) -> RepoResult<u64> {
        if user_ids.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let alive = sqlx::query_scalar::<_, i64>(
            r"
            SELECT id FROM segments WHERE id = $1 AND is_deleted = FALSE FOR SHARE
            ",
        )
        .bind(segment.id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if alive.is_none() {
            return Err(DomainError::SegmentDeleted(segment.name.clone()));
        }

        let result = sqlx::query(
            r"
            INSERT INTO user_segments (user_id, segment_id, segment_name, start_date)
            SELECT u.id, $1, $2, $3
            FROM users u
            WHERE u.id = ANY($4) AND u.is_deleted = FALSE
              AND NOT EXISTS (
                  SELECT 1 FROM user_segments us
                  WHERE us.user_id = u.id AND us.segment_id = $1
                    AND (us.end_date IS NULL OR us.end_date > $3)
              )
            ON CONFLICT (user_id, segment_id) WHERE end_date IS NULL DO NOTHING
            ",
        )
        .bind(segment.id)
        .bind(&segment.name)
        .bind(started_at)
        .bind(user_ids)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgSegmentRepository>();
    }

    #[test]
    fn test_deleted_flag() {
        assert_eq!(deleted_flag(SegmentFilter::Alive), Some(false));
        assert_eq!(deleted_flag(SegmentFilter::Deleted), Some(true));
        assert_eq!(deleted_flag(SegmentFilter::Both), None);
    }
}
