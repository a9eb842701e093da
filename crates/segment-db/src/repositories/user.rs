//! PostgreSQL implementation of UserRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;

use segment_core::entities::{Membership, NewMembership, NewUser, User};
use segment_core::error::DomainError;
use segment_core::traits::{RepoResult, UserRepository};

use crate::mappers::users_from_models;
use crate::models::{MembershipModel, UserModel};

use super::error::{map_check_violation, map_db_error, map_unique_violation};

/// PostgreSQL implementation of UserRepository
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new PgUserRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lock the user row for the rest of the transaction and require it to be alive.
    ///
    /// Every membership mutation of one user goes through this lock, so the
    /// checks made inside the transaction cannot be invalidated concurrently.
    async fn lock_alive_user(tx: &mut Transaction<'_, Postgres>, user_id: i64) -> RepoResult<()> {
        let is_deleted = sqlx::query_scalar::<_, bool>(
            r"
            SELECT is_deleted FROM users WHERE id = $1 FOR UPDATE
            ",
        )
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(map_db_error)?;

        match is_deleted {
            None => Err(DomainError::UserNotFound(user_id)),
            Some(true) => Err(DomainError::UserDeleted(user_id)),
            Some(false) => Ok(()),
        }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    #[instrument(skip(self))]
    async fn create(&self, user: &NewUser) -> RepoResult<User> {
        let model = sqlx::query_as::<_, UserModel>(
            r"
            INSERT INTO users (first_name, last_name, sex, age)
            VALUES ($1, $2, $3, $4)
            RETURNING id, first_name, last_name, sex, age, is_deleted, created_at
            ",
        )
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.sex.code())
        .bind(user.age)
        .fetch_one(&self.pool)
        .await
        .map_err(map_check_violation)?;

        User::try_from(model)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<User>> {
        let result = sqlx::query_as::<_, UserModel>(
            r"
            SELECT id, first_name, last_name, sex, age, is_deleted, created_at
            FROM users
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(User::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> RepoResult<Vec<User>> {
        let results = sqlx::query_as::<_, UserModel>(
            r"
            SELECT id, first_name, last_name, sex, age, is_deleted, created_at
            FROM users
            ORDER BY id
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        users_from_models(results)
    }

    #[instrument(skip(self))]
    async fn find_alive_ids(&self) -> RepoResult<Vec<i64>> {
        sqlx::query_scalar::<_, i64>(
            r"
            SELECT id FROM users WHERE is_deleted = FALSE ORDER BY id
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn active_memberships(&self, user_id: i64, now: DateTime<Utc>) -> RepoResult<Vec<Membership>> {
        let results = sqlx::query_as::<_, MembershipModel>(
            r"
            SELECT id, user_id, segment_id, segment_name, start_date, end_date
            FROM user_segments
            WHERE user_id = $1 AND (end_date IS NULL OR end_date > $2)
            ORDER BY start_date, id
            ",
        )
        .bind(user_id)
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Membership::from).collect())
    }

    #[instrument(skip(self))]
    async fn all_active_memberships(&self, now: DateTime<Utc>) -> RepoResult<Vec<Membership>> {
        let results = sqlx::query_as::<_, MembershipModel>(
            r"
            SELECT id, user_id, segment_id, segment_name, start_date, end_date
            FROM user_segments
            WHERE end_date IS NULL OR end_date > $1
            ORDER BY user_id, start_date, id
            ",
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Membership::from).collect())
    }

    #[instrument(skip(self, memberships), fields(count = memberships.len()))]
    async fn add_memberships(
        &self,
        user_id: i64,
        memberships: &[NewMembership],
        started_at: DateTime<Utc>,
    ) -> RepoResult<u64> {
        if memberships.is_empty() {
            return Ok(0);
        }

        let segment_ids: Vec<i64> = memberships.iter().map(|m| m.segment_id).collect();

        // Dropping the transaction without commit rolls back every insert below.
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;
        Self::lock_alive_user(&mut tx, user_id).await?;

        // Segments must still be alive; FOR SHARE blocks a concurrent soft delete.
        let alive_ids = sqlx::query_scalar::<_, i64>(
            r"
            SELECT id FROM segments
            WHERE id = ANY($1) AND is_deleted = FALSE
            FOR SHARE
            ",
        )
        .bind(&segment_ids)
        .fetch_all(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if let Some(gone) = memberships.iter().find(|m| !alive_ids.contains(&m.segment_id)) {
            return Err(DomainError::SegmentDeleted(gone.segment_name.clone()));
        }

        let already_active = sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS(
                SELECT 1 FROM user_segments
                WHERE user_id = $1 AND segment_id = ANY($2)
                  AND (end_date IS NULL OR end_date > $3)
            )
            ",
        )
        .bind(user_id)
        .bind(&segment_ids)
        .bind(started_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if already_active {
            return Err(DomainError::ActiveMembershipExists { user_id });
        }

        let mut inserted = 0;
        for membership in memberships {
            let result = sqlx::query(
                r"
                INSERT INTO user_segments (user_id, segment_id, segment_name, start_date, end_date)
                VALUES ($1, $2, $3, $4, $5)
                ",
            )
            .bind(user_id)
            .bind(membership.segment_id)
            .bind(&membership.segment_name)
            .bind(started_at)
            .bind(membership.end_date)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_unique_violation(e, || DomainError::ActiveMembershipExists { user_id }))?;

            inserted += result.rows_affected();
        }

        tx.commit().await.map_err(map_db_error)?;

        Ok(inserted)
    }

    #[instrument(skip(self))]
    async fn close_memberships(
        &self,
        user_id: i64,
        membership_ids: &[i64],
        closed_at: DateTime<Utc>,
    ) -> RepoResult<u64> {
        if membership_ids.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await.map_err(map_db_error)?;
        Self::lock_alive_user(&mut tx, user_id).await?;

        let result = sqlx::query(
            r"
            UPDATE user_segments
            SET end_date = $3
            WHERE user_id = $1 AND id = ANY($2)
              AND (end_date IS NULL OR end_date > $3)
            ",
        )
        .bind(user_id)
        .bind(membership_ids)
        .bind(closed_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        // All or nothing: a record closed by someone else aborts the batch.
        if result.rows_affected() != membership_ids.len() as u64 {
            return Err(DomainError::MembershipNotActive { user_id });
        }

        tx.commit().await.map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn soft_delete(&self, user_id: i64, closed_at: DateTime<Utc>) -> RepoResult<u64> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;
        Self::lock_alive_user(&mut tx, user_id).await?;

        sqlx::query(
            r"
            UPDATE users SET is_deleted = TRUE WHERE id = $1
            ",
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let closed = sqlx::query(
            r"
            UPDATE user_segments
            SET end_date = $2
            WHERE user_id = $1 AND (end_date IS NULL OR end_date > $2)
            ",
        )
        .bind(user_id)
        .bind(closed_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(closed.rows_affected())
    }
}
