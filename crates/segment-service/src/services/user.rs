//! User service
//!
//! Handles user creation, soft deletion and the read paths that show which
//! segments a user is in.

use std::collections::HashMap;

use chrono::Utc;
use segment_core::entities::{NewUser, User};
use segment_core::Sex;
use tracing::{info, instrument};
use validator::Validate;

use crate::dto::{CreateUserRequest, CreatedUserResponse, MembershipResponse, UserResponse, UserWithSegmentsResponse};

use super::context::ServiceContext;
use super::error::{ErrorKind, ResultExt, ServiceError, ServiceResult};

/// User service
pub struct UserService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> UserService<'a> {
    /// Create a new UserService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create a new user
    #[instrument(skip(self, request))]
    pub async fn create(&self, request: CreateUserRequest) -> ServiceResult<CreatedUserResponse> {
        const AT: &str = "UserService::create";

        request
            .validate()
            .map_err(|e| ServiceError::validation(AT, e.to_string()).with_source(e))?;
        let sex = Sex::try_from(request.sex)
            .map_err(|e| ServiceError::validation(AT, e.to_string()).with_source(e))?;
        let age = i32::try_from(request.age)
            .map_err(|e| ServiceError::validation(AT, "\"age\" is out of range").with_source(e))?;

        let new_user = NewUser::new(request.first_name, request.last_name, sex, age);
        let user = self.ctx.user_repo().create(&new_user).await.at(AT)?;

        info!(user_id = user.id, "User created");

        Ok(CreatedUserResponse { id: user.id })
    }

    /// Get a user that is not deleted
    #[instrument(skip(self))]
    pub async fn get_by_id(&self, user_id: i64) -> ServiceResult<UserResponse> {
        let user = self.resolve_alive(user_id, "UserService::get_by_id").await?;
        Ok(UserResponse::from(&user))
    }

    /// List every user, deleted ones included
    #[instrument(skip(self))]
    pub async fn get_all(&self) -> ServiceResult<Vec<UserResponse>> {
        let users = self
            .ctx
            .user_repo()
            .find_all()
            .await
            .at("UserService::get_all")?;
        Ok(users.iter().map(UserResponse::from).collect())
    }

    /// Segments the user is in right now
    #[instrument(skip(self))]
    pub async fn get_active_segments(&self, user_id: i64) -> ServiceResult<Vec<MembershipResponse>> {
        const AT: &str = "UserService::get_active_segments";

        if self.ctx.user_repo().find_by_id(user_id).await.at(AT)?.is_none() {
            return Err(unknown_user(user_id, AT));
        }
        let memberships = self
            .ctx
            .user_repo()
            .active_memberships(user_id, Utc::now())
            .await
            .at(AT)?;
        Ok(memberships.iter().map(MembershipResponse::from).collect())
    }

    /// A user that is not deleted, with its active segments
    #[instrument(skip(self))]
    pub async fn get_with_segments(&self, user_id: i64) -> ServiceResult<UserWithSegmentsResponse> {
        const AT: &str = "UserService::get_with_segments";

        let user = self.resolve_alive(user_id, AT).await?;
        let memberships = self
            .ctx
            .user_repo()
            .active_memberships(user_id, Utc::now())
            .await
            .at(AT)?;

        Ok(UserWithSegmentsResponse {
            user: UserResponse::from(&user),
            segments: memberships.iter().map(MembershipResponse::from).collect(),
        })
    }

    /// Every user with its active segments
    #[instrument(skip(self))]
    pub async fn get_all_with_active_segments(&self) -> ServiceResult<Vec<UserWithSegmentsResponse>> {
        const AT: &str = "UserService::get_all_with_active_segments";

        let now = Utc::now();
        let users = self.ctx.user_repo().find_all().await.at(AT)?;
        let memberships = self.ctx.user_repo().all_active_memberships(now).await.at(AT)?;

        let mut by_user: HashMap<i64, Vec<MembershipResponse>> = HashMap::new();
        for membership in &memberships {
            by_user
                .entry(membership.user_id)
                .or_default()
                .push(MembershipResponse::from(membership));
        }

        Ok(users
            .iter()
            .map(|user| UserWithSegmentsResponse {
                user: UserResponse::from(user),
                segments: by_user.remove(&user.id).unwrap_or_default(),
            })
            .collect())
    }

    /// Soft-delete a user and end all of its memberships
    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: i64) -> ServiceResult<()> {
        const AT: &str = "UserService::delete";

        let closed = self
            .ctx
            .user_repo()
            .soft_delete(user_id, Utc::now())
            .await
            .map_err(|e| match ServiceError::from_domain(e, AT) {
                err if err.kind() == ErrorKind::UserNotFound => unknown_user(user_id, AT),
                err if err.kind() == ErrorKind::UserDeleted => ServiceError::new(
                    ErrorKind::UserDeleted,
                    AT,
                    format!("User with id {user_id} is already deleted"),
                ),
                err => err,
            })?;

        info!(user_id, closed_memberships = closed, "User deleted");

        Ok(())
    }

    /// Fetch a user, failing if it is missing or soft-deleted
    pub(crate) async fn resolve_alive(&self, user_id: i64, location: &'static str) -> ServiceResult<User> {
        let user = self
            .ctx
            .user_repo()
            .find_by_id(user_id)
            .await
            .at(location)?
            .ok_or_else(|| unknown_user(user_id, location))?;

        if user.is_deleted {
            return Err(ServiceError::new(
                ErrorKind::UserDeleted,
                location,
                format!("User with id {user_id} is deleted"),
            ));
        }
        Ok(user)
    }
}

fn unknown_user(user_id: i64, location: &'static str) -> ServiceError {
    ServiceError::new(
        ErrorKind::UserNotFound,
        location,
        format!("User with id {user_id} does not exist"),
    )
}
