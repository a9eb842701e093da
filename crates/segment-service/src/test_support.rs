//! Shared fixtures for service tests

use std::sync::Arc;

use segment_db::MemoryStore;

use crate::dto::CreateUserRequest;
use crate::services::{ServiceContext, ServiceContextBuilder, UserService};

/// A context whose three repositories are one in-memory store
pub fn memory_context() -> (Arc<MemoryStore>, ServiceContext) {
    let store = Arc::new(MemoryStore::new());
    let ctx = ServiceContextBuilder::new()
        .user_repo(store.clone())
        .segment_repo(store.clone())
        .report_repo(store.clone())
        .build()
        .expect("all repositories set");
    (store, ctx)
}

pub fn user_request(first_name: &str, last_name: &str, sex: i64, age: i64) -> CreateUserRequest {
    CreateUserRequest {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        sex,
        age,
    }
}

/// Create "Ann Lee" and return the new ID
pub async fn create_ann(ctx: &ServiceContext) -> i64 {
    UserService::new(ctx)
        .create(user_request("Ann", "Lee", 0, 30))
        .await
        .expect("user created")
        .id
}
