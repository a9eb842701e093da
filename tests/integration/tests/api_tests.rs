//! API Integration Tests
//!
//! These tests require:
//! - Running PostgreSQL instance
//! - Environment variable: DATABASE_URL
//!
//! Run with: cargo test -p integration-tests --test api_tests

use integration_tests::{
    assert_json, assert_status, check_test_env, fixtures::*, TestServer,
};
use reqwest::StatusCode;

async fn create_user(server: &TestServer) -> i64 {
    let response = server
        .post("/api/v1/users", &CreateUserRequest::unique())
        .await
        .unwrap();
    let created: CreatedUserResponse = assert_json(response, StatusCode::CREATED).await.unwrap();
    created.id
}

async fn create_segment(server: &TestServer, name: &str) {
    let response = server
        .post("/api/v1/segments", &CreateSegmentRequest::named(name))
        .await
        .unwrap();
    assert_status(response, StatusCode::CREATED).await.unwrap();
}

async fn active_names(server: &TestServer, user_id: i64) -> Vec<String> {
    let response = server
        .get(&format!("/api/v1/users/{user_id}/segments"))
        .await
        .unwrap();
    let user: UserWithSegmentsResponse = assert_json(response, StatusCode::OK).await.unwrap();
    let mut names: Vec<String> = user.segments.into_iter().map(|m| m.name).collect();
    names.sort();
    names
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_health_ready() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health/ready").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();
}

// ============================================================================
// User Tests
// ============================================================================

#[tokio::test]
async fn test_create_and_get_user() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let request = CreateUserRequest::unique();

    let response = server.post("/api/v1/users", &request).await.unwrap();
    let created: CreatedUserResponse = assert_json(response, StatusCode::CREATED).await.unwrap();

    let response = server
        .get(&format!("/api/v1/users/{}", created.id))
        .await
        .unwrap();
    let user: UserResponse = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(user.id, created.id);
    assert_eq!(user.first_name, request.first_name);
    assert_eq!(user.last_name, "Lee");
    assert_eq!(user.sex, 1);
    assert_eq!(user.sex_text, "female");
    assert_eq!(user.age, 30);
    assert!(!user.is_deleted);
}

#[tokio::test]
async fn test_create_user_invalid_sex() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let request = CreateUserRequest {
        sex: 2,
        ..CreateUserRequest::unique()
    };

    let response = server.post("/api/v1/users", &request).await.unwrap();
    let body: ErrorResponse = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(body.error.code, "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_get_unknown_user() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get(&format!("/api/v1/users/{}", i64::MAX)).await.unwrap();
    let body: ErrorResponse = assert_json(response, StatusCode::NOT_FOUND).await.unwrap();
    assert_eq!(body.error.code, "USER_NOT_FOUND");
}

#[tokio::test]
async fn test_invalid_user_id_path() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/api/v1/users/abc").await.unwrap();
    let body: ErrorResponse = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(body.error.code, "INVALID_PATH_PARAMETER");
}

#[tokio::test]
async fn test_delete_user_closes_memberships() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let user_id = create_user(&server).await;
    let segment = unique_segment("CASCADE");
    create_segment(&server, &segment).await;

    let response = server
        .post(
            &format!("/api/v1/users/{user_id}/segments"),
            &AddSegmentsRequest::names(&[&segment]),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let response = server.delete(&format!("/api/v1/users/{user_id}")).await.unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    // Second delete reports the user as already gone
    let response = server.delete(&format!("/api/v1/users/{user_id}")).await.unwrap();
    let body: ErrorResponse = assert_json(response, StatusCode::NOT_FOUND).await.unwrap();
    assert_eq!(body.error.code, "USER_DELETED");

    let response = server.get("/api/v1/reports").await.unwrap();
    let report: ReportResponse = assert_json(response, StatusCode::OK).await.unwrap();
    let row = report
        .report
        .lines()
        .find(|line| line.starts_with(&format!("{user_id},{segment},")))
        .expect("membership row missing");
    assert!(!row.ends_with(','), "membership should be closed: {row}");
}

// ============================================================================
// Segment Tests
// ============================================================================

#[tokio::test]
async fn test_segment_lifecycle() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let name = unique_segment("LIFECYCLE");

    let response = server
        .post("/api/v1/segments", &CreateSegmentRequest::named(&name))
        .await
        .unwrap();
    let created: CreatedSegmentResponse = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(created.name, name);
    assert!(!created.recovered);
    assert_eq!(created.enrolled, 0);

    let response = server
        .post("/api/v1/segments", &CreateSegmentRequest::named(&name))
        .await
        .unwrap();
    let body: ErrorResponse = assert_json(response, StatusCode::CONFLICT).await.unwrap();
    assert_eq!(body.error.code, "SEGMENT_ALREADY_EXISTS");

    let response = server.get(&format!("/api/v1/segments/{name}")).await.unwrap();
    let segment: SegmentResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(!segment.is_deleted);

    let response = server.delete(&format!("/api/v1/segments/{name}")).await.unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    let response = server.delete(&format!("/api/v1/segments/{name}")).await.unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();

    let response = server.get("/api/v1/segments?segment_type=deleted").await.unwrap();
    let deleted: Vec<SegmentResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(deleted.iter().any(|s| s.name == name));

    // Re-creating a deleted segment recovers the same row
    let response = server
        .post("/api/v1/segments", &CreateSegmentRequest::named(&name))
        .await
        .unwrap();
    let recreated: CreatedSegmentResponse = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert!(recreated.recovered);

    let response = server.get(&format!("/api/v1/segments/{name}")).await.unwrap();
    let recovered: SegmentResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(recovered.id, segment.id);
    assert!(!recovered.is_deleted);
}

#[tokio::test]
async fn test_list_segments_invalid_filter() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/api/v1/segments?segment_type=sideways").await.unwrap();
    let body: ErrorResponse = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(body.error.code, "INVALID_QUERY_PARAMETER");
}

#[tokio::test]
async fn test_create_segment_with_full_percentage() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let user_id = create_user(&server).await;
    let name = unique_segment("EVERYONE");

    let response = server
        .post(
            "/api/v1/segments",
            &CreateSegmentRequest {
                name: name.clone(),
                percentage: Some(100),
            },
        )
        .await
        .unwrap();
    let created: CreatedSegmentResponse = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert!(created.enrolled >= 1);

    assert!(active_names(&server, user_id).await.contains(&name));
}

// ============================================================================
// Membership Tests
// ============================================================================

#[tokio::test]
async fn test_add_and_remove_segments() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let user_id = create_user(&server).await;
    let voice = unique_segment("VOICE");
    let music = unique_segment("MUSIC");
    create_segment(&server, &voice).await;
    create_segment(&server, &music).await;

    let response = server
        .post(
            &format!("/api/v1/users/{user_id}/segments"),
            &AddSegmentsRequest::names(&[&voice, &music]),
        )
        .await
        .unwrap();
    let update: MembershipUpdateResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(update.user_id, user_id);
    assert_eq!(update.affected, 2);

    let mut expected = vec![voice.clone(), music.clone()];
    expected.sort();
    assert_eq!(active_names(&server, user_id).await, expected);

    let response = server
        .post(
            &format!("/api/v1/users/{user_id}/segments/remove"),
            &RemoveSegmentsRequest::names(&[&voice]),
        )
        .await
        .unwrap();
    let update: MembershipUpdateResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(update.affected, 1);

    assert_eq!(active_names(&server, user_id).await, vec![music]);
}

#[tokio::test]
async fn test_add_duplicate_active_segment_rejected() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let user_id = create_user(&server).await;
    let voice = unique_segment("VOICE");
    let music = unique_segment("MUSIC");
    create_segment(&server, &voice).await;
    create_segment(&server, &music).await;

    let path = format!("/api/v1/users/{user_id}/segments");
    let response = server.post(&path, &AddSegmentsRequest::names(&[&voice])).await.unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    // Whole batch is rejected when any segment is already active
    let response = server
        .post(&path, &AddSegmentsRequest::names(&[&music, &voice]))
        .await
        .unwrap();
    let body: ErrorResponse = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(body.error.code, "VALIDATION_ERROR");
    assert!(body.error.message.contains(&voice));

    assert_eq!(active_names(&server, user_id).await, vec![voice]);
}

#[tokio::test]
async fn test_add_unknown_segment() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let user_id = create_user(&server).await;

    let response = server
        .post(
            &format!("/api/v1/users/{user_id}/segments"),
            &AddSegmentsRequest::names(&[&unique_segment("MISSING")]),
        )
        .await
        .unwrap();
    let body: ErrorResponse = assert_json(response, StatusCode::NOT_FOUND).await.unwrap();
    assert_eq!(body.error.code, "SEGMENT_NOT_FOUND");
}

#[tokio::test]
async fn test_add_segment_invalid_end_date() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let user_id = create_user(&server).await;
    let name = unique_segment("DATED");
    create_segment(&server, &name).await;

    let request = AddSegmentsRequest {
        segments: vec![SegmentEntry {
            name,
            end_date: Some("2023-08-31".to_string()),
        }],
    };
    let response = server
        .post(&format!("/api/v1/users/{user_id}/segments"), &request)
        .await
        .unwrap();
    let body: ErrorResponse = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert!(body.error.message.contains("end_date"));
}

#[tokio::test]
async fn test_remove_inactive_segment_rejected() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let user_id = create_user(&server).await;
    let name = unique_segment("IDLE");
    create_segment(&server, &name).await;

    let response = server
        .post(
            &format!("/api/v1/users/{user_id}/segments/remove"),
            &RemoveSegmentsRequest::names(&[&name]),
        )
        .await
        .unwrap();
    let body: ErrorResponse = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert!(body.error.message.contains(&name));
}

// ============================================================================
// Report Tests
// ============================================================================

#[tokio::test]
async fn test_report_download() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let user_id = create_user(&server).await;
    let name = unique_segment("REPORTED");
    create_segment(&server, &name).await;
    let response = server
        .post(
            &format!("/api/v1/users/{user_id}/segments"),
            &AddSegmentsRequest::names(&[&name]),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let response = server.get("/api/v1/reports/download").await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response
        .headers()
        .get("content-disposition")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(disposition.contains("filename=\"report_"));

    let body = response.text().await.unwrap();
    assert!(body.starts_with("user_id,segment_name,start_date,end_date\n"));
    assert!(body.contains(&format!("{user_id},{name},")));
}
