/// HTTP tests for the PrRoster API
///
/// Offline tests run everywhere. Flow tests require a running PostgreSQL
/// database (DATABASE_URL, or the local default in tests/common/mod.rs).

mod common;

use axum::http::StatusCode;
use common::{unique, TestContext, ADMIN_TOKEN};
use serde_json::{json, Value};

fn error_code(body: &Value) -> &str {
    body["error"]["code"].as_str().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Requests rejected before reaching the database
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_admin_routes_require_token() {
    let ctx = TestContext::offline();

    let (status, body) = ctx
        .post("/team/deactivate", json!({"team_name": "backend", "users": ["u1"]}), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "UNAUTHORIZED");

    let (status, _) = ctx
        .post("/users/setIsActive", json!({"user_id": "u1", "is_active": false}), Some("wrong"))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_json_is_invalid_request() {
    let ctx = TestContext::offline();

    let (status, body) = ctx.post_raw("/pullRequest/create", "{not json").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "INVALID_REQUEST");
}

#[tokio::test]
async fn test_missing_field_is_invalid_request() {
    let ctx = TestContext::offline();

    let (status, body) = ctx
        .post("/pullRequest/create", json!({"pull_request_id": "pr-1", "author_id": "u1"}), None)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "INVALID_REQUEST");
}

#[tokio::test]
async fn test_empty_field_reports_validation_details() {
    let ctx = TestContext::offline();

    let (status, body) = ctx
        .post(
            "/pullRequest/create",
            json!({"pull_request_id": "", "pull_request_name": "x", "author_id": "u1"}),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "INVALID_REQUEST");
    assert_eq!(body["error"]["details"][0]["field"], "pull_request_id");
}

#[tokio::test]
async fn test_missing_query_parameter() {
    let ctx = TestContext::offline();

    let (status, body) = ctx.get("/team/get").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "INVALID_REQUEST");
}

#[tokio::test]
async fn test_health_reports_degraded_without_database() {
    let ctx = TestContext::offline();

    let (status, body) = ctx.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "disconnected");
    assert_eq!(body["status"], "degraded");
}

// ---------------------------------------------------------------------------
// Full flows
// ---------------------------------------------------------------------------

async fn add_team(ctx: &TestContext, members: &[(&str, bool)]) -> (String, Vec<String>) {
    let team_name = unique("team");
    let ids: Vec<String> = members.iter().map(|(label, _)| unique(label)).collect();
    let members: Vec<Value> = members
        .iter()
        .zip(&ids)
        .map(|((label, active), id)| json!({"user_id": id, "username": label, "is_active": active}))
        .collect();

    let (status, body) = ctx
        .post("/team/add", json!({"team_name": team_name, "members": members}), None)
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["team"]["team_name"], team_name.as_str());

    (team_name, ids)
}

#[tokio::test]
async fn test_pull_request_flow() {
    let ctx = TestContext::new().await;
    let (_, ids) = add_team(&ctx, &[("a", true), ("b", true), ("c", true), ("d", true)]).await;
    let pr_id = unique("pr");

    let (status, body) = ctx
        .post(
            "/pullRequest/create",
            json!({"pull_request_id": pr_id, "pull_request_name": "Add search", "author_id": ids[0]}),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["pr"]["status"], "OPEN");
    let reviewers = body["pr"]["assigned_reviewers"].as_array().unwrap().clone();
    assert_eq!(reviewers.len(), 2);
    assert!(!reviewers.contains(&json!(ids[0])));

    let (status, body) = ctx
        .post(
            "/pullRequest/create",
            json!({"pull_request_id": pr_id, "pull_request_name": "Again", "author_id": ids[0]}),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "PR_EXISTS");

    let old = reviewers[0].as_str().unwrap().to_string();
    let (status, body) = ctx
        .post("/pullRequest/reassign", json!({"pull_request_id": pr_id, "old_reviewer_id": old}), None)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let replaced_by = body["replaced_by"].as_str().unwrap();
    assert_ne!(replaced_by, old);
    assert_ne!(replaced_by, ids[0]);
    assert_eq!(body["pr"]["assigned_reviewers"].as_array().unwrap().len(), 2);

    let (status, body) = ctx
        .post("/pullRequest/merge", json!({"pull_request_id": pr_id}), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pr"]["status"], "MERGED");
    let merged_at = body["pr"]["mergedAt"].clone();
    assert!(merged_at.is_string());

    let (status, body) = ctx
        .post("/pullRequest/merge", json!({"pull_request_id": pr_id}), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pr"]["mergedAt"], merged_at);

    let reviewer = body["pr"]["assigned_reviewers"][0].as_str().unwrap().to_string();
    let (status, body) = ctx
        .post("/pullRequest/reassign", json!({"pull_request_id": pr_id, "old_reviewer_id": reviewer}), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "PR_MERGED");

    let (status, body) = ctx.get(&format!("/users/getReview?user_id={}", reviewer)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pull_requests"][0]["pull_request_id"], pr_id.as_str());
    assert_eq!(body["pull_requests"][0]["status"], "MERGED");
}

#[tokio::test]
async fn test_create_without_teammates_is_not_found() {
    let ctx = TestContext::new().await;
    let (_, ids) = add_team(&ctx, &[("solo", true)]).await;

    let (status, body) = ctx
        .post(
            "/pullRequest/create",
            json!({"pull_request_id": unique("pr"), "pull_request_name": "Solo", "author_id": ids[0]}),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "NOT_FOUND");
}

#[tokio::test]
async fn test_team_endpoints() {
    let ctx = TestContext::new().await;
    let (team_name, ids) = add_team(&ctx, &[("a", true), ("b", false)]).await;

    let (status, body) = ctx.get(&format!("/team/get?team_name={}", team_name)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["members"].as_array().unwrap().len(), 2);

    let (status, body) = ctx
        .post("/team/add", json!({"team_name": team_name, "members": []}), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "TEAM_EXISTS");

    let (status, body) = ctx.get(&format!("/team/get?team_name={}", unique("missing"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "NOT_FOUND");

    let (status, body) = ctx
        .post(
            "/users/setIsActive",
            json!({"user_id": ids[1], "is_active": true}),
            Some(ADMIN_TOKEN),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["user"]["is_active"], true);
    assert_eq!(body["user"]["team_name"], team_name.as_str());
}

#[tokio::test]
async fn test_deactivate_flow() {
    let ctx = TestContext::new().await;
    let (team_name, ids) = add_team(&ctx, &[("a", true), ("b", true), ("c", true)]).await;
    let (other_team, other_ids) = add_team(&ctx, &[("x", true)]).await;
    let pr_id = unique("pr");

    ctx.post(
        "/pullRequest/create",
        json!({"pull_request_id": pr_id, "pull_request_name": "Feature", "author_id": ids[0]}),
        None,
    )
    .await;

    let (status, body) = ctx
        .post(
            "/team/deactivate",
            json!({"team_name": team_name, "users": [ids[1], other_ids[0]]}),
            Some(ADMIN_TOKEN),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "TEAM_COMPATIBILITY");
    assert_ne!(team_name, other_team);

    let (status, body) = ctx
        .post(
            "/team/deactivate",
            json!({"team_name": team_name, "users": [ids[1]]}),
            Some(ADMIN_TOKEN),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    // Only the author and the other reviewer remain active: nothing to hand over.
    assert_eq!(body["pull_requests"].as_array().unwrap().len(), 0);

    let (status, body) = ctx.get(&format!("/users/getReview?user_id={}", ids[1])).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["pull_requests"].as_array().unwrap().is_empty());
}
