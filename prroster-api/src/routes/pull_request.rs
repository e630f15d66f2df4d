/// Pull request endpoints
///
/// # Endpoints
///
/// - `POST /pullRequest/create` - Open a pull request and assign reviewers
/// - `POST /pullRequest/merge` - Mark a pull request as merged
/// - `POST /pullRequest/reassign` - Replace one reviewer

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use prroster_shared::models::pull_request::{PullRequestDetails, PullRequestStatus};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Create pull request request
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePullRequestRequest {
    #[validate(length(min = 1, max = 255, message = "pull_request_id must be 1-255 characters"))]
    pub pull_request_id: String,

    #[validate(length(min = 1, message = "pull_request_name must not be empty"))]
    pub pull_request_name: String,

    #[validate(length(min = 1, message = "author_id must not be empty"))]
    pub author_id: String,
}

/// Merge pull request request
#[derive(Debug, Deserialize, Validate)]
pub struct MergePullRequestRequest {
    #[validate(length(min = 1, message = "pull_request_id must not be empty"))]
    pub pull_request_id: String,
}

/// Reassign reviewer request
#[derive(Debug, Deserialize, Validate)]
pub struct ReassignReviewerRequest {
    #[validate(length(min = 1, message = "pull_request_id must not be empty"))]
    pub pull_request_id: String,

    #[serde(alias = "old_user_id")]
    #[validate(length(min = 1, message = "old_reviewer_id must not be empty"))]
    pub old_reviewer_id: String,
}

/// Pull request as returned by the API
#[derive(Debug, Serialize, Deserialize)]
pub struct PullRequestBody {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub status: PullRequestStatus,
    pub assigned_reviewers: Vec<String>,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    #[serde(rename = "mergedAt", skip_serializing_if = "Option::is_none", default)]
    pub merged_at: Option<DateTime<Utc>>,
}

impl From<PullRequestDetails> for PullRequestBody {
    fn from(details: PullRequestDetails) -> Self {
        let pr = details.pull_request;
        Self {
            pull_request_id: pr.id,
            pull_request_name: pr.name,
            author_id: pr.author_id,
            status: pr.status,
            assigned_reviewers: details.reviewers,
            created_at: pr.created_at,
            merged_at: pr.merged_at,
        }
    }
}

/// Wrapped pull request response
#[derive(Debug, Serialize, Deserialize)]
pub struct PullRequestResponse {
    pub pr: PullRequestBody,
}

/// Reassignment response
#[derive(Debug, Serialize, Deserialize)]
pub struct ReassignResponse {
    pub pr: PullRequestBody,
    pub replaced_by: String,
}

/// Open a pull request
///
/// # Endpoint
///
/// ```text
/// POST /pullRequest/create
///
/// { "pull_request_id": "pr-1001", "pull_request_name": "Add search", "author_id": "u1" }
/// ```
///
/// # Response (201)
///
/// ```json
/// {
///   "pr": {
///     "pull_request_id": "pr-1001",
///     "pull_request_name": "Add search",
///     "author_id": "u1",
///     "status": "OPEN",
///     "assigned_reviewers": ["u2", "u3"],
///     "createdAt": "2025-01-03T12:00:00Z"
///   }
/// }
/// ```
///
/// # Errors
///
/// - `404 NOT_FOUND`: Author or author's team not found, or the author has
///   no active teammate
/// - `409 PR_EXISTS`: ID already taken
pub async fn create_pull_request(
    State(state): State<AppState>,
    payload: Result<Json<CreatePullRequestRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<PullRequestResponse>)> {
    let Json(req) = payload?;
    req.validate()?;

    let details = state
        .engine
        .create_pull_request(&req.pull_request_id, &req.pull_request_name, &req.author_id)
        .await?;

    Ok((StatusCode::CREATED, Json(PullRequestResponse { pr: details.into() })))
}

/// Merge a pull request
///
/// Merging twice returns the stored state with the original `mergedAt`.
///
/// # Errors
///
/// - `404 NOT_FOUND`: No such pull request
pub async fn merge_pull_request(
    State(state): State<AppState>,
    payload: Result<Json<MergePullRequestRequest>, JsonRejection>,
) -> ApiResult<Json<PullRequestResponse>> {
    let Json(req) = payload?;
    req.validate()?;

    let details = state.engine.merge_pull_request(&req.pull_request_id).await?;

    Ok(Json(PullRequestResponse { pr: details.into() }))
}

/// Replace one reviewer of an open pull request
///
/// # Errors
///
/// - `404 NOT_FOUND`: Pull request or user not found
/// - `409 PR_MERGED`: Pull request is merged
/// - `409 NOT_ASSIGNED`: User does not review this pull request
/// - `409 NO_CANDIDATE`: No eligible replacement
pub async fn reassign_reviewer(
    State(state): State<AppState>,
    payload: Result<Json<ReassignReviewerRequest>, JsonRejection>,
) -> ApiResult<Json<ReassignResponse>> {
    let Json(req) = payload?;
    req.validate()?;

    let outcome = state
        .engine
        .reassign_reviewer(&req.pull_request_id, &req.old_reviewer_id)
        .await?;

    Ok(Json(ReassignResponse {
        pr: outcome.pull_request.into(),
        replaced_by: outcome.new_reviewer_id,
    }))
}
