/// User endpoints
///
/// # Endpoints
///
/// - `POST /users/setIsActive` - Flip a user's active flag (requires
///   `X-Admin-Token`). No reviews are reassigned; use `/team/deactivate` for
///   that.
/// - `GET /users/getReview?user_id=` - Pull requests the user reviews

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use prroster_shared::models::pull_request::{PullRequestShort, PullRequestStatus};
use prroster_shared::models::user::User;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Set active flag request
#[derive(Debug, Deserialize, Validate)]
pub struct SetIsActiveRequest {
    #[validate(length(min = 1, message = "user_id must not be empty"))]
    pub user_id: String,

    pub is_active: bool,
}

/// Review list query
#[derive(Debug, Deserialize, Validate)]
pub struct GetReviewQuery {
    #[validate(length(min = 1, message = "user_id must not be empty"))]
    pub user_id: String,
}

/// User as returned by the API
#[derive(Debug, Serialize, Deserialize)]
pub struct UserBody {
    pub user_id: String,
    pub username: String,
    pub team_name: Option<String>,
    pub is_active: bool,
}

impl From<User> for UserBody {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            username: user.name,
            team_name: user.team_name,
            is_active: user.is_active,
        }
    }
}

/// Wrapped user response
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub user: UserBody,
}

/// Short pull request entry of a review list
#[derive(Debug, Serialize, Deserialize)]
pub struct PullRequestShortBody {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub status: PullRequestStatus,
}

impl From<PullRequestShort> for PullRequestShortBody {
    fn from(pr: PullRequestShort) -> Self {
        Self {
            pull_request_id: pr.id,
            pull_request_name: pr.name,
            author_id: pr.author_id,
            status: pr.status,
        }
    }
}

/// Review list response
#[derive(Debug, Serialize, Deserialize)]
pub struct GetReviewResponse {
    pub user_id: String,
    pub pull_requests: Vec<PullRequestShortBody>,
}

/// Set a user's active flag
///
/// # Errors
///
/// - `401 UNAUTHORIZED`: Missing or wrong admin token
/// - `404 NOT_FOUND`: No such user
pub async fn set_is_active(
    State(state): State<AppState>,
    payload: Result<Json<SetIsActiveRequest>, JsonRejection>,
) -> ApiResult<Json<UserResponse>> {
    let Json(req) = payload?;
    req.validate()?;

    let user = state.engine.set_user_active(&req.user_id, req.is_active).await?;

    Ok(Json(UserResponse { user: user.into() }))
}

/// List the pull requests a user reviews
///
/// # Errors
///
/// - `404 NOT_FOUND`: No such user
pub async fn get_review(
    State(state): State<AppState>,
    query: Result<Query<GetReviewQuery>, QueryRejection>,
) -> ApiResult<Json<GetReviewResponse>> {
    let Query(query) = query?;
    query.validate()?;

    let pull_requests = state.engine.user_reviews(&query.user_id).await?;

    Ok(Json(GetReviewResponse {
        user_id: query.user_id,
        pull_requests: pull_requests.into_iter().map(Into::into).collect(),
    }))
}
