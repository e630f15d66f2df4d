/// Team endpoints
///
/// # Endpoints
///
/// - `POST /team/add` - Create a team with its members
/// - `GET /team/get?team_name=` - Team with all members
/// - `POST /team/deactivate` - Deactivate members and reassign their reviews
///   (requires `X-Admin-Token`)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    Json,
};
use prroster_shared::assignment::{DeactivationOutcome, NewTeamMember, ReassignmentNote};
use prroster_shared::models::team::{Team, TeamMember};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Member entry of an add-team request
#[derive(Debug, Deserialize, Validate)]
pub struct TeamMemberRequest {
    #[validate(length(min = 1, message = "user_id must not be empty"))]
    pub user_id: String,

    #[validate(length(min = 1, message = "username must not be empty"))]
    pub username: String,

    pub is_active: bool,
}

/// Add team request
#[derive(Debug, Deserialize, Validate)]
pub struct AddTeamRequest {
    #[validate(length(min = 1, max = 255, message = "team_name must be 1-255 characters"))]
    pub team_name: String,

    #[validate(nested)]
    pub members: Vec<TeamMemberRequest>,
}

/// Get team query
#[derive(Debug, Deserialize, Validate)]
pub struct GetTeamQuery {
    #[validate(length(min = 1, message = "team_name must not be empty"))]
    pub team_name: String,
}

/// Deactivate members request
#[derive(Debug, Deserialize, Validate)]
pub struct DeactivateTeamRequest {
    #[validate(length(min = 1, message = "team_name must not be empty"))]
    pub team_name: String,

    #[serde(rename = "users", alias = "user_ids")]
    pub user_ids: Vec<String>,
}

/// Team as returned by the API
#[derive(Debug, Serialize, Deserialize)]
pub struct TeamBody {
    pub team_name: String,
    pub members: Vec<TeamMember>,
}

impl From<Team> for TeamBody {
    fn from(team: Team) -> Self {
        Self {
            team_name: team.name,
            members: team.members,
        }
    }
}

/// Wrapped team response
#[derive(Debug, Serialize, Deserialize)]
pub struct TeamResponse {
    pub team: TeamBody,
}

/// One reassignment performed by the cascade
#[derive(Debug, Serialize, Deserialize)]
pub struct ReassignedPullRequest {
    pub pull_request_id: String,
    pub old_reviewer_id: String,
    pub replaced_by: String,
}

impl From<ReassignmentNote> for ReassignedPullRequest {
    fn from(note: ReassignmentNote) -> Self {
        Self {
            pull_request_id: note.pull_request_id,
            old_reviewer_id: note.old_reviewer_id,
            replaced_by: note.new_reviewer_id,
        }
    }
}

/// Deactivation response
#[derive(Debug, Serialize, Deserialize)]
pub struct DeactivateTeamResponse {
    pub team: TeamBody,
    pub pull_requests: Vec<ReassignedPullRequest>,
}

impl From<DeactivationOutcome> for DeactivateTeamResponse {
    fn from(outcome: DeactivationOutcome) -> Self {
        Self {
            team: outcome.team.into(),
            pull_requests: outcome.reassignments.into_iter().map(Into::into).collect(),
        }
    }
}

/// Create a team
///
/// # Endpoint
///
/// ```text
/// POST /team/add
/// Content-Type: application/json
///
/// {
///   "team_name": "backend",
///   "members": [
///     { "user_id": "u1", "username": "Alice", "is_active": true },
///     { "user_id": "u2", "username": "Bob", "is_active": true }
///   ]
/// }
/// ```
///
/// # Errors
///
/// - `400 TEAM_EXISTS`: Team name already taken
/// - `400 INVALID_REQUEST`: Malformed body
pub async fn add_team(
    State(state): State<AppState>,
    payload: Result<Json<AddTeamRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TeamResponse>)> {
    let Json(req) = payload?;
    req.validate()?;

    let members: Vec<NewTeamMember> = req
        .members
        .into_iter()
        .map(|m| NewTeamMember {
            user_id: m.user_id,
            username: m.username,
            is_active: m.is_active,
        })
        .collect();

    let team = state.engine.add_team(&req.team_name, &members).await?;

    Ok((StatusCode::CREATED, Json(TeamResponse { team: team.into() })))
}

/// Get a team with all members
///
/// # Errors
///
/// - `404 NOT_FOUND`: No such team
pub async fn get_team(
    State(state): State<AppState>,
    query: Result<Query<GetTeamQuery>, QueryRejection>,
) -> ApiResult<Json<TeamBody>> {
    let Query(query) = query?;
    query.validate()?;

    let team = state.engine.get_team(&query.team_name).await?;

    Ok(Json(team.into()))
}

/// Deactivate team members and resolve their review assignments
///
/// # Endpoint
///
/// ```text
/// POST /team/deactivate
/// X-Admin-Token: <token>
///
/// { "team_name": "backend", "users": ["u2", "u3"] }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "team": { "team_name": "backend", "members": [...] },
///   "pull_requests": [
///     { "pull_request_id": "pr-1", "old_reviewer_id": "u2", "replaced_by": "u4" }
///   ]
/// }
/// ```
///
/// # Errors
///
/// - `401 UNAUTHORIZED`: Missing or wrong admin token
/// - `404 NOT_FOUND`: No such team
/// - `409 TEAM_COMPATIBILITY`: Some users are not members of the team
pub async fn deactivate_team(
    State(state): State<AppState>,
    payload: Result<Json<DeactivateTeamRequest>, JsonRejection>,
) -> ApiResult<Json<DeactivateTeamResponse>> {
    let Json(req) = payload?;
    req.validate()?;

    if req.user_ids.iter().any(|id| id.is_empty()) {
        return Err(ApiError::invalid_request("users must not contain empty IDs"));
    }

    let outcome = state
        .engine
        .deactivate_team_members(&req.team_name, &req.user_ids)
        .await?;

    Ok(Json(outcome.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_team_request_validation() {
        let req: AddTeamRequest = serde_json::from_str(
            r#"{"team_name": "", "members": [{"user_id": "u1", "username": "A", "is_active": true}]}"#,
        )
        .unwrap();
        assert!(req.validate().is_err());

        let req: AddTeamRequest = serde_json::from_str(
            r#"{"team_name": "backend", "members": [{"user_id": "", "username": "A", "is_active": true}]}"#,
        )
        .unwrap();
        assert!(req.validate().is_err());

        let req: AddTeamRequest = serde_json::from_str(r#"{"team_name": "backend", "members": []}"#).unwrap();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_deactivate_request_reads_users_field() {
        let req: DeactivateTeamRequest =
            serde_json::from_str(r#"{"team_name": "backend", "users": ["u1", "u2"]}"#).unwrap();
        assert_eq!(req.user_ids, vec!["u1", "u2"]);

        let req: DeactivateTeamRequest =
            serde_json::from_str(r#"{"team_name": "backend", "user_ids": ["u3"]}"#).unwrap();
        assert_eq!(req.user_ids, vec!["u3"]);
    }

    #[test]
    fn test_reassignment_wire_names() {
        let body = ReassignedPullRequest::from(ReassignmentNote {
            pull_request_id: "pr-1".to_string(),
            old_reviewer_id: "u2".to_string(),
            new_reviewer_id: "u4".to_string(),
        });

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["replaced_by"], "u4");
        assert_eq!(json["old_reviewer_id"], "u2");
    }

    #[test]
    fn test_team_body_uses_team_name() {
        let body = TeamBody::from(Team {
            name: "backend".to_string(),
            members: vec![TeamMember {
                user_id: "u1".to_string(),
                username: "Alice".to_string(),
                is_active: true,
            }],
        });

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["team_name"], "backend");
        assert_eq!(json["members"][0]["username"], "Alice");
    }
}
