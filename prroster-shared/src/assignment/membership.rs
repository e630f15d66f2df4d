//! Team membership operations
//!
//! Flipping a single user's flag here never touches their assignments; only
//! [`AssignmentEngine::deactivate_team_members`] runs the cascade.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::error::is_unique_violation;
use super::{AssignmentEngine, AssignmentError, AssignmentResult};
use crate::models::pull_request::{PullRequest, PullRequestShort};
use crate::models::team::Team;
use crate::models::user::{UpsertUser, User};

/// Member entry supplied when a team is created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTeamMember {
    pub user_id: String,
    pub username: String,
    pub is_active: bool,
}

impl AssignmentEngine {
    /// Creates a team and adds (or moves) its members
    ///
    /// Members that already exist are updated in place, which moves them into
    /// the new team.
    ///
    /// # Errors
    ///
    /// - `TeamAlreadyExists` if the name is taken
    pub async fn add_team(&self, team_name: &str, members: &[NewTeamMember]) -> AssignmentResult<Team> {
        let mut tx = self.pool.begin().await?;

        if Team::exists(&mut *tx, team_name).await? {
            warn!(team_name, "Team already exists");
            return Err(AssignmentError::TeamAlreadyExists(team_name.to_string()));
        }

        Team::insert(&mut *tx, team_name).await.map_err(|e| {
            if is_unique_violation(&e) {
                AssignmentError::TeamAlreadyExists(team_name.to_string())
            } else {
                AssignmentError::Database(e)
            }
        })?;

        for member in members {
            User::upsert(
                &mut *tx,
                &UpsertUser {
                    id: member.user_id.clone(),
                    name: member.username.clone(),
                    team_name: team_name.to_string(),
                    is_active: member.is_active,
                },
            )
            .await?;
        }

        let team = Team::find_by_name(&mut *tx, team_name)
            .await?
            .ok_or_else(|| AssignmentError::TeamNotFound(team_name.to_string()))?;

        tx.commit().await?;

        info!(team_name, members = team.members.len(), "Team created");

        Ok(team)
    }

    /// Loads a team with all of its members
    pub async fn get_team(&self, team_name: &str) -> AssignmentResult<Team> {
        let mut conn = self.pool.acquire().await?;

        Team::find_by_name(&mut *conn, team_name)
            .await?
            .ok_or_else(|| AssignmentError::TeamNotFound(team_name.to_string()))
    }

    /// Sets a single user's active flag
    pub async fn set_user_active(&self, user_id: &str, is_active: bool) -> AssignmentResult<User> {
        let mut conn = self.pool.acquire().await?;

        let user = User::set_active(&mut *conn, user_id, is_active)
            .await?
            .ok_or_else(|| {
                warn!(user_id, "User does not exist");
                AssignmentError::UserNotFound(user_id.to_string())
            })?;

        info!(user_id, is_active, "User active flag updated");

        Ok(user)
    }

    /// Lists the pull requests a user reviews, oldest first
    pub async fn user_reviews(&self, user_id: &str) -> AssignmentResult<Vec<PullRequestShort>> {
        let mut conn = self.pool.acquire().await?;

        if !User::exists(&mut *conn, user_id).await? {
            return Err(AssignmentError::UserNotFound(user_id.to_string()));
        }

        Ok(PullRequest::list_reviewed_by(&mut *conn, user_id).await?)
    }
}
