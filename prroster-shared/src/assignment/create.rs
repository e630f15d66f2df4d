//! Initial reviewer assignment on pull request creation

use tracing::{info, warn};

use super::error::is_unique_violation;
use super::selection;
use super::{AssignmentEngine, AssignmentError, AssignmentResult};
use crate::models::pull_request::{CreatePullRequest, PullRequest, PullRequestDetails};
use crate::models::reviewer::ReviewerAssignment;
use crate::models::user::User;

impl AssignmentEngine {
    /// Opens a pull request and assigns its initial reviewers
    ///
    /// Reviewers are `min(2, N)` of the author's `N` active teammates, drawn
    /// uniformly at random without replacement. The teammate rows are read
    /// `FOR UPDATE` so concurrent creations in the same team serialize.
    ///
    /// # Errors
    ///
    /// - `PullRequestAlreadyExists` if the ID is taken
    /// - `UserNotFound` if the author does not exist
    /// - `TeamNotFound` if the author has no team or no active teammate; no
    ///   pull request is created in that case
    /// - `Database` on any store failure (the whole call is rolled back)
    pub async fn create_pull_request(
        &self,
        pull_request_id: &str,
        name: &str,
        author_id: &str,
    ) -> AssignmentResult<PullRequestDetails> {
        let mut tx = self.pool.begin().await?;

        if PullRequest::exists(&mut *tx, pull_request_id).await? {
            warn!(pull_request_id, "Pull request already exists");
            return Err(AssignmentError::PullRequestAlreadyExists(
                pull_request_id.to_string(),
            ));
        }

        let author = User::find_by_id(&mut *tx, author_id).await?.ok_or_else(|| {
            warn!(author_id, "Author does not exist");
            AssignmentError::UserNotFound(author_id.to_string())
        })?;

        let team_name = author.team_name.ok_or_else(|| {
            warn!(author_id, "Author has no team");
            AssignmentError::TeamNotFound(format!("team of user {}", author_id))
        })?;

        let teammates = User::active_teammate_ids_for_update(&mut *tx, &team_name, author_id).await?;

        let reviewer_count = selection::initial_reviewer_count(teammates.len());
        if reviewer_count == 0 {
            warn!(author_id, team_name = %team_name, "Author has no active teammates");
            return Err(AssignmentError::TeamNotFound(team_name));
        }

        let reviewers = self.selector.choose_many(&teammates, reviewer_count);

        let pull_request = PullRequest::create(
            &mut *tx,
            CreatePullRequest {
                id: pull_request_id.to_string(),
                name: name.to_string(),
                author_id: author_id.to_string(),
            },
        )
        .await
        .map_err(|e| {
            // A concurrent creation with the same ID won the race.
            if is_unique_violation(&e) {
                AssignmentError::PullRequestAlreadyExists(pull_request_id.to_string())
            } else {
                AssignmentError::Database(e)
            }
        })?;

        for reviewer_id in &reviewers {
            ReviewerAssignment::assign(&mut *tx, pull_request_id, reviewer_id).await?;
        }

        tx.commit().await?;

        info!(
            pull_request_id,
            author_id,
            team_name = %team_name,
            reviewers = ?reviewers,
            "Pull request created and reviewers assigned"
        );

        Ok(PullRequestDetails {
            pull_request,
            reviewers,
        })
    }
}
