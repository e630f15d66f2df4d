//! Single reviewer replacement

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::selection;
use super::{AssignmentEngine, AssignmentError, AssignmentResult};
use crate::models::pull_request::{PullRequest, PullRequestDetails};
use crate::models::reviewer::ReviewerAssignment;
use crate::models::user::User;

/// Result of a successful reassignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReassignOutcome {
    /// Pull request with its updated reviewer list
    pub pull_request: PullRequestDetails,

    /// Reviewer that replaced the old one
    pub new_reviewer_id: String,
}

impl AssignmentEngine {
    /// Replaces one reviewer of an open pull request
    ///
    /// The replacement is drawn uniformly from the old reviewer's active
    /// teammates, excluding the old reviewer, the author and anyone already
    /// reviewing. The swap is 1-for-1: the reviewer count never changes.
    ///
    /// # Errors
    ///
    /// Checked in this order, before any write:
    /// - `PullRequestNotFound`
    /// - `PullRequestMerged`
    /// - `UserNotFound` for the old reviewer
    /// - `ReviewerNotAssigned` if the old reviewer is not on the pull request
    /// - `NoAvailableReviewer` if no candidate exists; the assignment is left
    ///   untouched
    pub async fn reassign_reviewer(
        &self,
        pull_request_id: &str,
        old_reviewer_id: &str,
    ) -> AssignmentResult<ReassignOutcome> {
        let mut tx = self.pool.begin().await?;

        let pull_request = PullRequest::find_by_id_for_update(&mut *tx, pull_request_id)
            .await?
            .ok_or_else(|| {
                warn!(pull_request_id, "Pull request does not exist");
                AssignmentError::PullRequestNotFound(pull_request_id.to_string())
            })?;

        if pull_request.status.is_terminal() {
            warn!(pull_request_id, "Refusing to reassign on merged pull request");
            return Err(AssignmentError::PullRequestMerged(pull_request_id.to_string()));
        }

        let old_reviewer = User::find_by_id(&mut *tx, old_reviewer_id).await?.ok_or_else(|| {
            warn!(user_id = old_reviewer_id, "Reviewer does not exist");
            AssignmentError::UserNotFound(old_reviewer_id.to_string())
        })?;

        // Team rows are share-locked before the reviewer rows, the same
        // order a cascade takes its locks in.
        let team_members = match old_reviewer.team_name.as_deref() {
            Some(team_name) => User::list_by_team_for_share(&mut *tx, team_name).await?,
            None => Vec::new(),
        };

        let current_reviewers =
            ReviewerAssignment::reviewer_ids_for_update(&mut *tx, pull_request_id).await?;

        if !current_reviewers.iter().any(|id| id == old_reviewer_id) {
            warn!(pull_request_id, user_id = old_reviewer_id, "User is not assigned to pull request");
            return Err(AssignmentError::ReviewerNotAssigned {
                pull_request_id: pull_request_id.to_string(),
                user_id: old_reviewer_id.to_string(),
            });
        }

        let candidates = selection::replacement_candidates(
            &team_members,
            old_reviewer_id,
            &pull_request.author_id,
            &current_reviewers,
        );

        let new_reviewer_id = self.selector.choose_one(&candidates).ok_or_else(|| {
            warn!(pull_request_id, old_reviewer_id, "No available reviewer to reassign");
            AssignmentError::NoAvailableReviewer(pull_request_id.to_string())
        })?;

        ReviewerAssignment::remove(&mut *tx, pull_request_id, old_reviewer_id).await?;
        ReviewerAssignment::assign(&mut *tx, pull_request_id, &new_reviewer_id).await?;

        let pull_request = pull_request.with_reviewers(&mut *tx).await?;

        tx.commit().await?;

        info!(
            pull_request_id,
            old_reviewer_id,
            new_reviewer_id = %new_reviewer_id,
            "Reviewer reassigned"
        );

        Ok(ReassignOutcome {
            pull_request,
            new_reviewer_id,
        })
    }
}
