//! Pull request lifecycle: merge and read

use tracing::{debug, info, warn};

use super::{AssignmentEngine, AssignmentError, AssignmentResult};
use crate::models::pull_request::{PullRequest, PullRequestDetails};

impl AssignmentEngine {
    /// Moves a pull request to MERGED
    ///
    /// Reviewer assignments are left as they are. Merging a pull request
    /// that is already merged returns its stored state unchanged, including
    /// the original `merged_at`.
    ///
    /// # Errors
    ///
    /// - `PullRequestNotFound` if the pull request does not exist
    pub async fn merge_pull_request(&self, pull_request_id: &str) -> AssignmentResult<PullRequestDetails> {
        let mut tx = self.pool.begin().await?;

        let pull_request = PullRequest::find_by_id_for_update(&mut *tx, pull_request_id)
            .await?
            .ok_or_else(|| {
                warn!(pull_request_id, "Pull request does not exist");
                AssignmentError::PullRequestNotFound(pull_request_id.to_string())
            })?;

        let pull_request = if pull_request.status.is_terminal() {
            debug!(pull_request_id, "Pull request already merged");
            pull_request
        } else {
            PullRequest::mark_merged(&mut *tx, pull_request_id)
                .await?
                .ok_or_else(|| AssignmentError::PullRequestNotFound(pull_request_id.to_string()))?
        };

        let details = pull_request.with_reviewers(&mut *tx).await?;

        tx.commit().await?;

        info!(
            pull_request_id,
            merged_at = ?details.pull_request.merged_at,
            "Pull request merged"
        );

        Ok(details)
    }

    /// Loads a pull request with its current reviewers
    pub async fn get_pull_request(&self, pull_request_id: &str) -> AssignmentResult<PullRequestDetails> {
        let mut conn = self.pool.acquire().await?;

        let pull_request = PullRequest::find_by_id(&mut *conn, pull_request_id)
            .await?
            .ok_or_else(|| AssignmentError::PullRequestNotFound(pull_request_id.to_string()))?;

        Ok(pull_request.with_reviewers(&mut *conn).await?)
    }
}
