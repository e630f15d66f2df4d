//! Deactivation cascade
//!
//! Deactivating members is a team-membership event: it does not look at
//! pull request status, so assignments on merged pull requests are cleaned
//! up as well.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::selection;
use super::{AssignmentEngine, AssignmentError, AssignmentResult};
use crate::models::pull_request::PullRequest;
use crate::models::reviewer::ReviewerAssignment;
use crate::models::team::Team;
use crate::models::user::User;

/// A reviewer replaced during a cascade
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReassignmentNote {
    pub pull_request_id: String,
    pub old_reviewer_id: String,
    pub new_reviewer_id: String,
}

/// Result of a deactivation cascade
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeactivationOutcome {
    /// Team membership after deactivation
    pub team: Team,

    /// Assignments that were handed over to another member
    pub reassignments: Vec<ReassignmentNote>,

    /// Assignments dropped because no eligible member was left
    pub removed_without_replacement: usize,
}

impl AssignmentEngine {
    /// Deactivates a batch of team members and resolves their assignments
    ///
    /// Every assignment held by a deactivated user is either handed to a
    /// random active teammate who is neither the author nor already a
    /// reviewer, or deleted when no such teammate exists. Duplicate IDs in
    /// the batch are ignored; an empty batch is a no-op.
    ///
    /// # Errors
    ///
    /// - `TeamNotFound` if the team does not exist
    /// - `TeamCompatibility` if any user is not a member of the team; nothing
    ///   is deactivated in that case
    pub async fn deactivate_team_members(
        &self,
        team_name: &str,
        user_ids: &[String],
    ) -> AssignmentResult<DeactivationOutcome> {
        let mut batch: Vec<String> = user_ids.to_vec();
        batch.sort();
        batch.dedup();

        let mut tx = self.pool.begin().await?;

        if !Team::exists(&mut *tx, team_name).await? {
            warn!(team_name, "Team does not exist");
            return Err(AssignmentError::TeamNotFound(team_name.to_string()));
        }

        let members = User::ids_in_team_for_update(&mut *tx, team_name, &batch).await?;
        if members.len() != batch.len() {
            let outsiders: Vec<String> = batch
                .iter()
                .filter(|id| !members.contains(*id))
                .cloned()
                .collect();
            warn!(team_name, users = ?outsiders, "Some users do not belong to the team");
            return Err(AssignmentError::TeamCompatibility {
                team_name: team_name.to_string(),
                user_ids: outsiders,
            });
        }

        let deactivated = User::deactivate_many(&mut *tx, &batch).await?;
        debug!(team_name, deactivated, "Users deactivated");

        let active_members = User::active_ids_by_team(&mut *tx, team_name).await?;

        // Every reviewer row of every affected pull request is locked up
        // front, so the "other reviewers" seen below cannot change under us.
        let mut reviewers_by_pull_request: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for row in ReviewerAssignment::list_on_reviewed_pull_requests_for_update(&mut *tx, &batch).await? {
            reviewers_by_pull_request
                .entry(row.pull_request_id)
                .or_default()
                .push(row.user_id);
        }

        let mut reassignments = Vec::new();
        let mut removed_without_replacement = 0;

        for (pull_request_id, mut reviewers) in reviewers_by_pull_request {
            let pull_request_id = pull_request_id.as_str();
            let author_id = PullRequest::author_id(&mut *tx, pull_request_id).await?;
            let outgoing: Vec<String> = reviewers
                .iter()
                .filter(|id| batch.contains(*id))
                .cloned()
                .collect();

            for old_reviewer_id in outgoing {
                let old_reviewer_id = old_reviewer_id.as_str();
                reviewers.retain(|id| id != old_reviewer_id);

                let candidates = selection::cascade_candidates(&active_members, &author_id, &reviewers);

                ReviewerAssignment::remove(&mut *tx, pull_request_id, old_reviewer_id).await?;

                match self.selector.choose_one(&candidates) {
                    Some(new_reviewer_id) => {
                        ReviewerAssignment::assign(&mut *tx, pull_request_id, &new_reviewer_id).await?;
                        debug!(pull_request_id, old_reviewer_id, new_reviewer_id = %new_reviewer_id, "Reviewer handed over");
                        reviewers.push(new_reviewer_id.clone());
                        reassignments.push(ReassignmentNote {
                            pull_request_id: pull_request_id.to_string(),
                            old_reviewer_id: old_reviewer_id.to_string(),
                            new_reviewer_id,
                        });
                    }
                    None => {
                        debug!(pull_request_id, old_reviewer_id, "No candidate left, reviewer removed");
                        removed_without_replacement += 1;
                    }
                }
            }
        }

        let team = Team::find_by_name(&mut *tx, team_name)
            .await?
            .ok_or_else(|| AssignmentError::TeamNotFound(team_name.to_string()))?;

        tx.commit().await?;

        info!(
            team_name,
            deactivated = batch.len(),
            active_members = team.active_member_ids().len(),
            reassigned = reassignments.len(),
            removed_without_replacement,
            "Team members deactivated"
        );

        Ok(DeactivationOutcome {
            team,
            reassignments,
            removed_without_replacement,
        })
    }
}
