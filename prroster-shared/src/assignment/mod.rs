//! Reviewer assignment engine
//!
//! The engine owns every procedure that creates, replaces or removes
//! reviewer assignments, plus the team membership and pull request lifecycle
//! operations they depend on.
//!
//! # Operations
//!
//! - [`AssignmentEngine::create_pull_request`]: open a pull request and pick
//!   up to two reviewers from the author's active teammates
//! - [`AssignmentEngine::reassign_reviewer`]: swap one reviewer for an eligible
//!   teammate
//! - [`AssignmentEngine::deactivate_team_members`]: deactivate a batch of
//!   members and reassign or drop each of their assignments
//! - [`AssignmentEngine::merge_pull_request`]: move a pull request to MERGED
//! - [`AssignmentEngine::add_team`], [`AssignmentEngine::get_team`],
//!   [`AssignmentEngine::set_user_active`], [`AssignmentEngine::user_reviews`]:
//!   team membership
//!
//! # Transactions
//!
//! Each operation runs in exactly one transaction. All preconditions are
//! checked before the first write, and returning early (error or dropped
//! future) drops the uncommitted `sqlx::Transaction`, which rolls it back.
//! Reads that feed a later write are taken `FOR UPDATE`.
//!
//! # Example
//!
//! ```no_run
//! use prroster_shared::assignment::AssignmentEngine;
//! use sqlx::PgPool;
//!
//! # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
//! let engine = AssignmentEngine::new(pool);
//!
//! let pr = engine.create_pull_request("pr-1001", "Add search", "u1").await?;
//! println!("Reviewers: {:?}", pr.reviewers);
//!
//! let outcome = engine.reassign_reviewer("pr-1001", &pr.reviewers[0]).await?;
//! println!("Replaced by {}", outcome.new_reviewer_id);
//! # Ok(())
//! # }
//! ```

mod create;
mod deactivate;
pub mod error;
mod lifecycle;
mod membership;
mod reassign;
pub mod selection;

pub use deactivate::{DeactivationOutcome, ReassignmentNote};
pub use error::{AssignmentError, AssignmentResult};
pub use membership::NewTeamMember;
pub use reassign::ReassignOutcome;
pub use selection::ReviewerSelector;

use sqlx::PgPool;
use std::sync::Arc;

/// Stateless engine handle
///
/// Cheap to clone; the pool and selector are shared.
#[derive(Debug, Clone)]
pub struct AssignmentEngine {
    pool: PgPool,
    selector: Arc<ReviewerSelector>,
}

impl AssignmentEngine {
    /// Creates an engine with an entropy-seeded selector
    pub fn new(pool: PgPool) -> Self {
        Self::with_selector(pool, ReviewerSelector::from_entropy())
    }

    /// Creates an engine with a specific selector (e.g. a seeded one)
    pub fn with_selector(pool: PgPool, selector: ReviewerSelector) -> Self {
        Self {
            pool,
            selector: Arc::new(selector),
        }
    }

    /// Underlying connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
