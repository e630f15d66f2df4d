//! Reviewer eligibility and random selection
//!
//! Eligibility is decided here, in memory, over snapshots the engine reads
//! inside its transaction. The random pick is a single uniform draw over the
//! filtered list, so the rule does not depend on the database's random
//! function and can be tested with a seeded [`ReviewerSelector`].

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::models::user::User;

/// Number of reviewers assigned to a new pull request when enough
/// teammates are available
pub const MAX_REVIEWERS: usize = 2;

/// Reviewer count for a new pull request given `available` active teammates
pub fn initial_reviewer_count(available: usize) -> usize {
    available.min(MAX_REVIEWERS)
}

/// Candidates that may replace `old_reviewer_id` on a pull request
///
/// `team_members` is the old reviewer's team. A candidate must be active,
/// must not be the old reviewer or the author, and must not already review
/// the pull request.
pub fn replacement_candidates(
    team_members: &[User],
    old_reviewer_id: &str,
    author_id: &str,
    current_reviewers: &[String],
) -> Vec<String> {
    team_members
        .iter()
        .filter(|u| u.is_active)
        .filter(|u| u.id != old_reviewer_id && u.id != author_id)
        .filter(|u| !current_reviewers.contains(&u.id))
        .map(|u| u.id.clone())
        .collect()
}

/// Candidates that may take over an assignment during a deactivation cascade
///
/// `active_member_ids` is the team's active set after deactivation, so the
/// departing reviewer is already absent from it.
pub fn cascade_candidates(
    active_member_ids: &[String],
    author_id: &str,
    other_reviewers: &[String],
) -> Vec<String> {
    active_member_ids
        .iter()
        .filter(|id| id.as_str() != author_id)
        .filter(|id| !other_reviewers.contains(*id))
        .cloned()
        .collect()
}

/// Uniform random picker over candidate lists
///
/// Holds its own RNG so tests can inject a fixed seed. The lock is only held
/// for the duration of a single draw, never across an `.await`.
#[derive(Debug)]
pub struct ReviewerSelector {
    rng: Mutex<StdRng>,
}

impl ReviewerSelector {
    /// Selector seeded from OS entropy
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic selector for tests and reproducible runs
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Picks `amount` distinct candidates uniformly at random
    ///
    /// Returns every candidate if `amount` exceeds the list length. Order of
    /// the result is not significant.
    pub fn choose_many<T: Clone>(&self, candidates: &[T], amount: usize) -> Vec<T> {
        let mut rng = self.lock();
        candidates
            .choose_multiple(&mut *rng, amount)
            .cloned()
            .collect()
    }

    /// Picks one candidate uniformly at random, or None if the list is empty
    pub fn choose_one<T: Clone>(&self, candidates: &[T]) -> Option<T> {
        let mut rng = self.lock();
        candidates.choose(&mut *rng).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, StdRng> {
        // A panic mid-draw cannot leave the RNG in an invalid state.
        self.rng.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ReviewerSelector {
    fn default() -> Self {
        Self::from_entropy()
    }
}
