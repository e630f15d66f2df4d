//! Error type for the assignment engine
//!
//! Business-rule violations are distinct variants so callers can tell "your
//! request was invalid or conflicting" apart from "the system could not
//! complete the operation" (`Database`). Every variant is terminal for the
//! call; the engine never retries.

/// Result type alias for engine operations
pub type AssignmentResult<T> = Result<T, AssignmentError>;

/// Errors returned by the assignment engine
#[derive(Debug, thiserror::Error)]
pub enum AssignmentError {
    /// Referenced user does not exist
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Referenced team does not exist, or the author has no usable team
    #[error("Team not found: {0}")]
    TeamNotFound(String),

    /// A team with this name already exists
    #[error("Team already exists: {0}")]
    TeamAlreadyExists(String),

    /// A pull request with this ID already exists
    #[error("Pull request already exists: {0}")]
    PullRequestAlreadyExists(String),

    /// Referenced pull request does not exist
    #[error("Pull request not found: {0}")]
    PullRequestNotFound(String),

    /// Reassignment attempted on a merged pull request
    #[error("Pull request already merged: {0}")]
    PullRequestMerged(String),

    /// The user is not a current reviewer of the pull request
    #[error("User {user_id} is not assigned to pull request {pull_request_id}")]
    ReviewerNotAssigned {
        pull_request_id: String,
        user_id: String,
    },

    /// No eligible replacement reviewer exists
    #[error("No available reviewer for pull request {0}")]
    NoAvailableReviewer(String),

    /// A deactivation batch names users outside the team
    #[error("Users {user_ids:?} do not belong to team {team_name}")]
    TeamCompatibility {
        team_name: String,
        user_ids: Vec<String>,
    },

    /// Store or transaction failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AssignmentError {
    /// Whether this is a business-rule violation rather than an
    /// infrastructure failure
    pub fn is_business(&self) -> bool {
        !matches!(self, AssignmentError::Database(_))
    }
}

/// Whether a database error is a unique-constraint violation
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}
