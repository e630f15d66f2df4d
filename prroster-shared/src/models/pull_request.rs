/// Pull request model and database operations
///
/// Pull request IDs are supplied by the caller. The status lives in the
/// `statuses` lookup table and only ever moves `OPEN -> MERGED`.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE statuses (
///     id SMALLINT PRIMARY KEY,
///     name TEXT NOT NULL UNIQUE          -- 'OPEN', 'MERGED'
/// );
///
/// CREATE TABLE pull_requests (
///     id TEXT PRIMARY KEY,
///     name TEXT NOT NULL,
///     author_id TEXT NOT NULL REFERENCES users(id),
///     status_id SMALLINT NOT NULL REFERENCES statuses(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     merged_at TIMESTAMPTZ
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::error::BoxDynError;
use sqlx::postgres::{PgTypeInfo, PgValueRef};
use sqlx::{Decode, PgConnection, Postgres, Type};
use std::fmt;
use std::str::FromStr;

use super::reviewer::ReviewerAssignment;

/// Pull request status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PullRequestStatus {
    /// Open for review; reviewers may be reassigned
    Open,

    /// Terminal; direct reassignment is refused
    Merged,
}

impl PullRequestStatus {
    /// Name as stored in the `statuses` table
    pub fn as_str(&self) -> &'static str {
        match self {
            PullRequestStatus::Open => "OPEN",
            PullRequestStatus::Merged => "MERGED",
        }
    }

    /// Whether the status is terminal
    pub fn is_terminal(&self) -> bool {
        matches!(self, PullRequestStatus::Merged)
    }
}

impl fmt::Display for PullRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a status name is not known
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown pull request status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for PullRequestStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(PullRequestStatus::Open),
            "MERGED" => Ok(PullRequestStatus::Merged),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

// Statuses are read as text from the `statuses` join.
impl Type<Postgres> for PullRequestStatus {
    fn type_info() -> PgTypeInfo {
        <&str as Type<Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <&str as Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for PullRequestStatus {
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        let name = <&str as Decode<Postgres>>::decode(value)?;
        Ok(name.parse()?)
    }
}

/// Pull request model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PullRequest {
    /// Caller-supplied pull request ID
    pub id: String,

    /// Pull request title
    pub name: String,

    /// Author user ID
    pub author_id: String,

    /// Current status
    pub status: PullRequestStatus,

    /// When the pull request was created
    pub created_at: DateTime<Utc>,

    /// When the pull request was merged (present iff status is MERGED)
    pub merged_at: Option<DateTime<Utc>>,
}

/// Pull request together with its current reviewer IDs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestDetails {
    #[serde(flatten)]
    pub pull_request: PullRequest,

    /// Reviewer IDs in assignment order
    pub reviewers: Vec<String>,
}

/// Short pull request view used in a user's review list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PullRequestShort {
    pub id: String,
    pub name: String,
    pub author_id: String,
    pub status: PullRequestStatus,
}

/// Input for creating a new pull request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePullRequest {
    pub id: String,
    pub name: String,
    pub author_id: String,
}

impl PullRequest {
    /// Checks whether a pull request with this ID exists
    pub async fn exists(conn: &mut PgConnection, id: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM pull_requests WHERE id = $1)")
            .bind(id)
            .fetch_one(conn)
            .await
    }

    /// Inserts a new pull request with status OPEN
    ///
    /// # Errors
    ///
    /// Fails with a unique violation if the ID is taken, or a foreign key
    /// violation if the author does not exist.
    pub async fn create(conn: &mut PgConnection, data: CreatePullRequest) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, PullRequest>(
            r#"
            INSERT INTO pull_requests (id, name, author_id, status_id)
            VALUES ($1, $2, $3, (SELECT id FROM statuses WHERE name = $4))
            RETURNING id, name, author_id, $4::TEXT AS status, created_at, merged_at
            "#,
        )
        .bind(data.id)
        .bind(data.name)
        .bind(data.author_id)
        .bind(PullRequestStatus::Open.as_str())
        .fetch_one(conn)
        .await
    }

    /// Finds a pull request by ID
    pub async fn find_by_id(conn: &mut PgConnection, id: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, PullRequest>(
            r#"
            SELECT pr.id, pr.name, pr.author_id, st.name AS status, pr.created_at, pr.merged_at
            FROM pull_requests pr
            JOIN statuses st ON st.id = pr.status_id
            WHERE pr.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(conn)
        .await
    }

    /// Finds a pull request by ID and locks its row for the rest of the
    /// transaction
    ///
    /// The lock is `FOR NO KEY UPDATE`: it serializes writers of the same
    /// pull request but still lets other transactions insert reviewer rows
    /// that reference it.
    pub async fn find_by_id_for_update(
        conn: &mut PgConnection,
        id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, PullRequest>(
            r#"
            SELECT pr.id, pr.name, pr.author_id, st.name AS status, pr.created_at, pr.merged_at
            FROM pull_requests pr
            JOIN statuses st ON st.id = pr.status_id
            WHERE pr.id = $1
            FOR NO KEY UPDATE OF pr
            "#,
        )
        .bind(id)
        .fetch_optional(conn)
        .await
    }

    /// Returns the author ID of an existing pull request
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error::RowNotFound` if the pull request does not exist
    pub async fn author_id(conn: &mut PgConnection, id: &str) -> Result<String, sqlx::Error> {
        sqlx::query_scalar("SELECT author_id FROM pull_requests WHERE id = $1")
            .bind(id)
            .fetch_one(conn)
            .await
    }

    /// Moves a pull request to MERGED and stamps `merged_at`
    ///
    /// # Returns
    ///
    /// The updated pull request, or None if it does not exist
    pub async fn mark_merged(conn: &mut PgConnection, id: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, PullRequest>(
            r#"
            UPDATE pull_requests
            SET status_id = (SELECT id FROM statuses WHERE name = $2),
                merged_at = NOW()
            WHERE id = $1
            RETURNING id, name, author_id, $2::TEXT AS status, created_at, merged_at
            "#,
        )
        .bind(id)
        .bind(PullRequestStatus::Merged.as_str())
        .fetch_optional(conn)
        .await
    }

    /// Lists the pull requests a user currently reviews, oldest first
    pub async fn list_reviewed_by(
        conn: &mut PgConnection,
        user_id: &str,
    ) -> Result<Vec<PullRequestShort>, sqlx::Error> {
        sqlx::query_as::<_, PullRequestShort>(
            r#"
            SELECT pr.id, pr.name, pr.author_id, st.name AS status
            FROM pull_requests pr
            JOIN statuses st ON st.id = pr.status_id
            JOIN reviewers rev ON rev.pull_request_id = pr.id
            WHERE rev.user_id = $1
            ORDER BY pr.created_at ASC, pr.id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(conn)
        .await
    }

    /// Attaches the current reviewer list
    pub async fn with_reviewers(self, conn: &mut PgConnection) -> Result<PullRequestDetails, sqlx::Error> {
        let reviewers = ReviewerAssignment::reviewer_ids(conn, &self.id).await?;

        Ok(PullRequestDetails {
            pull_request: self,
            reviewers,
        })
    }
}
