/// Reviewer assignment model and database operations
///
/// A reviewer assignment pairs one pull request with one user. The pair is
/// the primary key, so a user can never be assigned twice to the same pull
/// request. Replacing or dropping a reviewer deletes the row.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE reviewers (
///     pull_request_id TEXT NOT NULL REFERENCES pull_requests(id) ON DELETE CASCADE,
///     user_id TEXT NOT NULL REFERENCES users(id),
///     assigned_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (pull_request_id, user_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;

/// Reviewer assignment row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReviewerAssignment {
    pub pull_request_id: String,
    pub user_id: String,
    pub assigned_at: DateTime<Utc>,
}

impl ReviewerAssignment {
    /// Assigns a user as reviewer of a pull request
    ///
    /// # Errors
    ///
    /// Fails with a unique violation if the user already reviews this pull
    /// request.
    pub async fn assign(
        conn: &mut PgConnection,
        pull_request_id: &str,
        user_id: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, ReviewerAssignment>(
            r#"
            INSERT INTO reviewers (pull_request_id, user_id)
            VALUES ($1, $2)
            RETURNING pull_request_id, user_id, assigned_at
            "#,
        )
        .bind(pull_request_id)
        .bind(user_id)
        .fetch_one(conn)
        .await
    }

    /// Removes a reviewer from a pull request
    ///
    /// # Returns
    ///
    /// True if a row was deleted
    pub async fn remove(
        conn: &mut PgConnection,
        pull_request_id: &str,
        user_id: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM reviewers WHERE pull_request_id = $1 AND user_id = $2")
            .bind(pull_request_id)
            .bind(user_id)
            .execute(conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists the reviewer IDs of a pull request in assignment order
    pub async fn reviewer_ids(
        conn: &mut PgConnection,
        pull_request_id: &str,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT user_id FROM reviewers
            WHERE pull_request_id = $1
            ORDER BY assigned_at ASC, user_id ASC
            "#,
        )
        .bind(pull_request_id)
        .fetch_all(conn)
        .await
    }

    /// Lists the reviewer IDs of a pull request and locks those rows
    pub async fn reviewer_ids_for_update(
        conn: &mut PgConnection,
        pull_request_id: &str,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT user_id FROM reviewers
            WHERE pull_request_id = $1
            ORDER BY assigned_at ASC, user_id ASC
            FOR UPDATE
            "#,
        )
        .bind(pull_request_id)
        .fetch_all(conn)
        .await
    }

    /// Lists every reviewer row of the pull requests reviewed by any of
    /// `user_ids`, locking them
    ///
    /// Rows come back ordered by pull request, then user, so concurrent
    /// cascades acquire their locks in the same order.
    pub async fn list_on_reviewed_pull_requests_for_update(
        conn: &mut PgConnection,
        user_ids: &[String],
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ReviewerAssignment>(
            r#"
            SELECT pull_request_id, user_id, assigned_at
            FROM reviewers
            WHERE pull_request_id IN (
                SELECT pull_request_id FROM reviewers WHERE user_id = ANY($1)
            )
            ORDER BY pull_request_id ASC, user_id ASC
            FOR UPDATE
            "#,
        )
        .bind(user_ids)
        .fetch_all(conn)
        .await
    }
}
