/// User model and database operations
///
/// Users are identified by an externally issued string ID. A user belongs to
/// at most one team (`team_name`) and carries an `is_active` flag; only active
/// users are ever picked as reviewers. Users are never deleted.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id TEXT PRIMARY KEY,
///     name TEXT NOT NULL,
///     team_name TEXT REFERENCES teams(name) ON UPDATE CASCADE,
///     is_active BOOLEAN NOT NULL DEFAULT TRUE
/// );
/// ```
///
/// All operations take a `&mut PgConnection` so they can run either on a
/// pooled connection or inside an engine transaction (`&mut *tx`).

use serde::{Deserialize, Serialize};
use sqlx::PgConnection;

/// User model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Externally issued user ID
    pub id: String,

    /// Display name
    pub name: String,

    /// Team the user belongs to (None = unaffiliated)
    pub team_name: Option<String>,

    /// Whether the user may be assigned as a reviewer
    pub is_active: bool,
}

/// Input for creating or updating a user as part of a team
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertUser {
    pub id: String,
    pub name: String,
    pub team_name: String,
    pub is_active: bool,
}

impl User {
    /// Finds a user by ID
    pub async fn find_by_id(conn: &mut PgConnection, id: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, team_name, is_active
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(conn)
        .await
    }

    /// Checks whether a user exists
    pub async fn exists(conn: &mut PgConnection, id: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(conn)
            .await
    }

    /// Inserts a user or, if the ID is already known, overwrites its name,
    /// active flag and team
    ///
    /// Moving a user to another team this way does not touch the reviewer
    /// rows created under the previous team.
    pub async fn upsert(conn: &mut PgConnection, data: &UpsertUser) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, team_name, is_active)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE
            SET name = EXCLUDED.name,
                team_name = EXCLUDED.team_name,
                is_active = EXCLUDED.is_active
            RETURNING id, name, team_name, is_active
            "#,
        )
        .bind(&data.id)
        .bind(&data.name)
        .bind(&data.team_name)
        .bind(data.is_active)
        .fetch_one(conn)
        .await
    }

    /// Sets the active flag of a single user
    ///
    /// # Returns
    ///
    /// The updated user, or None if no such user exists
    pub async fn set_active(
        conn: &mut PgConnection,
        id: &str,
        is_active: bool,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET is_active = $2
            WHERE id = $1
            RETURNING id, name, team_name, is_active
            "#,
        )
        .bind(id)
        .bind(is_active)
        .fetch_optional(conn)
        .await
    }

    /// Marks every listed user inactive
    ///
    /// # Returns
    ///
    /// Number of rows updated
    pub async fn deactivate_many(conn: &mut PgConnection, ids: &[String]) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET is_active = FALSE WHERE id = ANY($1)")
            .bind(ids)
            .execute(conn)
            .await?;

        Ok(result.rows_affected())
    }

    /// Lists all members of a team under a shared row lock
    ///
    /// Shared locks do not exclude each other, so concurrent reassignments in
    /// one team proceed in parallel, but they wait for a cascade that is
    /// deactivating any of the members.
    pub async fn list_by_team_for_share(
        conn: &mut PgConnection,
        team_name: &str,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, team_name, is_active
            FROM users
            WHERE team_name = $1
            ORDER BY id ASC
            FOR SHARE
            "#,
        )
        .bind(team_name)
        .fetch_all(conn)
        .await
    }

    /// Lists the active members of a team, ordered by ID
    pub async fn active_ids_by_team(
        conn: &mut PgConnection,
        team_name: &str,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT id FROM users
            WHERE team_name = $1 AND is_active = TRUE
            ORDER BY id ASC
            "#,
        )
        .bind(team_name)
        .fetch_all(conn)
        .await
    }

    /// Lists the active teammates of `author_id`, locking their rows
    ///
    /// The row locks serialize concurrent pull request creations against the
    /// same team until the calling transaction ends.
    pub async fn active_teammate_ids_for_update(
        conn: &mut PgConnection,
        team_name: &str,
        author_id: &str,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT id FROM users
            WHERE team_name = $1
              AND is_active = TRUE
              AND id <> $2
            ORDER BY id ASC
            FOR UPDATE
            "#,
        )
        .bind(team_name)
        .bind(author_id)
        .fetch_all(conn)
        .await
    }

    /// Returns which of `ids` belong to `team_name`, locking those rows
    pub async fn ids_in_team_for_update(
        conn: &mut PgConnection,
        team_name: &str,
        ids: &[String],
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT id FROM users
            WHERE team_name = $1 AND id = ANY($2)
            ORDER BY id ASC
            FOR UPDATE
            "#,
        )
        .bind(team_name)
        .bind(ids)
        .fetch_all(conn)
        .await
    }
}
