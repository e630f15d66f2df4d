/// Team model and database operations
///
/// A team is just a unique name; its members are the users whose `team_name`
/// matches. Membership changes by adding users under the name or by flipping
/// their `is_active` flag, never by deleting rows.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE teams (
///     name TEXT PRIMARY KEY
/// );
/// ```

use serde::{Deserialize, Serialize};
use sqlx::PgConnection;

/// A team together with its current members
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Unique team name
    pub name: String,

    /// Members ordered by user ID
    pub members: Vec<TeamMember>,
}

/// Member entry of a team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TeamMember {
    pub user_id: String,
    pub username: String,
    pub is_active: bool,
}

impl Team {
    /// Checks whether a team with this name exists
    pub async fn exists(conn: &mut PgConnection, name: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM teams WHERE name = $1)")
            .bind(name)
            .fetch_one(conn)
            .await
    }

    /// Inserts a new team row
    ///
    /// # Errors
    ///
    /// Fails with a unique violation if the name is already taken.
    pub async fn insert(conn: &mut PgConnection, name: &str) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO teams (name) VALUES ($1)")
            .bind(name)
            .execute(conn)
            .await?;

        Ok(())
    }

    /// Loads a team with all of its members
    ///
    /// # Returns
    ///
    /// The team, or None if no team has this name. A team without members is
    /// returned with an empty member list.
    pub async fn find_by_name(conn: &mut PgConnection, name: &str) -> Result<Option<Self>, sqlx::Error> {
        if !Self::exists(&mut *conn, name).await? {
            return Ok(None);
        }

        let members = Self::members(conn, name).await?;

        Ok(Some(Team {
            name: name.to_string(),
            members,
        }))
    }

    /// Lists the members of a team ordered by user ID
    pub async fn members(conn: &mut PgConnection, name: &str) -> Result<Vec<TeamMember>, sqlx::Error> {
        sqlx::query_as::<_, TeamMember>(
            r#"
            SELECT id AS user_id, name AS username, is_active
            FROM users
            WHERE team_name = $1
            ORDER BY id ASC
            "#,
        )
        .bind(name)
        .fetch_all(conn)
        .await
    }
}

impl Team {
    /// IDs of the members that are currently active
    pub fn active_member_ids(&self) -> Vec<&str> {
        self.members
            .iter()
            .filter(|m| m.is_active)
            .map(|m| m.user_id.as_str())
            .collect()
    }
}
