/// Database models for PrRoster
///
/// This module contains all database models and their queries. Every query
/// takes a `&mut PgConnection`, so the same model code runs on a pooled
/// connection and inside an engine transaction.
///
/// # Models
///
/// - `user`: Users with their team and active flag
/// - `team`: Teams and their member lists
/// - `pull_request`: Pull requests and their OPEN/MERGED status
/// - `reviewer`: Reviewer assignments (pull request, user) pairs
///
/// # Example
///
/// ```no_run
/// use prroster_shared::models::user::User;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let mut conn = pool.acquire().await?;
/// if let Some(user) = User::find_by_id(&mut conn, "u1").await? {
///     println!("{} active: {}", user.name, user.is_active);
/// }
/// # Ok(())
/// # }
/// ```

pub mod pull_request;
pub mod reviewer;
pub mod team;
pub mod user;
