/// API route handlers
///
/// Handlers are organized by resource:
///
/// - `health`: Health check endpoint
/// - `team`: Team creation, lookup and member deactivation
/// - `users`: User active flag and review list
/// - `pull_request`: Pull request creation, merge and reviewer reassignment

pub mod health;
pub mod pull_request;
pub mod team;
pub mod users;
