/// Middleware modules for the API server
///
/// - `admin`: `X-Admin-Token` check for admin-only routes

pub mod admin;
