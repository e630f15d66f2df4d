/// Admin token middleware
///
/// Admin-only routes (team deactivation and the single-user active flag)
/// require the `X-Admin-Token` header to equal the configured token.
///
/// # Example
///
/// ```no_run
/// use prroster_api::app::AppState;
/// use prroster_api::middleware::admin::require_admin_token;
/// use axum::{routing::post, Router};
///
/// # fn example(state: AppState) {
/// let admin_routes: Router<AppState> = Router::new()
///     .route("/team/deactivate", post(|| async { "ok" }))
///     .route_layer(axum::middleware::from_fn_with_state(state, require_admin_token));
/// # }
/// ```

use crate::app::AppState;
use crate::error::ApiError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

/// Header carrying the admin token
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Rejects the request with 401 unless it carries the admin token
pub async fn require_admin_token(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let provided = req
        .headers()
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            tracing::warn!(path = %req.uri().path(), "Admin token missing");
            ApiError::Unauthorized("Missing admin token".to_string())
        })?;

    if !tokens_match(provided, &state.config.admin.token) {
        tracing::warn!(path = %req.uri().path(), "Admin token rejected");
        return Err(ApiError::Unauthorized("Invalid admin token".to_string()));
    }

    Ok(next.run(req).await)
}

/// Compares two tokens without short-circuiting on the first mismatch
fn tokens_match(provided: &str, expected: &str) -> bool {
    let (a, b) = (provided.as_bytes(), expected.as_bytes());
    if a.len() != b.len() {
        return false;
    }

    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
