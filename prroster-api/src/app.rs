/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use prroster_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = prroster_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, middleware::admin::require_admin_token};
use axum::{
    routing::{get, post},
    Router,
};
use prroster_shared::assignment::AssignmentEngine;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Reviewer assignment engine
    pub engine: AssignmentEngine,

    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state with an entropy-seeded engine
    pub fn new(db: PgPool, config: Config) -> Self {
        Self::with_engine(AssignmentEngine::new(db), config)
    }

    /// Creates application state around an existing engine
    pub fn with_engine(engine: AssignmentEngine, config: Config) -> Self {
        Self {
            db: engine.pool().clone(),
            engine,
            config: Arc::new(config),
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET  /health
/// ├── POST /team/add
/// ├── GET  /team/get?team_name=
/// ├── POST /team/deactivate          (admin)
/// ├── POST /users/setIsActive        (admin)
/// ├── GET  /users/getReview?user_id=
/// ├── POST /pullRequest/create
/// ├── POST /pullRequest/merge
/// └── POST /pullRequest/reassign
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Request timeout (tower-http TimeoutLayer); an aborted request drops
///    its open transaction, which rolls it back
/// 2. Logging (tower-http TraceLayer)
/// 3. Admin token check (admin routes only)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let admin_routes = Router::new()
        .route("/team/deactivate", post(routes::team::deactivate_team))
        .route("/users/setIsActive", post(routes::users::set_is_active))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_admin_token,
        ));

    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/team/add", post(routes::team::add_team))
        .route("/team/get", get(routes::team::get_team))
        .route("/users/getReview", get(routes::users::get_review))
        .route("/pullRequest/create", post(routes::pull_request::create_pull_request))
        .route("/pullRequest/merge", post(routes::pull_request::merge_pull_request))
        .route("/pullRequest/reassign", post(routes::pull_request::reassign_reviewer));

    let timeout = state.config.request_timeout();

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(TimeoutLayer::new(timeout))
        .with_state(state)
}
