//! # PrRoster API Server
//!
//! Assigns pull request reviewers within teams and keeps the assignments
//! valid as members are deactivated or swapped.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/prroster ADMIN_TOKEN=secret cargo run -p prroster-api
//! ```

use anyhow::Context;
use prroster_api::{
    app::{build_router, AppState},
    config::Config,
};
use prroster_shared::db::{migrations, pool};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    init_tracing(&config);

    tracing::info!(
        env = ?config.env,
        "PrRoster API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let db = pool::create_pool(config.database.pool_config())
        .await
        .context("Failed to connect to database")?;

    if config.database.run_migrations {
        migrations::run_migrations(&db)
            .await
            .context("Failed to run database migrations")?;
    }

    let address = config.bind_address();
    let app = build_router(AppState::new(db.clone(), config));

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    tracing::info!(address = %address, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    pool::close_pool(db).await;
    tracing::info!("Shutdown complete");

    Ok(())
}

/// Installs the global subscriber: pretty output locally, JSON lines elsewhere
fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "prroster_api=debug,prroster_shared=debug,tower_http=debug".into());

    let json = config.env.json_logs();

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json()))
        .with((!json).then(fmt::layer))
        .init();
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections...");
}
