//! VidHive server entry point.

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vidhive_db::{DbManager, run_migrations};
use vidhive_server::api::{self, AppState};
use vidhive_server::config::ServerConfig;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("vidhive=info".parse()?))
        .json()
        .init();

    let config = ServerConfig::from_env()?;

    let db = DbManager::connect(&config.db)
        .await
        .context("failed to connect to SurrealDB")?;
    run_migrations(db.client())
        .await
        .context("failed to run migrations")?;

    let state = AppState::new(db.client().clone(), config.auth.clone(), config.cookie_secure);
    let mut app = api::router(state);
    if let Some(origin) = config.cors_origin.as_deref() {
        app = app.layer(api::cors_layer(origin).context("invalid VIDHIVE_CORS_ORIGIN")?);
    }

    let listener = TcpListener::bind(("0.0.0.0", config.http_port))
        .await
        .with_context(|| format!("failed to bind port {}", config.http_port))?;
    info!(port = config.http_port, "listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}
