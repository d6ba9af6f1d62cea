//! fleetd — the fleet management service binary.
//!
//! Loads configuration from the environment, runs pending migrations and
//! serves the JSON API.

use std::sync::Arc;

use anyhow::Context;
use fleet_core::AppConfig;
use fleet_http::{router, AppState};
use fleet_storage::PostgresStore;
use sqlx::postgres::PgPoolOptions;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("loading configuration")?;
    config.validate().context("validating configuration")?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!(
        name = %config.name,
        environment = ?config.environment,
        "starting"
    );

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("connecting to the database")?;

    let store = PostgresStore::new(pool);
    store.migrate().await.context("running migrations")?;

    let state = AppState::new(Arc::new(store));
    let app = router(state).layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, app).await.context("serving")?;
    Ok(())
}
