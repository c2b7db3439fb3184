mod config;
mod error;
mod middleware;
mod notifications;
mod routes;
mod state;
mod templates;
mod views;

use std::sync::Arc;

use chrono::Duration;
use lodge_site_core::auth::AdminGate;
use lodge_site_core::events::EventBus;
use lodge_site_core::media::{spawn_connectivity_monitor, FilesystemImageStore, Uploader};
use lodge_site_core::store::PgStore;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (dev convenience)
    let _ = dotenvy::dotenv();

    let config = config::AppConfig::from_env()
        .map_err(|e| anyhow::anyhow!("Failed to load config: {e}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    tracing::info!(site = %config.site_name, "Starting site server");

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .min_connections(config.db_min_connections)
        .connect(&config.database_url)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to database: {e}"))?;

    tracing::info!("Connected to PostgreSQL");

    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to run migrations: {e}"))?;

    tracing::info!("Database migrations applied");

    let event_bus = EventBus::new(config.event_bus_capacity);
    let store = Arc::new(PgStore::new(pool));

    let images = FilesystemImageStore::new(config.media_dir.clone(), config.media_base_url.clone())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to prepare media directory: {e}"))?;
    let uploader = Arc::new(Uploader::new(
        Arc::new(images),
        event_bus.clone(),
        config.max_upload_bytes,
    ));

    let gate = AdminGate::new(
        &config.admin_password,
        &config.jwt_secret,
        Duration::hours(config.session_hours),
    )
    .map_err(|e| anyhow::anyhow!("Failed to set up admin login: {e}"))?;

    let state = state::AppState::new(state::StateParts {
        config: config.clone(),
        content: store.clone(),
        images: store,
        uploader: uploader.clone(),
        gate,
        event_bus,
    });

    notifications::spawn_collector(state.clone());
    spawn_connectivity_monitor(uploader, config.connectivity_interval());

    let app = routes::build_router(state)
        .layer(middleware::request_tracing::trace_layer())
        .layer(middleware::cors::cors_layer());

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

/// Wait for SIGINT (Ctrl+C) or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => { tracing::info!("Received Ctrl+C, shutting down..."); }
        _ = terminate => { tracing::info!("Received SIGTERM, shutting down..."); }
    }
}
