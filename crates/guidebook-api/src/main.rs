//! Guidebook API server entry point.

use std::sync::Arc;

use guidebook_api::config::ServerConfig;
use guidebook_api::error::AppError;
use guidebook_api::state::AppState;
use guidebook_api::{app, telemetry};
use guidebook_core::clock::SystemClock;
use guidebook_event_store::MIGRATOR;
use guidebook_event_store::pg_event_repository::PgEventRepository;
use guidebook_script::GuideLibrary;
use sqlx::postgres::PgPoolOptions;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = ServerConfig::from_env()?;
    let _telemetry = telemetry::init(config.otlp_endpoint.as_deref())?;

    tracing::info!("Starting Guidebook API server");

    let guides = GuideLibrary::load_dir(&config.guide_dir)?;
    tracing::info!(
        guide_dir = %config.guide_dir.display(),
        count = guides.len(),
        "guide library loaded"
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;
    MIGRATOR.run(&pool).await?;

    let app_state = AppState::new(
        Arc::new(SystemClock),
        Arc::new(PgEventRepository::new(pool)),
        Arc::new(guides),
    );

    tracing::info!("Listening on {}", config.addr);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app(app_state)).await?;

    Ok(())
}
