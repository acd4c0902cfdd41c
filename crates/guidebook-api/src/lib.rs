//! Guidebook: HTTP API.
//!
//! Exposes campaign commands and queries over axum. The binary in
//! `main.rs` wires configuration, telemetry, the PostgreSQL event store and
//! the guide library into [`app`].

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod telemetry;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Builds the full application router.
pub fn app(state: state::AppState) -> Router {
    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    Router::new()
        .merge(routes::health::router())
        .nest(
            "/api/v1",
            Router::new()
                .merge(routes::health::router())
                .nest("/campaigns", routes::campaigns::router())
                .nest("/guides", routes::guides::router()),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
