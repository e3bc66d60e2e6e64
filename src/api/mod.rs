pub mod error;
pub mod handlers;
pub mod state;


use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use state::ApiState;

pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route(
            "/internal/graph/validate",
            post(handlers::strategy::validate),
        )
        .route(
            "/internal/strategy/generate",
            post(handlers::generate::generate),
        )
        .route(
            "/internal/strategy/{id}/activate",
            post(handlers::strategy::activate),
        )
        .route(
            "/internal/strategy/{id}/deactivate",
            post(handlers::strategy::deactivate),
        )
        .route("/internal/status", get(handlers::status::status))
        .route("/metrics", get(handlers::metrics::render))
        .with_state(state)
}

pub async fn serve(state: Arc<ApiState>, port: u16) -> anyhow::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    tracing::info!(port, "internal_api_listening");
    axum::serve(listener, app).await?;
    Ok(())
}
