//! Reachmap HTTP surface.
//!
//! A thin axum layer over the inventory and the reachability evaluator:
//! three GET endpoints, JSON in and out.

use axum::http::HeaderValue;
use std::net::SocketAddr;

pub mod routes;
pub mod state;
pub mod views;

pub use state::AppState;

/// Create the application router.
pub fn create_app(state: AppState, cors_origins: Vec<HeaderValue>) -> axum::Router {
    routes::build_router(state, cors_origins)
}

/// Start the API server.
pub async fn serve(
    addr: SocketAddr,
    state: AppState,
    cors_origins: Vec<HeaderValue>,
) -> anyhow::Result<()> {
    let app = create_app(state, cors_origins);

    tracing::info!("API server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
