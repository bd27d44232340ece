//! HTTP routes.

pub mod api;

use axum::http::{header, HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the application router.
pub fn build_router(state: AppState, cors_origins: Vec<HeaderValue>) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/nodes", get(api::nodes::node_list))
        .route("/nodes/:name", get(api::nodes::node_detail))
        .route("/pods/:name", get(api::pods::pod_detail))
}

/// Cross-origin access for the browser frontend: whitelisted origins only,
/// with credentials, preflight results cached for a day.
fn cors_layer(origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::CONTENT_LENGTH,
            header::ACCEPT_ENCODING,
        ])
        .allow_credentials(true)
        .max_age(Duration::from_secs(24 * 60 * 60))
}
