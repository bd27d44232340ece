//! Pod reachability endpoint.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::time::Instant;

use crate::state::AppState;
use crate::views::PodDetail;

/// GET /api/pods/:name
pub async fn pod_detail(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    let started = Instant::now();

    let snapshot = match state.inventory.snapshot().await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            tracing::error!("Failed to fetch cluster inventory: {}", e);
            return internal_error(e.to_string());
        }
    };

    match reachmap_core::evaluate(&snapshot, &name) {
        Ok(reachability) => {
            let view = PodDetail::from(&reachability);
            tracing::debug!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                peers = view.access_pods.len(),
                "computed pod detail for {name}",
            );
            Json(view).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to evaluate reachability for {}: {}", name, e);
            internal_error(e.to_string())
        }
    }
}

fn internal_error(message: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": message })),
    )
        .into_response()
}
