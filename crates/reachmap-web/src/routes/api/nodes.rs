//! Node endpoints: inventory projections only, no policy evaluation.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::time::Instant;

use crate::state::AppState;
use crate::views::{NodeDetail, NodeList};

/// GET /api/nodes
pub async fn node_list(State(state): State<AppState>) -> Response {
    let started = Instant::now();

    let nodes = match state.inventory.nodes().await {
        Ok(nodes) => nodes,
        Err(e) => {
            tracing::error!("Failed to list nodes: {}", e);
            return internal_error(e.to_string());
        }
    };

    let pods = match state.inventory.pods().await {
        Ok(pods) => pods,
        Err(e) => {
            tracing::error!("Failed to list pods: {}", e);
            return internal_error(e.to_string());
        }
    };

    let view = NodeList::build(&nodes, &pods);
    tracing::debug!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        nodes = view.total_node,
        "listed nodes",
    );
    Json(view).into_response()
}

/// GET /api/nodes/:name
pub async fn node_detail(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    let started = Instant::now();

    match state.inventory.node(&name).await {
        Ok(node) => {
            tracing::debug!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                "fetched node {name}",
            );
            Json(NodeDetail::from(&node)).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to get node {}: {}", name, e);
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
