//! Reachmap API server binary.

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use clap::Parser;
use reachmap_inventory::ClusterInventory;
use reachmap_web::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Read-only NetworkPolicy reachability analyzer for Kubernetes clusters.
#[derive(Parser, Debug)]
#[command(name = "reachmap", version, about)]
struct Args {
    /// Path to a kubeconfig file; the default client chain is used when absent.
    #[arg(long, env = "REACHMAP_KUBECONFIG")]
    kubeconfig: Option<PathBuf>,

    /// Address the API server binds to.
    #[arg(long, default_value = "0.0.0.0:8080")]
    listen: SocketAddr,

    /// Origin allowed to call the API from a browser; repeat for more.
    #[arg(long = "cors-origin", default_value = "http://localhost:3000")]
    cors_origins: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reachmap=info,reachmap_web=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    tracing::info!("Starting Reachmap API server v{}", env!("CARGO_PKG_VERSION"));

    let cors_origins = args
        .cors_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("invalid CORS origin {origin:?}"))
        })
        .collect::<Result<Vec<_>>>()?;

    let inventory = ClusterInventory::connect(args.kubeconfig.as_deref())
        .await
        .context("failed to connect to the Kubernetes cluster")?;

    tracing::info!("Connected to Kubernetes cluster");

    let state = AppState::new(inventory);
    reachmap_web::serve(args.listen, state, cors_origins).await
}
