// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::health_handler;
use super::readtext::readtext_handler;
use crate::config::ServerArgs;
use crate::engine::EnginePool;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<EnginePool>,
}

impl AppState {
    pub fn new(pool: Arc<EnginePool>) -> Self {
        Self { pool }
    }
}

pub fn create_app(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        // Health check
        .route("/", get(health_handler))
        // Recognition endpoint
        .route("/readtext", post(readtext_handler))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(args: &ServerArgs, state: AppState) -> anyhow::Result<()> {
    let app = create_app(state, args.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(args.listen_addr()).await?;

    tracing::info!("API server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("API server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
