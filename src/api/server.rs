//! HTTP API server

use crate::config::ConfigManager;
use crate::mcp::Dispatcher;
use crate::registry::CapabilityRegistry;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    /// Server address
    pub addr: SocketAddr,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            addr: ([127, 0, 0, 1], 8000).into(),
        }
    }
}

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    /// Configuration manager
    pub config: Arc<ConfigManager>,
    /// Capability registry, rebuilt on accepted config updates
    pub registry: Arc<CapabilityRegistry>,
    /// Request dispatcher (source of metrics and the store handle)
    pub dispatcher: Arc<Dispatcher>,
}

/// API server
pub struct ApiServer {
    config: ApiServerConfig,
    state: AppState,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(config: ApiServerConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Bind and serve until the process exits
    pub async fn serve(self) -> anyhow::Result<()> {
        let router = build_router(self.state);
        let listener = tokio::net::TcpListener::bind(self.config.addr).await?;
        info!("HTTP API listening on {}", self.config.addr);
        axum::serve(listener, router).await?;
        Ok(())
    }
}

/// Build the operator API router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/config", get(get_config_handler))
        .route("/config/update", post(update_config_handler))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Health check and version info
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let config = state.config.current();
    Json(serde_json::json!({
        "status": "online",
        "server": config.name,
        "version": config.version,
    }))
}

/// Current metrics snapshot, kb count fetched live
async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    let metrics = state.dispatcher.metrics();
    match metrics.snapshot(state.dispatcher.store().as_ref()).await {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"status": "error", "message": e.to_string()})),
        )
            .into_response(),
    }
}

/// Raw YAML configuration for operator editing
async fn get_config_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.config.raw_yaml() {
        Ok(yaml) => Json(serde_json::json!({"yaml": yaml})).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"status": "error", "message": e.to_string()})),
        )
            .into_response(),
    }
}

#[derive(Debug, Deserialize)]
struct UpdateConfigRequest {
    yaml: Option<String>,
}

#[derive(Debug, Serialize)]
struct UpdateConfigResponse {
    status: &'static str,
    message: String,
}

/// Apply a raw YAML configuration document
///
/// The registry is rebuilt from the accepted document before the response
/// goes out, so a caller that sees success and immediately lists tools sees
/// the new definitions.
async fn update_config_handler(
    State(state): State<AppState>,
    Json(request): Json<UpdateConfigRequest>,
) -> impl IntoResponse {
    let Some(yaml) = request.yaml else {
        return (
            StatusCode::BAD_REQUEST,
            Json(UpdateConfigResponse {
                status: "error",
                message: "No YAML provided".to_string(),
            }),
        );
    };

    match state.config.update_from_yaml(&yaml) {
        Ok(config) => {
            state.registry.rebuild(&config.tools, &config.resources);
            (
                StatusCode::OK,
                Json(UpdateConfigResponse {
                    status: "success",
                    message: "Configuration updated".to_string(),
                }),
            )
        }
        Err(e) => {
            warn!("Rejected config update: {}", e);
            (
                StatusCode::BAD_REQUEST,
                Json(UpdateConfigResponse {
                    status: "error",
                    message: e.to_string(),
                }),
            )
        }
    }
}
