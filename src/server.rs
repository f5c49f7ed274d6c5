//! Inbound HTTP surface
//!
//! Client-facing decrypt entry point, the worker heartbeat sink, and the
//! metrics endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::coordinator::JobCoordinator;
use crate::error::CoordinatorError;
use crate::metrics;

#[derive(Debug, Deserialize)]
pub struct DecryptRequest {
    pub credential: String,
}

#[derive(Debug, Serialize)]
pub struct DecryptResponse {
    pub plaintext: String,
}

#[derive(Debug, Deserialize)]
pub struct HeartbeatRequest {
    pub worker: String,
}

/// Build the inbound router
pub fn router(coordinator: Arc<JobCoordinator>) -> Router {
    Router::new()
        .route("/v1/decrypt", post(decrypt))
        .route("/v1/heartbeat", post(heartbeat))
        .route("/metrics", get(export_metrics))
        .layer(CorsLayer::permissive())
        .with_state(coordinator)
}

/// Blocks until the job is solved; see [`JobCoordinator::decrypt`]
async fn decrypt(
    State(coordinator): State<Arc<JobCoordinator>>,
    Json(request): Json<DecryptRequest>,
) -> Result<Json<DecryptResponse>, (StatusCode, String)> {
    match coordinator.decrypt(request.credential).await {
        Ok(plaintext) => Ok(Json(DecryptResponse { plaintext })),
        Err(e @ CoordinatorError::EmptyRegistry) => {
            warn!("decrypt rejected: {e}");
            Err((StatusCode::SERVICE_UNAVAILABLE, e.to_string()))
        }
        Err(e) => Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string())),
    }
}

async fn heartbeat(
    State(coordinator): State<Arc<JobCoordinator>>,
    Json(request): Json<HeartbeatRequest>,
) -> StatusCode {
    coordinator.record_heartbeat(&request.worker);
    StatusCode::NO_CONTENT
}

async fn export_metrics() -> String {
    metrics::gather()
}
