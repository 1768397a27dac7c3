//! API routes and handlers
//!
//! Thin transport over `AnalysisService`: deserialize, delegate, map the
//! result envelope to a status code. A failed analysis is a client error
//! with the same body shape as a success, per the response contract.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use candlelens_ai::{AnalysisRequest, AnalysisService, ProviderId};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<AnalysisService>,
}

/// Create the API router with CORS and request tracing
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/ai/analyze", post(analyze))
        .route("/api/ai/providers", get(list_providers))
        .route("/api/ai/health", get(health_check))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run one analysis. Success maps to 200; any failure the orchestrator
/// reported maps to 400 with the same envelope.
async fn analyze(State(state): State<AppState>, Json(request): Json<AnalysisRequest>) -> Response {
    let result = state.service.analyze(request).await;
    let status = if result.success {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    (status, Json(result)).into_response()
}

/// Availability of each known provider, keyed by identifier
async fn list_providers(State(state): State<AppState>) -> Json<BTreeMap<String, bool>> {
    let providers = ProviderId::ALL
        .iter()
        .map(|id| {
            let name = id.to_string();
            let available = state.service.is_provider_available(&name);
            (name, available)
        })
        .collect();
    Json(providers)
}

/// Health check response
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    timestamp: i64,
}

async fn health_check() -> Json<HealthResponse> {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0);

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp,
    })
}
