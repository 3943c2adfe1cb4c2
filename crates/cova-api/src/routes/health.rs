//! Service status and diagnostics endpoints

use axum::{Json, Router, extract::State, routing::get};
use cova_db::COLLECTIONS;
use serde::Serialize;
use tracing::warn;

use crate::state::AppState;

/// Maximum number of collections listed by the diagnostics endpoint
const MAX_LISTED_COLLECTIONS: usize = 10;

/// Service identity
#[derive(Serialize)]
pub struct RootResponse {
    pub name: &'static str,
    pub status: &'static str,
}

/// Known collections
#[derive(Serialize)]
pub struct SchemaResponse {
    pub collections: Vec<&'static str>,
}

/// Health status response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Document store diagnostics
#[derive(Serialize)]
pub struct DiagnosticsResponse {
    pub backend: &'static str,
    pub database: String,
    pub database_backend: Option<&'static str>,
    pub database_url: &'static str,
    pub connection_status: &'static str,
    pub collections: Vec<String>,
}

/// GET /
async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        name: "COVA",
        status: "ok",
    })
}

/// GET /schema
async fn schema() -> Json<SchemaResponse> {
    Json(SchemaResponse {
        collections: COLLECTIONS.to_vec(),
    })
}

/// GET /health
async fn health() -> Json<HealthResponse> {
    metrics::counter!("cova_health_checks_total").increment(1);

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /test
async fn diagnostics(State(state): State<AppState>) -> Json<DiagnosticsResponse> {
    let mut response = DiagnosticsResponse {
        backend: "running",
        database: "not available".to_string(),
        database_backend: state.db.backend_name(),
        database_url: if state.database_url_configured {
            "set"
        } else {
            "not set"
        },
        connection_status: "Not Connected",
        collections: Vec::new(),
    };

    if state.db.is_available() {
        match state.db.list_collections().await {
            Ok(mut collections) => {
                collections.truncate(MAX_LISTED_COLLECTIONS);
                response.database = "connected".to_string();
                response.connection_status = "Connected";
                response.collections = collections;
            }
            Err(e) => {
                warn!("Database diagnostics failed: {}", e);
                response.database = format!("connected but error: {}", e);
            }
        }
    }

    Json(response)
}

/// Create status routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/schema", get(schema))
        .route("/test", get(diagnostics))
        .route("/health", get(health))
        .route("/healthz", get(health))
}
