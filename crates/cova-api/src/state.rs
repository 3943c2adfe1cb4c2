//! Application state

use cova_auth::AuthService;
use cova_db::Database;

/// Prometheus handle rendering the `/metrics` body
pub type MetricsHandle = metrics_exporter_prometheus::PrometheusHandle;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub auth: AuthService,
    /// Whether a database URL was supplied at startup
    pub database_url_configured: bool,
}

impl AppState {
    pub fn new(db: Database, auth: AuthService, database_url_configured: bool) -> Self {
        Self {
            db,
            auth,
            database_url_configured,
        }
    }
}
