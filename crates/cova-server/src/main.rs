//! COVA - Restaurant ordering, booking and menu backend

use anyhow::{Context, Result};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;

use config::Config;
use cova_api::{AppState, create_router};
use cova_auth::{AuthService, TokenService};
use cova_db::Database;

/// COVA - Restaurant ordering, booking and menu backend
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "COVA_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Document store URL (`memory` or an SQLite URL)
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Secret used to sign access tokens
    #[arg(long, env = "COVA_JWT_SECRET", hide_env_values = true)]
    jwt_secret: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration
    let config_path = args.config.clone();
    let loaded = Config::load(&config_path)?;
    let from_file = loaded.is_some();
    let mut config = loaded.unwrap_or_default();
    apply_overrides(&mut config, args);

    // Initialize logging
    init_logging(&config.logging.level, &config.logging.format);

    info!("Starting COVA v{}", env!("CARGO_PKG_VERSION"));
    if from_file {
        info!("Loaded configuration from {}", config_path);
    } else {
        info!("Config file not found at {}, using defaults", config_path);
    }

    // Token settings are checked before anything else is started
    let secret = config.auth.secret()?;
    let algorithm = config.auth.algorithm()?;
    let ttl = config.auth.token_ttl()?;
    let tokens = Arc::new(
        TokenService::new(secret, algorithm, ttl).context("Failed to initialize token service")?,
    );

    // Initialize document store
    let db = match config.database.url.as_deref() {
        Some(url) => match open_database(url).await {
            Ok(db) => {
                info!("Connected to {} document store", db.backend_name().unwrap_or("unknown"));
                db
            }
            Err(e) => {
                error!("Failed to connect to document store: {}", e);
                warn!("Continuing without a document store; writes will be rejected");
                Database::unavailable()
            }
        },
        None => {
            warn!("DATABASE_URL is not set; running without a document store");
            Database::unavailable()
        }
    };

    info!("Inactive users: {}", config.auth.inactive_users.as_str());
    let auth = AuthService::new(db.clone(), tokens, config.auth.inactive_users);

    // Create the configured admin account if it does not exist yet
    if let Some((name, email, password)) = config.bootstrap.admin() {
        match auth.bootstrap_admin(name, email, password).await {
            Ok(true) => info!("Bootstrap admin {} created", email),
            Ok(false) => info!("Bootstrap admin {} already present", email),
            Err(e) => warn!("Could not create bootstrap admin {}: {}", email, e),
        }
    }

    // Initialize metrics
    let metrics_handle = if config.metrics.enabled {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("Failed to install Prometheus recorder")?;
        Some(Arc::new(handle))
    } else {
        None
    };

    // Create application state
    let state = AppState::new(db, auth, config.database.url.is_some());

    // Create router
    let mut app = create_router(state, metrics_handle).layer(TraceLayer::new_for_http());
    if config.cors.allow_any_origin {
        app = app.layer(CorsLayer::very_permissive());
    }

    let addr: SocketAddr = format!("{}:{}", config.server.bind_address, config.server.port)
        .parse()
        .context("Invalid bind address")?;

    info!("Listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Open the document store, creating the directory of an SQLite file first
async fn open_database(url: &str) -> Result<Database> {
    if let Some(dir) = sqlite_parent_dir(url) {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create database directory {}", dir.display()))?;
    }
    Ok(Database::new(url).await?)
}

fn sqlite_parent_dir(url: &str) -> Option<&Path> {
    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() || path == ":memory:" {
        return None;
    }
    Path::new(path).parent().filter(|dir| !dir.as_os_str().is_empty())
}

/// Command line and environment values take precedence over the file
fn apply_overrides(config: &mut Config, args: Args) {
    if let Some(bind) = args.bind {
        config.server.bind_address = bind;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(url) = args.database_url {
        config.database.url = Some(url);
    }

    let secret = args
        .jwt_secret
        .or_else(|| std::env::var("SECRET_KEY").ok());
    if secret.is_some() {
        config.auth.jwt_secret = secret;
    }
}

/// Initialize logging
fn init_logging(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let json = format.eq_ignore_ascii_case("json");
    let json_layer = json.then(|| fmt::layer().json().flatten_event(true));
    let text_layer = (!json).then(fmt::layer);

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_parent_dir() {
        assert_eq!(
            sqlite_parent_dir("sqlite:./data/cova.db?mode=rwc"),
            Some(Path::new("./data"))
        );
        assert_eq!(
            sqlite_parent_dir("sqlite:///var/lib/cova/cova.db"),
            Some(Path::new("/var/lib/cova"))
        );
        assert_eq!(sqlite_parent_dir("sqlite::memory:"), None);
        assert_eq!(sqlite_parent_dir("sqlite:cova.db"), None);
        assert_eq!(sqlite_parent_dir("memory"), None);
    }

    #[test]
    fn test_overrides_take_precedence() {
        let mut config = Config::default();
        let args = Args::parse_from([
            "cova",
            "--port",
            "9090",
            "--database-url",
            "memory",
            "--jwt-secret",
            "from-cli",
        ]);

        apply_overrides(&mut config, args);

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.database.url.as_deref(), Some("memory"));
        assert_eq!(config.auth.secret().unwrap(), "from-cli");
    }
}
