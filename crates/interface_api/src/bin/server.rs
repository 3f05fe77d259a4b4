//! Benefit Waterfall Simulator - API Server Binary
//!
//! This binary loads the plan and scenario catalogs and starts the HTTP
//! API server.
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin benefit-sim-api
//!
//! # Run with environment variables
//! API_PORT=9000 API_CATALOG_DIR=./data API_LOG_FORMAT=json cargo run --bin benefit-sim-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_CATALOG_DIR` - Directory holding `plans/*.json` and `scenarios/*.json` (default: data)
//! * `API_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `API_LOG_FORMAT` - `pretty` or `json` (default: pretty)
//! * `API_SIMULATION__CLIFF_MATERIALITY_RATIO` - Premium jump per unit of income
//!   above which a band boundary is flagged (default: 0)

use anyhow::Context;
use std::net::SocketAddr;
use std::path::Path;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use domain_plan::PlanCatalog;
use domain_scenario::ScenarioCatalog;
use interface_api::config::{ApiConfig, LogFormat};
use interface_api::create_router;

/// Main entry point for the API server.
///
/// Initializes logging, loads configuration and catalogs, and starts the
/// HTTP server.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration cannot be loaded from environment
/// - A catalog file cannot be read or holds an invalid plan or scenario
/// - Server fails to bind to the configured address
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env().context("invalid API configuration")?;

    init_tracing(&config.log_level, config.log_format);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        catalog_dir = %config.catalog_dir,
        "Starting benefit waterfall simulator API"
    );

    let (plans, scenarios) = load_catalogs(Path::new(&config.catalog_dir))?;

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .with_context(|| format!("invalid server address {}", config.server_addr()))?;

    let app = create_router(plans, scenarios, config);

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(log_level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init(),
    }
}

/// Loads `plans/` and `scenarios/` under the catalog directory.
///
/// A missing `scenarios/` directory leaves the scenario catalog empty;
/// requests can still supply scenarios inline.
fn load_catalogs(dir: &Path) -> anyhow::Result<(PlanCatalog, ScenarioCatalog)> {
    let mut plans = PlanCatalog::new();
    plans
        .load_from_dir(&dir.join("plans"))
        .context("failed to load plan catalog")?;

    let mut scenarios = ScenarioCatalog::new();
    let scenario_dir = dir.join("scenarios");
    if scenario_dir.is_dir() {
        scenarios
            .load_from_dir(&scenario_dir)
            .context("failed to load scenario catalog")?;
    } else {
        tracing::warn!(dir = %scenario_dir.display(), "No scenario directory; catalog is empty");
    }

    tracing::info!(plans = plans.len(), scenarios = scenarios.len(), "Catalogs loaded");
    Ok((plans, scenarios))
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// In-flight requests complete before the process exits.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
