//! Quality Gate API Server

mod error;
mod models;
mod routes;
mod view;

use qg_core::{CoreError, CoreResult, QualityGate, StoreConfig};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Application state shared across handlers
pub struct AppState {
    pub gate: QualityGate,
    pub config: AppConfig,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub store: StoreConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            store: StoreConfig::default(),
        }
    }
}

impl AppConfig {
    /// Reads overrides from `BIND_ADDR`, `DATA_DIR`, `DATABASE_FILE`,
    /// `DB_MAX_CONNECTIONS` and `DB_ACQUIRE_TIMEOUT_SECS`
    pub fn from_env() -> CoreResult<Self> {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Ok(dir) = std::env::var("DATA_DIR") {
            config.store.data_dir = dir.into();
        }
        if let Ok(file) = std::env::var("DATABASE_FILE") {
            config.store.file_name = file;
        }
        if let Some(max) = env_number::<u32>("DB_MAX_CONNECTIONS")? {
            config.store.max_connections = max;
        }
        if let Some(secs) = env_number::<u64>("DB_ACQUIRE_TIMEOUT_SECS")? {
            config.store.acquire_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

fn env_number<T: FromStr>(key: &str) -> CoreResult<Option<T>> {
    match std::env::var(key) {
        Ok(raw) => parse_number(key, &raw).map(Some),
        Err(_) => Ok(None),
    }
}

/// Parses into the target width; out-of-range values are errors, never truncated
fn parse_number<T: FromStr>(key: &str, raw: &str) -> CoreResult<T> {
    raw.trim().parse().map_err(|_| {
        CoreError::Config(format!(
            "{} must be a non-negative integer in range, got {:?}",
            key, raw
        ))
    })
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "qg_api=debug,qg_core=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Quality Gate API Server");

    if let Err(e) = run().await {
        error!("Server stopped: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> CoreResult<()> {
    let config = AppConfig::from_env()?;

    // Data directory, database file and reports table
    let gate = QualityGate::open(&config.store).await?;
    info!("Report store ready");

    let state = Arc::new(AppState { gate, config });
    let app = routes::router(state.clone());

    let listener = tokio::net::TcpListener::bind(&state.config.bind_addr).await?;
    info!("Listening on {}", state.config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.gate.store().close().await;
    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
