//! Candlelens AI Server
//!
//! HTTP front for the unified OHLCV analysis facade.
//!
//! # Usage
//!
//! ```bash
//! # Start with default settings
//! candlelens-server
//!
//! # Start with environment overrides
//! CANDLELENS_PORT=9000 candlelens-server
//! ```
//!
//! Provider credentials come from `OPENAI_API_KEY`, `DASHSCOPE_API_KEY`,
//! and `DEEPSEEK_API_KEY` (a `.env` file is honored).

mod config;
mod routes;

use std::sync::Arc;

use clap::Parser;
use tokio::signal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use candlelens_ai::{AnalysisService, ProviderId, ProviderRegistry};

use crate::config::ServerSettings;
use crate::routes::{create_router, AppState};

/// Candlelens AI Server - unified OHLCV analysis over several AI providers
#[derive(Parser, Debug)]
#[command(name = "candlelens-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Host to bind to
    #[arg(long, env = "CANDLELENS_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "CANDLELENS_PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "CANDLELENS_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Log format (json, pretty)
    #[arg(long, env = "CANDLELENS_LOG_FORMAT", default_value = "pretty")]
    log_format: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut settings = ServerSettings::default();
    if let Some(host) = args.host {
        settings.host = host;
    }
    if let Some(port) = args.port {
        settings.port = port;
    }
    settings.log_level = args.log_level;
    settings.log_format = args.log_format;

    init_logging(&settings);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting Candlelens AI Server"
    );

    // Build the immutable provider registry once; every call shares it
    let registry = ProviderRegistry::from_env();
    for id in ProviderId::ALL {
        tracing::info!(
            provider = %id,
            configured = registry.has_credential(&id.to_string()),
            "provider credential"
        );
    }

    let service = Arc::new(AnalysisService::new(registry));
    let state = AppState { service };
    let app = create_router(state);

    let addr = settings.socket_addr()?;
    tracing::info!(host = %settings.host, port = %settings.port, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

/// Initialize tracing/logging
fn init_logging(settings: &ServerSettings) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_level));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    match settings.log_format.as_str() {
        "json" => {
            subscriber.with(fmt::layer().json().with_target(true)).init();
        }
        _ => {
            subscriber.with(fmt::layer().with_target(true)).init();
        }
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }
}
