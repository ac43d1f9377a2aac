//! devwiki-api - REST backend for votes, tags and video tagging
//!
//! Resolves configuration (CLI → environment → config.toml → defaults),
//! opens the SQLite database and serves the HTTP API until Ctrl+C or
//! SIGTERM.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use devwiki_common::config::{ServerConfig, TomlConfig};
use devwiki_common::db::SqliteStore;
use devwiki_api::{build_router, AppState};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for devwiki-api
#[derive(Parser, Debug)]
#[command(name = "devwiki-api")]
#[command(about = "REST backend for the devwiki knowledge-sharing platform")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "DEVWIKI_PORT")]
    port: Option<u16>,

    /// Address to bind
    #[arg(long, env = "DEVWIKI_HOST")]
    host: Option<String>,

    /// Folder holding devwiki.db
    #[arg(short, long, env = "DEVWIKI_DATA_FOLDER")]
    data_folder: Option<PathBuf>,

    /// Path to config.toml
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Read the config file before tracing exists; report problems after
    let (file_config, load_error) = TomlConfig::load_or_default(args.config.as_deref());

    let config = ServerConfig::resolve(
        args.host,
        args.port,
        args.data_folder.as_deref(),
        file_config,
    );

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting devwiki-api v{}", env!("CARGO_PKG_VERSION"));

    if let Some(e) = load_error {
        warn!("{}; using defaults", e);
    }

    let db_path = config.database_path();
    info!("Database path: {}", db_path.display());

    let store = match SqliteStore::open(&db_path).await {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to open database: {}", e);
            return Err(e).context("Failed to initialize database");
        }
    };

    let state = AppState::new(Arc::new(store)).with_allowed_origins(config.allowed_origins.clone());
    let app = build_router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("devwiki-api listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
