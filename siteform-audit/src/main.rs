//! siteform-audit - Field Audit Collection Service
//!
//! **Module Identity:**
//! - Name: siteform-audit
//! - Port: 5780 (default)
//!
//! Hosts one technician session at a time: table upload, project selection,
//! conditional question rendering, section validation with photo-count
//! reconciliation, and submission persistence.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use siteform_common::config::{
    load_toml_config, load_toml_config_from, prepare_root_folder, resolve_root_folder, TomlConfig,
};
use siteform_common::events::EventBus;

use siteform_audit::{build_router, AppState, DEFAULT_PORT};

/// Command-line arguments for siteform-audit
#[derive(Parser, Debug)]
#[command(name = "siteform-audit")]
#[command(about = "Field audit collection service for SiteForm")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "SITEFORM_AUDIT_PORT")]
    port: Option<u16>,

    /// Root folder holding the SiteForm database
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Configuration file (defaults to the per-user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config must be read before tracing init so the TOML log level can
    // seed the filter. An unreadable file falls back to defaults.
    let toml_config = match &args.config {
        Some(path) => load_toml_config_from(path),
        None => load_toml_config("audit"),
    };
    let toml_config = match toml_config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Ignoring configuration file: {}", e);
            TomlConfig::default()
        }
    };

    // Initialize tracing: SITEFORM_LOG overrides the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env("SITEFORM_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&toml_config.logging.level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Log build identification IMMEDIATELY after tracing init
    info!(
        "Starting SiteForm Audit (siteform-audit) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    // Resolve root folder: CLI flag, then environment, then TOML, then default
    let root_folder = resolve_root_folder(
        args.root_folder.as_deref(),
        "SITEFORM_ROOT_FOLDER",
        &toml_config,
    );
    let db_path = prepare_root_folder(&root_folder)
        .map_err(|e| anyhow::anyhow!("Failed to initialize root folder: {}", e))?;
    info!("Database path: {}", db_path.display());

    // Initialize database connection pool
    let db_pool = siteform_audit::db::init_database_pool(&db_path).await?;
    info!("Database connection established");

    // Create event bus for SSE broadcasting
    let event_bus = EventBus::new(100); // 100 event capacity
    info!("Event bus initialized");

    // Create application state and router
    let state = AppState::new(db_pool, event_bus);
    let app = build_router(state);

    // Start server
    let port = args.port.or(toml_config.port).unwrap_or(DEFAULT_PORT);
    let addr = format!("127.0.0.1:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("siteform-audit listening on http://{}", addr);
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
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
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
