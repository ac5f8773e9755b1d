//! omc-api - track metadata compliance service
//!
//! Loads the rule data once at startup (refusing to start on any error),
//! then serves validation requests over HTTP.

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

use omc_api::cli::{init_tracing, Args};
use omc_api::osu::OsuClient;
use omc_api::{build_router, AppState};
use omc_common::config::{Settings, TomlConfig};
use omc_common::RuleSet;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let file = TomlConfig::load(args.config.as_deref()).context("Failed to load config file")?;
    let settings = Settings::resolve(args.overrides()?, file).context("Invalid configuration")?;

    init_tracing(&settings.log_level, settings.log_format);

    info!("Starting omc-api v{}", env!("CARGO_PKG_VERSION"));
    info!("Rule data folder: {}", settings.data_folder.display());

    let rules = RuleSet::load(&settings.data_folder).with_context(|| {
        format!(
            "Failed to load rule data from {}",
            settings.data_folder.display()
        )
    })?;

    if settings.api_secret.is_none() {
        warn!("No API secret configured - authentication is DISABLED");
    }

    let client = OsuClient::new(settings.osu.clone()).context("Failed to build osu! API client")?;

    let state = AppState::new(
        Arc::new(rules),
        Arc::new(client),
        settings.api_secret.clone(),
        settings.max_ids_per_request,
    );
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", settings.bind, settings.port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", settings.bind, settings.port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("omc-api listening on http://{}", addr);
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
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install signal handler: {}", e);
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
