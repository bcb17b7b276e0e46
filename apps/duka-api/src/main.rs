//! # Duka API
//!
//! REST server for the POS backend.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Duka API Server                                │
//! │                                                                         │
//! │  Till ───► HTTP (8080) ───► Handlers ───► Engines ───► SQLite (WAL)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use duka_api::config::LogConfig;
use duka_api::{router, AppConfig, AppState, JwtManager};
use duka_db::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = AppConfig::load().context("loading configuration")?;

    // Initialize tracing
    init_tracing(&config.log);

    info!("Starting Duka API server...");
    info!(
        addr = %format!("{}:{}", config.server.host, config.server.port),
        database = %config.database.path.display(),
        oversell = ?config.stock.oversell,
        "Configuration loaded"
    );
    if config.uses_dev_secret() {
        warn!("auth.jwt_secret is the development default; set DUKA__AUTH__JWT_SECRET");
    }

    // Connect to database (migrations run on connect)
    let db = Database::new(config.db_config())
        .await
        .context("opening database")?;
    info!("Database ready");

    let state = AppState::new(
        db.clone(),
        JwtManager::new(&config.auth.jwt_secret, config.auth.access_lifetime_secs),
    );

    let addr = config.bind_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "Listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
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
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
