//! # Medicare API server
//!
//! ```text
//!   load config ──► open SQLite + migrate ──► default admin ──► serve /api
//!                                                   │                 │
//!                              optional sample catalog     housekeeping every 5 min
//! ```

use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use medicare_api::{router, AppState, ServerConfig};
use medicare_core::password::dummy_hash;
use medicare_db::seed::{ensure_default_admin, insert_sample_medicines};
use medicare_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("Starting Medicare API server...");

    let config = ServerConfig::load().context("loading configuration")?;
    info!(
        addr = %config.listen_address(),
        database = %config.database_path,
        session_ttl_secs = config.session_ttl_secs,
        "Configuration loaded"
    );
    if config.uses_dev_secret() {
        warn!("MEDICARE_JWT_SECRET is not set, using the development secret");
    }

    let db_config = DbConfig::new(&config.database_path).max_connections(config.db_max_connections);
    let db = Database::new(db_config)
        .await
        .with_context(|| format!("opening database {}", config.database_path))?;

    if ensure_default_admin(&db).await?.is_some() {
        warn!("Created default administrator admin/admin, change its password");
    }
    if config.seed_sample_data {
        insert_sample_medicines(&db).await?;
    }

    if dummy_hash().is_none() {
        warn!("Could not prepare the password hasher, unknown-user logins skip the verify");
    }

    let addr = config.listen_address();
    let state = AppState::new(db.clone(), config);
    state.housekeeping(Utc::now()).await?;
    let housekeeping = tokio::spawn(run_housekeeping(state.clone()));
    let app = router(state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    housekeeping.abort();
    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

const HOUSEKEEPING_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Purges dead sessions and their carts until the task is aborted.
async fn run_housekeeping(state: AppState) {
    let mut ticker = tokio::time::interval(HOUSEKEEPING_INTERVAL);
    ticker.tick().await;

    loop {
        ticker.tick().await;
        match state.housekeeping(Utc::now()).await {
            Ok((purged, dropped)) if purged > 0 || dropped > 0 => {
                info!(purged, dropped, "Removed stale sessions and carts");
            }
            Ok(_) => {}
            Err(e) => error!(error = %e, "Housekeeping failed"),
        }
    }
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
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
