//! # Shopfront API server
//!
//! ```text
//! load .env ─► ApiConfig ─► Database (migrate) ─► Mailer ─► axum on HTTP_PORT
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use shopfront_api::{app, build_mailer, db_config, ApiConfig, AppState};
use shopfront_db::Database;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,shopfront=debug")),
        )
        .with_target(true)
        .init();

    info!("Starting Shopfront API server...");

    let config = ApiConfig::load().context("loading configuration")?;
    info!(
        port = config.http_port,
        database = %config.database_path,
        smtp = config.smtp.is_some(),
        "Configuration loaded"
    );

    let db = Database::new(db_config(&config))
        .await
        .context("opening database")?;

    let mailer = build_mailer(&config).context("configuring mailer")?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let state = Arc::new(AppState::new(db.clone(), mailer, config));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "Listening");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
