//! reqmeter server
//!
//! - `GET /`, `GET /health`: static JSON
//! - `GET /metrics`: Prometheus exposition with per-request latency and counts
//! - Port from `PORT` (default 3000), optional YAML via `REQMETER_CONFIG`

use std::net::SocketAddr;

use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reqmeter_server::{app_state::AppState, config, error::Result, obs, router};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!(code = e.client_code(), error = %e, "reqmeter-server failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cfg = config::from_env()?;
    let state = AppState::new(cfg)?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    if let Some(runtime) = state.runtime_collector() {
        obs::runtime::spawn_lag_probe(runtime, shutdown_rx);
    }

    let port = state.cfg().server.port;
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(metrics = ?state.registry().metric_names()?, "registry ready");

    let app = router::build_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server running on port {port}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let _ = shutdown_tx.send(true);
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
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
    tracing::info!("signal received, starting graceful shutdown");
}
