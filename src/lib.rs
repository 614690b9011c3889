//! perfpulse -- performance telemetry dashboard core.
//!
//! This crate provides the analysis result schema, the client for the
//! external analysis service, the dashboard's view state controller and view
//! models, synthetic demo data, and the JSON/HTML export encoders.

pub mod api;
pub mod client;
pub mod config;
pub mod export;
pub mod mock;
pub mod model;
pub mod state;
pub mod views;

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::client::{AnalysisBackend, DemoBackend, HttpAnalysisClient};
use crate::config::PerfpulseConfig;
use crate::state::Session;

/// Pick the analysis backend: the HTTP client, or synthetic data when
/// `offline` is set.
pub fn backend(config: &PerfpulseConfig, offline: bool) -> Result<Arc<dyn AnalysisBackend>> {
    if offline {
        return Ok(Arc::new(DemoBackend::default()));
    }
    let client = HttpAnalysisClient::new(&config.backend.base_url, config.backend.timeout())
        .context("failed to build analysis HTTP client")?;
    Ok(Arc::new(client))
}

/// Start the dashboard server and run until Ctrl-C.
pub async fn serve(config: PerfpulseConfig, offline: bool) -> Result<()> {
    let session = Session::new(
        backend(&config, offline)?,
        config.dashboard.race_policy,
        config.dashboard.demo_delay(),
    );

    let addr: std::net::SocketAddr = config
        .dashboard
        .bind
        .parse()
        .with_context(|| format!("invalid bind address: {}", config.dashboard.bind))?;
    tracing::info!(
        %addr,
        backend = %config.backend.base_url,
        offline,
        policy = ?config.dashboard.race_policy,
        "perfpulse dashboard listening"
    );

    let app = api::router(api::state::AppState::new(session.clone(), config));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(session))
        .await?;

    Ok(())
}

async fn shutdown_signal(session: Session) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl-C, running until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
    session.shutdown();
}
