//! Startup orchestration.
//!
//! # Responsibilities
//! - Assemble the application from config and registry
//! - Initialize subsystems in dependency order
//! - Start background work (metrics, cyclic jobs, signal listener)
//! - Bind the listener and serve until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - Cyclic jobs start only once the listener is bound

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::AppConfig;
use crate::error::BuildError;
use crate::http::HttpServer;
use crate::kernel::{Application, Registry};
use crate::lifecycle::signals::spawn_signal_listener;
use crate::observability::metrics;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Build the application and serve it until SIGINT/SIGTERM or
/// [`ServerHandle::request_shutdown`](crate::lifecycle::ServerHandle::request_shutdown).
pub async fn run(config: AppConfig, registry: Registry) -> Result<(), StartupError> {
    let app = Arc::new(Application::build(config, registry)?);
    let config = app.config();

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(address) => {
                if let Err(error) = metrics::init_metrics(address) {
                    tracing::error!(error = %error, "Failed to install metrics exporter");
                }
            }
            Err(error) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %error,
                "Failed to parse metrics address"
            ),
        }
    }

    let address = config.listener.bind_address.clone();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind { address, source })?;

    let shutdown = app.server().shutdown().clone();
    let jobs = app.start_cyclic_jobs();
    let signals = spawn_signal_listener(shutdown.clone());

    tracing::info!(
        routes = app.routes().len(),
        cyclic_jobs = jobs.len(),
        "Kernel ready"
    );

    let served = HttpServer::new(app.clone()).run(listener, shutdown.clone()).await;

    // Stop the job loops even if the server exited on error.
    shutdown.trigger();
    jobs.join().await;
    signals.abort();

    served.map_err(StartupError::Serve)?;
    tracing::info!("Shutdown complete");
    Ok(())
}
