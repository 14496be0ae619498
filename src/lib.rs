//! # msgstore
//!
//! Authenticated message storage over gRPC. Every call carries a signed
//! token; the owner identity it contains scopes all reads and writes.

use std::future::Future;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;

pub mod auth;
pub mod clients;
pub mod grpc;
pub mod routes;
pub mod service;
pub mod store;

pub use msgstore_config::Config;
pub use msgstore_error::AppError;

/// gRPC server builder with the per-call deadline applied
pub fn grpc_server(request_timeout: Duration) -> tonic::transport::Server {
    tonic::transport::Server::builder().timeout(request_timeout)
}

/// Drive the gRPC and HTTP servers together. The first one to fail drops the
/// other and its error is returned.
pub async fn run_servers<G, H, GE, HE>(grpc: G, http: H) -> anyhow::Result<()>
where
    G: Future<Output = Result<(), GE>>,
    H: Future<Output = Result<(), HE>>,
    GE: std::error::Error + Send + Sync + 'static,
    HE: std::error::Error + Send + Sync + 'static,
{
    tokio::try_join!(
        async { grpc.await.context("gRPC server failed") },
        async { http.await.context("HTTP server failed") },
    )?;
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
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

    tracing::info!("Shutdown signal received");
}
