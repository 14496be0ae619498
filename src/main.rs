// ============================================================================
// msgstore server - Main Binary
// ============================================================================
//
// Runs two listeners until SIGINT/SIGTERM:
// - gRPC Messages service (authenticated CRUD over stored messages)
// - HTTP adapter forwarding /api/messages to the gRPC service
//
// Storage is PostgreSQL when DATABASE_URL is set, in-memory otherwise.
//
// ============================================================================

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use msgstore_server::auth::TokenValidator;
use msgstore_server::clients::MessagesClient;
use msgstore_server::grpc::{MessagesGrpcService, MessagesServer, StatusMapping};
use msgstore_server::routes::{create_router, HttpState};
use msgstore_server::service::{MessageService, OwnershipPolicy};
use msgstore_server::store::{create_pool, MemoryMessageStore, MessageStore, PgMessageStore};
use msgstore_server::{grpc_server, run_servers, shutdown_signal, Config};
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Arc::new(Config::from_env()?);

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.rust_log.clone()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("=== msgstore Starting ===");

    let store: Arc<dyn MessageStore> = match &config.database_url {
        Some(database_url) => {
            info!("Connecting to database...");
            let pool = create_pool(database_url, &config.db)
                .await
                .context("Failed to connect to database")?;
            let store = PgMessageStore::new(pool);

            info!("Applying database migrations...");
            store
                .migrate()
                .await
                .context("Failed to apply database migrations")?;
            info!("Database ready");
            Arc::new(store)
        }
        None => {
            warn!("DATABASE_URL not set - messages are kept in memory and lost on restart");
            Arc::new(MemoryMessageStore::new())
        }
    };

    let ownership = OwnershipPolicy::from(config.enforce_ownership);
    let statuses = StatusMapping::from(config.storage_fault_status);
    info!(ownership = ?ownership, statuses = ?statuses, "Request policy");

    let validator = TokenValidator::new(config.app_secret.as_bytes()).with_app_id(config.app_id);
    let service = MessagesGrpcService::new(
        Arc::new(MessageService::new(store, ownership)),
        Arc::new(validator),
        statuses,
    );

    // Bind both listeners before announcing them
    let grpc_addr: SocketAddr = config
        .grpc
        .bind_address
        .parse()
        .context("Invalid GRPC_BIND_ADDRESS")?;
    let grpc_listener = TcpListener::bind(grpc_addr)
        .await
        .with_context(|| format!("Failed to bind gRPC listener to {}", grpc_addr))?;
    info!("Messages gRPC listening on {}", grpc_addr);

    let client = MessagesClient::new(&config.crud_client)
        .context("Invalid CRUD_CLIENT_ADDR")?;
    let app = create_router(Arc::new(HttpState { client }));

    let http_listener = TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("Failed to bind HTTP listener to {}", config.bind_address))?;
    info!("HTTP adapter listening on {}", config.bind_address);

    let grpc = grpc_server(config.grpc.request_timeout())
        .add_service(MessagesServer::new(service))
        .serve_with_incoming_shutdown(TcpListenerStream::new(grpc_listener), shutdown_signal());
    let http = axum::serve(http_listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .into_future();

    run_servers(grpc, http).await?;

    info!("Gracefully stopped");
    Ok(())
}
