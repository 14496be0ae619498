// ============================================================================
// gRPC Server and Client Configuration
// ============================================================================

use std::time::Duration;

use crate::constants::*;

/// Settings for the Messages gRPC listener
#[derive(Clone, Debug)]
pub struct GrpcConfig {
    pub bind_address: String,
    /// Deadline applied to every inbound call
    pub request_timeout_secs: u64,
}

impl GrpcConfig {
    pub(crate) fn from_env() -> Self {
        Self {
            bind_address: std::env::var("GRPC_BIND_ADDRESS")
                .unwrap_or_else(|_| DEFAULT_GRPC_BIND_ADDRESS.to_string()),
            request_timeout_secs: std::env::var("GRPC_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_GRPC_REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Settings the HTTP adapter uses to reach the Messages service
#[derive(Clone, Debug)]
pub struct CrudClientConfig {
    /// Endpoint URI, e.g. `http://127.0.0.1:44044`
    pub addr: String,
    pub timeout_secs: u64,
    /// Extra attempts after a transient transport failure
    pub retries: u32,
}

impl CrudClientConfig {
    pub(crate) fn from_env() -> Self {
        Self {
            addr: std::env::var("CRUD_CLIENT_ADDR")
                .unwrap_or_else(|_| DEFAULT_CRUD_CLIENT_ADDR.to_string()),
            timeout_secs: std::env::var("CRUD_CLIENT_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_CRUD_CLIENT_TIMEOUT_SECS),
            retries: std::env::var("CRUD_CLIENT_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_CRUD_CLIENT_RETRIES),
        }
    }

    /// Client settings pointing at a specific endpoint, with default limits
    pub fn for_endpoint(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            timeout_secs: DEFAULT_CRUD_CLIENT_TIMEOUT_SECS,
            retries: DEFAULT_CRUD_CLIENT_RETRIES,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
