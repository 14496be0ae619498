// ============================================================================
// Configuration Constants
// ============================================================================

// Default listener values
pub(crate) const DEFAULT_HTTP_PORT: u16 = 8080;
pub(crate) const DEFAULT_GRPC_BIND_ADDRESS: &str = "[::]:44044";
pub(crate) const DEFAULT_CRUD_CLIENT_ADDR: &str = "http://127.0.0.1:44044";

// Default time limits (in seconds)
pub(crate) const DEFAULT_GRPC_REQUEST_TIMEOUT_SECS: u64 = 10;
pub(crate) const DEFAULT_CRUD_CLIENT_TIMEOUT_SECS: u64 = 5;

// The HTTP adapter retries transient transport failures, the server never does
pub(crate) const DEFAULT_CRUD_CLIENT_RETRIES: u32 = 3;

// Lifetime of tokens minted by the issuer
pub(crate) const DEFAULT_TOKEN_TTL_HOURS: i64 = 12;
