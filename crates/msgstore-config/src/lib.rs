// ============================================================================
// msgstore Config - Centralized configuration management
// ============================================================================
//
// Configuration for the message-storage service and its HTTP adapter.
// Loaded from environment variables (and an optional .env file) with
// sensible defaults for everything except the token secret.
//
// ============================================================================

mod constants;
mod database;
mod grpc;

pub use database::DbConfig;
pub use grpc::{CrudClientConfig, GrpcConfig};

use anyhow::{Context, Result};
use constants::*;
use std::str::FromStr;

/// Which status code the RPC layer reports for an unexpected storage fault
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum StorageFaultStatus {
    /// Mutations and single fetches report `Unauthenticated`, listing reports `Internal`
    #[default]
    Legacy,
    /// Every operation reports `Internal`
    Internal,
}

impl FromStr for StorageFaultStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" => Ok(Self::Legacy),
            "internal" => Ok(Self::Internal),
            other => anyhow::bail!(
                "Unknown STORAGE_FAULT_STATUS '{}', expected 'legacy' or 'internal'",
                other
            ),
        }
    }
}

/// Main configuration structure for the msgstore service
#[derive(Clone, Debug)]
pub struct Config {
    /// Shared HMAC secret used to verify (and mint) tokens
    pub app_secret: String,

    /// When set, tokens issued for any other application are rejected
    pub app_id: Option<i32>,

    /// PostgreSQL URL. The in-memory store is used when this is unset.
    pub database_url: Option<String>,

    pub port: u16,
    pub bind_address: String,

    /// Explicit ownership check on get/update/delete
    pub enforce_ownership: bool,

    pub storage_fault_status: StorageFaultStatus,

    pub token_ttl_hours: i64,
    pub rust_log: String,

    // Sub-configurations
    pub db: DbConfig,
    pub grpc: GrpcConfig,
    pub crud_client: CrudClientConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let app_secret = std::env::var("APP_SECRET").context("APP_SECRET must be set")?;
        if app_secret.trim().is_empty() {
            anyhow::bail!("APP_SECRET must not be empty");
        }

        let app_id = match std::env::var("APP_ID") {
            Ok(raw) => Some(
                raw.parse::<i32>()
                    .with_context(|| format!("APP_ID '{}' is not a valid integer", raw))?,
            ),
            Err(_) => None,
        };

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_HTTP_PORT);

        let enforce_ownership = match std::env::var("ENFORCE_OWNERSHIP") {
            Ok(raw) => parse_flag(&raw)
                .with_context(|| format!("ENFORCE_OWNERSHIP '{}' is not a boolean", raw))?,
            Err(_) => true,
        };

        let storage_fault_status = match std::env::var("STORAGE_FAULT_STATUS") {
            Ok(raw) => raw.parse()?,
            Err(_) => StorageFaultStatus::default(),
        };

        Ok(Self {
            app_secret,
            app_id,
            database_url,
            port,
            bind_address: format!("[::]:{}", port),
            enforce_ownership,
            storage_fault_status,
            token_ttl_hours: std::env::var("TOKEN_TTL_HOURS")
                .ok()
                .and_then(|h| h.parse().ok())
                .unwrap_or(DEFAULT_TOKEN_TTL_HOURS),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            db: DbConfig::from_env(),
            grpc: GrpcConfig::from_env(),
            crud_client: CrudClientConfig::from_env(),
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
