//! Configuration module for the Garden Guide backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::errors::AppError;

/// Default endpoint of the third-party species lookup service.
pub const DEFAULT_SPECIES_API_URL: &str = "https://perenual.com/api/species-list";

/// `GARDEN_STORE_DIR` value selecting the in-process store; nothing persists.
pub const MEMORY_STORE: &str = ":memory:";

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared key for API authentication (required in production)
    pub api_psk: Option<String>,
    /// Path to SQLite database file backing the hosted plant tier
    pub db_path: PathBuf,
    /// Directory of the key-value store backing the local cache tier,
    /// or [`MEMORY_STORE`]
    pub store_dir: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Log output format
    pub log_format: LogFormat,
    /// Species lookup endpoint
    pub species_api_url: String,
    /// Species lookup API key; the external tier is unavailable without it
    pub species_api_key: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let api_psk = env::var("GARDEN_API_PSK").ok();

        let db_path = env::var("GARDEN_DB_PATH")
            .unwrap_or_else(|_| "./data/garden.sqlite".to_string())
            .into();

        let store_dir = env::var("GARDEN_STORE_DIR")
            .unwrap_or_else(|_| "./data/store".to_string())
            .into();

        let bind_addr = env::var("GARDEN_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let bind_addr = bind_addr.parse().map_err(|e| {
            AppError::Internal(format!("Invalid GARDEN_BIND_ADDR '{}': {}", bind_addr, e))
        })?;

        let log_level = env::var("GARDEN_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_format = env::var("GARDEN_LOG_FORMAT")
            .map(|s| LogFormat::parse(&s))
            .unwrap_or(LogFormat::Text);

        let species_api_url = env::var("GARDEN_SPECIES_API_URL")
            .unwrap_or_else(|_| DEFAULT_SPECIES_API_URL.to_string());

        let species_api_key = env::var("GARDEN_SPECIES_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());

        Ok(Self {
            api_psk,
            db_path,
            store_dir,
            bind_addr,
            log_level,
            log_format,
            species_api_url,
            species_api_key,
        })
    }

    /// Whether the local cache tier lives only in memory.
    pub fn uses_memory_store(&self) -> bool {
        self.store_dir.as_os_str() == MEMORY_STORE
    }
}
