// --- File: crates/calboard_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

// --- Database Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String, // e.g. DATABASE_URL or APP_DATABASE__URL
}

// --- Calendly Config ---
// Client id/secret/redirect URI come from env vars with no defaults
// (CALENDLY_CLIENT_ID, CALENDLY_CLIENT_SECRET, CALENDLY_REDIRECT_URI);
// loading fails fast when any is absent.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CalendlyConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub auth_base_url: String,
    pub api_base_url: String,
}

// --- Aggregation Cache Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CacheConfig {
    /// Time-to-live for cached aggregate results, in minutes.
    pub ttl_minutes: u64,
}

// --- CSV Export Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ExportConfig {
    /// IANA time zone used for every exported timestamp.
    pub time_zone: String,
}

// --- Unified App Configuration ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub calendly: CalendlyConfig,
    pub cache: CacheConfig,
    pub export: ExportConfig,
}
