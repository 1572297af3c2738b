// --- File: crates/calboard_config/src/lib.rs ---

pub mod models;

pub use models::*;

use config::{Config, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use std::env;

static DOTENV_LOADED: OnceCell<()> = OnceCell::new();

/// Loads `.env` at most once per process, so every entry point can call this
/// without worrying about ordering.
pub fn ensure_dotenv_loaded() {
    DOTENV_LOADED.get_or_init(|| {
        let _ = dotenv::dotenv();
    });
}

/// Loads the unified application configuration.
///
/// Layering: built-in defaults, then an optional `config/default.toml`, then
/// `APP_`-prefixed environment variables (`__` separator). The Calendly
/// client credentials are required plain env vars and override whatever the
/// file sources contain; a missing one fails the whole load.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let client_id = require_env("CALENDLY_CLIENT_ID")?;
    let client_secret = require_env("CALENDLY_CLIENT_SECRET")?;
    let redirect_uri = require_env("CALENDLY_REDIRECT_URI")?;

    let mut builder = Config::builder()
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 8086_i64)?
        .set_default("database.url", "sqlite://calboard.db?mode=rwc")?
        .set_default("cache.ttl_minutes", 20_i64)?
        .set_default("export.time_zone", "America/Argentina/Buenos_Aires")?
        .set_default("calendly.auth_base_url", "https://auth.calendly.com")?
        .set_default("calendly.api_base_url", "https://api.calendly.com")?
        .add_source(File::with_name("config/default").required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .set_override("calendly.client_id", client_id)?
        .set_override("calendly.client_secret", client_secret)?
        .set_override("calendly.redirect_uri", redirect_uri)?;

    // Plain DATABASE_URL wins over both the file and the APP_ prefix form.
    if let Ok(url) = env::var("DATABASE_URL") {
        builder = builder.set_override("database.url", url)?;
    }

    builder.build()?.try_deserialize()
}

fn require_env(name: &str) -> Result<String, ConfigError> {
    env::var(name)
        .map_err(|_| ConfigError::Message(format!("missing required environment variable {name}")))
}
