//! Service configuration
//!
//! Settings are layered: built-in defaults, then `CATALOG_*` environment
//! variables, then a bare `PORT` as most hosting platforms provide it.
//! Store connection settings are read separately by
//! [`common::database::DatabaseConfig`].

use ::config::{Config, ConfigError, Environment};
use serde::Deserialize;

/// Which store the service talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    /// Process-local tables, lost on exit
    Memory,
}

/// HTTP service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub store: StoreBackend,
    /// `tracing` filter used when `RUST_LOG` is unset
    pub log_filter: String,
}

impl ServerConfig {
    /// Load the configuration from the environment
    ///
    /// # Environment Variables
    /// - `CATALOG_HOST`: bind address (default: "0.0.0.0")
    /// - `CATALOG_PORT` or `PORT`: listening port (default: 3000)
    /// - `CATALOG_STORE`: `postgres` or `memory` (default: "postgres")
    /// - `CATALOG_LOG_FILTER`: log filter (default: "info,catalog=debug,sqlx=warn")
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 3000)?
            .set_default("store", "postgres")?
            .set_default("log_filter", "info,catalog=debug,sqlx=warn")?
            .add_source(Environment::with_prefix("CATALOG").try_parsing(true))
            .set_override_option("port", std::env::var("PORT").ok())?
            .build()?
            .try_deserialize()
    }
}
