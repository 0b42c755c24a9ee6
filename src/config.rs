//! Configuration management for the lending server
//!
//! Layers, lowest priority first: built-in defaults, the optional
//! `config/default` file, `LIBRARY__SECTION__KEY` environment variables,
//! then the conventional `DATABASE_URL`, `PORT` and `JWT_SECRET` variables.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// Without a URL the server runs on the in-memory ledgers.
    pub url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub issuer: String,
    pub access_token_minutes: i64,
    pub refresh_token_minutes: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Fallback filter when `RUST_LOG` is not set.
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        Self::layered(
            env::var("DATABASE_URL").ok(),
            env::var("PORT").ok(),
            env::var("JWT_SECRET").ok(),
        )
    }

    fn layered(
        database_url: Option<String>,
        port: Option<String>,
        jwt_secret: Option<String>,
    ) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3030)?
            .set_default("database.max_connections", 5)?
            .set_default("auth.jwt_secret", "change-this-secret-in-production")?
            .set_default("auth.issuer", "library")?
            .set_default("auth.access_token_minutes", 60)?
            .set_default("auth.refresh_token_minutes", 180)?
            .set_default(
                "logging.level",
                "library_lending=debug,tower_http=debug",
            )?
            .add_source(File::with_name("config/default").required(false))
            // Add environment variables (with prefix LIBRARY__)
            .add_source(
                Environment::with_prefix("LIBRARY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("database.url", database_url)?
            .set_override_option("server.port", port)?
            .set_override_option("auth.jwt_secret", jwt_secret)?
            .build()?;

        config.try_deserialize()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
