use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RunEnvironment {
    Development,
    Production,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub environment: RunEnvironment,
    pub cors: CorsConfig,
}

impl ServerConfig {
    /// Whether internal error details may be shown to clients.
    pub fn expose_error_detail(&self) -> bool {
        self.environment == RunEnvironment::Development
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    pub dir: PathBuf,
    pub max_file_size: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IngestConfig {
    pub transaction_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub upload: UploadConfig,
    pub ingest: IngestConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 5000)?
            .set_default("server.environment", "development")?
            .set_default("server.cors.allow_origins", vec!["http://localhost:3000"])?
            .set_default("server.cors.max_age", 3600)?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("database.acquire_timeout_secs", 8)?
            .set_default("upload.dir", "./uploads")?
            .set_default("upload.max_file_size", common::upload::DEFAULT_MAX_FILE_SIZE)?
            .set_default("ingest.transaction_timeout_secs", 60)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., BUYER_LEDGER__DATABASE__URL)
            .add_source(
                Environment::with_prefix("BUYER_LEDGER")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors.allow_origins")
                    .try_parsing(true),
            )
            .build()?;

        s.try_deserialize()
    }
}
