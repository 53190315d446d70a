use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub secondary_database: SecondaryDatabaseConfig,
    pub stats_api: StatsApiConfig,
    pub model: ModelConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Optional mirror store. Writes to it are best-effort; leaving the
/// url unset disables mirroring entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecondaryDatabaseConfig {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsApiConfig {
    pub base_url: String,
    pub api_key: String,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub artifact_dir: String,
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            // Start with default values
            .set_default("database.url", "postgresql://localhost:5432/goalcast_dev")?
            .set_default("database.max_connections", 10)?
            .set_default("secondary_database.url", None::<String>)?
            .set_default("stats_api.base_url", "https://api.football-data-api.com")?
            .set_default("stats_api.api_key", "")?
            .set_default("stats_api.max_retries", 3)?
            .set_default("stats_api.retry_backoff_ms", 500)?
            .set_default("model.artifact_dir", "artifacts")?
            // Add in settings from configuration file
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(File::with_name("config/local").required(false))
            // Add in settings from environment variables
            .add_source(Environment::new().separator("_"))
            .build()?;

        config.try_deserialize()
    }

    pub fn database_url(&self) -> &str {
        &self.database.url
    }
}
