use secrecy::Secret;
use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct DateConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub storage: StorageConfig,
    pub mongodb: MongoConfig,
    pub static_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub retry_max_elapsed_ms: u64,
}

impl StorageConfig {
    pub fn retry_budget(&self) -> Duration {
        Duration::from_millis(self.retry_max_elapsed_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    pub username: Option<String>,
    pub key: Option<Secret<String>>,
    pub database: String,
    pub collection: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    MongoDb,
}

impl DateConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env, APP__ prefix and PORT)
        let common_config = core_config::Config::load()?;

        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let backend: StorageBackend = get_env("STORAGE_BACKEND", Some("mongodb"), is_prod)?
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        // The endpoint is only mandatory when it is going to be used.
        let uri_default = match backend {
            StorageBackend::Memory => Some("mongodb://localhost:27017"),
            StorageBackend::MongoDb => None,
        };

        Ok(DateConfig {
            common: common_config,
            storage: StorageConfig {
                backend,
                retry_max_elapsed_ms: get_env("STORAGE_RETRY_MAX_ELAPSED_MS", Some("2000"), is_prod)?
                    .parse()
                    .map_err(|e| {
                        AppError::ConfigError(anyhow::anyhow!(
                            "STORAGE_RETRY_MAX_ELAPSED_MS must be a number of milliseconds: {}",
                            e
                        ))
                    })?,
            },
            mongodb: MongoConfig {
                uri: get_env("MONGODB_URI", uri_default, is_prod)?,
                username: env::var("MONGODB_USERNAME").ok(),
                key: env::var("MONGODB_KEY").ok().map(Secret::new),
                database: get_env("MONGODB_DATABASE", Some("date_db"), is_prod)?,
                collection: get_env("MONGODB_COLLECTION", Some("dates"), is_prod)?,
            },
            static_dir: get_env("STATIC_DIR", Some("static"), is_prod)?,
        })
    }
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "mongodb" | "mongo" => Ok(StorageBackend::MongoDb),
            _ => Err(format!("Invalid storage backend: {}", s)),
        }
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
