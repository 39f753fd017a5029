//! Application Configuration
//!
//! Layered settings: built-in defaults, then an optional TOML file, then
//! `MICRODOPPLER__SECTION__KEY` environment variables.

use crate::rate_limit::RateLimitConfig;
use config::{Config, ConfigError, Environment, File};
use inference_engine::ForestConfig;
use serde::{Deserialize, Serialize};
use signal_ingest::{IngestConfig, ReaderConfig};
use storage::RetryPolicy;

/// Default config file stem, extension detected by the loader
pub const DEFAULT_CONFIG_PATH: &str = "config/microdoppler";

/// Environment variable overriding the config file location
pub const CONFIG_PATH_ENV: &str = "MICRODOPPLER_CONFIG";

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
        }
    }
}

/// History database settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite URL; the file is created when missing
    pub url: String,
    pub retry: RetryPolicy,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://classifications.db".to_string(),
            retry: RetryPolicy::default(),
        }
    }
}

/// Log output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Maximum level: trace, debug, info, warn or error
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub ingest: IngestConfig,
    pub reader: ReaderConfig,
    pub model: ForestConfig,
    pub rate_limit: RateLimitConfig,
    pub logging: LoggingConfig,
    /// Bundled example signal served by the sample endpoint
    pub sample_data_path: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            ingest: IngestConfig::default(),
            reader: ReaderConfig::default(),
            model: ForestConfig::default(),
            rate_limit: RateLimitConfig::default(),
            logging: LoggingConfig::default(),
            sample_data_path: "data/test_micro_doppler_signals.csv".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from the file named by `MICRODOPPLER_CONFIG`, or the default path
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(&path)
    }

    /// Load with an explicit config file; a missing file is not an error
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Config::try_from(&Self::default())?)
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("MICRODOPPLER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let config = AppConfig::load_from("does/not/exist/microdoppler").unwrap();
        assert_eq!(config.server.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.ingest.min_rows, 5);
        assert_eq!(config.model.n_estimators, 100);
        assert_eq!(config.model.seed, 42);
        assert_eq!(config.database.retry.max_attempts, 3);
        assert!(config.rate_limit.enabled);
        assert!(config.sample_data_path.ends_with(".csv"));
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = std::env::temp_dir().join(format!("microdoppler-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.toml");
        std::fs::write(
            &path,
            "[server]\nbind_addr = \"127.0.0.1:9000\"\n\n[model]\nn_estimators = 10\n\n[rate_limit]\nenabled = false\n",
        )
        .unwrap();

        let config = AppConfig::load_from(path.to_str().unwrap()).unwrap();
        assert_eq!(config.server.bind_addr, "127.0.0.1:9000");
        assert_eq!(config.model.n_estimators, 10);
        assert_eq!(config.model.seed, 42);
        assert!(!config.rate_limit.enabled);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
