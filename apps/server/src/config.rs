//! Configuration management for the bridge server

use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub registry: RegistryConfig,
    pub store: StoreConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Connection settings for the tracker registry.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    #[serde(default = "default_registry_url")]
    pub base_url: String,
    #[serde(default = "default_registry_username")]
    pub username: String,
    pub password: String,
    /// Per-request timeout. Registry writes are retried on transport
    /// failures, so this bounds each attempt, not the whole operation.
    #[serde(default = "default_registry_timeout")]
    pub timeout_seconds: u64,
}

/// Connection settings for the document store.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_url")]
    pub base_url: String,
    #[serde(default = "default_store_timeout")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Use JSON formatting for logs (recommended for production)
    #[serde(default)]
    pub json: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_registry_url() -> String {
    "http://localhost:8080/api".to_string()
}

fn default_registry_username() -> String {
    "admin".to_string()
}

fn default_registry_timeout() -> u64 {
    30
}

fn default_store_url() -> String {
    "http://localhost:9200".to_string()
}

fn default_store_timeout() -> u64 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from environment and config files
    pub fn load() -> anyhow::Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port())?
            .set_default("registry.base_url", default_registry_url())?
            .set_default("registry.username", default_registry_username())?
            .set_default("registry.timeout_seconds", default_registry_timeout())?
            .set_default("store.base_url", default_store_url())?
            .set_default("store.timeout_seconds", default_store_timeout())?
            .set_default("logging.level", default_log_level())?
            .set_default("logging.json", false)?
            // Add config file if exists
            .add_source(config::File::with_name("config").required(false))
            // Override with environment variables
            // Uses double underscore (__) to map to nested config structure
            // Example: BRIDGE__REGISTRY__BASE_URL -> config.registry.base_url
            .add_source(
                config::Environment::with_prefix("BRIDGE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        Ok(addr.parse()?)
    }

    pub fn registry_timeout(&self) -> Duration {
        Duration::from_secs(self.registry.timeout_seconds)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store.timeout_seconds)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.registry.password.is_empty() {
            return Err("registry.password must be set".to_string());
        }
        if self.registry.timeout_seconds == 0 {
            return Err("registry.timeout_seconds must be > 0".to_string());
        }
        if self.store.timeout_seconds == 0 {
            return Err("store.timeout_seconds must be > 0".to_string());
        }
        Ok(())
    }
}
