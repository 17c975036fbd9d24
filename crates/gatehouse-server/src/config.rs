//! Server configuration.
//!
//! Configuration is read from an optional TOML file plus `GATEHOUSE_*`
//! environment overrides (double underscore as the section separator, e.g.
//! `GATEHOUSE_AUTH__TOKEN__SECRET_KEY`). Every section has defaults; the
//! only value with no usable default is the token signing secret.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use gatehouse_auth::config::AuthConfig;

/// Root server configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP listener settings.
    pub server: HttpSettings,

    /// Credential/role storage settings.
    pub storage: StorageSettings,

    /// Session cache settings.
    pub cache: CacheSettings,

    /// Authentication configuration (token, registration, policies).
    pub auth: AuthConfig,

    /// Logging settings.
    pub logging: LoggingSettings,
}

impl ServerConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any section is unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.auth.validate()?;
        if matches!(self.storage.mode, StorageMode::Postgres) && self.storage.url.is_empty() {
            return Err(ConfigError::Invalid {
                message: "storage.url must be set when storage.mode = \"postgres\"".to_string(),
            });
        }
        if matches!(self.cache.mode, CacheMode::Redis) && self.cache.url.is_empty() {
            return Err(ConfigError::Invalid {
                message: "cache.url must be set when cache.mode = \"redis\"".to_string(),
            });
        }
        Ok(())
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Address the server binds to.
    pub bind_addr: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Which storage backend holds users and roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageMode {
    /// PostgreSQL via `gatehouse-auth-postgres`.
    Postgres,
    /// In-process store; state is lost on restart. Development only.
    Memory,
}

/// Credential/role storage settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Backend selection.
    pub mode: StorageMode,

    /// PostgreSQL connection URL.
    pub url: String,

    /// Connection pool size.
    pub max_connections: u32,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            mode: StorageMode::Postgres,
            url: String::new(),
            max_connections: 5,
        }
    }
}

/// Which backend holds the session cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheMode {
    /// Redis via deadpool.
    Redis,
    /// In-process cache; entries are lost on restart. Development only.
    Memory,
}

/// Session cache settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Backend selection.
    pub mode: CacheMode,

    /// Redis connection URL.
    pub url: String,

    /// TTL applied to cached session tokens.
    #[serde(with = "humantime_serde")]
    pub default_ttl: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            mode: CacheMode::Redis,
            url: String::new(),
            default_ttl: Duration::from_secs(7 * 24 * 60 * 60),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default tracing filter when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Loads configuration from an optional file and the environment.
///
/// # Errors
///
/// Returns an error if the file is malformed or a value fails to
/// deserialize.
pub fn load_config(path: Option<&str>) -> Result<ServerConfig, ConfigError> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::with_name(path).required(false));
    }
    let raw = builder
        .add_source(config::Environment::with_prefix("GATEHOUSE").separator("__"))
        .build()?;

    Ok(raw.try_deserialize()?)
}

/// Errors produced while loading or validating server configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file or environment could not be read or parsed.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// The auth section failed validation.
    #[error(transparent)]
    Auth(#[from] gatehouse_auth::ConfigError),

    /// A server-level setting is unusable.
    #[error("invalid configuration: {message}")]
    Invalid {
        /// What is wrong.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> ServerConfig {
        let mut config = ServerConfig::default();
        config.auth.token.secret_key = "0123456789abcdef0123456789abcdef".to_string();
        config.storage.mode = StorageMode::Memory;
        config.cache.mode = CacheMode::Memory;
        config
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.server.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.storage.mode, StorageMode::Postgres);
        assert_eq!(config.storage.max_connections, 5);
        assert_eq!(config.cache.mode, CacheMode::Redis);
        assert_eq!(config.cache.default_ttl, Duration::from_secs(604_800));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_validate_accepts_memory_modes_without_urls() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validate_requires_postgres_url() {
        let mut config = valid_config();
        config.storage.mode = StorageMode::Postgres;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn test_validate_requires_redis_url() {
        let mut config = valid_config();
        config.cache.mode = CacheMode::Redis;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn test_validate_propagates_auth_errors() {
        let mut config = valid_config();
        config.auth.token.secret_key.clear();
        assert!(matches!(config.validate(), Err(ConfigError::Auth(_))));
    }

    #[test]
    fn test_load_config_without_file_uses_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.server.bind_addr, "0.0.0.0:8080");
    }
}
