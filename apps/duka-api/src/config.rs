//! API server configuration.
//!
//! Layered with the `config` crate, later sources win:
//!
//! ```text
//! built-in defaults
//!   └── duka.toml            (path from DUKA_CONFIG, optional)
//!         └── DUKA__* env    (DUKA__SERVER__PORT=9000, DUKA__STOCK__OVERSELL=reject)
//! ```

use config::{Config, Environment, File};
use duka_db::{DbConfig, OversellPolicy};
use serde::Deserialize;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Development signing key. Must be overridden outside development.
pub const DEV_JWT_SECRET: &str = "duka-dev-secret-change-in-production";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub stock: StockConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file, created on first start.
    pub path: PathBuf,
    pub max_connections: u32,
    /// How long a writer waits for the SQLite lock.
    pub busy_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for bearer tokens.
    pub jwt_secret: String,
    /// Lifetime of tokens issued by [`crate::auth::JwtManager::issue`].
    pub access_lifetime_secs: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StockConfig {
    pub oversell: OversellPolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl AppConfig {
    /// Loads configuration from `DUKA_CONFIG` (default `./duka.toml`) and the
    /// environment.
    pub fn load() -> Result<Self, ConfigError> {
        let path = env::var("DUKA_CONFIG").unwrap_or_else(|_| "duka.toml".to_string());
        Self::load_from(&path)
    }

    /// Loads configuration with `path` as the optional file layer.
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080_i64)?
            .set_default("database.path", "./duka.db")?
            .set_default("database.max_connections", 5_i64)?
            .set_default("database.busy_timeout_secs", 5_i64)?
            .set_default("auth.jwt_secret", DEV_JWT_SECRET)?
            .set_default("auth.access_lifetime_secs", 28_800_i64)? // one shift
            .set_default("stock.oversell", "clamp")?
            .set_default("log.filter", "info,duka_db=debug,tower_http=info")?
            .set_default("log.json", false)?
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("DUKA").separator("__"))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingRequired("auth.jwt_secret".to_string()));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "database.max_connections".to_string(),
            ));
        }
        if self.auth.access_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue(
                "auth.access_lifetime_secs".to_string(),
            ));
        }
        Ok(())
    }

    /// Socket address the server binds to.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|_| ConfigError::InvalidValue("server.host".to_string()))
    }

    /// Pool settings for [`duka_db::Database::new`].
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database.path)
            .max_connections(self.database.max_connections)
            .busy_timeout(Duration::from_secs(self.database.busy_timeout_secs))
            .oversell(self.stock.oversell)
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.auth.jwt_secret == DEV_JWT_SECRET
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
