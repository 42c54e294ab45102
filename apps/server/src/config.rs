//! Server configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults, once at startup, and passed down explicitly.

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use hearth_db::StoreConfig;

/// Which record store backend to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Memory,
    Csv,
    Sqlite,
}

impl StorageKind {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Some(StorageKind::Memory),
            "csv" => Some(StorageKind::Csv),
            "sqlite" => Some(StorageKind::Sqlite),
            _ => None,
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address
    pub host: IpAddr,

    /// HTTP port
    pub port: u16,

    /// Record store backend
    pub storage: StorageKind,

    /// CSV directory (csv backend)
    pub data_dir: PathBuf,

    /// Database file (sqlite backend)
    pub database_path: PathBuf,

    /// Seed default data into an empty store
    pub seed: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: IpAddr::from([0, 0, 0, 0]),
            port: 5000,
            storage: StorageKind::Memory,
            data_dir: PathBuf::from("./data"),
            database_path: PathBuf::from("./data/hearth.db"),
            seed: true,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ServerConfig::default();

        let host = match lookup("HEARTH_HOST") {
            Some(v) => v
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue("HEARTH_HOST".to_string()))?,
            None => defaults.host,
        };

        let port = match lookup("HEARTH_PORT") {
            Some(v) => v
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue("HEARTH_PORT".to_string()))?,
            None => defaults.port,
        };

        let storage = match lookup("HEARTH_STORAGE") {
            Some(v) => StorageKind::parse(&v)
                .ok_or_else(|| ConfigError::InvalidValue("HEARTH_STORAGE".to_string()))?,
            None => defaults.storage,
        };

        let seed = match lookup("HEARTH_SEED") {
            Some(v) => parse_bool(&v)
                .ok_or_else(|| ConfigError::InvalidValue("HEARTH_SEED".to_string()))?,
            None => defaults.seed,
        };

        let data_dir = lookup("HEARTH_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let database_path = lookup("HEARTH_DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.database_path);

        if data_dir.as_os_str().is_empty() {
            return Err(ConfigError::MissingRequired("HEARTH_DATA_DIR".to_string()));
        }
        if database_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingRequired("HEARTH_DATABASE_PATH".to_string()));
        }

        Ok(ServerConfig {
            host,
            port,
            storage,
            data_dir,
            database_path,
            seed,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Store selection handed to `hearth_db::open_store`.
    pub fn store_config(&self) -> StoreConfig {
        match self.storage {
            StorageKind::Memory => StoreConfig::Memory,
            StorageKind::Csv => StoreConfig::Csv {
                dir: self.data_dir.clone(),
            },
            StorageKind::Sqlite => StoreConfig::Sqlite {
                path: self.database_path.clone(),
            },
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
