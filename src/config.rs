//! Application configuration
//!
//! Layered the usual way: compiled-in defaults, then an optional TOML file
//! named by `CONFIG_PATH`, then `CHATSEARCH__`-prefixed environment
//! variables.

use crate::ads::AdsConfig;
use crate::index::ElasticConfig;
use crate::messaging::BusConfig;
use crate::query::QueryConfig;
use crate::rotation::RotationConfig;
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Search index connection
    #[serde(default)]
    pub index: ElasticConfig,

    /// Context pool rotation
    #[serde(default)]
    pub rotation: RotationConfig,

    /// Query building and result shaping
    #[serde(default)]
    pub query: QueryConfig,

    /// Ad cache and billing
    #[serde(default)]
    pub ads: AdsConfig,

    /// Message bus
    #[serde(default)]
    pub bus: BusConfig,

    /// Relational store
    #[serde(default)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// MySQL connection URL
    #[serde(default = "default_database_url")]
    pub url: String,

    /// Connection pool size
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_url() -> String {
    "mysql://root@127.0.0.1:3306/chatsearch".to_string()
}

fn default_max_connections() -> u32 {
    10
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/default.toml".to_string());

        config::Config::builder()
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            .add_source(config::File::with_name(&config_path).required(false))
            .add_source(
                config::Environment::with_prefix("CHATSEARCH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
