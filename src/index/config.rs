//! Index provider configuration

use serde::{Deserialize, Serialize};

/// Elasticsearch connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElasticConfig {
    /// Base URL of the cluster
    #[serde(default = "default_url")]
    pub url: String,

    /// Index searched by this service
    #[serde(default = "default_index")]
    pub index: String,

    /// Basic-auth username
    pub username: Option<String>,

    /// Basic-auth password
    pub password: Option<String>,

    /// Connect timeout in milliseconds
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

fn default_url() -> String {
    "http://127.0.0.1:9200".to_string()
}

fn default_index() -> String {
    "message".to_string()
}

fn default_connect_timeout_ms() -> u64 {
    2_000
}

impl Default for ElasticConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            index: default_index(),
            username: None,
            password: None,
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}
