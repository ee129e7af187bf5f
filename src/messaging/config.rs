//! Message bus configuration

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusConfig {
    /// NATS server URL
    #[serde(default = "default_url")]
    pub url: String,

    /// Subject carrying cache-invalidation signals
    #[serde(default = "default_cache_subject")]
    pub cache_subject: String,

    /// Subject carrying served-impression broadcasts
    #[serde(default = "default_impressions_subject")]
    pub impressions_subject: String,
}

fn default_url() -> String {
    "nats://127.0.0.1:4222".to_string()
}

fn default_cache_subject() -> String {
    "search.cache".to_string()
}

fn default_impressions_subject() -> String {
    "search.impressions".to_string()
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            cache_subject: default_cache_subject(),
            impressions_subject: default_impressions_subject(),
        }
    }
}
