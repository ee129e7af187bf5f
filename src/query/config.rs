//! Query engine configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Query engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Fixed page size
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Hard execution deadline in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Highlight fragment size in characters
    #[serde(default = "default_fragment_size")]
    pub fragment_size: usize,

    /// Display window width in runes
    #[serde(default = "default_window")]
    pub window: usize,

    /// Keep-alive extension granted to the context on each use
    #[serde(default = "default_context_keep_alive")]
    pub context_keep_alive: String,

    /// Base prepended to the stored relative link
    #[serde(default = "default_link_base")]
    pub link_base: String,
}

impl QueryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_page_size() -> usize {
    10
}

fn default_timeout_ms() -> u64 {
    3_000
}

fn default_fragment_size() -> usize {
    30
}

fn default_window() -> usize {
    25
}

fn default_context_keep_alive() -> String {
    "5m".to_string()
}

fn default_link_base() -> String {
    "https://t.me".to_string()
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            timeout_ms: default_timeout_ms(),
            fragment_size: default_fragment_size(),
            window: default_window(),
            context_keep_alive: default_context_keep_alive(),
            link_base: default_link_base(),
        }
    }
}
