//! Rotation manager configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Context rotation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationConfig {
    /// Number of contexts kept open per generation
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,

    /// Keep-alive requested when opening a context, in seconds. The provider
    /// renews it on each use and enforces its own absolute cap.
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,
}

impl RotationConfig {
    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs)
    }
}

fn default_pool_size() -> usize {
    2
}

fn default_keep_alive_secs() -> u64 {
    120
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            pool_size: default_pool_size(),
            keep_alive_secs: default_keep_alive_secs(),
        }
    }
}
