//! Ad cache and billing configuration

use serde::{Deserialize, Serialize};

/// Ad overlay configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdsConfig {
    /// Capacity of the billing job queue. Jobs beyond this are dropped with a
    /// warning rather than blocking the lookup path.
    #[serde(default = "default_billing_queue_size")]
    pub billing_queue_size: usize,
}

fn default_billing_queue_size() -> usize {
    256
}

impl Default for AdsConfig {
    fn default() -> Self {
        Self {
            billing_queue_size: default_billing_queue_size(),
        }
    }
}
