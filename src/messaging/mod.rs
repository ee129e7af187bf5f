//! Message bus wiring
//!
//! Two plain NATS subjects tie the fleet together: a cache-invalidation
//! subject telling every node which snapshot to reload, and an impressions
//! subject mirroring served impressions onto every node's cached counters.

pub mod config;
pub mod error;
pub mod events;
pub mod nats;

pub use config::BusConfig;
pub use error::{BusError, BusResult};
pub use nats::NatsBus;

use async_trait::async_trait;

/// Outbound side of the bus, consumed by the billing worker.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Broadcast a served impression so every node can mirror the counter.
    async fn publish_impression(&self, ad_id: u64) -> BusResult<()>;
}
