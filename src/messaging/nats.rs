//! NATS bus implementation

use crate::ads::AdCache;
use crate::messaging::config::BusConfig;
use crate::messaging::error::{BusError, BusResult};
use crate::messaging::events::{parse_impression, parse_invalidation};
use crate::messaging::EventPublisher;
use async_nats::Client;
use async_trait::async_trait;
use futures::StreamExt;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// NATS-backed bus handle
pub struct NatsBus {
    client: Client,
    config: BusConfig,
}

impl NatsBus {
    /// Connect to the configured NATS server.
    pub async fn connect(config: BusConfig) -> BusResult<Self> {
        let client = async_nats::connect(&config.url)
            .await
            .map_err(|e| BusError::Connection(format!("NATS connection failed: {}", e)))?;

        info!(url = %config.url, "connected to message bus");
        Ok(Self { client, config })
    }

    /// Spawn a task reloading cache snapshots on invalidation signals.
    pub async fn run_invalidation_listener(
        &self,
        cache: Arc<AdCache>,
    ) -> BusResult<JoinHandle<()>> {
        let mut subscriber = self
            .client
            .subscribe(self.config.cache_subject.clone())
            .await
            .map_err(|e| BusError::Subscribe(format!("NATS subscribe failed: {}", e)))?;

        let subject = self.config.cache_subject.clone();
        Ok(tokio::spawn(async move {
            info!(%subject, "invalidation listener started");
            while let Some(msg) = subscriber.next().await {
                let Some(kind) = parse_invalidation(&msg.payload) else {
                    warn!(%subject, "unrecognized invalidation payload");
                    continue;
                };
                debug!(%kind, "cache invalidation received");
                if let Err(e) = cache.reload(kind).await {
                    error!(%kind, error = %e, "snapshot reload failed");
                }
            }
            info!(%subject, "invalidation listener stopped");
        }))
    }

    /// Spawn a task mirroring broadcast impressions onto the cache.
    pub async fn run_impression_listener(
        &self,
        cache: Arc<AdCache>,
    ) -> BusResult<JoinHandle<()>> {
        let mut subscriber = self
            .client
            .subscribe(self.config.impressions_subject.clone())
            .await
            .map_err(|e| BusError::Subscribe(format!("NATS subscribe failed: {}", e)))?;

        let subject = self.config.impressions_subject.clone();
        Ok(tokio::spawn(async move {
            info!(%subject, "impression listener started");
            while let Some(msg) = subscriber.next().await {
                let Some(ad_id) = parse_impression(&msg.payload) else {
                    warn!(%subject, "unrecognized impression payload");
                    continue;
                };
                cache.apply_impression(ad_id);
            }
            info!(%subject, "impression listener stopped");
        }))
    }
}

#[async_trait]
impl EventPublisher for NatsBus {
    async fn publish_impression(&self, ad_id: u64) -> BusResult<()> {
        self.client
            .publish(
                self.config.impressions_subject.clone(),
                ad_id.to_string().into(),
            )
            .await
            .map_err(|e| BusError::Publish(format!("NATS publish failed: {}", e)))?;
        Ok(())
    }
}
