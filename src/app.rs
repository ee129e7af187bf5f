//! Service assembly
//!
//! Wires the index client, the rotation clock, the query engine, the ad cache
//! and the bus listeners into one handle the binary (and integration tests)
//! drive.

use crate::ads::{AdCache, BillingQueue, CacheKind, MySqlAdRepository, Placement};
use crate::config::AppConfig;
use crate::error::AppResult;
use crate::index::ElasticClient;
use crate::messaging::NatsBus;
use crate::models::{AdCategory, ContentKind};
use crate::query::{QueryResult, SearchEngine, SearchPage};
use crate::rotation::ContextRotation;
use sqlx::mysql::MySqlPoolOptions;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Running service handle
pub struct SearchApp {
    rotation: Arc<ContextRotation>,
    engine: SearchEngine,
    cache: Arc<AdCache>,
    listeners: Vec<JoinHandle<()>>,
    billing: JoinHandle<()>,
}

impl SearchApp {
    /// Connect every backend and start the background tasks.
    pub async fn start(config: AppConfig) -> AppResult<Self> {
        let provider = Arc::new(ElasticClient::new(config.index.clone())?);

        let rotation =
            Arc::new(ContextRotation::start(provider.clone(), config.rotation.clone()).await);

        let engine = SearchEngine::new(provider, rotation.clone(), config.query.clone());

        let pool = MySqlPoolOptions::new()
            .max_connections(config.database.max_connections)
            .connect(&config.database.url)
            .await?;
        info!("connected to relational store");
        let repository = Arc::new(MySqlAdRepository::new(pool));

        let bus = Arc::new(NatsBus::connect(config.bus.clone()).await?);

        let (billing, billing_handle) = BillingQueue::start(
            repository.clone(),
            bus.clone(),
            config.ads.billing_queue_size,
        );

        let cache = Arc::new(AdCache::new(repository, billing));
        for kind in [CacheKind::Keyword, CacheKind::Ad, CacheKind::Association] {
            if let Err(e) = cache.reload(kind).await {
                // Served empty until the next invalidation for this kind.
                warn!(%kind, error = %e, "initial cache load failed");
            }
        }

        let listeners = vec![
            bus.run_invalidation_listener(cache.clone()).await?,
            bus.run_impression_listener(cache.clone()).await?,
        ];

        Ok(Self {
            rotation,
            engine,
            cache,
            listeners,
            billing: billing_handle,
        })
    }

    /// Run one page of a content search.
    pub async fn search(
        &self,
        kind: ContentKind,
        text: &str,
        cursor: &[f64],
    ) -> QueryResult<SearchPage> {
        self.engine.search(kind, text, cursor).await
    }

    /// Every eligible ad tied to `word`, billing each one served.
    pub fn keyword_ads(&self, identity: &str, word: &str) -> Vec<Placement> {
        self.cache.keyword_ads(identity, word)
    }

    /// One round-robin ad pick for a rotational category.
    pub fn typed_ad(&self, identity: &str, category: AdCategory) -> Option<Placement> {
        self.cache.typed_ad(identity, category)
    }

    /// Stop the rotation clock and the bus listeners, then drain the billing
    /// queue: dropping the cache releases the last queue handle, so the worker
    /// finishes its outstanding jobs and exits on its own.
    pub async fn shutdown(self) {
        self.rotation.shutdown().await;

        for handle in self.listeners {
            handle.abort();
            let _ = handle.await;
        }

        drop(self.cache);
        if let Err(e) = self.billing.await {
            warn!(error = %e, "billing worker join failed");
        }

        info!("search app stopped");
    }
}
