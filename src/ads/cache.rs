//! In-memory ad/keyword snapshots and lookup paths
//!
//! Each snapshot sits behind its own lock and is replaced wholesale on reload:
//! the fetch happens into a local structure, the swap is the only locked step.
//! A lookup therefore reads the old or the new snapshot, never a mix.

use crate::ads::billing::{BillingJob, BillingQueue};
use crate::ads::error::AdsResult;
use crate::ads::repository::AdRepository;
use crate::models::{Ad, AdCategory, Keyword};
use chrono::Utc;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use strum::{Display, EnumString};
use tracing::{info, warn};

/// A servable ad reference handed back to the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub title: String,
    pub link: String,
}

/// Which snapshot a cache-invalidation signal refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum CacheKind {
    Keyword,
    Ad,
    Association,
}

#[derive(Default)]
struct KeywordSnapshot {
    by_id: HashMap<u64, Keyword>,
    by_word: HashMap<String, u64>,
}

/// Cache service owning the keyword, ad and association snapshots.
pub struct AdCache {
    repository: Arc<dyn AdRepository>,
    billing: BillingQueue,
    keywords: RwLock<KeywordSnapshot>,
    ads: RwLock<HashMap<u64, Ad>>,
    /// Ad id lists per rotational category, in store order. Status and the
    /// rest of the eligibility predicate are checked at serve time, not here.
    categories: RwLock<HashMap<AdCategory, Vec<u64>>>,
    /// Per-category round-robin cursors; reset only on ad reload.
    cursors: DashMap<AdCategory, u64>,
    associations: RwLock<HashMap<u64, Vec<u64>>>,
}

impl AdCache {
    /// Create an empty cache. Snapshots stay empty until the first reload.
    pub fn new(repository: Arc<dyn AdRepository>, billing: BillingQueue) -> Self {
        Self {
            repository,
            billing,
            keywords: RwLock::new(KeywordSnapshot::default()),
            ads: RwLock::new(HashMap::new()),
            categories: RwLock::new(HashMap::new()),
            cursors: DashMap::new(),
            associations: RwLock::new(HashMap::new()),
        }
    }

    /// Load all three snapshots; stops at the first failing kind.
    pub async fn load_all(&self) -> AdsResult<()> {
        self.reload(CacheKind::Keyword).await?;
        self.reload(CacheKind::Ad).await?;
        self.reload(CacheKind::Association).await?;
        Ok(())
    }

    /// Replace one snapshot from the store. A failed fetch leaves the previous
    /// snapshot (and the other two) untouched.
    pub async fn reload(&self, kind: CacheKind) -> AdsResult<()> {
        match kind {
            CacheKind::Keyword => {
                let rows = self.repository.fetch_keywords().await?;
                let mut snapshot = KeywordSnapshot::default();
                for keyword in rows {
                    snapshot.by_word.insert(keyword.word.clone(), keyword.id);
                    snapshot.by_id.insert(keyword.id, keyword);
                }
                info!(keywords = snapshot.by_id.len(), "keyword snapshot replaced");
                *self.keywords.write() = snapshot;
            }
            CacheKind::Ad => {
                let rows = self.repository.fetch_ads().await?;
                let mut by_id = HashMap::new();
                let mut lists: HashMap<AdCategory, Vec<u64>> = HashMap::new();
                for ad in rows {
                    if ad.category.is_rotational() {
                        lists.entry(ad.category).or_default().push(ad.id);
                    }
                    by_id.insert(ad.id, ad);
                }
                info!(ads = by_id.len(), categories = lists.len(), "ad snapshot replaced");
                *self.ads.write() = by_id;
                *self.categories.write() = lists;
                self.cursors.clear();
            }
            CacheKind::Association => {
                let rows = self.repository.fetch_keyword_ads().await?;
                let mut map: HashMap<u64, Vec<u64>> = HashMap::new();
                for (keyword_id, ad_id) in rows {
                    map.entry(keyword_id).or_default().push(ad_id);
                }
                info!(keywords = map.len(), "association snapshot replaced");
                *self.associations.write() = map;
            }
        }
        Ok(())
    }

    /// Keyword-triggered lookup: every eligible ad associated with `word`, in
    /// association order. Each returned ad fires impression and debit jobs.
    pub fn keyword_ads(&self, identity: &str, word: &str) -> Vec<Placement> {
        if word.is_empty() {
            return Vec::new();
        }

        let keyword_id = {
            let keywords = self.keywords.read();
            let Some(&id) = keywords.by_word.get(word) else {
                return Vec::new();
            };
            match keywords.by_id.get(&id) {
                Some(keyword) if keyword.active => id,
                _ => return Vec::new(),
            }
        };

        let candidates = match self.associations.read().get(&keyword_id) {
            Some(list) => list.clone(),
            None => return Vec::new(),
        };

        let now = Utc::now();
        let ads = self.ads.read();
        let mut placements = Vec::new();

        for ad_id in candidates {
            let Some(ad) = ads.get(&ad_id) else { continue };
            if !ad.is_eligible(now) {
                continue;
            }
            self.record_serving(identity, ad);
            placements.push(Placement {
                title: ad.title.clone(),
                link: ad.link.clone(),
            });
        }

        placements
    }

    /// Category-triggered lookup: exactly one round-robin pick per call.
    ///
    /// The cursor advances before eligibility is checked, so an ineligible
    /// pick costs this call its slot (strict rotation fairness) and returns
    /// nothing.
    pub fn typed_ad(&self, identity: &str, category: AdCategory) -> Option<Placement> {
        if !category.is_rotational() {
            return None;
        }

        let ad_id = {
            let lists = self.categories.read();
            let list = lists.get(&category)?;
            if list.is_empty() {
                return None;
            }
            let mut cursor = self.cursors.entry(category).or_insert(0);
            let index = (*cursor as usize) % list.len();
            *cursor += 1;
            list[index]
        };

        let ads = self.ads.read();
        let Some(ad) = ads.get(&ad_id) else {
            warn!(%category, ad_id, "category list references missing ad");
            return None;
        };

        if !ad.is_eligible(Utc::now()) {
            return None;
        }

        self.record_serving(identity, ad);
        Some(Placement {
            title: ad.title.clone(),
            link: ad.link.clone(),
        })
    }

    /// Mirror a broadcast impression onto the cached counter.
    ///
    /// Races a concurrent reload by design: the store-side counter is the
    /// source of truth, this mirror only tightens the cap check between
    /// reloads.
    pub fn apply_impression(&self, ad_id: u64) {
        if let Some(ad) = self.ads.write().get_mut(&ad_id) {
            ad.impressions += 1;
        }
    }

    fn record_serving(&self, identity: &str, ad: &Ad) {
        self.billing.enqueue(BillingJob::Impression { ad_id: ad.id });
        if let Some(client_id) = ad.client_id {
            self.billing.enqueue(BillingJob::Debit {
                ad_id: ad.id,
                client_id,
                identity: identity.to_string(),
                price: ad.price_per_view,
            });
        }
    }
}
