//! Shared fakes for unit tests

use crate::ads::error::AdsResult;
use crate::ads::repository::AdRepository;
use crate::messaging::error::BusResult;
use crate::messaging::EventPublisher;
use crate::models::{Ad, AdLedgerEntry, Keyword};
use async_trait::async_trait;
use parking_lot::Mutex;

/// Repository that records writes and serves configurable snapshots.
#[derive(Default)]
pub(crate) struct RecordingRepository {
    pub keywords: Mutex<Vec<Keyword>>,
    pub ads: Mutex<Vec<Ad>>,
    pub keyword_ads: Mutex<Vec<(u64, u64)>>,
    pub fail_fetches: Mutex<bool>,
    impressions: Mutex<Vec<u64>>,
    ledger: Mutex<Vec<AdLedgerEntry>>,
    debits: Mutex<Vec<(u64, f64)>>,
}

impl RecordingRepository {
    pub fn impressions(&self) -> Vec<u64> {
        self.impressions.lock().clone()
    }

    pub fn ledger(&self) -> Vec<AdLedgerEntry> {
        self.ledger.lock().clone()
    }

    pub fn debits(&self) -> Vec<(u64, f64)> {
        self.debits.lock().clone()
    }

    fn check_fetch(&self) -> AdsResult<()> {
        if *self.fail_fetches.lock() {
            return Err(crate::ads::AdsError::Store("store offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl AdRepository for RecordingRepository {
    async fn fetch_keywords(&self) -> AdsResult<Vec<Keyword>> {
        self.check_fetch()?;
        Ok(self.keywords.lock().clone())
    }

    async fn fetch_ads(&self) -> AdsResult<Vec<Ad>> {
        self.check_fetch()?;
        Ok(self.ads.lock().clone())
    }

    async fn fetch_keyword_ads(&self) -> AdsResult<Vec<(u64, u64)>> {
        self.check_fetch()?;
        Ok(self.keyword_ads.lock().clone())
    }

    async fn increment_impressions(&self, ad_id: u64) -> AdsResult<()> {
        self.impressions.lock().push(ad_id);
        Ok(())
    }

    async fn insert_ledger(&self, entry: &AdLedgerEntry) -> AdsResult<()> {
        self.ledger.lock().push(entry.clone());
        Ok(())
    }

    async fn debit_client(&self, client_id: u64, price: f64) -> AdsResult<()> {
        self.debits.lock().push((client_id, price));
        Ok(())
    }
}

/// Publisher that records broadcast ad ids.
#[derive(Default)]
pub(crate) struct RecordingPublisher {
    published: Mutex<Vec<u64>>,
}

impl RecordingPublisher {
    pub fn published(&self) -> Vec<u64> {
        self.published.lock().clone()
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish_impression(&self, ad_id: u64) -> BusResult<()> {
        self.published.lock().push(ad_id);
        Ok(())
    }
}
