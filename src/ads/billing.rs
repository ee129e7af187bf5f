//! Fire-and-forget billing queue
//!
//! Lookups enqueue jobs and return immediately; one worker task drains the
//! queue and issues the store writes and the impression broadcast. The queue
//! is bounded so a load spike degrades to dropped billing jobs instead of
//! unbounded concurrent work. Worker failures are logged, never retried.

use crate::ads::repository::AdRepository;
use crate::messaging::EventPublisher;
use crate::models::AdLedgerEntry;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// One unit of deferred billing work
#[derive(Debug, Clone, PartialEq)]
pub enum BillingJob {
    /// Bump the store-side impression counter and broadcast the impression.
    Impression { ad_id: u64 },
    /// Write a ledger row, then subtract the price from the client's balance
    /// and add it to cumulative spend.
    Debit {
        ad_id: u64,
        client_id: u64,
        identity: String,
        price: f64,
    },
}

/// Cheap handle for enqueueing billing jobs
#[derive(Clone)]
pub struct BillingQueue {
    tx: mpsc::Sender<BillingJob>,
}

impl BillingQueue {
    /// Spawn the worker and return the enqueue handle plus its join handle.
    /// The worker exits once every `BillingQueue` clone has been dropped.
    pub fn start(
        repository: Arc<dyn AdRepository>,
        publisher: Arc<dyn EventPublisher>,
        capacity: usize,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(capacity);
        let handle = tokio::spawn(run_worker(repository, publisher, rx));
        (Self { tx }, handle)
    }

    /// Hand a job to the worker without waiting. A full queue drops the job.
    pub fn enqueue(&self, job: BillingJob) {
        if let Err(e) = self.tx.try_send(job) {
            warn!(error = %e, "billing queue full, dropping job");
        }
    }
}

async fn run_worker(
    repository: Arc<dyn AdRepository>,
    publisher: Arc<dyn EventPublisher>,
    mut rx: mpsc::Receiver<BillingJob>,
) {
    info!("billing worker started");

    while let Some(job) = rx.recv().await {
        match job {
            BillingJob::Impression { ad_id } => {
                if let Err(e) = repository.increment_impressions(ad_id).await {
                    error!(ad_id, error = %e, "impression update failed");
                }
                if let Err(e) = publisher.publish_impression(ad_id).await {
                    error!(ad_id, error = %e, "impression broadcast failed");
                }
            }
            BillingJob::Debit {
                ad_id,
                client_id,
                identity,
                price,
            } => {
                let entry = AdLedgerEntry::new(ad_id, identity, price);
                if let Err(e) = repository.insert_ledger(&entry).await {
                    error!(ad_id, client_id, error = %e, "ledger insert failed");
                    continue;
                }
                if let Err(e) = repository.debit_client(client_id, price).await {
                    error!(client_id, error = %e, "client debit failed");
                }
            }
        }
    }

    info!("billing worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ads::error::AdsResult;
    use crate::models::{Ad, Keyword};
    use crate::testutil::{RecordingPublisher, RecordingRepository};
    use async_trait::async_trait;

    #[tokio::test]
    async fn impression_job_updates_store_and_broadcasts() {
        let repository = Arc::new(RecordingRepository::default());
        let publisher = Arc::new(RecordingPublisher::default());
        let (queue, handle) = BillingQueue::start(repository.clone(), publisher.clone(), 8);

        queue.enqueue(BillingJob::Impression { ad_id: 42 });
        drop(queue);
        handle.await.unwrap();

        assert_eq!(repository.impressions(), vec![42]);
        assert_eq!(publisher.published(), vec![42]);
    }

    #[tokio::test]
    async fn debit_job_writes_ledger_then_balance() {
        let repository = Arc::new(RecordingRepository::default());
        let publisher = Arc::new(RecordingPublisher::default());
        let (queue, handle) = BillingQueue::start(repository.clone(), publisher.clone(), 8);

        queue.enqueue(BillingJob::Debit {
            ad_id: 42,
            client_id: 7,
            identity: "alice".into(),
            price: 0.25,
        });
        drop(queue);
        handle.await.unwrap();

        let ledger = repository.ledger();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].ad_id, 42);
        assert_eq!(ledger[0].identity, "alice");
        assert_eq!(repository.debits(), vec![(7, 0.25)]);
    }

    #[tokio::test]
    async fn queued_jobs_drain_before_the_worker_exits() {
        let repository = Arc::new(RecordingRepository::default());
        let publisher = Arc::new(RecordingPublisher::default());
        let (queue, handle) = BillingQueue::start(repository.clone(), publisher.clone(), 8);

        for ad_id in [1, 2, 3] {
            queue.enqueue(BillingJob::Impression { ad_id });
        }
        queue.enqueue(BillingJob::Debit {
            ad_id: 3,
            client_id: 9,
            identity: "carol".into(),
            price: 0.5,
        });

        // Dropping the last handle closes the channel; the worker keeps
        // draining what was already enqueued before it exits.
        drop(queue);
        handle.await.unwrap();

        assert_eq!(repository.impressions(), vec![1, 2, 3]);
        assert_eq!(publisher.published(), vec![1, 2, 3]);
        assert_eq!(repository.debits(), vec![(9, 0.5)]);
    }

    #[tokio::test]
    async fn failed_ledger_insert_skips_the_debit() {
        struct LedgerlessRepository(RecordingRepository);

        #[async_trait]
        impl AdRepository for LedgerlessRepository {
            async fn fetch_keywords(&self) -> AdsResult<Vec<Keyword>> {
                self.0.fetch_keywords().await
            }
            async fn fetch_ads(&self) -> AdsResult<Vec<Ad>> {
                self.0.fetch_ads().await
            }
            async fn fetch_keyword_ads(&self) -> AdsResult<Vec<(u64, u64)>> {
                self.0.fetch_keyword_ads().await
            }
            async fn increment_impressions(&self, ad_id: u64) -> AdsResult<()> {
                self.0.increment_impressions(ad_id).await
            }
            async fn insert_ledger(&self, _entry: &AdLedgerEntry) -> AdsResult<()> {
                Err(crate::ads::AdsError::Store("disk full".into()))
            }
            async fn debit_client(&self, client_id: u64, price: f64) -> AdsResult<()> {
                self.0.debit_client(client_id, price).await
            }
        }

        let repository = Arc::new(LedgerlessRepository(RecordingRepository::default()));
        let publisher = Arc::new(RecordingPublisher::default());
        let (queue, handle) = BillingQueue::start(repository.clone(), publisher, 8);

        queue.enqueue(BillingJob::Debit {
            ad_id: 1,
            client_id: 7,
            identity: "bob".into(),
            price: 1.0,
        });
        drop(queue);
        handle.await.unwrap();

        assert!(repository.0.debits().is_empty());
    }
}
