//! Relational store seam for keywords, ads and billing
//!
//! The cache only ever does bulk reads; writes are narrow column updates and
//! one ledger insert, issued by the billing worker.

use crate::ads::error::AdsResult;
use crate::models::{Ad, AdCategory, AdLedgerEntry, Keyword};
use async_trait::async_trait;
use chrono::DateTime;
use sqlx::{FromRow, MySqlPool};
use tracing::warn;

/// Store operations consumed by the ad cache and the billing worker.
#[async_trait]
pub trait AdRepository: Send + Sync {
    async fn fetch_keywords(&self) -> AdsResult<Vec<Keyword>>;
    async fn fetch_ads(&self) -> AdsResult<Vec<Ad>>;
    /// Keyword-to-ad association pairs, in stored order.
    async fn fetch_keyword_ads(&self) -> AdsResult<Vec<(u64, u64)>>;

    async fn increment_impressions(&self, ad_id: u64) -> AdsResult<()>;
    async fn insert_ledger(&self, entry: &AdLedgerEntry) -> AdsResult<()>;
    async fn debit_client(&self, client_id: u64, price: f64) -> AdsResult<()>;
}

/// MySQL-backed repository
pub struct MySqlAdRepository {
    pool: MySqlPool,
}

impl MySqlAdRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct KeywordRow {
    id: u64,
    word: String,
    status: u8,
}

#[derive(FromRow)]
struct AdRow {
    id: u64,
    category: u8,
    status: u8,
    client_id: u64,
    price_per_view: f64,
    impressions: u64,
    max_impressions: u64,
    start_time: i64,
    stop_time: i64,
    title: String,
    link: String,
}

#[derive(FromRow)]
struct KeywordAdRow {
    keyword_id: u64,
    ad_id: u64,
}

impl AdRow {
    fn into_ad(self) -> Option<Ad> {
        let Some(category) = AdCategory::from_code(self.category) else {
            warn!(ad_id = self.id, category = self.category, "unknown ad category, skipping row");
            return None;
        };

        Some(Ad {
            id: self.id,
            category,
            active: self.status == 1,
            // A zero client column means the ad has no billing owner yet.
            client_id: (self.client_id != 0).then_some(self.client_id),
            price_per_view: self.price_per_view,
            impressions: self.impressions,
            max_impressions: self.max_impressions,
            starts_at: DateTime::from_timestamp(self.start_time, 0).unwrap_or(DateTime::UNIX_EPOCH),
            stops_at: DateTime::from_timestamp(self.stop_time, 0).unwrap_or(DateTime::UNIX_EPOCH),
            title: self.title,
            link: self.link,
        })
    }
}

#[async_trait]
impl AdRepository for MySqlAdRepository {
    async fn fetch_keywords(&self) -> AdsResult<Vec<Keyword>> {
        let rows: Vec<KeywordRow> = sqlx::query_as("SELECT id, word, status FROM keywords")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| Keyword {
                id: row.id,
                word: row.word,
                active: row.status == 1,
            })
            .collect())
    }

    async fn fetch_ads(&self) -> AdsResult<Vec<Ad>> {
        let rows: Vec<AdRow> = sqlx::query_as(
            "SELECT id, category, status, client_id, price_per_view, impressions, \
             max_impressions, start_time, stop_time, title, link FROM ads",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().filter_map(AdRow::into_ad).collect())
    }

    async fn fetch_keyword_ads(&self) -> AdsResult<Vec<(u64, u64)>> {
        let rows: Vec<KeywordAdRow> =
            sqlx::query_as("SELECT keyword_id, ad_id FROM keyword_ads ORDER BY id")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(|row| (row.keyword_id, row.ad_id)).collect())
    }

    async fn increment_impressions(&self, ad_id: u64) -> AdsResult<()> {
        sqlx::query("UPDATE ads SET impressions = impressions + 1 WHERE id = ?")
            .bind(ad_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert_ledger(&self, entry: &AdLedgerEntry) -> AdsResult<()> {
        sqlx::query(
            "INSERT INTO ad_logs (id, ad_id, username, price, created) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(entry.id.to_string())
        .bind(entry.ad_id)
        .bind(&entry.identity)
        .bind(entry.price)
        .bind(entry.created_at.timestamp_millis())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn debit_client(&self, client_id: u64, price: f64) -> AdsResult<()> {
        sqlx::query("UPDATE clients SET balance = balance - ?, spent = spent + ? WHERE id = ?")
            .bind(price)
            .bind(price)
            .bind(client_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
