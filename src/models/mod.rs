//! Domain types shared across the service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Content-type filter applied to a search request.
///
/// Wire codes follow the bot protocol: 1 group, 2 channel, 3 video, 4 image,
/// 5 voice, 6 text, 7 file, 8 image+video; anything else searches everything.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ContentKind {
    All,
    Group,
    Channel,
    Video,
    Image,
    Voice,
    Text,
    File,
    ImageAndVideo,
}

impl ContentKind {
    /// Decode the bot-protocol content-type code. Unknown codes fall back to `All`.
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => ContentKind::Group,
            2 => ContentKind::Channel,
            3 => ContentKind::Video,
            4 => ContentKind::Image,
            5 => ContentKind::Voice,
            6 => ContentKind::Text,
            7 => ContentKind::File,
            8 => ContentKind::ImageAndVideo,
            _ => ContentKind::All,
        }
    }
}

/// Advertisement category.
///
/// `Generic` ads are only ever served through keyword associations; the other
/// four categories are paid display slots selected round-robin per category.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AdCategory {
    Generic,
    Pinned,
    InlineLarge,
    InlineSmall,
    Content,
}

impl AdCategory {
    /// Decode the store's numeric category column.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(AdCategory::Generic),
            2 => Some(AdCategory::Pinned),
            3 => Some(AdCategory::InlineLarge),
            4 => Some(AdCategory::InlineSmall),
            5 => Some(AdCategory::Content),
            _ => None,
        }
    }

    /// Whether this category participates in round-robin display selection.
    pub fn is_rotational(&self) -> bool {
        !matches!(self, AdCategory::Generic)
    }
}

/// A trigger keyword. Unique by `word`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword {
    pub id: u64,
    pub word: String,
    pub active: bool,
}

/// An advertisement as cached in memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ad {
    pub id: u64,
    pub category: AdCategory,
    pub active: bool,
    /// Billing client owning this ad. Ads without a client are never served.
    pub client_id: Option<u64>,
    pub price_per_view: f64,
    pub impressions: u64,
    pub max_impressions: u64,
    pub starts_at: DateTime<Utc>,
    pub stops_at: DateTime<Utc>,
    pub title: String,
    pub link: String,
}

impl Ad {
    /// Combined status / billing / cap / time-window predicate an ad must pass
    /// before it is servable.
    pub fn is_eligible(&self, now: DateTime<Utc>) -> bool {
        self.active
            && self.client_id.is_some()
            && self.impressions < self.max_impressions
            && now >= self.starts_at
            && now <= self.stops_at
    }
}

/// One billing ledger row, written for every served impression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdLedgerEntry {
    pub id: Uuid,
    pub ad_id: u64,
    pub identity: String,
    pub price: f64,
    pub created_at: DateTime<Utc>,
}

impl AdLedgerEntry {
    pub fn new(ad_id: u64, identity: impl Into<String>, price: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            ad_id,
            identity: identity.into(),
            price,
            created_at: Utc::now(),
        }
    }
}
