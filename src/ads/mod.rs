//! Ad/keyword cache and billing
//!
//! Serves keyword-triggered and category-triggered ad lookups from in-memory
//! snapshots, wholesale-replaced on invalidation signals, and records
//! impressions and spend through a bounded fire-and-forget billing queue.

pub mod billing;
pub mod cache;
pub mod config;
pub mod error;
pub mod repository;

pub use billing::{BillingJob, BillingQueue};
pub use cache::{AdCache, CacheKind, Placement};
pub use config::AdsConfig;
pub use error::{AdsError, AdsResult};
pub use repository::{AdRepository, MySqlAdRepository};
