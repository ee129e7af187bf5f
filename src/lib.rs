//! Full-text chat search backend
//!
//! Three cooperating pieces:
//!
//! - [`rotation`] keeps a bounded pool of index snapshot contexts fresh on a
//!   one-second clock so paginated reads stay consistent.
//! - [`query`] builds bounded, cursor-paginated index queries and shapes the
//!   hits into display-ready snippets.
//! - [`ads`] serves keyword- and category-triggered ad placements from
//!   in-memory snapshots, billing served impressions through a
//!   fire-and-forget queue.
//!
//! [`messaging`] ties nodes together over NATS (cache invalidation and
//! impression mirroring), and [`app::SearchApp`] wires it all up.

pub mod ads;
pub mod app;
pub mod config;
pub mod error;
pub mod index;
pub mod messaging;
pub mod models;
pub mod query;
pub mod rotation;

#[cfg(test)]
pub(crate) mod testutil;

pub use app::SearchApp;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
