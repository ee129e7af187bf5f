//! Top-level application errors

use crate::ads::AdsError;
use crate::index::IndexError;
use crate::messaging::BusError;
use crate::query::QueryError;

/// Result type for application startup and wiring
pub type AppResult<T> = std::result::Result<T, AppError>;

/// Errors surfaced during startup and wiring
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Ads(#[from] AdsError),

    #[error(transparent)]
    Bus(#[from] BusError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
