//! Error types for ad cache and store operations

/// Result type for ad cache and store operations
pub type AdsResult<T> = std::result::Result<T, AdsError>;

/// Errors from the ad snapshot store
#[derive(Debug, thiserror::Error)]
pub enum AdsError {
    /// Relational store read or write failed
    #[error("ad store error: {0}")]
    Store(String),
}

impl From<sqlx::Error> for AdsError {
    fn from(err: sqlx::Error) -> Self {
        AdsError::Store(err.to_string())
    }
}
