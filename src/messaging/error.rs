//! Error types for bus operations

/// Result type for bus operations
pub type BusResult<T> = std::result::Result<T, BusError>;

/// Errors from the message bus
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("bus connection failed: {0}")]
    Connection(String),

    #[error("publish failed: {0}")]
    Publish(String),

    #[error("subscribe failed: {0}")]
    Subscribe(String),
}
