//! Error types for index provider operations

/// Result type for index provider operations
pub type IndexResult<T> = std::result::Result<T, IndexError>;

/// Errors that can occur talking to the index provider
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// Transport-level failure (connect, send, read)
    #[error("index transport error: {0}")]
    Transport(String),

    /// The index answered with a non-success status
    #[error("index returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The index answered 2xx but the body was not what we expected
    #[error("index response malformed: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for IndexError {
    fn from(err: reqwest::Error) -> Self {
        IndexError::Transport(err.to_string())
    }
}
