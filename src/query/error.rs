//! Error types for the query path

/// Result type for query operations
pub type QueryResult<T> = std::result::Result<T, QueryError>;

/// Errors surfaced to the search caller
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// The context pool is empty; the request fails immediately, no retry.
    #[error("no search context available")]
    NoContext,

    /// Index timeout, transport failure or non-success status. Not retried here.
    #[error("query failed: {0}")]
    Upstream(String),

    /// The index answered but the body did not decode.
    #[error("decode failed: {0}")]
    Decode(String),
}

impl From<crate::index::IndexError> for QueryError {
    fn from(err: crate::index::IndexError) -> Self {
        QueryError::Upstream(err.to_string())
    }
}
