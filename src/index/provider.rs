//! Index provider trait seam

use crate::index::error::IndexResult;
use async_trait::async_trait;
use std::time::Duration;

/// Opaque handle to a consistent, time-bounded snapshot of the index.
///
/// Issued by the provider, renewed on each use, never inspected by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContextToken(String);

impl ContextToken {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

/// The three operations the service consumes from the index provider.
#[async_trait]
pub trait IndexProvider: Send + Sync {
    /// Open a new snapshot context valid for `keep_alive`.
    async fn open_context(&self, keep_alive: Duration) -> IndexResult<ContextToken>;

    /// Release a snapshot context's index-side resources.
    async fn close_context(&self, token: &ContextToken) -> IndexResult<()>;

    /// Execute one search request. `body` carries the full query DSL including
    /// the context token; the raw success body is returned for the caller to
    /// decode. Non-success statuses and transport failures are errors.
    async fn execute(&self, body: serde_json::Value, timeout: Duration) -> IndexResult<String>;
}
