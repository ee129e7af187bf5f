//! Elasticsearch implementation of the index provider
//!
//! Uses the point-in-time REST API: contexts are PIT ids opened against the
//! configured index, searches go to the top-level `_search` endpoint because
//! the PIT in the body already pins the index.

use crate::index::config::ElasticConfig;
use crate::index::error::{IndexError, IndexResult};
use crate::index::provider::{ContextToken, IndexProvider};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// Reqwest-backed Elasticsearch client
pub struct ElasticClient {
    http: reqwest::Client,
    config: ElasticConfig,
}

#[derive(Deserialize)]
struct PitOpened {
    id: String,
}

impl ElasticClient {
    pub fn new(config: ElasticConfig) -> IndexResult<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .build()?;

        Ok(Self { http, config })
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.username {
            Some(user) => request.basic_auth(user, self.config.password.as_deref()),
            None => request,
        }
    }

    async fn check(response: reqwest::Response) -> IndexResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(IndexError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl IndexProvider for ElasticClient {
    async fn open_context(&self, keep_alive: Duration) -> IndexResult<ContextToken> {
        let url = format!(
            "{}/{}/_pit?keep_alive={}s",
            self.config.url,
            self.config.index,
            keep_alive.as_secs()
        );

        let response = self.authorized(self.http.post(&url)).send().await?;
        let response = Self::check(response).await?;

        let opened: PitOpened = response
            .json()
            .await
            .map_err(|e| IndexError::Malformed(e.to_string()))?;

        Ok(ContextToken::new(opened.id))
    }

    async fn close_context(&self, token: &ContextToken) -> IndexResult<()> {
        let url = format!("{}/_pit", self.config.url);

        let response = self
            .authorized(self.http.delete(&url))
            .json(&json!({ "id": token.id() }))
            .send()
            .await?;
        Self::check(response).await?;

        Ok(())
    }

    async fn execute(&self, body: serde_json::Value, timeout: Duration) -> IndexResult<String> {
        let url = format!("{}/_search", self.config.url);

        let response = self
            .authorized(self.http.post(&url))
            .timeout(timeout)
            .json(&body)
            .send()
            .await?;
        let response = Self::check(response).await?;

        Ok(response.text().await?)
    }
}
