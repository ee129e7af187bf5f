//! Search execution and result shaping

use crate::index::IndexProvider;
use crate::models::ContentKind;
use crate::query::builder;
use crate::query::config::QueryConfig;
use crate::query::error::{QueryError, QueryResult};
use crate::query::snippet;
use crate::rotation::TokenSource;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

/// One display-ready search hit
#[derive(Debug, Clone, PartialEq)]
pub struct Snippet {
    pub text: String,
    pub link: String,
}

/// One page of shaped results
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage {
    /// Ordered display snippets
    pub snippets: Vec<Snippet>,
    /// Sort keys of the last hit; pass back verbatim for the next page.
    /// Empty when the page had no hits.
    pub next_cursor: Vec<f64>,
    /// Whether another page is likely available
    pub has_next: bool,
}

#[derive(Debug, Deserialize)]
struct RawResponse {
    #[serde(default)]
    hits: RawHitsWrapper,
}

#[derive(Debug, Default, Deserialize)]
struct RawHitsWrapper {
    #[serde(default)]
    hits: Vec<RawHit>,
}

#[derive(Debug, Deserialize)]
struct RawHit {
    #[serde(rename = "_source")]
    source: RawSource,
    #[serde(default)]
    highlight: RawHighlight,
    #[serde(default)]
    sort: Vec<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct RawSource {
    #[serde(default)]
    link: String,
    #[serde(default)]
    photos: i64,
    #[serde(default)]
    videos: i64,
    #[serde(default)]
    voices: i64,
    #[serde(default)]
    files: i64,
}

#[derive(Debug, Default, Deserialize)]
struct RawHighlight {
    #[serde(default)]
    content: Vec<String>,
}

/// Executes one bounded, paginated index query per call.
pub struct SearchEngine {
    provider: Arc<dyn IndexProvider>,
    tokens: Arc<dyn TokenSource>,
    config: QueryConfig,
}

impl SearchEngine {
    pub fn new(
        provider: Arc<dyn IndexProvider>,
        tokens: Arc<dyn TokenSource>,
        config: QueryConfig,
    ) -> Self {
        Self {
            provider,
            tokens,
            config,
        }
    }

    /// Run one page of the query and shape the hits for display.
    ///
    /// `cursor` is empty for the first page, otherwise the `next_cursor` of
    /// the previous response.
    pub async fn search(
        &self,
        kind: ContentKind,
        text: &str,
        cursor: &[f64],
    ) -> QueryResult<SearchPage> {
        let token = self.tokens.get().ok_or(QueryError::NoContext)?;

        let body = builder::build_body(kind, text, cursor, &token, &self.config);
        debug!(%kind, cursor_len = cursor.len(), "executing search");

        let raw = self.provider.execute(body, self.config.timeout()).await?;

        let parsed: RawResponse =
            serde_json::from_str(&raw).map_err(|e| QueryError::Decode(e.to_string()))?;

        Ok(self.shape(parsed))
    }

    fn shape(&self, response: RawResponse) -> SearchPage {
        let hits = response.hits.hits;
        let has_next = hits.len() >= self.config.page_size;

        let next_cursor = hits.last().map(|hit| hit.sort.clone()).unwrap_or_default();

        let snippets = hits
            .into_iter()
            .map(|hit| {
                let fragment = hit.highlight.content.first().map(String::as_str).unwrap_or("");
                let windowed = snippet::display_window(fragment, self.config.window);
                let glyph = snippet::media_glyph(
                    hit.source.photos,
                    hit.source.videos,
                    hit.source.voices,
                    hit.source.files,
                );
                Snippet {
                    text: format!("{glyph}{}", snippet::escape_markdown(&windowed)),
                    link: format!("{}{}", self.config.link_base, hit.source.link),
                }
            })
            .collect();

        SearchPage {
            snippets,
            next_cursor,
            has_next,
        }
    }
}
