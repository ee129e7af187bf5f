//! Index query construction
//!
//! One request body per search: full-text match plus a type-specific filter
//! set over the per-item media counters, a fixed relevance tie-break chain,
//! single-fragment highlighting and cursor-based pagination.

use crate::index::ContextToken;
use crate::models::ContentKind;
use crate::query::config::QueryConfig;
use serde_json::{json, Value};

fn range_at_least_one(field: &str) -> Value {
    json!({ "range": { field: { "gte": 1 } } })
}

fn term_zero(field: &str) -> Value {
    json!({ "term": { field: 0 } })
}

/// Structural filter set for a content type.
///
/// `All`, `Group` and `Channel` add no structural filter: the group/channel
/// distinction is not expressed in the media counters (known simplification).
pub(crate) fn type_filters(kind: ContentKind) -> Vec<Value> {
    match kind {
        ContentKind::All | ContentKind::Group | ContentKind::Channel => Vec::new(),
        ContentKind::Video => vec![
            range_at_least_one("videos"),
            term_zero("photos"),
            term_zero("voices"),
            term_zero("files"),
        ],
        ContentKind::Image => vec![
            range_at_least_one("photos"),
            term_zero("videos"),
            term_zero("voices"),
            term_zero("files"),
        ],
        ContentKind::Voice => vec![
            range_at_least_one("voices"),
            term_zero("photos"),
            term_zero("videos"),
            term_zero("files"),
        ],
        ContentKind::Text => vec![
            term_zero("photos"),
            term_zero("videos"),
            term_zero("voices"),
            term_zero("files"),
        ],
        ContentKind::File => vec![
            range_at_least_one("files"),
            term_zero("photos"),
            term_zero("videos"),
            term_zero("voices"),
        ],
        ContentKind::ImageAndVideo => vec![
            range_at_least_one("photos"),
            range_at_least_one("videos"),
            term_zero("voices"),
            term_zero("files"),
        ],
    }
}

/// Build the full search body for one page.
pub(crate) fn build_body(
    kind: ContentKind,
    text: &str,
    cursor: &[f64],
    token: &ContextToken,
    config: &QueryConfig,
) -> Value {
    let mut body = json!({
        "size": config.page_size,
        "query": {
            "bool": {
                "must": [
                    { "match": { "content": text } }
                ],
                "filter": type_filters(kind),
            }
        },
        "sort": [
            { "score":  { "order": "desc" } },
            { "videos": { "order": "desc" } },
            { "photos": { "order": "desc" } },
        ],
        "highlight": {
            "pre_tags": ["<em>"],
            "post_tags": ["</em>"],
            "fields": {
                "content": {
                    "fragment_size": config.fragment_size,
                    "number_of_fragments": 1,
                }
            }
        },
        "pit": {
            "id": token.id(),
            "keep_alive": config.context_keep_alive,
        },
        "track_total_hits": false,
    });

    if !cursor.is_empty() {
        body["search_after"] = json!(cursor);
    }

    body
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_for(kind: ContentKind, cursor: &[f64]) -> Value {
        build_body(
            kind,
            "rust",
            cursor,
            &ContextToken::new("pit-1"),
            &QueryConfig::default(),
        )
    }

    #[test]
    fn text_filter_is_four_zero_terms_without_ranges() {
        let filters = type_filters(ContentKind::Text);
        assert_eq!(filters.len(), 4);
        for field in ["photos", "videos", "voices", "files"] {
            assert!(filters.contains(&json!({ "term": { field: 0 } })));
        }
        assert!(filters.iter().all(|f| f.get("range").is_none()));
    }

    #[test]
    fn video_filter_requires_videos_and_excludes_rest() {
        let filters = type_filters(ContentKind::Video);
        assert!(filters.contains(&json!({ "range": { "videos": { "gte": 1 } } })));
        assert!(filters.contains(&json!({ "term": { "photos": 0 } })));
        assert!(filters.contains(&json!({ "term": { "voices": 0 } })));
        assert!(filters.contains(&json!({ "term": { "files": 0 } })));
    }

    #[test]
    fn image_and_video_requires_both_counters() {
        let filters = type_filters(ContentKind::ImageAndVideo);
        assert!(filters.contains(&json!({ "range": { "photos": { "gte": 1 } } })));
        assert!(filters.contains(&json!({ "range": { "videos": { "gte": 1 } } })));
        assert!(filters.contains(&json!({ "term": { "voices": 0 } })));
        assert!(filters.contains(&json!({ "term": { "files": 0 } })));
    }

    #[test]
    fn broad_kinds_add_no_structural_filter() {
        for kind in [ContentKind::All, ContentKind::Group, ContentKind::Channel] {
            assert!(type_filters(kind).is_empty());
        }
    }

    #[test]
    fn first_page_omits_search_after() {
        let body = body_for(ContentKind::All, &[]);
        assert!(body.get("search_after").is_none());
        assert_eq!(body["size"], 10);
        assert_eq!(body["track_total_hits"], false);
        assert_eq!(body["pit"]["id"], "pit-1");
        assert_eq!(body["pit"]["keep_alive"], "5m");
    }

    #[test]
    fn cursor_is_passed_back_verbatim() {
        let body = body_for(ContentKind::All, &[12.5, 3.0, 1.0]);
        assert_eq!(body["search_after"], json!([12.5, 3.0, 1.0]));
    }

    #[test]
    fn sort_chain_is_fixed() {
        let body = body_for(ContentKind::All, &[]);
        let sort = body["sort"].as_array().expect("sort array");
        assert_eq!(sort.len(), 3);
        assert_eq!(sort[0]["score"]["order"], "desc");
        assert_eq!(sort[1]["videos"]["order"], "desc");
        assert_eq!(sort[2]["photos"]["order"], "desc");
    }

    #[test]
    fn highlight_uses_single_fragment() {
        let body = body_for(ContentKind::All, &[]);
        let highlight = &body["highlight"];
        assert_eq!(highlight["pre_tags"], json!(["<em>"]));
        assert_eq!(highlight["post_tags"], json!(["</em>"]));
        assert_eq!(highlight["fields"]["content"]["fragment_size"], 30);
        assert_eq!(highlight["fields"]["content"]["number_of_fragments"], 1);
    }
}
