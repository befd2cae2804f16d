//! Internal API JSON extraction.
//!
//! Browse-style responses nest their video renderers at unpredictable
//! depths, so listings are recovered by walking the whole `contents` and
//! `continuationContents` trees. Search responses use one fixed path.

use metrotube::config::JSON_PARSE_DEPTH_LIMIT;
use metrotube::models::ContentRecord;
use serde_json::{Map, Value};
use tracing::{debug, trace, warn};

use super::{Extraction, ExtractionError, PayloadKind};
use crate::normalize::normalize;

/// Default nesting limit for the tree walk.
pub const DEFAULT_MAX_DEPTH: usize = JSON_PARSE_DEPTH_LIMIT;

/// Keys whose object values are lifted into records (case-sensitive
/// substring match).
const RENDERER_KEYS: [&str; 2] = ["videoRenderer", "compactVideoRenderer"];

/// Roots of the listing walk, in order.
const LISTING_ROOTS: [&str; 2] = ["contents", "continuationContents"];

const SEARCH_RESULTS_PATH: &str =
    "contents.twoColumnSearchResultsRenderer.primaryContents.sectionListRenderer.contents";

/// Borrowed view of a JSON value, split by what the walk does with it.
enum JsonNode<'a> {
    Object(&'a Map<String, Value>),
    Array(&'a [Value]),
    Scalar,
}

impl<'a> From<&'a Value> for JsonNode<'a> {
    fn from(value: &'a Value) -> Self {
        match value {
            Value::Object(map) => JsonNode::Object(map),
            Value::Array(items) => JsonNode::Array(items),
            _ => JsonNode::Scalar,
        }
    }
}

/// Resolve a dot-notation path; numeric segments index arrays.
pub(crate) fn value_at<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(data, |current, key| match current {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn str_at<'a>(data: &'a Value, path: &str) -> Option<&'a str> {
    value_at(data, path)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Text from either a `runs` list (first run) or a `simpleText` leaf.
fn text_of(data: &Value, field: &str) -> Option<String> {
    let field = data.get(field)?;
    str_at(field, "runs.0.text")
        .or_else(|| str_at(field, "simpleText"))
        .map(str::to_string)
}

/// URL of the last (largest) thumbnail.
fn last_thumbnail(data: &Value) -> Option<String> {
    value_at(data, "thumbnail.thumbnails")
        .and_then(Value::as_array)
        .and_then(|thumbs| thumbs.last())
        .and_then(|thumb| str_at(thumb, "url"))
        .map(str::to_string)
}

/// Lift a `videoRenderer`-like object. `None` when it has no `videoId`.
fn lift_renderer(renderer: &Value) -> Option<ContentRecord> {
    let id = str_at(renderer, "videoId")?;
    let mut record = ContentRecord::new(id);

    if let Some(title) = text_of(renderer, "title") {
        record.title = title;
    }
    if let Some(author) =
        text_of(renderer, "ownerText").or_else(|| text_of(renderer, "shortBylineText"))
    {
        record.author_name = author;
    }
    record.author_id = ["ownerText", "shortBylineText"].iter().find_map(|field| {
        str_at(
            renderer,
            &format!("{}.runs.0.navigationEndpoint.browseEndpoint.browseId", field),
        )
        .map(str::to_string)
    });
    if let Some(thumbnail) = last_thumbnail(renderer) {
        record.thumbnail_url = thumbnail;
    }
    record.duration_text = str_at(renderer, "lengthText.simpleText").map(str::to_string);
    record.view_count_text = str_at(renderer, "viewCountText.simpleText").map(str::to_string);
    record.published_time_text =
        str_at(renderer, "publishedTimeText.simpleText").map(str::to_string);

    Some(record)
}

/// Render a second count as `m:ss` or `h:mm:ss`.
fn format_seconds(total: u64) -> String {
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

/// Lift the top-level `videoDetails` object of a player response.
pub(crate) fn lift_video_details(details: &Value) -> Option<ContentRecord> {
    let id = str_at(details, "videoId")?;
    let mut record = ContentRecord::new(id);

    if let Some(title) = str_at(details, "title") {
        record.title = title.to_string();
    }
    if let Some(author) = str_at(details, "author") {
        record.author_name = author.to_string();
    }
    record.author_id = str_at(details, "channelId").map(str::to_string);
    if let Some(thumbnail) = last_thumbnail(details) {
        record.thumbnail_url = thumbnail;
    }
    record.duration_text = str_at(details, "lengthSeconds")
        .and_then(|s| s.parse::<u64>().ok())
        .map(format_seconds);
    record.view_count_text = str_at(details, "viewCount").map(|n| format!("{} views", n));

    Some(record)
}

/// Collects renderer records from a tree, bounded by depth.
struct RendererWalk {
    max_depth: usize,
    records: Vec<ContentRecord>,
    depth_limited: bool,
    skipped: usize,
}

impl RendererWalk {
    fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            records: Vec::new(),
            depth_limited: false,
            skipped: 0,
        }
    }

    fn walk(&mut self, node: JsonNode<'_>, depth: usize) {
        if depth >= self.max_depth {
            self.depth_limited = true;
            return;
        }

        match node {
            JsonNode::Object(map) => {
                for (key, value) in map {
                    if value.is_object() && RENDERER_KEYS.iter().any(|k| key.contains(k)) {
                        match lift_renderer(value) {
                            Some(record) => self.records.push(record),
                            None => {
                                self.skipped += 1;
                                trace!("Skipping {} without videoId", key);
                            }
                        }
                    }
                    self.walk(JsonNode::from(value), depth + 1);
                }
            }
            JsonNode::Array(items) => {
                for item in items {
                    self.walk(JsonNode::from(item), depth + 1);
                }
            }
            JsonNode::Scalar => {}
        }
    }

    fn finish(self, kind: &str) -> Vec<ContentRecord> {
        if self.depth_limited {
            warn!(
                "{} payload nests deeper than {} levels; deeper renderers were ignored",
                kind, self.max_depth
            );
        }
        debug!(
            "{} walk found {} renderers ({} without videoId)",
            kind,
            self.records.len(),
            self.skipped
        );
        self.records
    }
}

/// Extracts records from internal API responses.
#[derive(Debug, Clone)]
pub struct JsonExtractor {
    max_depth: usize,
}

impl Default for JsonExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl JsonExtractor {
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth: max_depth.max(1),
        }
    }

    pub fn extract(&self, kind: PayloadKind, body: &str) -> Extraction {
        match kind {
            PayloadKind::Listing => self.extract_listing(body),
            PayloadKind::Search => self.extract_search(body),
            PayloadKind::Detail => self.extract_detail(body),
        }
    }

    /// Walk `contents` then `continuationContents` for renderers.
    pub fn extract_listing(&self, body: &str) -> Extraction {
        let root = match parse(body) {
            Ok(root) => root,
            Err(e) => return Extraction::failed(e),
        };

        Extraction::complete(normalize(self.walk_roots(&root, "listing")))
    }

    /// Follow the fixed search results path only.
    pub fn extract_search(&self, body: &str) -> Extraction {
        let root = match parse(body) {
            Ok(root) => root,
            Err(e) => return Extraction::failed(e),
        };

        let records: Vec<ContentRecord> = value_at(&root, SEARCH_RESULTS_PATH)
            .and_then(Value::as_array)
            .map(|sections| {
                sections
                    .iter()
                    .filter_map(|section| section.get("videoRenderer"))
                    .filter(|renderer| renderer.is_object())
                    .filter_map(lift_renderer)
                    .collect()
            })
            .unwrap_or_default();

        debug!("search path yielded {} renderers", records.len());
        Extraction::complete(normalize(records))
    }

    /// Lift `videoDetails`, then anything the tree walk finds.
    pub fn extract_detail(&self, body: &str) -> Extraction {
        let root = match parse(body) {
            Ok(root) => root,
            Err(e) => return Extraction::failed(e),
        };

        let mut records: Vec<ContentRecord> = root
            .get("videoDetails")
            .and_then(lift_video_details)
            .into_iter()
            .collect();
        records.extend(self.walk_roots(&root, "detail"));

        Extraction::complete(normalize(records))
    }

    fn walk_roots(&self, root: &Value, kind: &str) -> Vec<ContentRecord> {
        let mut walk = RendererWalk::new(self.max_depth);
        for name in LISTING_ROOTS {
            if let Some(subtree) = root.get(name).filter(|v| v.is_object()) {
                walk.walk(JsonNode::from(subtree), 0);
            }
        }
        walk.finish(kind)
    }
}

fn parse(body: &str) -> Result<Value, ExtractionError> {
    serde_json::from_str(body).map_err(|e| {
        warn!("Failed to parse internal API payload: {}", e);
        ExtractionError::Parse(e.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ExtractionStatus;
    use serde_json::json;

    fn renderer(id: &str, title: &str) -> Value {
        json!({
            "videoId": id,
            "title": { "runs": [{ "text": title }] },
            "ownerText": { "runs": [{
                "text": "Channel",
                "navigationEndpoint": { "browseEndpoint": { "browseId": "UCchan" } }
            }] },
            "thumbnail": { "thumbnails": [
                { "url": "https://i.ytimg.com/small.jpg" },
                { "url": "https://i.ytimg.com/large.jpg" }
            ] },
            "lengthText": { "simpleText": "4:20" },
            "viewCountText": { "simpleText": "12K views" },
            "publishedTimeText": { "simpleText": "2 weeks ago" }
        })
    }

    #[test]
    fn test_nested_and_continuation_renderers() {
        let payload = json!({
            "contents": {
                "a": { "videoRenderer": renderer("X", "Nested") },
                "b": [{ "videoRenderer": renderer("Y", "In array") }]
            },
            "continuationContents": {
                "items": [{ "compactVideoRenderer": renderer("Z", "Compact") }]
            }
        });

        let extraction = JsonExtractor::default().extract_listing(&payload.to_string());
        assert_eq!(extraction.status, ExtractionStatus::Complete);
        let ids: Vec<_> = extraction.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["X", "Y", "Z"]);

        let first = &extraction.records[0];
        assert_eq!(first.title, "Nested");
        assert_eq!(first.author_name, "Channel");
        assert_eq!(first.author_id.as_deref(), Some("UCchan"));
        assert_eq!(first.thumbnail_url, "https://i.ytimg.com/large.jpg");
        assert_eq!(first.duration_text.as_deref(), Some("4:20"));
        assert_eq!(first.view_count_text.as_deref(), Some("12K views"));
        assert_eq!(first.published_time_text.as_deref(), Some("2 weeks ago"));
    }

    #[test]
    fn test_minimal_renderer_is_stable_across_runs() {
        let payload = r#"{"contents":{"a":{"videoRenderer":{"videoId":"abc12345678","title":{"runs":[{"text":"T"}]},"ownerText":{"runs":[{"text":"C"}]}}}}}"#;
        let extractor = JsonExtractor::default();

        let first = extractor.extract_listing(payload);
        let second = extractor.extract_listing(payload);
        assert_eq!(first, second);

        assert_eq!(first.status, ExtractionStatus::Complete);
        assert_eq!(first.records.len(), 1);
        let record = &first.records[0];
        assert_eq!(record.id, "abc12345678");
        assert_eq!(record.title, "T");
        assert_eq!(record.author_name, "C");
        assert_eq!(record.thumbnail_url, "");
    }

    #[test]
    fn test_renderer_key_match_is_case_sensitive() {
        let payload = json!({
            "contents": {
                "gridVideoRenderer": renderer("G", "Grid"),
                "videoRendererV2": renderer("S", "Suffixed")
            }
        });

        let extraction = JsonExtractor::default().extract_listing(&payload.to_string());
        let ids: Vec<_> = extraction.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["S"]);
    }

    #[test]
    fn test_renderer_without_video_id_is_ignored() {
        let payload = json!({
            "contents": {
                "videoRenderer": { "title": { "runs": [{ "text": "No id" }] } },
                "next": { "videoRenderer": { "videoId": "ok" } }
            }
        });

        let extraction = JsonExtractor::default().extract_listing(&payload.to_string());
        assert_eq!(extraction.records.len(), 1);
        assert_eq!(extraction.records[0].id, "ok");
        assert_eq!(extraction.records[0].title, "Unknown Title");
        assert_eq!(extraction.records[0].author_name, "Unknown Channel");
    }

    #[test]
    fn test_renderer_children_are_walked() {
        let payload = json!({
            "contents": {
                "videoRenderer": {
                    "videoId": "outer",
                    "menu": { "items": [{ "compactVideoRenderer": { "videoId": "inner" } }] }
                }
            }
        });

        let extraction = JsonExtractor::default().extract_listing(&payload.to_string());
        let ids: Vec<_> = extraction.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["outer", "inner"]);
    }

    #[test]
    fn test_duplicates_keep_first() {
        let payload = json!({
            "contents": { "list": [
                { "videoRenderer": renderer("dup", "first") },
                { "videoRenderer": renderer("other", "other") },
                { "videoRenderer": renderer("dup", "second") }
            ] }
        });

        let extraction = JsonExtractor::default().extract_listing(&payload.to_string());
        assert_eq!(extraction.records.len(), 2);
        assert_eq!(extraction.records[0].title, "first");
    }

    #[test]
    fn test_non_object_roots_are_skipped() {
        let payload = json!({ "contents": [{ "videoRenderer": renderer("X", "x") }] });
        let extraction = JsonExtractor::default().extract_listing(&payload.to_string());
        assert!(extraction.records.is_empty());
        assert_eq!(extraction.status, ExtractionStatus::Complete);
    }

    #[test]
    fn test_parse_failure() {
        let extraction = JsonExtractor::default().extract_listing("{ not json");
        assert!(extraction.records.is_empty());
        assert!(matches!(
            extraction.status,
            ExtractionStatus::Failed(ExtractionError::Parse(_))
        ));
    }

    #[test]
    fn test_depth_limit_keeps_shallow_records() {
        let mut deep = json!({ "videoRenderer": { "videoId": "deep" } });
        for _ in 0..10 {
            deep = json!({ "wrap": deep });
        }
        let payload = json!({
            "contents": {
                "videoRenderer": { "videoId": "shallow" },
                "nested": deep
            }
        });

        let extraction = JsonExtractor::new(5).extract_listing(&payload.to_string());
        let ids: Vec<_> = extraction.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["shallow"]);

        let extraction = JsonExtractor::default().extract_listing(&payload.to_string());
        assert_eq!(extraction.records.len(), 2);
    }

    #[test]
    fn test_search_uses_fixed_path_only() {
        let payload = json!({
            "contents": {
                "twoColumnSearchResultsRenderer": {
                    "primaryContents": {
                        "sectionListRenderer": {
                            "contents": [
                                { "videoRenderer": renderer("S1", "Result one") },
                                { "shelfRenderer": { "videoRenderer": renderer("S9", "Nested") } },
                                { "videoRenderer": renderer("S2", "Result two") }
                            ]
                        }
                    }
                }
            }
        });

        let extraction = JsonExtractor::default().extract_search(&payload.to_string());
        let ids: Vec<_> = extraction.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["S1", "S2"]);
    }

    #[test]
    fn test_search_missing_path_is_empty() {
        let extraction = JsonExtractor::default().extract_search(r#"{"contents":{}}"#);
        assert!(extraction.records.is_empty());
        assert_eq!(extraction.status, ExtractionStatus::Complete);
    }

    #[test]
    fn test_detail_from_video_details() {
        let payload = json!({
            "videoDetails": {
                "videoId": "dQw4w9WgXcQ",
                "title": "Never Gonna Give You Up",
                "author": "Rick Astley",
                "channelId": "UCuAXFkgsw1L7xaCfnd5JJOw",
                "lengthSeconds": "213",
                "viewCount": "1500000000",
                "thumbnail": { "thumbnails": [{ "url": "//i.ytimg.com/vi/dQw4w9WgXcQ/hq.jpg" }] }
            }
        });

        let extraction = JsonExtractor::default().extract_detail(&payload.to_string());
        assert_eq!(extraction.records.len(), 1);
        let record = &extraction.records[0];
        assert_eq!(record.author_name, "Rick Astley");
        assert_eq!(record.duration_text.as_deref(), Some("3:33"));
        assert_eq!(record.view_count_text.as_deref(), Some("1500000000 views"));
        assert_eq!(
            record.thumbnail_url,
            "https://i.ytimg.com/vi/dQw4w9WgXcQ/hq.jpg"
        );
    }

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(59), "0:59");
        assert_eq!(format_seconds(213), "3:33");
        assert_eq!(format_seconds(3725), "1:02:05");
    }

    #[test]
    fn test_value_at() {
        let data = json!({ "a": [{ "b": "c" }] });
        assert_eq!(value_at(&data, "a.0.b"), Some(&json!("c")));
        assert_eq!(value_at(&data, "a.x"), None);
        assert_eq!(value_at(&data, "missing"), None);
    }
}
