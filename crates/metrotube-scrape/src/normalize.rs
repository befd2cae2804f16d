//! Record cleanup shared by every extraction strategy.

use std::collections::HashSet;

use metrotube::models::{absolutize_url, canonical_url, ContentRecord, DEFAULT_AUTHOR, DEFAULT_TITLE};

/// Collapse runs of whitespace and trim.
pub(crate) fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn clean_optional(text: Option<String>) -> Option<String> {
    text.map(|t| clean_text(&t)).filter(|t| !t.is_empty())
}

fn or_default(text: &str, default: &str) -> String {
    let cleaned = clean_text(text);
    if cleaned.is_empty() {
        default.to_string()
    } else {
        cleaned
    }
}

/// Normalize one record's fields. Applying it twice changes nothing.
pub fn normalize_record(record: ContentRecord) -> ContentRecord {
    let id = record.id.trim().to_string();
    ContentRecord {
        canonical_url: canonical_url(&id),
        title: or_default(&record.title, DEFAULT_TITLE),
        author_name: or_default(&record.author_name, DEFAULT_AUTHOR),
        author_id: clean_optional(record.author_id),
        thumbnail_url: absolutize_url(&record.thumbnail_url),
        duration_text: clean_optional(record.duration_text),
        view_count_text: clean_optional(record.view_count_text),
        published_time_text: clean_optional(record.published_time_text),
        id,
        ..record
    }
}

/// Keep the first record for each identity, preserving order.
pub fn dedup_by_identity(records: Vec<ContentRecord>) -> Vec<ContentRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| seen.insert(record.id.clone()))
        .collect()
}

/// Normalize every record, then drop repeated identities.
pub fn normalize(records: Vec<ContentRecord>) -> Vec<ContentRecord> {
    dedup_by_identity(records.into_iter().map(normalize_record).collect())
}

/// Clear the per-user flags unless the session is authenticated.
pub fn apply_session_flags(records: &mut [ContentRecord], authenticated: bool) {
    if authenticated {
        return;
    }
    for record in records {
        record.liked = false;
        record.disliked = false;
        record.in_watch_later = false;
    }
}
