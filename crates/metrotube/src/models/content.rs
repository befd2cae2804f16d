//! Content record model.

use serde::{Deserialize, Serialize};

/// Title used when a source item carries none.
pub const DEFAULT_TITLE: &str = "Unknown Title";
/// Author name used when a source item carries none.
pub const DEFAULT_AUTHOR: &str = "Unknown Channel";

const WATCH_URL_PREFIX: &str = "https://www.youtube.com/watch?v=";

/// Canonical watch URL for a video identity.
pub fn canonical_url(id: &str) -> String {
    format!("{}{}", WATCH_URL_PREFIX, id)
}

/// Rewrite a schema-relative URL (`//host/path`) to an explicit `https:` URL.
pub fn absolutize_url(url: &str) -> String {
    let url = url.trim();
    if url.starts_with("//") {
        format!("https:{}", url)
    } else {
        url.to_string()
    }
}

/// One displayable video item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    pub id: String,
    pub title: String,
    pub author_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
    pub thumbnail_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_count_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_time_text: Option<String>,
    pub canonical_url: String,
    #[serde(default)]
    pub liked: bool,
    #[serde(default)]
    pub disliked: bool,
    #[serde(default)]
    pub in_watch_later: bool,
}

impl ContentRecord {
    /// Create a record with default title, author and an empty thumbnail.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            canonical_url: canonical_url(&id),
            id,
            title: DEFAULT_TITLE.to_string(),
            author_name: DEFAULT_AUTHOR.to_string(),
            author_id: None,
            thumbnail_url: String::new(),
            duration_text: None,
            view_count_text: None,
            published_time_text: None,
            liked: false,
            disliked: false,
            in_watch_later: false,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_author(mut self, name: impl Into<String>) -> Self {
        self.author_name = name.into();
        self
    }

    pub fn with_thumbnail(mut self, url: impl Into<String>) -> Self {
        self.thumbnail_url = url.into();
        self
    }

    pub fn with_duration(mut self, text: impl Into<String>) -> Self {
        self.duration_text = Some(text.into());
        self
    }

    pub fn with_view_count(mut self, text: impl Into<String>) -> Self {
        self.view_count_text = Some(text.into());
        self
    }

    pub fn with_published_time(mut self, text: impl Into<String>) -> Self {
        self.published_time_text = Some(text.into());
        self
    }
}
