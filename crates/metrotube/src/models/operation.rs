//! Logical operations a caller can request.

use std::fmt;

use serde::Serialize;

/// A logical content request, carrying its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "operation", rename_all = "camelCase")]
pub enum Operation {
    Home,
    Search {
        query: String,
    },
    Recommendations,
    Library,
    Playlist {
        #[serde(rename = "playlistId")]
        playlist_id: String,
    },
    VideoDetail {
        #[serde(rename = "videoId")]
        video_id: String,
    },
    Related {
        #[serde(rename = "videoId")]
        video_id: String,
    },
    Channel {
        #[serde(rename = "channelId")]
        channel_id: String,
    },
}

impl Operation {
    pub fn search(query: impl Into<String>) -> Self {
        Operation::Search {
            query: query.into(),
        }
    }

    pub fn playlist(playlist_id: impl Into<String>) -> Self {
        Operation::Playlist {
            playlist_id: playlist_id.into(),
        }
    }

    pub fn video_detail(video_id: impl Into<String>) -> Self {
        Operation::VideoDetail {
            video_id: video_id.into(),
        }
    }

    pub fn related(video_id: impl Into<String>) -> Self {
        Operation::Related {
            video_id: video_id.into(),
        }
    }

    pub fn channel(channel_id: impl Into<String>) -> Self {
        Operation::Channel {
            channel_id: channel_id.into(),
        }
    }

    /// Stable operation name used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Home => "home",
            Operation::Search { .. } => "search",
            Operation::Recommendations => "recommendations",
            Operation::Library => "library",
            Operation::Playlist { .. } => "playlist",
            Operation::VideoDetail { .. } => "videoDetail",
            Operation::Related { .. } => "related",
            Operation::Channel { .. } => "channel",
        }
    }

    /// Whether the internal API implements this operation.
    pub fn has_internal_channel(&self) -> bool {
        true
    }

    /// Whether an anonymous public page exists for this operation.
    pub fn has_public_channel(&self) -> bool {
        !matches!(self, Operation::Library)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        assert_eq!(Operation::Home.name(), "home");
        assert_eq!(Operation::search("x").name(), "search");
        assert_eq!(Operation::video_detail("v").to_string(), "videoDetail");
    }

    #[test]
    fn test_library_has_no_public_page() {
        assert!(!Operation::Library.has_public_channel());
        assert!(Operation::Library.has_internal_channel());
        assert!(Operation::Recommendations.has_public_channel());
        assert!(Operation::channel("UC123").has_public_channel());
    }

    #[test]
    fn test_serialize_tagged() {
        let json = serde_json::to_value(Operation::playlist("PL1")).unwrap();
        assert_eq!(json["operation"], "playlist");
        assert_eq!(json["playlistId"], "PL1");
    }
}
