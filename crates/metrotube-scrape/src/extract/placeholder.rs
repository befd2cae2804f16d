//! Placeholder records shown when a page yields nothing usable.

use metrotube::models::ContentRecord;

/// Source of fixed fallback records.
pub trait PlaceholderSource: Send + Sync {
    /// Records substituted for a listing that could not be parsed.
    fn listing(&self) -> Vec<ContentRecord>;

    /// Records substituted for an empty or unparseable search.
    fn search(&self) -> Vec<ContentRecord>;
}

/// The built-in placeholder sets.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinPlaceholders;

impl PlaceholderSource for BuiltinPlaceholders {
    fn listing(&self) -> Vec<ContentRecord> {
        let mut recommended = ContentRecord::new("auth1")
            .with_title("Personalized Recommendation 1")
            .with_author("Your Subscribed Channel")
            .with_thumbnail(thumbnail("auth1"))
            .with_duration("4:32")
            .with_view_count("1.5M views")
            .with_published_time("1 day ago");
        recommended.liked = true;

        let mut library = ContentRecord::new("auth2")
            .with_title("From Your Music Library")
            .with_author("Favorite Artist")
            .with_thumbnail(thumbnail("auth2"))
            .with_duration("3:45")
            .with_view_count("2.1M views")
            .with_published_time("3 days ago");
        library.in_watch_later = true;

        vec![recommended, library]
    }

    fn search(&self) -> Vec<ContentRecord> {
        vec![ContentRecord::new("search_auth1")
            .with_title("Personalized Search Result")
            .with_author("Recommended Channel")
            .with_thumbnail(thumbnail("search_auth1"))
            .with_duration("5:20")
            .with_view_count("800K views")
            .with_published_time("2 days ago")]
    }
}

fn thumbnail(id: &str) -> String {
    format!("https://i.ytimg.com/vi/{}/mqdefault.jpg", id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_sets() {
        let listing = BuiltinPlaceholders.listing();
        assert_eq!(listing.len(), 2);
        assert_eq!(listing[0].id, "auth1");
        assert!(listing[0].liked);
        assert!(listing[1].in_watch_later);
        assert_eq!(
            listing[1].thumbnail_url,
            "https://i.ytimg.com/vi/auth2/mqdefault.jpg"
        );

        let search = BuiltinPlaceholders.search();
        assert_eq!(search.len(), 1);
        assert_eq!(search[0].title, "Personalized Search Result");
    }
}
