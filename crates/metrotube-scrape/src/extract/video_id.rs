//! Video identity recovery from link targets.

use std::sync::LazyLock;

use regex::Regex;

// Identities are exactly eleven URL-safe characters; the trailing group keeps
// a longer token from being truncated into a false match.
static LONG_FORM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:youtube\.com)?/watch\?v=([A-Za-z0-9_-]{11})(?:[^A-Za-z0-9_-]|$)").unwrap()
});
static SHORT_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"youtu\.be/([A-Za-z0-9_-]{11})(?:[^A-Za-z0-9_-]|$)").unwrap()
});
static PARAMETER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[?&])v=([A-Za-z0-9_-]{11})(?:[^A-Za-z0-9_-]|$)").unwrap()
});

/// Identity patterns, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdPattern {
    /// `/watch?v=ID`
    LongForm,
    /// `youtu.be/ID`
    ShortLink,
    /// any `v=ID` query parameter
    Parameter,
}

impl IdPattern {
    pub const ORDER: [IdPattern; 3] = [IdPattern::LongForm, IdPattern::ShortLink, IdPattern::Parameter];

    fn regex(self) -> &'static Regex {
        match self {
            IdPattern::LongForm => &LONG_FORM,
            IdPattern::ShortLink => &SHORT_LINK,
            IdPattern::Parameter => &PARAMETER,
        }
    }

    /// Capture the identity from a link target, if this pattern matches.
    pub fn capture(self, href: &str) -> Option<String> {
        self.regex()
            .captures(href)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }
}

/// Recover an identity from a single link, trying each pattern in order.
pub fn extract_video_id(href: &str) -> Option<String> {
    IdPattern::ORDER
        .iter()
        .find_map(|pattern| pattern.capture(href))
}

/// Recover an identity from several links.
///
/// Patterns take precedence over link order: every link is tried against the
/// long form before any link is tried against the short form.
pub fn extract_from_links<'a, I>(hrefs: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
    I::IntoIter: Clone,
{
    let hrefs = hrefs.into_iter();
    IdPattern::ORDER
        .iter()
        .find_map(|pattern| hrefs.clone().find_map(|href| pattern.capture(href)))
}
