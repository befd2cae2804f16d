//! Public page HTML extraction.
//!
//! Each video item element is lifted independently; an element whose
//! identity cannot be recovered is skipped without affecting its siblings.
//! Every field is read through an ordered chain of rules and the first rule
//! that yields a value wins.

use std::sync::{Arc, LazyLock};

use metrotube::models::ContentRecord;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, trace, warn};

use super::json::{lift_video_details, value_at};
use super::placeholder::PlaceholderSource;
use super::video_id::{extract_from_links, extract_video_id};
use super::{Extraction, ExtractionError, PayloadKind, PlaceholderReason};
use crate::normalize::{clean_text, normalize};

const LISTING_ITEMS: &str = "div[class*='ytd-rich-item-renderer'], \
                             div[class*='ytd-video-renderer'], \
                             div[class*='ytd-compact-video-renderer']";
const SEARCH_ITEMS: &str = "div[class*='ytd-video-renderer']";

static CHANNEL_HREF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/channel/([A-Za-z0-9_-]+)").unwrap());
static PLAYER_RESPONSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"ytInitialPlayerResponse\s*=\s*").unwrap());

fn compile(selector: &str) -> Result<Selector, ExtractionError> {
    Selector::parse(selector).map_err(|e| ExtractionError::Selector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// Compiled selectors for one extraction pass.
struct Selectors {
    listing_items: Selector,
    search_items: Selector,
    links: Selector,
    titled_link: Selector,
    heading_link: Selector,
    video_title: Selector,
    channel_link: Selector,
    channel_name_link: Selector,
    image: Selector,
    duration: Selector,
    meta_spans: Selector,
}

impl Selectors {
    fn compile() -> Result<Self, ExtractionError> {
        Ok(Self {
            listing_items: compile(LISTING_ITEMS)?,
            search_items: compile(SEARCH_ITEMS)?,
            links: compile("a[href]")?,
            titled_link: compile("a[title]")?,
            heading_link: compile("h3 a")?,
            video_title: compile("#video-title")?,
            channel_link: compile("a[class*='channel']")?,
            channel_name_link: compile(".ytd-channel-name a")?,
            image: compile("img")?,
            duration: compile(".ytd-thumbnail-overlay-time-status-renderer")?,
            meta_spans: compile(".ytd-video-meta-block span")?,
        })
    }
}

type FieldRule = fn(&ElementRef<'_>, &Selectors) -> Option<String>;

fn first_of(rules: &[FieldRule], element: &ElementRef<'_>, selectors: &Selectors) -> Option<String> {
    rules.iter().find_map(|rule| rule(element, selectors))
}

fn element_text(element: &ElementRef<'_>) -> Option<String> {
    let text = clean_text(&element.text().collect::<String>());
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn attr(element: &ElementRef<'_>, name: &str) -> Option<String> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn title_from_titled_link(element: &ElementRef<'_>, s: &Selectors) -> Option<String> {
    element
        .select(&s.titled_link)
        .find_map(|a| attr(&a, "title"))
}

fn title_from_heading_link(element: &ElementRef<'_>, s: &Selectors) -> Option<String> {
    element.select(&s.heading_link).find_map(|a| element_text(&a))
}

fn title_from_video_title(element: &ElementRef<'_>, s: &Selectors) -> Option<String> {
    element
        .select(&s.video_title)
        .find_map(|el| element_text(&el).or_else(|| attr(&el, "title")))
}

const TITLE_RULES: &[FieldRule] = &[
    title_from_titled_link,
    title_from_heading_link,
    title_from_video_title,
];

fn author_from_channel_link(element: &ElementRef<'_>, s: &Selectors) -> Option<String> {
    element.select(&s.channel_link).find_map(|a| element_text(&a))
}

fn author_from_channel_name(element: &ElementRef<'_>, s: &Selectors) -> Option<String> {
    element
        .select(&s.channel_name_link)
        .find_map(|a| element_text(&a))
}

const AUTHOR_RULES: &[FieldRule] = &[author_from_channel_link, author_from_channel_name];

fn thumbnail_from_image(element: &ElementRef<'_>, s: &Selectors) -> Option<String> {
    let image = element.select(&s.image).next()?;
    ["src", "data-src", "data-thumb"]
        .iter()
        .find_map(|name| attr(&image, name))
}

fn duration_from_overlay(element: &ElementRef<'_>, s: &Selectors) -> Option<String> {
    element.select(&s.duration).find_map(|el| element_text(&el))
}

fn author_id_from_links(element: &ElementRef<'_>, s: &Selectors) -> Option<String> {
    element.select(&s.links).find_map(|a| {
        let href = a.value().attr("href")?;
        CHANNEL_HREF
            .captures(href)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    })
}

/// View count and published time from the metadata spans.
///
/// A span mentioning views is only ever a view count candidate; the first
/// candidate of each kind wins.
fn metadata(element: &ElementRef<'_>, s: &Selectors) -> (Option<String>, Option<String>) {
    let mut views = None;
    let mut published = None;

    for span in element.select(&s.meta_spans) {
        let Some(text) = element_text(&span) else {
            continue;
        };
        if text.contains("view") {
            views.get_or_insert(text);
        } else if text.contains("ago") {
            published.get_or_insert(text);
        }
    }

    (views, published)
}

/// Lift one item element. `None` when no identity can be recovered.
fn lift_element(element: &ElementRef<'_>, s: &Selectors) -> Option<ContentRecord> {
    let hrefs: Vec<&str> = element
        .select(&s.links)
        .filter_map(|a| a.value().attr("href"))
        .collect();
    let id = extract_from_links(hrefs.iter().copied())?;

    let mut record = ContentRecord::new(id);
    if let Some(title) = first_of(TITLE_RULES, element, s) {
        record.title = title;
    }
    if let Some(author) = first_of(AUTHOR_RULES, element, s) {
        record.author_name = author;
    }
    record.author_id = author_id_from_links(element, s);
    if let Some(thumbnail) = thumbnail_from_image(element, s) {
        record.thumbnail_url = thumbnail;
    }
    record.duration_text = duration_from_overlay(element, s);
    let (views, published) = metadata(element, s);
    record.view_count_text = views;
    record.published_time_text = published;

    Some(record)
}

fn ensure_markup(html: &str) -> Result<(), ExtractionError> {
    if html.trim().is_empty() {
        return Err(ExtractionError::NotMarkup("payload is empty".to_string()));
    }
    if !html.contains('<') {
        return Err(ExtractionError::NotMarkup(
            "payload contains no tags".to_string(),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy)]
enum ItemKind {
    Listing,
    Search,
}

/// Extracts records from public HTML pages.
pub struct HtmlExtractor {
    placeholders: Arc<dyn PlaceholderSource>,
}

impl HtmlExtractor {
    pub fn new(placeholders: Arc<dyn PlaceholderSource>) -> Self {
        Self { placeholders }
    }

    pub fn extract(&self, kind: PayloadKind, html: &str) -> Extraction {
        match kind {
            PayloadKind::Listing => self.extract_listing(html),
            PayloadKind::Search => self.extract_search(html),
            PayloadKind::Detail => self.extract_detail(html),
        }
    }

    /// Extract a listing page. Zero items is a legitimate empty result; only
    /// a total failure substitutes the listing placeholders.
    pub fn extract_listing(&self, html: &str) -> Extraction {
        match scan(html, ItemKind::Listing) {
            Ok(records) => Extraction::complete(records),
            Err(e) => {
                warn!("Listing page could not be parsed, using placeholders: {}", e);
                Extraction::placeholder(
                    normalize(self.placeholders.listing()),
                    PlaceholderReason::ParseFailure,
                )
            }
        }
    }

    /// Extract a search results page. An empty result always becomes the
    /// search placeholder; the status says whether parsing failed.
    pub fn extract_search(&self, html: &str) -> Extraction {
        match scan(html, ItemKind::Search) {
            Ok(records) if !records.is_empty() => Extraction::complete(records),
            Ok(_) => {
                debug!("Search page held no results, using placeholder");
                Extraction::placeholder(
                    normalize(self.placeholders.search()),
                    PlaceholderReason::NoResults,
                )
            }
            Err(e) => {
                warn!("Search page could not be parsed, using placeholder: {}", e);
                Extraction::placeholder(
                    normalize(self.placeholders.search()),
                    PlaceholderReason::ParseFailure,
                )
            }
        }
    }

    /// Extract a watch page: the embedded player response if present,
    /// otherwise the page's meta tags.
    pub fn extract_detail(&self, html: &str) -> Extraction {
        if let Err(e) = ensure_markup(html) {
            return Extraction::failed(e);
        }

        if let Some(record) = embedded_player_details(html) {
            return Extraction::complete(normalize(vec![record]));
        }

        let document = Html::parse_document(html);
        match meta_details(&document) {
            Ok(record) => Extraction::complete(normalize(record.into_iter().collect())),
            Err(e) => Extraction::failed(e),
        }
    }
}

fn scan(html: &str, kind: ItemKind) -> Result<Vec<ContentRecord>, ExtractionError> {
    ensure_markup(html)?;
    let selectors = Selectors::compile()?;
    let document = Html::parse_document(html);

    let items = match kind {
        ItemKind::Listing => &selectors.listing_items,
        ItemKind::Search => &selectors.search_items,
    };

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for element in document.select(items) {
        match lift_element(&element, &selectors) {
            Some(record) => records.push(record),
            None => {
                skipped += 1;
                trace!("Skipping {:?} item without a video link", kind);
            }
        }
    }

    debug!(
        "{:?} page: {} items, {} skipped",
        kind,
        records.len(),
        skipped
    );
    Ok(normalize(records))
}

/// Lift `videoDetails` from an inline `ytInitialPlayerResponse` assignment.
fn embedded_player_details(html: &str) -> Option<ContentRecord> {
    let start = PLAYER_RESPONSE.find(html)?.end();
    // The stream deserializer stops after the first complete value, so the
    // trailing script text is never parsed.
    let mut stream =
        serde_json::Deserializer::from_str(&html[start..]).into_iter::<serde_json::Value>();
    let response = match stream.next()? {
        Ok(value) => value,
        Err(e) => {
            debug!("Embedded player response is not valid JSON: {}", e);
            return None;
        }
    };
    value_at(&response, "videoDetails").and_then(lift_video_details)
}

fn meta_content(document: &Html, selector: &str) -> Result<Option<String>, ExtractionError> {
    let selector = compile(selector)?;
    Ok(document
        .select(&selector)
        .find_map(|el| attr(&el, "content").or_else(|| attr(&el, "href"))))
}

/// Fall back to Open Graph and microdata tags.
fn meta_details(document: &Html) -> Result<Option<ContentRecord>, ExtractionError> {
    let id = match meta_content(document, "meta[itemprop='videoId']")? {
        Some(id) => Some(id),
        None => meta_content(document, "link[rel='canonical'], meta[property='og:url']")?
            .and_then(|url| extract_video_id(&url)),
    };
    let Some(id) = id else {
        debug!("Watch page carries no video identity");
        return Ok(None);
    };

    let mut record = ContentRecord::new(id);
    if let Some(title) = meta_content(document, "meta[property='og:title'], meta[name='title']")? {
        record.title = title;
    }
    if let Some(author) = meta_content(document, "span[itemprop='author'] link[itemprop='name']")? {
        record.author_name = author;
    }
    record.author_id = meta_content(document, "meta[itemprop='channelId']")?;
    if let Some(thumbnail) = meta_content(document, "meta[property='og:image']")? {
        record.thumbnail_url = thumbnail;
    }
    record.view_count_text = meta_content(document, "meta[itemprop='interactionCount']")?
        .map(|n| format!("{} views", n));

    Ok(Some(record))
}
