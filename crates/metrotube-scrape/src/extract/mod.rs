//! Payload extraction.
//!
//! Internal API payloads are JSON trees handled by [`json::JsonExtractor`];
//! public pages are HTML documents handled by [`html::HtmlExtractor`]. Both
//! produce an [`Extraction`] whose status tells a legitimately empty result
//! apart from a placeholder substitution or a failure.

pub mod html;
pub mod json;
pub mod placeholder;
pub mod video_id;

pub use html::HtmlExtractor;
pub use json::JsonExtractor;
pub use placeholder::{BuiltinPlaceholders, PlaceholderSource};
pub use video_id::{extract_video_id, IdPattern};

use metrotube::models::{ContentRecord, Operation};
use thiserror::Error;

/// Errors that abort a whole extraction pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("failed to parse JSON payload: {0}")]
    Parse(String),

    #[error("payload is not an HTML document: {0}")]
    NotMarkup(String),

    #[error("invalid selector '{selector}': {reason}")]
    Selector { selector: String, reason: String },
}

/// Why placeholder records were substituted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderReason {
    /// The page parsed but held no items.
    NoResults,
    /// The page could not be parsed.
    ParseFailure,
}

/// How an extraction pass ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionStatus {
    /// Records came from the payload (possibly none).
    Complete,
    /// Records are a fixed placeholder set.
    Placeholder(PlaceholderReason),
    /// Nothing could be extracted.
    Failed(ExtractionError),
}

impl ExtractionStatus {
    /// Short label for display and JSON output.
    pub fn label(&self) -> &'static str {
        match self {
            ExtractionStatus::Complete => "complete",
            ExtractionStatus::Placeholder(PlaceholderReason::NoResults) => "placeholder:no-results",
            ExtractionStatus::Placeholder(PlaceholderReason::ParseFailure) => {
                "placeholder:parse-failure"
            }
            ExtractionStatus::Failed(_) => "failed",
        }
    }
}

/// Records plus the status of the pass that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub records: Vec<ContentRecord>,
    pub status: ExtractionStatus,
}

impl Extraction {
    pub fn complete(records: Vec<ContentRecord>) -> Self {
        Self {
            records,
            status: ExtractionStatus::Complete,
        }
    }

    pub fn placeholder(records: Vec<ContentRecord>, reason: PlaceholderReason) -> Self {
        Self {
            records,
            status: ExtractionStatus::Placeholder(reason),
        }
    }

    pub fn failed(error: ExtractionError) -> Self {
        Self {
            records: Vec::new(),
            status: ExtractionStatus::Failed(error),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, ExtractionStatus::Failed(_))
    }
}

/// Shape of the payload an operation returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    /// A feed or list of videos.
    Listing,
    /// Search results.
    Search,
    /// A single video page.
    Detail,
}

impl PayloadKind {
    pub fn for_operation(operation: &Operation) -> Self {
        match operation {
            Operation::Search { .. } => PayloadKind::Search,
            Operation::VideoDetail { .. } => PayloadKind::Detail,
            Operation::Home
            | Operation::Recommendations
            | Operation::Library
            | Operation::Playlist { .. }
            | Operation::Related { .. }
            | Operation::Channel { .. } => PayloadKind::Listing,
        }
    }
}
