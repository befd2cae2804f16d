//! Request dispatch, payload extraction and normalization for metrotube.
//!
//! [`ContentService`] ties the pieces together: the [`Dispatcher`] routes an
//! operation over the internal or public channel, the extractors in
//! [`extract`] turn the raw payload into records, and [`normalize`] cleans
//! them up.

pub mod dispatch;
pub mod extract;
pub mod normalize;
pub mod service;

pub use dispatch::{
    Dispatcher, FetchError, PreparedRequest, RawPayload, RequestContext, RequestMethod, Transport,
    TransportFailure, TransportResponse,
};
pub use extract::{
    BuiltinPlaceholders, Extraction, ExtractionError, ExtractionStatus, PayloadKind,
    PlaceholderReason, PlaceholderSource,
};
pub use service::{ContentPage, ContentService, FeedError, JsonFailurePolicy};

// Re-export the core crate's client so callers need only one import path.
pub use metrotube::http_client::HttpClient;
