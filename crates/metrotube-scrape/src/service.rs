//! Feed service: fetch, extract and normalize in one call.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use metrotube::config::Settings;
use metrotube::http_client::HttpError;
use metrotube::models::{ContentRecord, Operation};
use metrotube::session::{Channel, SessionState};
use thiserror::Error;
use tracing::{info, warn};

use crate::dispatch::{Dispatcher, FetchError, Transport, TransportFailure};
use crate::extract::{
    BuiltinPlaceholders, Extraction, ExtractionError, ExtractionStatus, HtmlExtractor,
    JsonExtractor, PayloadKind, PlaceholderReason, PlaceholderSource,
};
use crate::normalize::{apply_session_flags, normalize};

/// Errors returned by [`ContentService::load`].
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("{operation} request over {channel} channel failed: {reason}")]
    Transport {
        operation: &'static str,
        channel: Channel,
        #[source]
        reason: TransportFailure,
    },

    #[error("{operation} requires an authenticated session")]
    AuthenticationRequired { operation: &'static str },

    #[error("failed to extract {operation} content: {source}")]
    ExtractionFailed {
        operation: &'static str,
        #[source]
        source: ExtractionError,
    },
}

impl From<FetchError> for FeedError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::AuthenticationRequired { operation } => {
                FeedError::AuthenticationRequired { operation }
            }
            FetchError::Transport {
                operation,
                channel,
                reason,
            } => FeedError::Transport {
                operation,
                channel,
                reason,
            },
        }
    }
}

/// What to do when an internal API payload cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFailurePolicy {
    /// Report [`FeedError::ExtractionFailed`].
    #[default]
    Surface,
    /// Substitute the placeholder set for the operation.
    Substitute,
}

impl From<&Settings> for JsonFailurePolicy {
    fn from(settings: &Settings) -> Self {
        if settings.substitute_on_json_failure {
            JsonFailurePolicy::Substitute
        } else {
            JsonFailurePolicy::Surface
        }
    }
}

/// Result of one [`ContentService::load`] call.
#[derive(Debug, Clone)]
pub struct ContentPage {
    pub operation: Operation,
    pub channel: Channel,
    pub records: Vec<ContentRecord>,
    pub status: ExtractionStatus,
    pub fetched_at: DateTime<Utc>,
}

impl ContentPage {
    pub fn is_placeholder(&self) -> bool {
        matches!(self.status, ExtractionStatus::Placeholder(_))
    }
}

/// Loads content for operations on behalf of a caller-owned session.
pub struct ContentService {
    dispatcher: Dispatcher,
    json: JsonExtractor,
    html: HtmlExtractor,
    placeholders: Arc<dyn PlaceholderSource>,
    json_failure: JsonFailurePolicy,
}

impl ContentService {
    /// Create a service over an explicit transport.
    pub fn new(settings: &Settings, transport: Arc<dyn Transport>) -> Self {
        let placeholders: Arc<dyn PlaceholderSource> = Arc::new(BuiltinPlaceholders);
        Self {
            dispatcher: Dispatcher::new(settings, transport),
            json: JsonExtractor::new(settings.max_json_depth),
            html: HtmlExtractor::new(placeholders.clone()),
            placeholders,
            json_failure: JsonFailurePolicy::from(settings),
        }
    }

    /// Create a service backed by an HTTP client built from settings.
    pub fn from_settings(settings: &Settings) -> Result<Self, HttpError> {
        let client = metrotube::http_client::HttpClient::from_settings(settings)?;
        Ok(Self::new(settings, Arc::new(client)))
    }

    /// Replace the placeholder source.
    pub fn with_placeholders(mut self, placeholders: Arc<dyn PlaceholderSource>) -> Self {
        self.html = HtmlExtractor::new(placeholders.clone());
        self.placeholders = placeholders;
        self
    }

    /// Set the policy for unparseable internal API payloads.
    pub fn with_json_failure_policy(mut self, policy: JsonFailurePolicy) -> Self {
        self.json_failure = policy;
        self
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Fetch and extract the content for one operation.
    pub async fn load(
        &self,
        operation: &Operation,
        session: &SessionState,
    ) -> Result<ContentPage, FeedError> {
        let payload = self.dispatcher.fetch(operation, session).await?;
        let kind = PayloadKind::for_operation(operation);

        let extraction = match payload.channel {
            Channel::Internal => self.json.extract(kind, &payload.body),
            Channel::Public => self.html.extract(kind, &payload.body),
        };
        let Extraction {
            mut records,
            mut status,
        } = extraction;

        if let ExtractionStatus::Failed(source) = status {
            match (self.json_failure, payload.channel, kind) {
                (JsonFailurePolicy::Substitute, Channel::Internal, PayloadKind::Listing) => {
                    warn!("{} payload unusable ({}), using placeholders", operation, source);
                    records = normalize(self.placeholders.listing());
                }
                (JsonFailurePolicy::Substitute, Channel::Internal, PayloadKind::Search) => {
                    warn!("{} payload unusable ({}), using placeholder", operation, source);
                    records = normalize(self.placeholders.search());
                }
                _ => {
                    return Err(FeedError::ExtractionFailed {
                        operation: operation.name(),
                        source,
                    });
                }
            }
            status = ExtractionStatus::Placeholder(PlaceholderReason::ParseFailure);
        }

        apply_session_flags(&mut records, session.is_authenticated());
        info!(
            "{} over {} channel: {} records ({})",
            operation,
            payload.channel,
            records.len(),
            status.label()
        );

        Ok(ContentPage {
            operation: operation.clone(),
            channel: payload.channel,
            records,
            status,
            fetched_at: Utc::now(),
        })
    }
}
