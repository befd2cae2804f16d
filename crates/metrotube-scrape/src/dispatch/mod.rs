//! Dual-channel request dispatch.
//!
//! A valid session routes every operation through the internal JSON API.
//! Anything else goes to the public pages, except for operations that have
//! no public equivalent, which fail without touching the network. The
//! decision is made once per call and never retried on the other channel.

mod request;

pub use request::{
    ClientBlock, InternalContext, InternalRequestBody, PreparedRequest, RequestContext,
    RequestMethod,
};

use std::sync::Arc;

use async_trait::async_trait;
use metrotube::config::{ClientIdentity, Settings};
use metrotube::http_client::{HttpClient, HttpError};
use metrotube::models::Operation;
use metrotube::session::{Channel, HeaderProfile, SessionState};
use thiserror::Error;
use tracing::{debug, warn};

use request::Endpoints;

/// Why a transport could not deliver a usable body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportFailure {
    #[error("HTTP status {0}")]
    Status(u16),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("failed to read response body: {0}")]
    Body(String),
}

impl From<HttpError> for TransportFailure {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Timeout(e) => TransportFailure::Timeout(e.to_string()),
            other => TransportFailure::Network(other.to_string()),
        }
    }
}

/// Successful transport response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// Executes prepared requests.
///
/// Implementations must treat a non-2xx status as a failure.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: &PreparedRequest)
        -> Result<TransportResponse, TransportFailure>;
}

#[async_trait]
impl Transport for HttpClient {
    async fn execute(
        &self,
        request: &PreparedRequest,
    ) -> Result<TransportResponse, TransportFailure> {
        let response = match (&request.method, &request.body) {
            (RequestMethod::Post, Some(body)) => {
                self.post_json_with_headers(&request.url, body, request.headers())
                    .await?
            }
            (RequestMethod::Post, None) => {
                self.post_json_with_headers(&request.url, &serde_json::json!({}), request.headers())
                    .await?
            }
            (RequestMethod::Get, _) => self.get_with_headers(&request.url, request.headers()).await?,
        };

        let status = response.status.as_u16();
        if !response.is_success() {
            return Err(TransportFailure::Status(status));
        }
        debug!(
            "{} response content type: {}",
            request.context.operation,
            response.content_type().unwrap_or("unknown")
        );

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                TransportFailure::Timeout(e.to_string())
            } else {
                TransportFailure::Body(e.to_string())
            }
        })?;

        Ok(TransportResponse { status, body })
    }
}

/// Errors from [`Dispatcher::fetch`].
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{operation} requires an authenticated session")]
    AuthenticationRequired { operation: &'static str },

    #[error("{operation} request over {channel} channel failed: {reason}")]
    Transport {
        operation: &'static str,
        channel: Channel,
        #[source]
        reason: TransportFailure,
    },
}

/// Raw response body tagged with the channel it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPayload {
    pub operation: Operation,
    pub channel: Channel,
    pub status: u16,
    pub body: String,
}

/// Routes operations to the internal or public channel.
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    endpoints: Endpoints,
    client: ClientIdentity,
    profile: HeaderProfile,
}

impl Dispatcher {
    /// Create a dispatcher over an explicit transport.
    pub fn new(settings: &Settings, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            endpoints: Endpoints::from(settings),
            client: settings.client.clone(),
            profile: HeaderProfile::from(settings),
        }
    }

    /// Create a dispatcher backed by an [`HttpClient`] built from settings.
    pub fn from_settings(settings: &Settings) -> Result<Self, HttpError> {
        let client = HttpClient::from_settings(settings)?;
        Ok(Self::new(settings, Arc::new(client)))
    }

    /// Decide the channel and build the request without sending it.
    pub fn plan(
        &self,
        operation: &Operation,
        session: &SessionState,
    ) -> Result<PreparedRequest, FetchError> {
        if session.is_valid() && operation.has_internal_channel() {
            return Ok(self
                .endpoints
                .internal(operation, session, &self.client, &self.profile));
        }

        if !operation.has_public_channel() {
            debug!("{} has no public page and the session is not valid", operation);
            return Err(FetchError::AuthenticationRequired {
                operation: operation.name(),
            });
        }

        self.endpoints
            .public(operation, session, &self.client, &self.profile)
            .ok_or(FetchError::AuthenticationRequired {
                operation: operation.name(),
            })
    }

    /// Route and execute one request.
    pub async fn fetch(
        &self,
        operation: &Operation,
        session: &SessionState,
    ) -> Result<RawPayload, FetchError> {
        let request = self.plan(operation, session)?;
        let channel = request.channel();
        debug!("{} -> {} channel: {}", operation, channel, request.url);

        match self.transport.execute(&request).await {
            Ok(response) => {
                debug!(
                    "{} returned {} bytes (status {})",
                    operation,
                    response.body.len(),
                    response.status
                );
                Ok(RawPayload {
                    operation: operation.clone(),
                    channel,
                    status: response.status,
                    body: response.body,
                })
            }
            Err(reason) => {
                warn!("{} request over {} channel failed: {}", operation, channel, reason);
                Err(FetchError::Transport {
                    operation: operation.name(),
                    channel,
                    reason,
                })
            }
        }
    }
}
