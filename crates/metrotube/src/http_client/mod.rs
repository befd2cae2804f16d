//! HTTP client with bounded timeouts and explicit per-request headers.
//!
//! Every request carries the headers resolved for its channel; the client
//! itself holds no cookies or session state so concurrent calls with
//! different sessions never leak credentials into each other.

mod response;
mod user_agent;

pub use response::HttpResponse;
pub use user_agent::{resolve_user_agent, rotating_user_agent, DEFAULT_USER_AGENT, ROTATE_KEYWORD};

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use reqwest::Client;
use tracing::debug;

use crate::config::Settings;

/// Errors raised by [`HttpClient`].
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("Failed to create HTTP client: {0}")]
    Build(String),

    #[error("Request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    #[error("HTTP request failed: {0}")]
    Request(#[source] reqwest::Error),
}

impl From<reqwest::Error> for HttpError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            HttpError::Timeout(err)
        } else {
            HttpError::Request(err)
        }
    }
}

/// Builder for constructing `HttpClient`.
pub struct HttpClientBuilder {
    timeout: Duration,
    connect_timeout: Duration,
    user_agent: Option<String>,
}

impl HttpClientBuilder {
    /// Set the fallback user agent for requests that do not send their own.
    pub fn user_agent(mut self, ua: &str) -> Self {
        self.user_agent = Some(ua.to_string());
        self
    }

    /// Set the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Build the `HttpClient`.
    pub fn build(self) -> Result<HttpClient, HttpError> {
        let user_agent = resolve_user_agent(self.user_agent.as_deref());

        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;

        Ok(HttpClient { client })
    }
}

/// Thin wrapper around `reqwest::Client`.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a builder with the whole-request timeout.
    pub fn builder(timeout: Duration) -> HttpClientBuilder {
        HttpClientBuilder {
            timeout,
            connect_timeout: timeout,
            user_agent: None,
        }
    }

    /// Create a client from application settings.
    pub fn from_settings(settings: &Settings) -> Result<Self, HttpError> {
        Self::builder(settings.request_timeout())
            .connect_timeout(settings.connect_timeout())
            .user_agent(&settings.user_agent)
            .build()
    }

    /// GET request with explicit headers.
    pub async fn get_with_headers(
        &self,
        url: &str,
        headers: &BTreeMap<String, String>,
    ) -> Result<HttpResponse, HttpError> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(name, value);
        }

        let start = Instant::now();
        let response = request.send().await?;
        debug!(
            "GET {} -> {} in {:?}",
            url,
            response.status(),
            start.elapsed()
        );

        Ok(HttpResponse::from_reqwest(response))
    }

    /// POST a JSON body with explicit headers.
    pub async fn post_json_with_headers<T: serde::Serialize + ?Sized>(
        &self,
        url: &str,
        json: &T,
        headers: &BTreeMap<String, String>,
    ) -> Result<HttpResponse, HttpError> {
        let mut request = self.client.post(url);
        for (name, value) in headers {
            request = request.header(name, value);
        }
        // After the headers so an explicit Content-Type is not duplicated.
        let request = request.json(json);

        let start = Instant::now();
        let response = request.send().await?;
        debug!(
            "POST {} -> {} in {:?}",
            url,
            response.status(),
            start.elapsed()
        );

        Ok(HttpResponse::from_reqwest(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_from_default_settings() {
        assert!(HttpClient::from_settings(&Settings::default()).is_ok());
    }

    #[test]
    fn test_http_error_display() {
        let err = HttpError::Build("bad proxy".to_string());
        assert!(err.to_string().contains("Failed to create HTTP client"));
    }
}
