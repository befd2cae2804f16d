//! Application settings.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::http_client::DEFAULT_USER_AGENT;

/// Deepest nesting the JSON parser accepts; deeper documents fail to parse
/// before the walk starts.
pub const JSON_PARSE_DEPTH_LIMIT: usize = 128;

/// Client identity embedded in every internal API request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientIdentity {
    pub name: String,
    pub version: String,
    pub id: String,
}

impl Default for ClientIdentity {
    fn default() -> Self {
        Self {
            name: "WEB_REMIX".to_string(),
            version: "1.20250310.01.00".to_string(),
            id: "67".to_string(),
        }
    }
}

/// Application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the internal API; the endpoint name is appended.
    pub internal_base_url: String,
    /// Base URL of the public web surface.
    pub public_base_url: String,
    /// API key sent as the `key` query parameter on internal requests.
    pub api_key: String,
    /// Client identity for the internal API context block.
    pub client: ClientIdentity,
    /// User agent for both channels.
    pub user_agent: String,
    /// Accept-Language header value.
    pub accept_language: String,
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Maximum nesting depth followed by the JSON tree walk, at most
    /// [`JSON_PARSE_DEPTH_LIMIT`].
    pub max_json_depth: usize,
    /// Replace an unparseable internal API payload with placeholder records
    /// instead of reporting the failure.
    pub substitute_on_json_failure: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            internal_base_url: "https://music.youtube.com/youtubei/v1".to_string(),
            public_base_url: "https://www.youtube.com".to_string(),
            api_key: "AIzaSyC9XL3ZjWddXya6X74dJoCTL-WGJF9ZnMlY".to_string(),
            client: ClientIdentity::default(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
            connect_timeout_secs: 15,
            request_timeout_secs: 30,
            max_json_depth: JSON_PARSE_DEPTH_LIMIT,
            substitute_on_json_failure: false,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let settings: Settings = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Apply `METROTUBE_*` environment variable overrides.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup. Empty values are ignored.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("METROTUBE_INTERNAL_BASE_URL") {
            self.internal_base_url = v;
        }
        if let Some(v) = get("METROTUBE_PUBLIC_BASE_URL") {
            self.public_base_url = v;
        }
        if let Some(v) = get("METROTUBE_API_KEY") {
            self.api_key = v;
        }
        if let Some(v) = get("METROTUBE_USER_AGENT") {
            self.user_agent = v;
        }
        if let Some(v) = get("METROTUBE_ACCEPT_LANGUAGE") {
            self.accept_language = v;
        }
        if let Some(v) = get("METROTUBE_CONNECT_TIMEOUT").and_then(|v| v.parse().ok()) {
            self.connect_timeout_secs = v;
        }
        if let Some(v) = get("METROTUBE_REQUEST_TIMEOUT").and_then(|v| v.parse().ok()) {
            self.request_timeout_secs = v;
        }
        if let Some(v) = get("METROTUBE_MAX_JSON_DEPTH").and_then(|v| v.parse().ok()) {
            self.max_json_depth = v;
        }
        if let Some(v) = get("METROTUBE_SUBSTITUTE_ON_JSON_FAILURE") {
            self.substitute_on_json_failure = matches!(v.as_str(), "1" | "true" | "yes");
        }

        self
    }

    /// Check that URLs parse and limits are non-zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("internal_base_url", &self.internal_base_url),
            ("public_base_url", &self.public_base_url),
        ] {
            url::Url::parse(value)
                .map_err(|e| ConfigError::Invalid(format!("{} '{}': {}", name, value, e)))?;
        }

        if self.connect_timeout_secs == 0 || self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "timeouts must be at least one second".to_string(),
            ));
        }
        if self.max_json_depth == 0 || self.max_json_depth > JSON_PARSE_DEPTH_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "max_json_depth must be between 1 and {}",
                JSON_PARSE_DEPTH_LIMIT
            )));
        }

        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
