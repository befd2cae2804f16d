//! Session credentials and channel selection.
//!
//! The session is owned by an external credential collaborator which fills it
//! in field by field. This crate only reads it: [`SessionState::is_valid`]
//! decides which channel a request takes and
//! [`SessionState::headers_for_channel`] resolves the headers sent with it.
//! Authentication is never stored as a flag; it is always recomputed from the
//! credential fields.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::http_client::resolve_user_agent;

pub const HEADER_USER_AGENT: &str = "User-Agent";
pub const HEADER_ACCEPT_LANGUAGE: &str = "Accept-Language";
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const HEADER_COOKIE: &str = "Cookie";
pub const HEADER_VISITOR_ID: &str = "X-Goog-Visitor-Id";
pub const HEADER_AUTHORIZATION: &str = "Authorization";

/// Which request channel an operation is routed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Authenticated internal JSON API.
    Internal,
    /// Anonymous public HTML pages.
    Public,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Internal => write!(f, "internal"),
            Channel::Public => write!(f, "public"),
        }
    }
}

/// Fixed header values sent on every request regardless of session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderProfile {
    pub user_agent: String,
    pub accept_language: String,
}

impl From<&Settings> for HeaderProfile {
    fn from(settings: &Settings) -> Self {
        Self {
            user_agent: resolve_user_agent(Some(&settings.user_agent)),
            accept_language: settings.accept_language.clone(),
        }
    }
}

impl Default for HeaderProfile {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

/// Informational account details captured alongside the credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: Option<String>,
    pub email: Option<String>,
    pub channel_handle: Option<String>,
    pub uses_advanced_token: bool,
}

/// Session credentials for the internal API channel.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionState {
    visitor_data: Option<String>,
    data_sync_id: Option<String>,
    cookies: Option<String>,
    advanced_token: Option<String>,
    account_name: Option<String>,
    account_email: Option<String>,
    channel_handle: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn non_blank(value: impl Into<String>) -> Option<String> {
    let value = value.into();
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

impl SessionState {
    /// Create an empty (anonymous) session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the stored credentials are sufficient for the internal API.
    ///
    /// Either an advanced token, or both cookies and visitor data.
    pub fn is_valid(&self) -> bool {
        present(&self.advanced_token).is_some()
            || (present(&self.cookies).is_some() && present(&self.visitor_data).is_some())
    }

    /// Authentication status, derived from [`is_valid`](Self::is_valid) only.
    pub fn is_authenticated(&self) -> bool {
        self.is_valid()
    }

    /// The channel requests are routed through for this session.
    pub fn channel(&self) -> Channel {
        if self.is_valid() {
            Channel::Internal
        } else {
            Channel::Public
        }
    }

    /// Resolve the request headers for a channel.
    ///
    /// User-Agent and Accept-Language are always present, even for an empty
    /// session. Credentials are only attached to the internal channel.
    pub fn headers_for_channel(
        &self,
        channel: Channel,
        profile: &HeaderProfile,
    ) -> BTreeMap<String, String> {
        let mut headers = BTreeMap::new();
        headers.insert(HEADER_USER_AGENT.to_string(), profile.user_agent.clone());
        headers.insert(
            HEADER_ACCEPT_LANGUAGE.to_string(),
            profile.accept_language.clone(),
        );

        if channel == Channel::Public {
            return headers;
        }

        headers.insert(
            HEADER_CONTENT_TYPE.to_string(),
            "application/json".to_string(),
        );
        if let Some(cookies) = present(&self.cookies) {
            headers.insert(HEADER_COOKIE.to_string(), cookies.to_string());
        }
        if let Some(visitor) = present(&self.visitor_data) {
            headers.insert(HEADER_VISITOR_ID.to_string(), visitor.to_string());
        }
        if let Some(token) = present(&self.advanced_token) {
            headers.insert(HEADER_AUTHORIZATION.to_string(), format!("Bearer {}", token));
        }

        headers
    }

    /// Forget every credential and account field.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Account details, only for a valid session.
    pub fn profile(&self) -> Option<UserProfile> {
        if !self.is_valid() {
            return None;
        }
        Some(UserProfile {
            name: self.account_name.clone(),
            email: self.account_email.clone(),
            channel_handle: self.channel_handle.clone(),
            uses_advanced_token: present(&self.advanced_token).is_some(),
        })
    }

    pub fn visitor_data(&self) -> Option<&str> {
        present(&self.visitor_data)
    }

    pub fn set_visitor_data(&mut self, value: impl Into<String>) {
        self.visitor_data = non_blank(value);
    }

    pub fn data_sync_id(&self) -> Option<&str> {
        present(&self.data_sync_id)
    }

    pub fn set_data_sync_id(&mut self, value: impl Into<String>) {
        self.data_sync_id = non_blank(value);
    }

    pub fn cookies(&self) -> Option<&str> {
        present(&self.cookies)
    }

    pub fn set_cookies(&mut self, value: impl Into<String>) {
        self.cookies = non_blank(value);
    }

    pub fn advanced_token(&self) -> Option<&str> {
        present(&self.advanced_token)
    }

    pub fn set_advanced_token(&mut self, value: impl Into<String>) {
        self.advanced_token = non_blank(value);
    }

    pub fn account_name(&self) -> Option<&str> {
        present(&self.account_name)
    }

    pub fn account_email(&self) -> Option<&str> {
        present(&self.account_email)
    }

    pub fn channel_handle(&self) -> Option<&str> {
        present(&self.channel_handle)
    }

    /// Store account details. `None` leaves the existing value untouched.
    pub fn set_account_info(
        &mut self,
        name: Option<String>,
        email: Option<String>,
        channel_handle: Option<String>,
    ) {
        if let Some(name) = name {
            self.account_name = non_blank(name);
        }
        if let Some(email) = email {
            self.account_email = non_blank(email);
        }
        if let Some(handle) = channel_handle {
            self.channel_handle = non_blank(handle);
        }
    }
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &Option<String>| present(v).map(|s| format!("<{} bytes>", s.len()));
        f.debug_struct("SessionState")
            .field("valid", &self.is_valid())
            .field("visitor_data", &self.visitor_data)
            .field("data_sync_id", &self.data_sync_id)
            .field("cookies", &redact(&self.cookies))
            .field("advanced_token", &redact(&self.advanced_token))
            .field("account_name", &self.account_name)
            .finish()
    }
}
