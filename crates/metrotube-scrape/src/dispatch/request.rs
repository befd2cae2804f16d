//! Request construction for both channels.

use std::collections::BTreeMap;

use metrotube::config::{ClientIdentity, Settings};
use metrotube::models::Operation;
use metrotube::session::{Channel, HeaderProfile, SessionState};
use serde::Serialize;

/// Per-call request context. Built fresh for every fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub client: ClientIdentity,
    pub headers: BTreeMap<String, String>,
    pub operation: &'static str,
    pub channel: Channel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    Get,
    Post,
}

/// A fully resolved request, ready for a [`Transport`](super::Transport).
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    pub method: RequestMethod,
    pub url: String,
    pub body: Option<InternalRequestBody>,
    pub context: RequestContext,
}

impl PreparedRequest {
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.context.headers
    }

    pub fn channel(&self) -> Channel {
        self.context.channel
    }
}

/// JSON body posted to the internal API.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalRequestBody {
    pub context: InternalContext,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browse_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InternalContext {
    pub client: ClientBlock,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientBlock {
    pub client_name: String,
    pub client_version: String,
    pub client_id: String,
    pub user_agent: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visitor_data: Option<String>,
}

/// Base URLs and key for both channels, taken from settings.
#[derive(Debug, Clone)]
pub(crate) struct Endpoints {
    internal_base: String,
    public_base: String,
    api_key: String,
}

impl From<&Settings> for Endpoints {
    fn from(settings: &Settings) -> Self {
        Self {
            internal_base: settings.internal_base_url.trim_end_matches('/').to_string(),
            public_base: settings.public_base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
        }
    }
}

/// Internal API endpoint name and the operation-specific body fields.
struct InternalRoute {
    endpoint: &'static str,
    browse_id: Option<String>,
    query: Option<String>,
    video_id: Option<String>,
}

impl InternalRoute {
    fn browse(browse_id: Option<String>) -> Self {
        Self {
            endpoint: "browse",
            browse_id,
            query: None,
            video_id: None,
        }
    }

    fn for_operation(operation: &Operation) -> Self {
        match operation {
            Operation::Home => Self::browse(None),
            Operation::Recommendations => Self::browse(Some("FEmusic_home".to_string())),
            Operation::Library => Self::browse(Some("FEmusic_library_landing".to_string())),
            Operation::Playlist { playlist_id } => {
                Self::browse(Some(format!("VL{}", playlist_id)))
            }
            Operation::Channel { channel_id } => Self::browse(Some(channel_id.clone())),
            Operation::Search { query } => Self {
                endpoint: "search",
                browse_id: None,
                query: Some(query.clone()),
                video_id: None,
            },
            Operation::VideoDetail { video_id } => Self {
                endpoint: "player",
                browse_id: None,
                query: None,
                video_id: Some(video_id.clone()),
            },
            Operation::Related { video_id } => Self {
                endpoint: "next",
                browse_id: None,
                query: None,
                video_id: Some(video_id.clone()),
            },
        }
    }
}

impl Endpoints {
    /// Build the internal API POST for an operation.
    pub(crate) fn internal(
        &self,
        operation: &Operation,
        session: &SessionState,
        client: &ClientIdentity,
        profile: &HeaderProfile,
    ) -> PreparedRequest {
        let route = InternalRoute::for_operation(operation);
        let url = format!(
            "{}/{}?key={}",
            self.internal_base,
            route.endpoint,
            urlencoding::encode(&self.api_key)
        );

        let body = InternalRequestBody {
            context: InternalContext {
                client: ClientBlock {
                    client_name: client.name.clone(),
                    client_version: client.version.clone(),
                    client_id: client.id.clone(),
                    user_agent: profile.user_agent.clone(),
                    visitor_data: session.visitor_data().map(str::to_string),
                },
            },
            browse_id: route.browse_id,
            query: route.query,
            video_id: route.video_id,
        };

        PreparedRequest {
            method: RequestMethod::Post,
            url,
            body: Some(body),
            context: RequestContext {
                client: client.clone(),
                headers: session.headers_for_channel(Channel::Internal, profile),
                operation: operation.name(),
                channel: Channel::Internal,
            },
        }
    }

    /// Build the public page GET for an operation, if it has one.
    pub(crate) fn public(
        &self,
        operation: &Operation,
        session: &SessionState,
        client: &ClientIdentity,
        profile: &HeaderProfile,
    ) -> Option<PreparedRequest> {
        let path = public_path(operation)?;

        Some(PreparedRequest {
            method: RequestMethod::Get,
            url: format!("{}{}", self.public_base, path),
            body: None,
            context: RequestContext {
                client: client.clone(),
                headers: session.headers_for_channel(Channel::Public, profile),
                operation: operation.name(),
                channel: Channel::Public,
            },
        })
    }
}

/// Path and query of the public page for an operation.
fn public_path(operation: &Operation) -> Option<String> {
    let path = match operation {
        Operation::Home => "/".to_string(),
        Operation::Recommendations => "/feed/trending".to_string(),
        Operation::Search { query } => {
            format!("/results?search_query={}", urlencoding::encode(query))
        }
        Operation::VideoDetail { video_id } | Operation::Related { video_id } => {
            format!("/watch?v={}", urlencoding::encode(video_id))
        }
        Operation::Playlist { playlist_id } => {
            format!("/playlist?list={}", urlencoding::encode(playlist_id))
        }
        Operation::Channel { channel_id } => {
            format!("/channel/{}", urlencoding::encode(channel_id))
        }
        Operation::Library => return None,
    };
    Some(path)
}
