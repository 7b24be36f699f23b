//! Jellyfin/Emby API client
//!
//! Both servers speak the MediaBrowser API. The notifier only needs two calls:
//! an unauthenticated `GET /System/Ping` and an authenticated
//! `POST /Library/Refresh`. Response bodies are returned as text and never parsed.

use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method};
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Client name reported to the media server in the authorization header
pub const CLIENT_NAME: &str = "NZBGet";

pub const PING_PATH: &str = "System/Ping";
pub const REFRESH_PATH: &str = "Library/Refresh";

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("invalid endpoint {path}: {source}")]
    Endpoint {
        path: &'static str,
        #[source]
        source: url::ParseError,
    },

    #[error("{0}")]
    Request(#[from] reqwest::Error),
}

/// Media server API client
pub struct MediaServerClient {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl MediaServerClient {
    /// Create a client for `base_url`. `None` disables the request timeout.
    pub fn new(
        base_url: Url,
        api_key: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, NotifyError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(NotifyError::Client)?;

        Ok(Self {
            client,
            base_url,
            api_key: api_key.into(),
        })
    }

    /// Check the server is reachable. Returns the raw response body.
    pub async fn ping(&self) -> Result<String, NotifyError> {
        let url = self.endpoint(PING_PATH)?;
        debug!("REQUEST URL: {}", url);

        self.send(self.client.get(url)).await
    }

    /// Ask the server to rescan all libraries. Returns the raw response body.
    pub async fn refresh_library(&self) -> Result<String, NotifyError> {
        let url = self.endpoint(REFRESH_PATH)?;
        debug!("REQUEST URL: {}", url);
        debug!("HEADERS: {{'Authorization': '{}'}}", masked_authorization());

        let request = self
            .client
            .request(Method::POST, url)
            .header(AUTHORIZATION, self.authorization_header());

        self.send(request).await
    }

    /// `MediaBrowser Client="NZBGet", Token="{api_key}"`
    pub fn authorization_header(&self) -> String {
        authorization_value(&self.api_key)
    }

    fn endpoint(&self, path: &'static str) -> Result<Url, NotifyError> {
        self.base_url
            .join(path)
            .map_err(|source| NotifyError::Endpoint { path, source })
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<String, NotifyError> {
        let response = request.send().await?.error_for_status()?;
        let status = response.status();
        let body = response.text().await?;

        debug!(status = %status, bytes = body.len(), "Media server responded");
        Ok(body)
    }
}

fn authorization_value(token: &str) -> String {
    format!("MediaBrowser Client=\"{}\", Token=\"{}\"", CLIENT_NAME, token)
}

fn masked_authorization() -> String {
    authorization_value("***")
}
