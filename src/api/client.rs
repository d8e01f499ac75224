// Biblio - Mobile Library Client
// Copyright (C) 2025 Biblio contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! HTTP client for the library backend
//!
//! `BiblioClient` wraps `reqwest::Client` and implements the two cross-cutting
//! policies of the transport boundary, once, for every endpoint:
//!
//! - each outgoing request carries `Authorization: Bearer <token>` when a
//!   token is currently persisted; no token sends the request unauthenticated
//! - each 401 response clears the persisted token and demotes the session to
//!   inactive, regardless of which call site issued the request
//!
//! There is no retry and no backoff: a failed request surfaces immediately to
//! its caller. Endpoints may answer JSON or a bare text confirmation, so the
//! client exposes both typed (`request_json`) and shape-agnostic
//! (`request_body`) entry points.

use crate::error::{BiblioError, Result};
use crate::state::session::SessionHandle;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, Method, Response, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default backend base URL (development deployment)
const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Configuration for BiblioClient
/// Provides a builder pattern for client customization
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: "Biblio/0.1.0 (biblio-core)".to_string(),
        }
    }
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }
}

/// Builder for ClientConfig
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
        }
    }

    pub fn base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}

impl Default for ClientConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A response body that may be JSON or a bare text confirmation.
///
/// The borrow/return endpoints legitimately answer with a plain string
/// instead of the updated book, so callers must be able to tell the two
/// apart before validating.
#[derive(Debug, Clone)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

/// Main HTTP client for the library backend
///
/// Holds the configured `reqwest::Client`, the validated base URL and a
/// handle to the session, which is consulted for the bearer token on every
/// request and notified on every 401.
#[derive(Debug)]
pub struct BiblioClient {
    /// Underlying HTTP client
    client: Client,
    /// Backend base URL without trailing slash
    base_url: String,
    /// Session handle: token source and 401 sink
    session: Arc<SessionHandle>,
}

impl BiblioClient {
    /// Create a new BiblioClient with default configuration
    pub fn new(session: Arc<SessionHandle>) -> Result<Self> {
        Self::with_config(session, ClientConfig::default())
    }

    /// Create a new BiblioClient with custom configuration
    ///
    /// # Errors
    /// Returns error if the base URL does not parse or the HTTP client
    /// cannot be built.
    pub fn with_config(session: Arc<SessionHandle>, config: ClientConfig) -> Result<Self> {
        // Validate the base URL up front so endpoint paths can be joined
        // with plain string formatting later.
        let parsed = url::Url::parse(&config.base_url)
            .map_err(|e| BiblioError::invalid_input(format!("invalid base URL: {e}")))?;
        if !parsed.has_host() {
            return Err(BiblioError::invalid_input(format!(
                "base URL has no host: {}",
                config.base_url
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| BiblioError::invalid_input(format!("invalid user agent: {e}")))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .pool_max_idle_per_host(4)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    /// Get the backend base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Perform a request and deserialize the JSON response into `T`
    ///
    /// # Errors
    /// Returns error if the request fails, the status is not 2xx, or the
    /// body does not deserialize into `T`.
    pub async fn request_json<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        B: Serialize,
    {
        let response = self.send(method, path, body).await?;
        let status = response.status();
        let text = response.text().await.map_err(|e| {
            BiblioError::api_failed(
                format!("failed to read response body: {e}"),
                Some(status.as_u16()),
                Some(path.to_string()),
            )
        })?;

        serde_json::from_str::<T>(&text).map_err(|e| {
            BiblioError::invalid_response(format!("unexpected response shape: {e}"), Some(text))
        })
    }

    /// Perform a request and return the body as JSON or plain text
    ///
    /// Used by endpoints whose responses need shape validation before being
    /// trusted, and by those that may answer with a bare confirmation string.
    pub async fn request_body<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<ResponseBody>
    where
        B: Serialize,
    {
        let response = self.send(method, path, body).await?;
        let status = response.status();
        let text = response.text().await.map_err(|e| {
            BiblioError::api_failed(
                format!("failed to read response body: {e}"),
                Some(status.as_u16()),
                Some(path.to_string()),
            )
        })?;
        Ok(parse_body(&text))
    }

    /// Perform a request, discarding any response body
    pub async fn request_empty<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<()>
    where
        B: Serialize,
    {
        self.send(method, path, body).await?;
        Ok(())
    }

    /// Send one request with the transport policies applied
    ///
    /// Attaches the bearer token when one is persisted; maps 401 to
    /// `Unauthorized` after clearing the stored token; maps other non-2xx
    /// statuses to `ApiRequestFailed` carrying the response body.
    async fn send<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<Response>
    where
        B: Serialize,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, path, "sending request");

        let mut builder = self.client.request(method, &url);
        if let Some(token) = self.session.bearer_token().await? {
            builder = builder.bearer_auth(token);
        }
        if let Some(b) = body {
            builder = builder.json(b);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| BiblioError::NetworkError(e.to_string()))?;

        let status = response.status();
        debug!(path, status = status.as_u16(), "received response");

        match status {
            s if s.is_success() => Ok(response),
            StatusCode::UNAUTHORIZED => {
                // Cross-cutting policy: any 401 invalidates the session,
                // independent of which call site issued the request.
                warn!(path, "401 response, clearing stored session token");
                self.session.invalidate().await;
                Err(BiblioError::Unauthorized {
                    endpoint: Some(path.to_string()),
                })
            }
            _ => {
                let error_body = response.text().await.unwrap_or_default();
                let message = if error_body.is_empty() {
                    format!("server responded with status {}", status.as_u16())
                } else {
                    error_body
                };
                Err(BiblioError::api_failed(
                    message,
                    Some(status.as_u16()),
                    Some(path.to_string()),
                ))
            }
        }
    }
}

/// Classify a response body as JSON or a bare text confirmation.
///
/// Spring serializes string bodies as text/plain, which is not valid JSON,
/// while every object/array response parses cleanly.
fn parse_body(text: &str) -> ResponseBody {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => ResponseBody::Json(value),
        Err(_) => ResponseBody::Text(text.to_string()),
    }
}
