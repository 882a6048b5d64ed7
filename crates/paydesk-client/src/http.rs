//! # Remote Resource Client
//!
//! Uniform request/response handling for every backend call.
//!
//! | Situation | Result |
//! |-----------|--------|
//! | 2xx | body parsed as JSON; an unparseable body becomes `{}` |
//! | 401 on a request that carried a token | session cleared, one redirect to the login route, [`ClientError::Unauthorized`] |
//! | other non-2xx | [`ClientError::Request`] with the payload's `message`, else `Request failed: <status>` |
//! | no response | [`ClientError::Network`] |
//!
//! The backend wraps every payload in a `success` flag. Because an
//! unparseable body degrades to `{}`, callers must check that flag; the
//! [`ResourceClient::call`] helper does so and decodes the rest.
//!
//! Paths are built as an [`Endpoint`]: literal parts plus parameters that
//! are percent-encoded as single path segments, so an identifier can never
//! change which endpoint is called.
//!
//! No retries: a failure surfaces to the caller immediately.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use url::Url;

use paydesk_core::{Route, ValidationError};

use crate::config::PaydeskConfig;
use crate::error::ClientError;
use crate::navigation::Navigator;
use crate::session::SessionStore;

/// Whether a request carries the session's bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    /// Attach the token when one is present; a 401 to a request that
    /// carried it forces logout.
    Bearer,
    /// Never attach a token; a 401 is an ordinary rejection. Used by the
    /// login and registration endpoints.
    Anonymous,
}

/// A path relative to the API base URL.
///
/// Literal parts come from [`Endpoint::new`] and [`Endpoint::path`] and may
/// contain `/`. Each [`Endpoint::param`] becomes exactly one escaped
/// segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    segments: Vec<String>,
    invalid: Option<String>,
}

impl Endpoint {
    pub fn new(path: &str) -> Self {
        Self {
            segments: Vec::new(),
            invalid: None,
        }
        .path(path)
    }

    /// Append literal path segments.
    pub fn path(mut self, path: &str) -> Self {
        self.segments.extend(
            path.split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        );
        self
    }

    /// Append one path parameter. Empty, `.` and `..` values make the
    /// endpoint unusable.
    pub fn param(mut self, value: impl AsRef<str>) -> Self {
        let value = value.as_ref();
        if matches!(value, "" | "." | "..") && self.invalid.is_none() {
            self.invalid = Some(value.to_string());
        }
        self.segments.push(value.to_string());
        self
    }

    /// The absolute URL of this endpoint beneath `base`.
    fn resolve(&self, base: &Url) -> Result<Url, ClientError> {
        if let Some(value) = &self.invalid {
            return Err(ValidationError::InvalidIdentifier {
                value: value.clone(),
            }
            .into());
        }
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::Request {
                endpoint: self.to_string(),
                status: None,
                message: "API base URL cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .extend(&self.segments);
        Ok(url)
    }
}

impl From<&str> for Endpoint {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<&String> for Endpoint {
    fn from(path: &String) -> Self {
        Self::new(path)
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

/// Client for the Paydesk REST API.
#[derive(Clone)]
pub struct ResourceClient {
    http: reqwest::Client,
    base_url: Url,
    session: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
}

impl std::fmt::Debug for ResourceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceClient")
            .field("base_url", &self.base_url.as_str())
            .field("session", &self.session)
            .finish()
    }
}

impl ResourceClient {
    /// Build a client for `config`, reading tokens from `session` and
    /// reporting forced logouts to `navigator`.
    pub fn new(
        config: &PaydeskConfig,
        session: Arc<SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                headers.insert(
                    reqwest::header::ACCEPT,
                    reqwest::header::HeaderValue::from_static("application/json"),
                );
                headers
            })
            .build()
            .map_err(|e| ClientError::Network {
                endpoint: "client_init".into(),
                source: e,
            })?;

        Ok(Self {
            http,
            base_url: config.api_url.clone(),
            session,
            navigator,
        })
    }

    /// The session store this client reads its token from.
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Issue an authenticated request and return the parsed JSON body.
    ///
    /// `path` is relative to the configured base URL (e.g. `disputes`).
    pub async fn request(
        &self,
        method: Method,
        path: impl Into<Endpoint>,
        body: Option<&Value>,
        query: &[(&str, String)],
    ) -> Result<Value, ClientError> {
        self.send(method, path, body, query, Auth::Bearer).await
    }

    /// Issue a request, require `success == true`, and decode the payload.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: impl Into<Endpoint>,
        body: Option<&Value>,
        query: &[(&str, String)],
        auth: Auth,
    ) -> Result<T, ClientError> {
        let path = path.into();
        let endpoint = format!("{method} {path}");
        let value = self.send(method, path, body, query, auth).await?;
        decode_success(&endpoint, value)
    }

    /// Issue a request with the given auth mode and return the parsed body.
    pub async fn send(
        &self,
        method: Method,
        path: impl Into<Endpoint>,
        body: Option<&Value>,
        query: &[(&str, String)],
        auth: Auth,
    ) -> Result<Value, ClientError> {
        let path = path.into();
        let endpoint = format!("{method} {path}");
        let url = path.resolve(&self.base_url)?;

        let mut request = self.http.request(method, url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        let token = match auth {
            Auth::Bearer => self.session.token(),
            Auth::Anonymous => None,
        };
        if let Some(token) = &token {
            request = request.header(
                reqwest::header::AUTHORIZATION,
                token.header_value().as_str(),
            );
        }

        let resp = request.send().await.map_err(|e| ClientError::Network {
            endpoint: endpoint.clone(),
            source: e,
        })?;
        let status = resp.status();
        tracing::debug!(endpoint = %endpoint, status = status.as_u16(), "response received");

        if status == StatusCode::UNAUTHORIZED && token.is_some() {
            self.force_logout(&endpoint);
            return Err(ClientError::Unauthorized { endpoint });
        }

        let bytes = resp.bytes().await.map_err(|e| ClientError::Network {
            endpoint: endpoint.clone(),
            source: e,
        })?;
        let value = parse_body(&endpoint, &bytes);

        if !status.is_success() {
            return Err(ClientError::Request {
                message: server_message(&value)
                    .unwrap_or_else(|| format!("Request failed: {}", status.as_u16())),
                endpoint,
                status: Some(status.as_u16()),
            });
        }

        Ok(value)
    }

    /// Clear the session and redirect to login. Concurrent rejections
    /// redirect once: only the call that ended the session navigates.
    fn force_logout(&self, endpoint: &str) {
        if self.session.logout() {
            tracing::warn!(endpoint, "session rejected by server, signing out");
            self.navigator.navigate(Route::Login);
        } else {
            tracing::debug!(endpoint, "session already cleared");
        }
    }
}

/// Parse a response body. An empty or malformed body becomes `{}`.
fn parse_body(endpoint: &str, bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        return Value::Object(Map::new());
    }
    serde_json::from_slice(bytes).unwrap_or_else(|e| {
        tracing::warn!(endpoint, "response body is not JSON, treating as empty: {e}");
        Value::Object(Map::new())
    })
}

/// The human-readable message the server put in an error payload.
fn server_message(value: &Value) -> Option<String> {
    ["message", "error"]
        .iter()
        .find_map(|key| value.get(key).and_then(Value::as_str))
        .filter(|m| !m.trim().is_empty())
        .map(str::to_string)
}

/// Require `success == true` and decode the payload into `T`.
pub(crate) fn decode_success<T: DeserializeOwned>(
    endpoint: &str,
    value: Value,
) -> Result<T, ClientError> {
    if value.get("success").and_then(Value::as_bool) != Some(true) {
        return Err(ClientError::Request {
            endpoint: endpoint.to_string(),
            status: None,
            message: server_message(&value)
                .unwrap_or_else(|| "The server did not confirm the request".to_string()),
        });
    }
    serde_json::from_value(value).map_err(|source| ClientError::Decode {
        endpoint: endpoint.to_string(),
        source,
    })
}
