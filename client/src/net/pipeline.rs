//! Single egress point for backend calls.
//!
//! ARCHITECTURE
//! ============
//! Request phase: attach `Authorization: Bearer <token>` from, in order, the
//! request's explicit override, the persisted access token, or the installed
//! default credential.
//!
//! Response phase (errors only): a 401 on a logical request that has not
//! been replayed yet consumes that request's retry guard, exchanges the
//! persisted refresh token for a new access token on the raw transport, and
//! replays the request once. If no refresh token is stored the original 401
//! is returned unchanged. If the refresh itself fails, credentials are
//! cleared and [`AuthEvent::SessionExpired`] is published so the session
//! store can drop to `Unauthenticated`.
//!
//! The retry guard is an [`Attempt`] value local to [`Pipeline::send`], so a
//! logical request is replayed at most once no matter how many 401s other
//! requests hit concurrently.

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod pipeline_test;

use std::sync::{Arc, RwLock};

use records::RefreshResponse;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use super::error::ApiError;
use super::request::{ApiRequest, RequestBody};
use crate::config::ClientConfig;
use crate::state::tokens::{ACCESS_TOKEN_KEY, TokenStore};

const REFRESH_PATH: &str = "/auth/token/refresh/";
const AUTH_EVENT_CAPACITY: usize = 16;

/// Credential lifecycle notifications published by the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthEvent {
    /// A refresh failed; both tokens were cleared.
    SessionExpired,
}

/// Retry guard for one logical request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Attempt {
    Initial,
    Replay,
}

/// A successful (2xx) response with its parsed JSON body.
///
/// Empty bodies parse as `Value::Null`; non-JSON bodies are kept as a string.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl ApiResponse {
    /// Decode the raw body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Decode`] if the body does not match `T`.
    pub fn json<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        Ok(serde_json::from_value(self.body)?)
    }

    /// Decode the body, unwrapping a `{ "data": ... }` envelope if present.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Decode`] if the payload does not match `T`.
    pub fn data<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        Ok(serde_json::from_value(unwrap_envelope(self.body))?)
    }

    /// Decode a list, accepting a bare array, a `data` envelope, or a
    /// paginated `{ "results": [...] }` page. A null body is an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Decode`] if the payload is not list-shaped.
    pub fn list<T: DeserializeOwned>(self) -> Result<Vec<T>, ApiError> {
        let value = unwrap_envelope(self.body);
        let value = match value {
            Value::Null => return Ok(Vec::new()),
            Value::Object(mut map) if map.get("results").is_some_and(Value::is_array) => {
                map.remove("results").unwrap_or(Value::Null)
            }
            other => other,
        };
        Ok(serde_json::from_value(value)?)
    }
}

fn unwrap_envelope(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.get("data").is_some_and(|d| !d.is_null()) => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Shared HTTP pipeline. Cheap to share behind an `Arc`.
pub struct Pipeline {
    http: reqwest::Client,
    config: ClientConfig,
    tokens: Arc<dyn TokenStore>,
    default_credential: RwLock<Option<String>>,
    events: broadcast::Sender<AuthEvent>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Build the transport: JSON accept header, cookie store, configured timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Network`] if the TLS backend cannot be initialized.
    pub fn new(config: ClientConfig, tokens: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .cookie_store(true)
            .timeout(config.timeout)
            .build()?;
        let (events, _) = broadcast::channel(AUTH_EVENT_CAPACITY);
        Ok(Self { http, config, tokens, default_credential: RwLock::new(None), events })
    }

    #[must_use]
    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    /// Subscribe to credential lifecycle events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    /// Install (or, with `None`, remove) the fallback credential.
    pub fn set_default_credential(&self, token: Option<String>) {
        let mut slot = self
            .default_credential
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *slot = token;
    }

    #[must_use]
    pub fn default_credential(&self) -> Option<String> {
        self.default_credential
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    fn credential_for(&self, request: &ApiRequest) -> Option<String> {
        request
            .bearer_override
            .clone()
            .or_else(|| self.tokens.access_token())
            .or_else(|| self.default_credential())
    }

    /// Send one logical request, refreshing and replaying at most once on 401.
    ///
    /// # Errors
    ///
    /// Returns the classified [`ApiError`] for transport failures and non-2xx
    /// responses, or [`ApiError::RefreshFailed`] when the silent refresh
    /// could not mint a new access token.
    pub async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let mut attempt = Attempt::Initial;
        let mut credential = self.credential_for(request);

        loop {
            let err = match self.dispatch(request, credential.as_deref()).await {
                Ok(response) => return Ok(response),
                Err(err) => err,
            };

            if !(err.is_unauthorized() && request.allow_refresh && attempt == Attempt::Initial) {
                return Err(self.log_failure(request, err));
            }
            attempt = Attempt::Replay;

            let Some(refresh) = self.tokens.refresh_token() else {
                debug!(path = %request.path, "401 with no refresh token; not retrying");
                return Err(self.log_failure(request, err));
            };

            match self.refresh(&refresh).await {
                Ok(access) => {
                    debug!(path = %request.path, "replaying request with refreshed token");
                    credential = Some(access);
                }
                Err(refresh_err) => {
                    error!(error = %refresh_err, "token refresh failed");
                    self.expire_session();
                    return Err(ApiError::RefreshFailed(Box::new(refresh_err)));
                }
            }
        }
    }

    async fn dispatch(&self, request: &ApiRequest, credential: Option<&str>) -> Result<ApiResponse, ApiError> {
        let url = self.config.endpoint(&request.path);
        debug!(method = %request.method, url = %url, "request");

        let mut builder = self.http.request(request.method.clone(), &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = credential {
            builder = builder.bearer_auth(token);
        }
        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(body),
            RequestBody::Multipart(body) => builder.multipart(body.to_form()?),
        };

        let response = builder.send().await?;
        read_response(response, &url).await
    }

    /// Exchange a refresh token for a new access token and persist it.
    async fn refresh(&self, refresh: &str) -> Result<String, ApiError> {
        let url = self.config.endpoint(REFRESH_PATH);
        info!("attempting token refresh");
        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "refresh": refresh }))
            .send()
            .await?;
        let body = read_response(response, &url).await?;
        let parsed: RefreshResponse = serde_json::from_value(body.body).map_err(|_| ApiError::MissingAccessToken)?;
        if parsed.access.is_empty() {
            return Err(ApiError::MissingAccessToken);
        }

        self.tokens.set(ACCESS_TOKEN_KEY, &parsed.access);
        self.set_default_credential(Some(parsed.access.clone()));
        info!("access token refreshed");
        Ok(parsed.access)
    }

    /// Drop all credentials and tell observers the session is gone.
    fn expire_session(&self) {
        self.tokens.clear();
        self.set_default_credential(None);
        warn!("session expired; credentials cleared");
        // No receivers is fine: nothing is observing the session yet.
        let _ = self.events.send(AuthEvent::SessionExpired);
    }

    fn log_failure(&self, request: &ApiRequest, err: ApiError) -> ApiError {
        error!(
            method = %request.method,
            url = %self.config.endpoint(&request.path),
            status = err.status().map(|s| s.as_u16()),
            message = %err,
            "api request failed"
        );
        err
    }
}

async fn read_response(response: reqwest::Response, url: &str) -> Result<ApiResponse, ApiError> {
    let status = response.status();
    let bytes = response.bytes().await?;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };

    if status.is_success() {
        Ok(ApiResponse { status, body })
    } else {
        Err(ApiError::from_status(status, url, body))
    }
}
