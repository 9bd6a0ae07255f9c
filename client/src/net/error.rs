//! Error taxonomy for backend calls.
//!
//! Non-2xx responses keep their parsed JSON body so callers can pull the
//! backend's own wording (`message`, `error`, `detail`) into user-facing text.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use reqwest::StatusCode;
use serde_json::Value;

/// Coarse classification used by views to pick a recovery affordance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad credentials or an expired session.
    Auth,
    /// Write rejected by backend validation.
    Validation,
    /// The request could not complete.
    Network,
    NotFound,
    /// Any other backend failure.
    Server,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("unauthorized: {}", body_message(.body).unwrap_or("authentication required"))]
    Unauthorized { body: Value },
    #[error("not found: {url}")]
    NotFound { url: String, body: Value },
    #[error("rejected ({status}): {}", body_message(.body).unwrap_or("validation failed"))]
    Validation { status: StatusCode, body: Value },
    #[error("server returned {status}: {}", body_message(.body).unwrap_or("no details"))]
    Server { status: StatusCode, body: Value },
    #[error("http request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("invalid response payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("token refresh failed: {0}")]
    RefreshFailed(Box<ApiError>),
    #[error("refresh response did not include an access token")]
    MissingAccessToken,
}

impl ApiError {
    /// Classify a non-success HTTP status.
    #[must_use]
    pub fn from_status(status: StatusCode, url: &str, body: Value) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized { body },
            StatusCode::NOT_FOUND => Self::NotFound { url: url.to_owned(), body },
            StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
                Self::Validation { status, body }
            }
            _ => Self::Server { status, body },
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized { .. } | Self::RefreshFailed(_) | Self::MissingAccessToken => ErrorKind::Auth,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Network(_) => ErrorKind::Network,
            Self::Server { .. } | Self::Decode(_) => ErrorKind::Server,
        }
    }

    /// HTTP status of the failed response, if one was received.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Unauthorized { .. } => Some(StatusCode::UNAUTHORIZED),
            Self::NotFound { .. } => Some(StatusCode::NOT_FOUND),
            Self::Validation { status, .. } | Self::Server { status, .. } => Some(*status),
            Self::Network(e) => e.status(),
            Self::RefreshFailed(inner) => inner.status(),
            Self::Decode(_) | Self::MissingAccessToken => None,
        }
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Parsed response body, for variants that carry one.
    #[must_use]
    pub fn body(&self) -> Option<&Value> {
        match self {
            Self::Unauthorized { body }
            | Self::NotFound { body, .. }
            | Self::Validation { body, .. }
            | Self::Server { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Backend-provided reason, looked up as `message`, then `error`, then `detail`.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.body().and_then(body_message)
    }

    /// One line suitable for showing next to a retry affordance.
    #[must_use]
    pub fn user_message(&self) -> String {
        if let Some(message) = self.message() {
            return message.to_owned();
        }
        match self.kind() {
            ErrorKind::Auth => "Your session has expired. Please log in again.".to_owned(),
            ErrorKind::Validation => "The server rejected the request.".to_owned(),
            ErrorKind::Network => "Could not reach the server. Please check your connection.".to_owned(),
            ErrorKind::NotFound => "The requested record was not found.".to_owned(),
            ErrorKind::Server => "Something went wrong. Please try again.".to_owned(),
        }
    }
}

/// Pull `message`, `error` or `detail` (first non-empty string wins) from a body.
#[must_use]
pub fn body_message(body: &Value) -> Option<&str> {
    ["message", "error", "detail"]
        .into_iter()
        .filter_map(|key| body.get(key).and_then(Value::as_str))
        .find(|s| !s.trim().is_empty())
}
