//! Identity and token envelopes returned by the `/auth/*` endpoints.

use serde::{Deserialize, Serialize};

/// An authenticated staff member, taken verbatim from auth responses.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Backend user identifier.
    #[serde(deserialize_with = "crate::deserialize_i64_from_number")]
    pub id: i64,
    /// Login email.
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    /// Whether the backend grants admin rights.
    #[serde(default)]
    pub is_admin: bool,
}

impl Identity {
    /// Full name for display, falling back to the email when both names are blank.
    #[must_use]
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() { self.email.clone() } else { full.to_owned() }
    }
}

/// Opaque bearer credentials issued at login.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived credential attached to every API call.
    pub access: String,
    /// Longer-lived credential used to mint a new access token.
    pub refresh: String,
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair").finish_non_exhaustive()
    }
}

/// Body of `POST /auth/login/`.
///
/// Failure bodies carry a human-readable reason in one of `message`,
/// `error` or `detail` depending on which backend layer rejected the call.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub success: bool,
    pub tokens: Option<TokenPair>,
    pub user: Option<Identity>,
    pub message: Option<String>,
    pub error: Option<String>,
    pub detail: Option<String>,
}

/// Body of `GET /auth/status/`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub success: bool,
    pub user: Option<Identity>,
}

/// Body of `POST /auth/token/refresh/`.
#[derive(Clone, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
}
