//! Authenticated session for the current operator.
//!
//! DESIGN
//! ======
//! One explicit store per process, built around the shared [`ApiClient`].
//! State is published on a `watch` channel so views and the CLI can observe
//! transitions without polling. The pipeline never reaches into the store:
//! it publishes [`AuthEvent::SessionExpired`] and the listener spawned by
//! [`SessionStore::spawn_auth_listener`] moves the store to unauthenticated.
//!
//! ERROR HANDLING
//! ==============
//! Startup verification never fails loudly; a bad or expired token just
//! leaves the store unauthenticated (with a message on 401). Login returns
//! an [`AuthError`] carrying the backend's own wording when it has one.
//! Logout is local first and best-effort remote.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use records::{Identity, LoginResponse, StatusResponse};
use reqwest::StatusCode;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::net::api::ApiClient;
use crate::net::error::{ApiError, body_message};
use crate::net::pipeline::AuthEvent;

pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please log in again.";
pub const LOGIN_FAILED_MESSAGE: &str = "Login failed. Please check your credentials.";

/// Snapshot of the session published to observers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub user: Option<Identity>,
    /// True until the startup check finishes, and while a login is in flight.
    pub is_loading: bool,
    /// Last user-facing auth message.
    pub error: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self { user: None, is_loading: true, error: None }
    }
}

impl Session {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// A failed login, carrying the message shown to the operator.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct AuthError {
    pub message: String,
}

impl AuthError {
    fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

pub struct SessionStore {
    api: ApiClient,
    state: watch::Sender<Session>,
    initialized: AtomicBool,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("session", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        let (state, _) = watch::channel(Session::default());
        Self { api, state, initialized: AtomicBool::new(false) }
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// Follow pipeline auth events until the pipeline goes away. Abort the
    /// handle on teardown.
    #[must_use]
    pub fn spawn_auth_listener(self: &Arc<Self>) -> JoinHandle<()> {
        let store = Arc::clone(self);
        let mut events = self.api.pipeline().subscribe();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(AuthEvent::SessionExpired) => store.mark_expired(),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!(skipped, "auth listener lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    fn mark_expired(&self) {
        info!("session expired; returning to login");
        self.state.send_modify(|s| {
            s.user = None;
            s.is_loading = false;
            s.error = Some(SESSION_EXPIRED_MESSAGE.to_owned());
        });
    }

    fn drop_credentials(&self) {
        self.api.pipeline().tokens().clear();
        self.api.pipeline().set_default_credential(None);
    }

    // =========================================================================
    // STARTUP
    // =========================================================================

    /// Verify a persisted token against `/auth/status/`. Runs once per
    /// store; later calls return immediately.
    pub async fn check_initial_session(&self) {
        if self.initialized.swap(true, Ordering::SeqCst) {
            return;
        }

        let pipeline = self.api.pipeline();
        let Some(token) = pipeline.tokens().access_token() else {
            debug!("no persisted access token");
            self.state.send_modify(|s| s.is_loading = false);
            return;
        };
        pipeline.set_default_credential(Some(token));

        match self.api.auth_status().await {
            Ok(StatusResponse { success: true, user: Some(user) }) => {
                info!(email = %user.email, "restored session");
                self.state.send_modify(|s| {
                    s.user = Some(user);
                    s.is_loading = false;
                });
            }
            Ok(_) => {
                warn!("auth status response was not a valid session");
                self.drop_credentials();
                self.state.send_modify(|s| {
                    s.user = None;
                    s.is_loading = false;
                });
            }
            Err(err) => {
                warn!(error = %err, "auth check failed");
                self.drop_credentials();
                let expired = err.status() == Some(StatusCode::UNAUTHORIZED);
                self.state.send_modify(|s| {
                    s.user = None;
                    s.is_loading = false;
                    if expired {
                        s.error = Some(SESSION_EXPIRED_MESSAGE.to_owned());
                    }
                });
            }
        }
    }

    // =========================================================================
    // LOGIN / LOGOUT
    // =========================================================================

    /// Exchange credentials for a token pair and become authenticated.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] when the backend rejects the login or the
    /// request fails. The same message is stored in the session error slot.
    pub async fn login(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        self.state.send_modify(|s| {
            s.is_loading = true;
            s.error = None;
        });

        let result = self.authenticate(email, password).await;

        self.state.send_modify(|s| {
            s.is_loading = false;
            match &result {
                Ok(user) => s.user = Some(user.clone()),
                Err(err) => s.error = Some(err.message.clone()),
            }
        });
        result
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let response = match self.api.login(email, password).await {
            Ok(response) => response,
            Err(err) => {
                error!(error = %err, "login failed");
                return Err(AuthError::new(login_error_message(&err)));
            }
        };

        if !response.success {
            let message = rejected_login_message(&response);
            error!(reason = %message, "login rejected");
            return Err(AuthError::new(message));
        }
        let (Some(tokens), Some(user)) = (response.tokens, response.user) else {
            error!("login response missing tokens or user");
            return Err(AuthError::new(LOGIN_FAILED_MESSAGE));
        };

        let pipeline = self.api.pipeline();
        pipeline.tokens().save_pair(&tokens);
        pipeline.set_default_credential(Some(tokens.access));
        info!(email = %user.email, "logged in");
        Ok(user)
    }

    /// Forget credentials locally, then tell the backend in the background.
    ///
    /// Must be called inside a Tokio runtime. The returned handle resolves
    /// once the invalidation call finishes; its failures are only logged.
    pub fn logout(&self) -> JoinHandle<()> {
        let pipeline = self.api.pipeline();
        let access = pipeline.tokens().access_token().or_else(|| pipeline.default_credential());
        let refresh = pipeline.tokens().refresh_token();

        self.drop_credentials();
        self.state.send_modify(|s| {
            s.user = None;
            s.error = None;
            s.is_loading = false;
        });
        info!("logged out");

        let api = self.api.clone();
        tokio::spawn(async move {
            if let Err(err) = api.logout(access, refresh).await {
                warn!(error = %err, "logout request failed");
            }
        })
    }
}

fn login_error_message(err: &ApiError) -> String {
    err.body()
        .and_then(body_message)
        .unwrap_or(LOGIN_FAILED_MESSAGE)
        .to_owned()
}

fn rejected_login_message(response: &LoginResponse) -> String {
    [&response.message, &response.error, &response.detail]
        .into_iter()
        .flatten()
        .find(|m| !m.trim().is_empty())
        .cloned()
        .unwrap_or_else(|| LOGIN_FAILED_MESSAGE.to_owned())
}
