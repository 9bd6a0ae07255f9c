//! Native client for the hotel admin backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! Callers never touch the network directly. Every backend call goes through
//! [`net::pipeline::Pipeline`], which owns credential attachment and the
//! one-shot refresh-and-retry on 401. [`state::session::SessionStore`] is the
//! single source of truth for who is logged in; it observes the pipeline's
//! auth events instead of reloading anything.
//!
//! `net` handles transport and typed endpoints, `state` holds long-lived
//! observable stores (session, notifications, stats, persisted tokens), and
//! `util` holds pure helpers (booking filter/sort, timestamp handling).

pub mod config;
pub mod net;
pub mod state;
pub mod util;

pub use config::ClientConfig;
pub use net::api::ApiClient;
pub use net::error::{ApiError, ErrorKind};
pub use net::pipeline::{AuthEvent, Pipeline};
pub use state::session::{AuthError, Session, SessionStore};
pub use state::tokens::{FileTokenStore, MemoryTokenStore, TokenStore};
