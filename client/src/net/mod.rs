//! Networking: transport pipeline and typed backend endpoints.
//!
//! SYSTEM CONTEXT
//! ==============
//! `pipeline` is the only place that knows about credentials and refresh,
//! `api` maps backend endpoints onto typed calls, `request` describes
//! replayable requests, and `error` classifies failures.

pub mod api;
pub mod error;
pub mod pipeline;
pub mod request;

#[cfg(test)]
pub(crate) mod mock_backend;
