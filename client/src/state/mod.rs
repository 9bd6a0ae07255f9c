//! Long-lived client stores.
//!
//! SYSTEM CONTEXT
//! ==============
//! `tokens` is the durable credential slot the pipeline reads on every call.
//! `session`, `notifications` and `stats` are observable stores built on top
//! of the typed API; each owns at most one background task and hands back
//! its `JoinHandle` so the embedding process decides teardown.

pub mod notifications;
pub mod session;
pub mod stats;
pub mod tokens;
