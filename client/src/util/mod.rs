//! Pure helpers shared by the client stores and the CLI.
//!
//! SYSTEM CONTEXT
//! ==============
//! Nothing here touches the network or holds state, so views can call these
//! on every render and tests can pin the clock.

pub mod booking_filter;
pub mod timestamps;
