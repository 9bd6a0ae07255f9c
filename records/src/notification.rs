//! Locally-held notification entries.
//!
//! Notifications are derived client-side from polled bookings. Read and
//! removed flags are purely local and carry no durability guarantee.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Category of a notification, used for grouping and display.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Booking,
    Menu,
    System,
    Cancellation,
    Confirmation,
}

/// A single entry in the notification feed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NotificationItem {
    /// Locally unique identifier.
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    /// RFC 3339 timestamp the notification refers to.
    pub timestamp: String,
    pub read: bool,
    pub booking_reference: Option<String>,
    /// Source record, when the notification was built from one.
    pub data: Option<Value>,
}
