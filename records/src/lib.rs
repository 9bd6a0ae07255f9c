//! Shared record types for the hotel backend REST surface.
//!
//! This crate owns the wire representation consumed by `client` and the
//! `hotel-admin` console. Records are plain server-sourced data: the client
//! never enforces invariants on them beyond field presence, and every
//! mutation is round-tripped through the backend.
//!
//! DESIGN
//! ======
//! The backend serializes decimals as strings and is not always consistent
//! about integer vs float encoding, so numeric fields go through lenient
//! deserializers instead of failing the whole payload.

pub mod auth;
pub mod booking;
pub mod menu;
pub mod notification;

pub use auth::{Identity, LoginResponse, RefreshResponse, StatusResponse, TokenPair};
pub use booking::{Amount, BookingStats, BookingStatus, Occupancy, RoomBooking, SelectedRoom};
pub use menu::{DailySpecial, MenuItem};
pub use notification::{NotificationItem, NotificationKind};

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

/// Error returned when a textual enum value is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} `{value}`")]
pub struct ParseRecordError {
    /// Which field was being parsed (e.g. `"booking status"`).
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

pub(crate) fn deserialize_i64_from_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    number_to_i64(&value).ok_or_else(|| D::Error::custom("expected integer-compatible number"))
}

pub(crate) fn deserialize_u32_or_zero<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let Some(value) = value else {
        return Ok(0);
    };
    if value.is_null() {
        return Ok(0);
    }
    let int = number_to_i64(&value).ok_or_else(|| D::Error::custom("expected integer-compatible number"))?;
    u32::try_from(int).map_err(|_| D::Error::custom(format!("value {int} out of range for u32")))
}

fn number_to_i64(value: &serde_json::Value) -> Option<i64> {
    let serde_json::Value::Number(number) = value else {
        return None;
    };
    if let Some(int) = number.as_i64() {
        return Some(int);
    }
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    if let Some(float) = number.as_f64()
        && float.is_finite()
        && float.fract() == 0.0
        && float >= i64::MIN as f64
        && float <= i64::MAX as f64
    {
        return Some(float as i64);
    }
    None
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
