//! Room bookings and aggregate booking statistics.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ParseRecordError;

/// Lifecycle status of a room booking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    /// All statuses in the order staff pick them.
    pub const ALL: [Self; 4] = [Self::Pending, Self::Confirmed, Self::Completed, Self::Cancelled];

    /// Wire value sent in `PATCH /room-bookings/{id}/`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = ParseRecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseRecordError { kind: "booking status", value: s.to_owned() })
    }
}

/// Room occupancy requested for a selected room.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Occupancy {
    Single,
    Double,
}

/// A price that the backend emits either as a JSON number or a decimal string.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(f64),
    Text(String),
}

impl Amount {
    /// Numeric value, or `None` when the text form does not parse.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Text(text) => text.trim().parse().ok(),
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value:.2}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// A room line inside a booking.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectedRoom {
    #[serde(deserialize_with = "crate::deserialize_i64_from_number")]
    pub id: i64,
    pub name: String,
    #[serde(default = "one")]
    pub quantity: u32,
    pub occupancy: Occupancy,
    pub price: Amount,
    pub description: Option<String>,
    pub max_guests: Option<u32>,
}

fn one() -> u32 {
    1
}

/// A room reservation as served by `/room-bookings/`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoomBooking {
    /// Numeric primary key.
    #[serde(deserialize_with = "crate::deserialize_i64_from_number")]
    pub id: i64,
    /// Human-readable identifier, distinct from `id`.
    pub booking_reference: String,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub address: Option<String>,
    pub special_requests: Option<String>,
    /// Check-in date (`YYYY-MM-DD`).
    pub check_in: String,
    /// Check-out date (`YYYY-MM-DD`).
    pub check_out: String,
    #[serde(default, deserialize_with = "crate::deserialize_u32_or_zero")]
    pub adults: u32,
    #[serde(default, deserialize_with = "crate::deserialize_u32_or_zero")]
    pub children: u32,
    #[serde(default)]
    pub selected_rooms: Vec<SelectedRoom>,
    /// Decimal total serialized as a string by the backend.
    pub total_price: String,
    #[serde(default, deserialize_with = "crate::deserialize_u32_or_zero")]
    pub nights: u32,
    /// Creation timestamp (RFC 3339).
    pub booking_date: String,
    /// Raw status string; absent on older records.
    #[serde(default)]
    pub status: Option<String>,
}

impl RoomBooking {
    /// Status shown to staff; records without one are treated as pending.
    #[must_use]
    pub fn display_status(&self) -> &str {
        self.status.as_deref().unwrap_or(BookingStatus::Pending.as_str())
    }

    /// Number of room lines, counting a booking with none as a single room.
    #[must_use]
    pub fn room_count(&self) -> usize {
        self.selected_rooms.len().max(1)
    }

    /// Total price as a number, if the decimal string parses.
    #[must_use]
    pub fn total_price_value(&self) -> Option<f64> {
        self.total_price.trim().parse().ok()
    }
}

/// Aggregates served by `/room-bookings/stats/`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BookingStats {
    #[serde(default, deserialize_with = "crate::deserialize_u32_or_zero")]
    pub total_bookings: u32,
    #[serde(default, deserialize_with = "crate::deserialize_u32_or_zero")]
    pub pending_bookings: u32,
    #[serde(default, deserialize_with = "crate::deserialize_u32_or_zero")]
    pub confirmed_bookings: u32,
    #[serde(default, deserialize_with = "crate::deserialize_u32_or_zero")]
    pub cancelled_bookings: u32,
    #[serde(default, deserialize_with = "crate::deserialize_u32_or_zero")]
    pub completed_bookings: u32,
    #[serde(default = "zero_amount")]
    pub total_revenue: Amount,
    #[serde(default = "zero_amount")]
    pub monthly_revenue: Amount,
    #[serde(default = "zero_amount")]
    pub average_booking_value: Amount,
    #[serde(default)]
    pub occupancy_rate: f64,
    #[serde(default, deserialize_with = "crate::deserialize_u32_or_zero")]
    pub total_guests: u32,
    #[serde(default)]
    pub recent_bookings: Vec<RoomBooking>,
    #[serde(default, deserialize_with = "crate::deserialize_u32_or_zero")]
    pub recent_bookings_count: u32,
}

fn zero_amount() -> Amount {
    Amount::Text("0".to_owned())
}

impl Default for Amount {
    fn default() -> Self {
        zero_amount()
    }
}
