//! Client-side filtering and sorting of a loaded booking list.
//!
//! DESIGN
//! ======
//! Filters run in a fixed order (search, status, date window) and each one
//! preserves relative order. Sorting is a stable ascending sort; descending
//! is that result reversed, so flipping the order always reverses the list
//! exactly, ties included.
//!
//! Date windows are measured from midnight UTC of `now`. A booking whose
//! relevant date does not parse never falls inside a window.

#[cfg(test)]
#[path = "booking_filter_test.rs"]
mod booking_filter_test;

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use records::{BookingStatus, ParseRecordError, RoomBooking};
use time::{Duration, OffsetDateTime};

use super::timestamps::{parse_timestamp, start_of_day};

// =============================================================================
// FILTER KEYS
// =============================================================================

/// Status filter: everything, or one exact status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(BookingStatus),
}

impl FromStr for StatusFilter {
    type Err = ParseRecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse().map(Self::Only)
    }
}

/// Date window applied to `booking_date` or `check_in`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DateFilter {
    #[default]
    All,
    /// Booked since midnight.
    Today,
    /// Booked within the last 7 days.
    Week,
    /// Booked within the last 30 days.
    Month,
    /// Checking in today or later.
    Upcoming,
    /// Checked in before today.
    Past,
}

impl DateFilter {
    pub const ALL: [Self; 6] = [Self::All, Self::Today, Self::Week, Self::Month, Self::Upcoming, Self::Past];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Today => "today",
            Self::Week => "week",
            Self::Month => "month",
            Self::Upcoming => "upcoming",
            Self::Past => "past",
        }
    }

    fn matches(self, booking: &RoomBooking, today: OffsetDateTime) -> bool {
        let booked_since = |days: i64| {
            parse_timestamp(&booking.booking_date).is_some_and(|ts| ts >= today - Duration::days(days))
        };
        match self {
            Self::All => true,
            Self::Today => booked_since(0),
            Self::Week => booked_since(7),
            Self::Month => booked_since(30),
            Self::Upcoming => parse_timestamp(&booking.check_in).is_some_and(|ts| ts >= today),
            Self::Past => parse_timestamp(&booking.check_in).is_some_and(|ts| ts < today),
        }
    }
}

impl FromStr for DateFilter {
    type Err = ParseRecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseRecordError { kind: "date filter", value: s.to_owned() })
    }
}

/// Column to sort by.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    BookingDate,
    CheckIn,
    FullName,
    TotalPrice,
    Reference,
}

impl SortKey {
    pub const ALL: [Self; 5] = [Self::BookingDate, Self::CheckIn, Self::FullName, Self::TotalPrice, Self::Reference];

    /// Field name as used by the backend.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BookingDate => "booking_date",
            Self::CheckIn => "check_in",
            Self::FullName => "full_name",
            Self::TotalPrice => "total_price",
            Self::Reference => "booking_reference",
        }
    }

    fn compare(self, a: &RoomBooking, b: &RoomBooking) -> Ordering {
        match self {
            Self::BookingDate => parse_timestamp(&a.booking_date).cmp(&parse_timestamp(&b.booking_date)),
            Self::CheckIn => parse_timestamp(&a.check_in).cmp(&parse_timestamp(&b.check_in)),
            Self::FullName => a.full_name.to_lowercase().cmp(&b.full_name.to_lowercase()),
            Self::TotalPrice => compare_amounts(a.total_price_value(), b.total_price_value()),
            Self::Reference => a.booking_reference.cmp(&b.booking_reference),
        }
    }
}

impl FromStr for SortKey {
    type Err = ParseRecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("reference") {
            return Ok(Self::Reference);
        }
        Self::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseRecordError { kind: "sort key", value: s.to_owned() })
    }
}

/// Unparsable amounts sort first.
fn compare_amounts(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        })
    }
}

impl FromStr for SortOrder {
    type Err = ParseRecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(ParseRecordError { kind: "sort order", value: s.to_owned() }),
        }
    }
}

// =============================================================================
// FILTER
// =============================================================================

/// The booking list's view settings. Defaults show everything, newest first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BookingFilter {
    /// Free-text search; blank matches everything.
    pub search: String,
    pub status: StatusFilter,
    pub date: DateFilter,
    pub sort_by: SortKey,
    pub order: SortOrder,
}

impl BookingFilter {
    pub fn toggle_order(&mut self) {
        self.order = self.order.toggled();
    }

    /// Whether `booking` passes the search, status and date filters.
    #[must_use]
    pub fn matches(&self, booking: &RoomBooking, now: OffsetDateTime) -> bool {
        self.matches_at(booking, start_of_day(now))
    }

    fn matches_at(&self, booking: &RoomBooking, today: OffsetDateTime) -> bool {
        self.matches_search(booking) && self.matches_status(booking) && self.date.matches(booking, today)
    }

    fn matches_search(&self, booking: &RoomBooking) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        booking.full_name.to_lowercase().contains(&needle)
            || booking.email.to_lowercase().contains(&needle)
            || booking.booking_reference.to_lowercase().contains(&needle)
            || booking.phone.contains(&self.search)
    }

    fn matches_status(&self, booking: &RoomBooking) -> bool {
        match self.status {
            StatusFilter::All => true,
            StatusFilter::Only(status) => booking.status.as_deref() == Some(status.as_str()),
        }
    }

    /// Filter then sort, borrowing from `bookings`.
    #[must_use]
    pub fn apply<'a>(&self, bookings: &'a [RoomBooking], now: OffsetDateTime) -> Vec<&'a RoomBooking> {
        let today = start_of_day(now);
        let mut visible: Vec<&RoomBooking> = bookings
            .iter()
            .filter(|b| self.matches_at(b, today))
            .collect();

        let key = self.sort_by;
        visible.sort_by(|a, b| key.compare(a, b));
        if self.order == SortOrder::Desc {
            visible.reverse();
        }
        visible
    }
}
