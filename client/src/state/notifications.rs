//! Booking notification feed and its background poller.
//!
//! DESIGN
//! ======
//! The backend has no push channel, so notifications are derived locally:
//! the feed is seeded from the most recent bookings and then fed by a poller
//! that asks for the newest few every interval. Anything booked after the
//! feed's `last_checked` mark becomes an unread notification. Read/removed
//! flags live only in memory.
//!
//! ERROR HANDLING
//! ==============
//! Poll failures are logged and skipped; the next tick tries again. A 401
//! during the initial load is expected before login settles and shows a
//! friendly placeholder instead of an error entry.

#[cfg(test)]
#[path = "notifications_test.rs"]
mod notifications_test;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use records::{NotificationItem, NotificationKind, RoomBooking};
use reqwest::StatusCode;
use time::OffsetDateTime;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::net::api::ApiClient;
use crate::net::error::ApiError;
use crate::util::timestamps::{parse_timestamp, to_rfc3339, unix_millis};

const INITIAL_NOTIFICATION_LIMIT: usize = 10;
const POLL_BOOKING_LIMIT: u32 = 5;

/// Feed shared between the poller and whoever renders it.
pub type SharedFeed = Arc<Mutex<NotificationFeed>>;

/// Newest-first list of notifications.
#[derive(Clone, Debug)]
pub struct NotificationFeed {
    items: Vec<NotificationItem>,
    enabled: bool,
    last_checked: OffsetDateTime,
}

impl NotificationFeed {
    /// Empty, enabled feed that treats bookings made after `now` as new.
    #[must_use]
    pub fn new(now: OffsetDateTime) -> Self {
        Self { items: Vec::new(), enabled: true, last_checked: now }
    }

    #[must_use]
    pub fn shared(now: OffsetDateTime) -> SharedFeed {
        Arc::new(Mutex::new(Self::new(now)))
    }

    #[must_use]
    pub fn items(&self) -> &[NotificationItem] {
        &self.items
    }

    #[must_use]
    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|n| !n.read).count()
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Pause or resume polling. Existing entries are kept.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    #[must_use]
    pub fn last_checked(&self) -> OffsetDateTime {
        self.last_checked
    }

    /// Returns whether an entry with `id` existed.
    pub fn mark_read(&mut self, id: &str) -> bool {
        match self.items.iter_mut().find(|n| n.id == id) {
            Some(item) => {
                item.read = true;
                true
            }
            None => false,
        }
    }

    pub fn mark_all_read(&mut self) {
        for item in &mut self.items {
            item.read = true;
        }
    }

    /// Returns whether an entry with `id` existed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|n| n.id != id);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Replace the feed with the outcome of the first recent-bookings fetch.
    pub fn load_initial(&mut self, result: Result<Vec<RoomBooking>, ApiError>, now: OffsetDateTime) {
        self.items = match result {
            Ok(bookings) => bookings
                .iter()
                .take(INITIAL_NOTIFICATION_LIMIT)
                .map(recent_booking_item)
                .collect(),
            Err(err) if err.status() == Some(StatusCode::UNAUTHORIZED) => {
                debug!("notifications loaded before authentication");
                vec![system_item(
                    format!("auth-info-{}", unix_millis(now)),
                    "Notifications Ready",
                    "Notification system is active and will show new bookings when they arrive.",
                    now,
                )]
            }
            Err(err) => {
                warn!(error = %err, "failed to load initial notifications");
                vec![system_item(
                    format!("error-{}", unix_millis(now)),
                    "Notification System Error",
                    "Unable to load recent notifications. Please check your connection.",
                    now,
                )]
            }
        };
    }

    /// Turn bookings made after `last_checked` into unread notifications at
    /// the top of the feed. Returns the bookings that were new.
    pub fn ingest(&mut self, bookings: &[RoomBooking], now: OffsetDateTime) -> Vec<RoomBooking> {
        let last_checked = self.last_checked;
        let fresh: Vec<RoomBooking> = bookings
            .iter()
            .filter(|b| parse_timestamp(&b.booking_date).is_some_and(|ts| ts > last_checked))
            .cloned()
            .collect();
        if fresh.is_empty() {
            return fresh;
        }

        let stamp = unix_millis(now);
        let mut items: Vec<NotificationItem> = fresh
            .iter()
            .map(|booking| NotificationItem {
                id: format!("booking-{}-{stamp}", booking.id),
                kind: NotificationKind::Booking,
                title: "New Booking Received".to_owned(),
                message: format!(
                    "{} booked {} room(s) for {}",
                    booking.full_name,
                    booking.room_count(),
                    booking.check_in
                ),
                timestamp: to_rfc3339(now),
                read: false,
                booking_reference: Some(booking.booking_reference.clone()),
                data: serde_json::to_value(booking).ok(),
            })
            .collect();
        items.append(&mut self.items);
        self.items = items;
        self.last_checked = now;
        fresh
    }
}

fn recent_booking_item(booking: &RoomBooking) -> NotificationItem {
    NotificationItem {
        id: format!("initial-{}", booking.id),
        kind: NotificationKind::Booking,
        title: "Recent Booking".to_owned(),
        message: format!("{} booked {} room(s)", booking.full_name, booking.room_count()),
        timestamp: booking.booking_date.clone(),
        read: true,
        booking_reference: Some(booking.booking_reference.clone()),
        data: serde_json::to_value(booking).ok(),
    }
}

fn system_item(id: String, title: &str, message: &str, now: OffsetDateTime) -> NotificationItem {
    NotificationItem {
        id,
        kind: NotificationKind::System,
        title: title.to_owned(),
        message: message.to_owned(),
        timestamp: to_rfc3339(now),
        read: false,
        booking_reference: None,
        data: None,
    }
}

// =============================================================================
// POLLER
// =============================================================================

/// Background task that keeps a [`SharedFeed`] current.
pub struct NotificationPoller;

impl NotificationPoller {
    /// Seed `feed` from the recent bookings.
    pub async fn load_initial(api: &ApiClient, feed: &SharedFeed) {
        let result = api.recent_bookings(None).await;
        let mut feed = feed.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        feed.load_initial(result, OffsetDateTime::now_utc());
    }

    /// Seed the feed, then poll `recent_bookings(5)` every `every` while the
    /// feed is enabled. New bookings are forwarded on `on_new` when given.
    /// Abort the handle on teardown.
    #[must_use]
    pub fn spawn(
        api: ApiClient,
        feed: SharedFeed,
        every: Duration,
        on_new: Option<mpsc::UnboundedSender<RoomBooking>>,
    ) -> JoinHandle<()> {
        info!(interval_secs = every.as_secs(), "notification poller started");
        tokio::spawn(async move {
            Self::load_initial(&api, &feed).await;

            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick fires immediately; the feed was just seeded.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                poll_once(&api, &feed, on_new.as_ref()).await;
            }
        })
    }
}

/// One poll cycle. Returns how many new bookings arrived.
pub async fn poll_once(
    api: &ApiClient,
    feed: &SharedFeed,
    on_new: Option<&mpsc::UnboundedSender<RoomBooking>>,
) -> usize {
    let enabled = feed
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .is_enabled();
    if !enabled {
        return 0;
    }

    let bookings = match api.recent_bookings(Some(POLL_BOOKING_LIMIT)).await {
        Ok(bookings) => bookings,
        Err(err) if err.status() == Some(StatusCode::UNAUTHORIZED) => {
            debug!("notification poll skipped: not authenticated");
            return 0;
        }
        Err(err) => {
            warn!(error = %err, "notification poll failed");
            return 0;
        }
    };

    let fresh = feed
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .ingest(&bookings, OffsetDateTime::now_utc());
    if !fresh.is_empty() {
        info!(count = fresh.len(), "new bookings received");
    }
    if let Some(tx) = on_new {
        for booking in &fresh {
            if tx.send(booking.clone()).is_err() {
                debug!("new-booking receiver dropped");
                break;
            }
        }
    }
    fresh.len()
}
