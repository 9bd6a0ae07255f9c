//! Dashboard statistics with periodic refresh.
//!
//! The refresher fetches once on start and then on a fixed interval,
//! publishing a [`StatsView`] on a `watch` channel. A failed fetch keeps the
//! last good numbers and only sets the error.

#[cfg(test)]
#[path = "stats_test.rs"]
mod stats_test;

use std::sync::Arc;
use std::time::Duration;

use records::BookingStats;
use time::OffsetDateTime;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::net::api::ApiClient;

pub const STATS_ERROR_MESSAGE: &str = "Failed to fetch statistics";

#[derive(Clone, Debug, PartialEq)]
pub struct StatsView {
    pub stats: BookingStats,
    pub loading: bool,
    pub error: Option<String>,
    /// When `stats` was last replaced by a successful fetch.
    pub last_updated: Option<OffsetDateTime>,
}

impl Default for StatsView {
    fn default() -> Self {
        Self { stats: BookingStats::default(), loading: true, error: None, last_updated: None }
    }
}

pub struct StatsRefresher {
    api: ApiClient,
    state: watch::Sender<StatsView>,
}

impl StatsRefresher {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        let (state, _) = watch::channel(StatsView::default());
        Self { api, state }
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<StatsView> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn snapshot(&self) -> StatsView {
        self.state.borrow().clone()
    }

    /// Fetch now. Returns whether the fetch succeeded.
    pub async fn refresh_now(&self) -> bool {
        self.state.send_modify(|v| {
            v.loading = true;
            v.error = None;
        });

        match self.api.booking_stats().await {
            Ok(stats) => {
                debug!(total = stats.total_bookings, "booking stats refreshed");
                self.state.send_modify(|v| {
                    v.stats = stats;
                    v.loading = false;
                    v.last_updated = Some(OffsetDateTime::now_utc());
                });
                true
            }
            Err(err) => {
                warn!(error = %err, "failed to fetch booking stats");
                self.state.send_modify(|v| {
                    v.loading = false;
                    v.error = Some(STATS_ERROR_MESSAGE.to_owned());
                });
                false
            }
        }
    }

    /// Refresh immediately and then every `every`. Abort the handle on teardown.
    #[must_use]
    pub fn spawn(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let refresher = Arc::clone(self);
        info!(interval_secs = every.as_secs(), "stats refresher started");
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                refresher.refresh_now().await;
            }
        })
    }
}
