//! `hotel-admin notifications` and `hotel-admin watch`.
//!
//! `watch` is the long-running dashboard: the notification poller and stats
//! refresher run as background tasks and this loop only renders what they
//! publish. It exits on Ctrl-C or when the session expires underneath it.

use std::sync::Arc;

use client::state::notifications::{NotificationFeed, NotificationPoller};
use client::state::stats::StatsRefresher;
use records::RoomBooking;
use time::OffsetDateTime;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::output::{booking_line, notification_line, print_json, stats_lines};
use crate::{CliContext, CliError};

pub(crate) async fn run_notifications(ctx: &CliContext) -> Result<(), CliError> {
    ctx.require_session().await?;

    let now = OffsetDateTime::now_utc();
    let feed = NotificationFeed::shared(now);
    NotificationPoller::load_initial(&ctx.api, &feed).await;

    let feed = feed.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    if ctx.json {
        return print_json(feed.items());
    }
    for item in feed.items() {
        println!("{}", notification_line(item, now));
    }
    if feed.items().is_empty() {
        println!("no notifications");
    }
    Ok(())
}

pub(crate) async fn run_watch(ctx: &CliContext) -> Result<(), CliError> {
    let session = ctx.require_session().await?;
    let listener = session.spawn_auth_listener();

    let (tx, mut new_bookings) = mpsc::unbounded_channel::<RoomBooking>();
    let feed = NotificationFeed::shared(OffsetDateTime::now_utc());
    let poller = NotificationPoller::spawn(ctx.api.clone(), Arc::clone(&feed), ctx.config.notification_poll, Some(tx));

    let stats = Arc::new(StatsRefresher::new(ctx.api.clone()));
    let refresher = stats.spawn(ctx.config.stats_refresh);
    let mut stats_rx = stats.subscribe();
    let mut session_rx = session.subscribe();

    info!("watching for new bookings");
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let outcome = loop {
        tokio::select! {
            result = &mut shutdown => {
                if let Err(err) = result {
                    warn!(error = %err, "ctrl-c handler failed");
                }
                break Ok(());
            }
            Some(booking) = new_bookings.recv() => {
                println!("new booking: {}", booking_line(&booking));
            }
            Ok(()) = stats_rx.changed() => {
                let view = stats_rx.borrow_and_update().clone();
                if view.loading {
                    continue;
                }
                match view.error {
                    Some(error) => eprintln!("stats: {error}"),
                    None => {
                        for line in stats_lines(&view.stats) {
                            println!("{line}");
                        }
                    }
                }
            }
            Ok(()) = session_rx.changed() => {
                if !session_rx.borrow_and_update().is_authenticated() {
                    break Err(CliError::NotLoggedIn);
                }
            }
        }
    };

    poller.abort();
    refresher.abort();
    listener.abort();
    outcome
}
