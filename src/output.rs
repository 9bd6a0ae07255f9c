//! Stdout rendering: pretty JSON or one summary line per record.

use records::{BookingStats, DailySpecial, MenuItem, NotificationItem, RoomBooking};
use serde::Serialize;
use time::OffsetDateTime;

use client::util::timestamps::format_relative;

use crate::CliError;

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

pub(crate) fn booking_line(booking: &RoomBooking) -> String {
    format!(
        "{:>5}  {:<12} {:<9}  {} -> {}  {:<24} {:>10}",
        booking.id,
        booking.booking_reference,
        booking.display_status(),
        booking.check_in,
        booking.check_out,
        booking.full_name,
        booking.total_price
    )
}

pub(crate) fn menu_item_line(item: &MenuItem) -> String {
    let mut flags = Vec::new();
    if item.is_vegetarian == Some(true) {
        flags.push("veg");
    }
    if item.is_available == Some(false) {
        flags.push("unavailable");
    }
    format!(
        "{:>5}  {:<28} {:>8}  {}",
        item.id,
        item.name,
        item.price,
        flags.join(",")
    )
}

pub(crate) fn special_line(special: &DailySpecial) -> String {
    let state = if special.is_active { "active" } else { "inactive" };
    format!(
        "{:>5}  {:<28} {:>8}  {}  {state}",
        special.id, special.name, special.price, special.date
    )
}

pub(crate) fn stats_lines(stats: &BookingStats) -> Vec<String> {
    vec![
        format!(
            "bookings: {} total, {} pending, {} confirmed, {} completed, {} cancelled",
            stats.total_bookings,
            stats.pending_bookings,
            stats.confirmed_bookings,
            stats.completed_bookings,
            stats.cancelled_bookings
        ),
        format!(
            "revenue: {} total, {} this month, {} average",
            stats.total_revenue, stats.monthly_revenue, stats.average_booking_value
        ),
        format!("occupancy: {:.1}%, guests: {}", stats.occupancy_rate, stats.total_guests),
    ]
}

pub(crate) fn notification_line(item: &NotificationItem, now: OffsetDateTime) -> String {
    let marker = if item.read { ' ' } else { '*' };
    format!(
        "{marker} [{}] {}: {}",
        format_relative(&item.timestamp, now),
        item.title,
        item.message
    )
}
