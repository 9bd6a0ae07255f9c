//! `hotel-admin bookings ...`

use clap::{Args, Subcommand};
use client::net::api::BookingQuery;
use client::util::booking_filter::{BookingFilter, DateFilter, SortKey, SortOrder, StatusFilter};
use records::{BookingStatus, RoomBooking};
use time::OffsetDateTime;

use crate::output::{booking_line, print_json, stats_lines};
use crate::{CliContext, CliError};

#[derive(Args, Debug)]
pub(crate) struct BookingsCommand {
    #[command(subcommand)]
    pub(crate) command: BookingsSubcommand,
}

#[derive(Subcommand, Debug)]
pub(crate) enum BookingsSubcommand {
    /// List bookings, filtered server-side and then locally.
    List(ListArgs),
    /// Show one booking by numeric id or booking reference.
    Show { key: String },
    /// Change a booking's status.
    Status { id: i64, status: BookingStatus },
    Delete { id: i64 },
    /// Aggregate booking statistics.
    Stats,
    /// Newest bookings first.
    Recent {
        #[arg(long)]
        limit: Option<u32>,
    },
}

#[derive(Args, Debug, Default)]
pub(crate) struct ListArgs {
    /// Local search on name, email, reference and phone.
    #[arg(long, default_value = "")]
    search: String,
    /// all, pending, confirmed, completed or cancelled.
    #[arg(long, default_value = "all")]
    status: StatusFilter,
    /// all, today, week, month, upcoming or past.
    #[arg(long, default_value = "all")]
    date: DateFilter,
    /// booking_date, check_in, full_name, total_price or reference.
    #[arg(long, default_value = "booking_date")]
    sort: SortKey,
    #[arg(long, default_value = "desc")]
    order: SortOrder,

    /// Backend full-text search.
    #[arg(long)]
    server_search: Option<String>,
    #[arg(long)]
    server_status: Option<BookingStatus>,
    #[arg(long)]
    check_in_after: Option<String>,
    #[arg(long)]
    check_in_before: Option<String>,
    #[arg(long)]
    limit: Option<u32>,
}

impl ListArgs {
    pub(crate) fn query(&self) -> BookingQuery {
        BookingQuery {
            limit: self.limit,
            ordering: None,
            search: self.server_search.clone(),
            check_in_after: self.check_in_after.clone(),
            check_in_before: self.check_in_before.clone(),
            status: self.server_status,
        }
    }

    pub(crate) fn filter(&self) -> BookingFilter {
        BookingFilter {
            search: self.search.clone(),
            status: self.status,
            date: self.date,
            sort_by: self.sort,
            order: self.order,
        }
    }
}

/// A key that parses as an integer is an id; anything else is a reference.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum BookingKey<'a> {
    Id(i64),
    Reference(&'a str),
}

pub(crate) fn parse_booking_key(raw: &str) -> BookingKey<'_> {
    let raw = raw.trim();
    raw.parse().map_or(BookingKey::Reference(raw), BookingKey::Id)
}

pub(crate) async fn run(ctx: &CliContext, command: BookingsCommand) -> Result<(), CliError> {
    let api = &ctx.api;
    match command.command {
        BookingsSubcommand::List(args) => {
            let bookings = api.list_bookings(&args.query()).await?;
            let visible = args.filter().apply(&bookings, OffsetDateTime::now_utc());
            if ctx.json {
                print_json(&visible)?;
            } else {
                for booking in &visible {
                    println!("{}", booking_line(booking));
                }
                eprintln!("showing {} of {} bookings", visible.len(), bookings.len());
            }
            Ok(())
        }
        BookingsSubcommand::Show { key } => {
            let booking = match parse_booking_key(&key) {
                BookingKey::Id(id) => api.get_booking(id).await?,
                BookingKey::Reference(reference) => api.get_booking_by_reference(reference).await?,
            };
            print_booking(ctx, &booking)
        }
        BookingsSubcommand::Status { id, status } => {
            let booking = api.update_booking_status(id, status).await?;
            print_booking(ctx, &booking)
        }
        BookingsSubcommand::Delete { id } => {
            api.delete_booking(id).await?;
            println!("deleted booking {id}");
            Ok(())
        }
        BookingsSubcommand::Stats => {
            let stats = api.booking_stats().await?;
            if ctx.json {
                print_json(&stats)?;
            } else {
                for line in stats_lines(&stats) {
                    println!("{line}");
                }
            }
            Ok(())
        }
        BookingsSubcommand::Recent { limit } => {
            let bookings = api.recent_bookings(limit).await?;
            if ctx.json {
                print_json(&bookings)?;
            } else {
                for booking in &bookings {
                    println!("{}", booking_line(booking));
                }
            }
            Ok(())
        }
    }
}

fn print_booking(ctx: &CliContext, booking: &RoomBooking) -> Result<(), CliError> {
    if ctx.json {
        return print_json(booking);
    }
    println!("{}", booking_line(booking));
    println!("  email: {}  phone: {}", booking.email, booking.phone);
    println!(
        "  guests: {} adults, {} children  nights: {}  rooms: {}",
        booking.adults,
        booking.children,
        booking.nights,
        booking.room_count()
    );
    for room in &booking.selected_rooms {
        println!("  - {} x{} ({:?}) {}", room.name, room.quantity, room.occupancy, room.price);
    }
    if let Some(requests) = booking.special_requests.as_deref().filter(|s| !s.trim().is_empty()) {
        println!("  requests: {requests}");
    }
    println!("  booked: {}", booking.booking_date);
    Ok(())
}
