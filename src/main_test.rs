use super::*;
use std::path::Path;

use bookings::{BookingKey, BookingsSubcommand, parse_booking_key};
use client::net::api::BookingQuery;
use client::util::booking_filter::{BookingFilter, DateFilter, SortKey, SortOrder, StatusFilter};
use menu::{FormArgs, ItemsSubcommand, MenuSubcommand, SpecialsSubcommand, guess_mime};
use records::{BookingStats, BookingStatus, DailySpecial, MenuItem, NotificationItem, RoomBooking};
use time::OffsetDateTime;

fn parse(args: &[&str]) -> Cli {
    let mut argv = vec!["hotel-admin"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap()
}

fn list_args(args: &[&str]) -> bookings::ListArgs {
    let mut argv = vec!["bookings", "list"];
    argv.extend_from_slice(args);
    match parse(&argv).command {
        Command::Bookings(cmd) => match cmd.command {
            BookingsSubcommand::List(list) => list,
            other => panic!("unexpected subcommand {other:?}"),
        },
        other => panic!("unexpected command {other:?}"),
    }
}

fn item_form(args: &[&str]) -> FormArgs {
    let mut argv = vec!["menu", "items", "create"];
    argv.extend_from_slice(args);
    match parse(&argv).command {
        Command::Menu(cmd) => match cmd.command {
            MenuSubcommand::Items(items) => match items.command {
                ItemsSubcommand::Create(form) => form,
                other => panic!("unexpected subcommand {other:?}"),
            },
            other => panic!("unexpected subcommand {other:?}"),
        },
        other => panic!("unexpected command {other:?}"),
    }
}

fn booking() -> RoomBooking {
    serde_json::from_value(serde_json::json!({
        "id": 7,
        "booking_reference": "HB-007",
        "full_name": "Alice Smith",
        "email": "alice@example.com",
        "phone": "+1 555-0107",
        "check_in": "2030-03-20",
        "check_out": "2030-03-22",
        "total_price": "240.00",
        "booking_date": "2030-03-15T08:00:00Z"
    }))
    .unwrap()
}

// =============================================================================
// Top-level parsing
// =============================================================================

#[test]
fn login_takes_email_and_password_flags() {
    let cli = parse(&["login", "--email", "admin@hotel.test", "--password", "pw"]);
    match cli.command {
        Command::Login(args) => {
            assert_eq!(args.email, "admin@hotel.test");
            assert_eq!(args.password.as_deref(), Some("pw"));
        }
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn json_flag_is_global() {
    let cli = parse(&["bookings", "stats", "--json"]);
    assert!(cli.json);
    assert!(matches!(cli.command, Command::Bookings(_)));

    let cli = parse(&["whoami"]);
    assert!(!cli.json);
}

#[test]
fn base_url_and_token_file_flags_parse() {
    let cli = parse(&["--base-url", "http://api.test/api", "--token-file", "/tmp/t.json", "logout"]);
    assert_eq!(cli.base_url.as_deref(), Some("http://api.test/api"));
    assert_eq!(cli.token_file.as_deref(), Some(Path::new("/tmp/t.json")));
    assert!(matches!(cli.command, Command::Logout));
}

#[test]
fn unknown_command_is_rejected() {
    assert!(Cli::try_parse_from(["hotel-admin", "rooms"]).is_err());
}

// =============================================================================
// Bookings
// =============================================================================

#[test]
fn list_defaults_match_default_filter_and_empty_query() {
    let args = list_args(&[]);
    assert_eq!(args.filter(), BookingFilter::default());
    assert_eq!(args.query(), BookingQuery::default());
}

#[test]
fn list_flags_split_between_server_query_and_local_filter() {
    let args = list_args(&[
        "--search",
        "smith",
        "--status",
        "confirmed",
        "--date",
        "upcoming",
        "--sort",
        "total_price",
        "--order",
        "asc",
        "--server-status",
        "pending",
        "--check-in-after",
        "2030-01-01",
        "--limit",
        "20",
    ]);

    let filter = args.filter();
    assert_eq!(filter.search, "smith");
    assert_eq!(filter.status, StatusFilter::Only(BookingStatus::Confirmed));
    assert_eq!(filter.date, DateFilter::Upcoming);
    assert_eq!(filter.sort_by, SortKey::TotalPrice);
    assert_eq!(filter.order, SortOrder::Asc);

    let query = args.query();
    assert_eq!(query.status, Some(BookingStatus::Pending));
    assert_eq!(query.check_in_after.as_deref(), Some("2030-01-01"));
    assert_eq!(query.check_in_before, None);
    assert_eq!(query.limit, Some(20));
    assert_eq!(query.search, None);
}

#[test]
fn list_rejects_unknown_filter_values() {
    assert!(Cli::try_parse_from(["hotel-admin", "bookings", "list", "--status", "lost"]).is_err());
    assert!(Cli::try_parse_from(["hotel-admin", "bookings", "list", "--date", "yesterday"]).is_err());
    assert!(Cli::try_parse_from(["hotel-admin", "bookings", "list", "--sort", "email"]).is_err());
}

#[test]
fn status_subcommand_parses_status_positionally() {
    let cli = parse(&["bookings", "status", "12", "cancelled"]);
    match cli.command {
        Command::Bookings(cmd) => match cmd.command {
            BookingsSubcommand::Status { id, status } => {
                assert_eq!(id, 12);
                assert_eq!(status, BookingStatus::Cancelled);
            }
            other => panic!("unexpected subcommand {other:?}"),
        },
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn booking_key_prefers_numeric_id() {
    assert_eq!(parse_booking_key("42"), BookingKey::Id(42));
    assert_eq!(parse_booking_key(" 42 "), BookingKey::Id(42));
    assert_eq!(parse_booking_key("HB-042"), BookingKey::Reference("HB-042"));
    assert_eq!(parse_booking_key(" HB-1 "), BookingKey::Reference("HB-1"));
}

// =============================================================================
// Menu
// =============================================================================

#[test]
fn item_form_without_image_keeps_optional_fields_unset() {
    let form = item_form(&["--name", "Soup", "--price", "6.50"]).to_form().unwrap();
    assert_eq!(form.name, "Soup");
    assert_eq!(form.description, "");
    assert_eq!(form.price, "6.50");
    assert!(form.image.is_none());
    assert_eq!(form.is_vegetarian, None);
    assert_eq!(form.is_available, None);
    assert_eq!(form.category, None);
}

#[test]
fn item_form_reads_image_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("soup.PNG");
    std::fs::write(&path, b"\x89PNG").unwrap();
    let path_str = path.to_str().unwrap();

    let form = item_form(&[
        "--name",
        "Soup",
        "--price",
        "6.50",
        "--image",
        path_str,
        "--vegetarian",
        "true",
        "--category",
        "starters",
    ])
    .to_form()
    .unwrap();

    let image = form.image.unwrap();
    assert_eq!(image.file_name, "soup.PNG");
    assert_eq!(image.mime, "image/png");
    assert_eq!(image.bytes, b"\x89PNG");
    assert_eq!(form.is_vegetarian, Some(true));
    assert_eq!(form.category.as_deref(), Some("starters"));
}

#[test]
fn item_form_missing_image_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.jpg");
    let form = item_form(&["--name", "Soup", "--price", "1", "--image", missing.to_str().unwrap()]);

    let err = form.to_form().unwrap_err();
    assert!(matches!(err, CliError::Io { .. }));
    assert!(err.to_string().contains("nope.jpg"));
}

#[test]
fn mime_guess_by_extension() {
    assert_eq!(guess_mime(Path::new("a.png")), "image/png");
    assert_eq!(guess_mime(Path::new("a.JPG")), "image/jpeg");
    assert_eq!(guess_mime(Path::new("a.jpeg")), "image/jpeg");
    assert_eq!(guess_mime(Path::new("a.gif")), "image/gif");
    assert_eq!(guess_mime(Path::new("a.webp")), "image/webp");
    assert_eq!(guess_mime(Path::new("a.bmp")), "application/octet-stream");
    assert_eq!(guess_mime(Path::new("noext")), "application/octet-stream");
}

#[test]
fn special_update_takes_id_form_and_date() {
    let cli = parse(&[
        "menu", "specials", "update", "3", "--name", "Pie", "--price", "4", "--date", "2030-05-01",
    ]);
    match cli.command {
        Command::Menu(cmd) => match cmd.command {
            MenuSubcommand::Specials(specials) => match specials.command {
                SpecialsSubcommand::Update { id, form, date } => {
                    assert_eq!(id, 3);
                    assert_eq!(form.to_form().unwrap().name, "Pie");
                    assert_eq!(date.as_deref(), Some("2030-05-01"));
                }
                other => panic!("unexpected subcommand {other:?}"),
            },
            other => panic!("unexpected subcommand {other:?}"),
        },
        other => panic!("unexpected command {other:?}"),
    }
}

// =============================================================================
// Output
// =============================================================================

#[test]
fn booking_line_shows_reference_status_and_dates() {
    let line = output::booking_line(&booking());
    assert!(line.contains("HB-007"));
    assert!(line.contains("pending"));
    assert!(line.contains("2030-03-20 -> 2030-03-22"));
    assert!(line.contains("Alice Smith"));
    assert!(line.contains("240.00"));
}

#[test]
fn menu_item_line_flags() {
    let mut item: MenuItem = serde_json::from_value(serde_json::json!({
        "id": 1, "name": "Salad", "price": "8.00",
        "image": null, "is_vegetarian": true, "is_available": false,
        "category": null, "created_at": null, "updated_at": null
    }))
    .unwrap();
    assert!(output::menu_item_line(&item).ends_with("veg,unavailable"));

    item.is_vegetarian = None;
    item.is_available = Some(true);
    assert!(output::menu_item_line(&item).ends_with("8.00  "));
}

#[test]
fn special_line_shows_visibility() {
    let mut special: DailySpecial = serde_json::from_value(serde_json::json!({
        "id": 2, "name": "Pie", "price": "4.00", "image": null, "date": "2030-05-01"
    }))
    .unwrap();
    assert!(output::special_line(&special).ends_with("2030-05-01  inactive"));
    special.is_active = true;
    assert!(output::special_line(&special).ends_with("2030-05-01  active"));
}

#[test]
fn stats_lines_cover_counts_revenue_and_occupancy() {
    let stats = BookingStats { total_bookings: 4, occupancy_rate: 62.5, ..BookingStats::default() };
    let lines = output::stats_lines(&stats);
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("bookings: 4 total"));
    assert_eq!(lines[1], "revenue: 0 total, 0 this month, 0 average");
    assert_eq!(lines[2], "occupancy: 62.5%, guests: 0");
}

#[test]
fn notification_line_marks_unread() {
    let mut item: NotificationItem = serde_json::from_value(serde_json::json!({
        "id": "n1", "type": "booking", "title": "New Booking",
        "message": "Alice booked 1 room(s)", "timestamp": "whenever",
        "read": false, "booking_reference": null, "data": null
    }))
    .unwrap();
    let now = OffsetDateTime::now_utc();
    assert_eq!(output::notification_line(&item, now), "* [whenever] New Booking: Alice booked 1 room(s)");
    item.read = true;
    assert!(output::notification_line(&item, now).starts_with("  [whenever]"));
}

#[test]
fn api_errors_render_user_message() {
    let err = CliError::from(client::ApiError::MissingAccessToken);
    assert_eq!(err.to_string(), "Your session has expired. Please log in again.");
    assert_eq!(CliError::NotLoggedIn.to_string(), "not logged in; run `hotel-admin login` first");
}
