use super::*;
use time::macros::datetime;

const NOW: OffsetDateTime = datetime!(2030-03-15 10:00 UTC);

fn booking(id: i64, name: &str, status: Option<&str>, total: &str, booked: &str, check_in: &str) -> RoomBooking {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "booking_reference": format!("HB-{id:03}"),
        "full_name": name,
        "email": format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        "phone": format!("+1 555-01{id:02}"),
        "check_in": check_in,
        "check_out": "2030-04-01",
        "total_price": total,
        "booking_date": booked,
        "status": status
    }))
    .unwrap()
}

fn fixture() -> Vec<RoomBooking> {
    vec![
        booking(1, "Alice Smith", Some("pending"), "120.00", "2030-03-15T08:00:00Z", "2030-03-20"),
        booking(2, "bob Jones", Some("confirmed"), "99.50", "2030-03-10T08:00:00Z", "2030-03-01"),
        booking(3, "Carol White", Some("cancelled"), "1000", "2030-02-01T08:00:00Z", "2030-03-15"),
        booking(4, "Dan Brown", None, "abc", "not-a-date", "garbage"),
    ]
}

fn ids(list: &[&RoomBooking]) -> Vec<i64> {
    list.iter().map(|b| b.id).collect()
}

// =============================================================================
// Defaults
// =============================================================================

#[test]
fn default_is_all_all_newest_first() {
    let filter = BookingFilter::default();
    assert_eq!(filter.status, StatusFilter::All);
    assert_eq!(filter.date, DateFilter::All);
    assert_eq!(filter.sort_by, SortKey::BookingDate);
    assert_eq!(filter.order, SortOrder::Desc);

    let data = fixture();
    // Unparsable booking_date sorts lowest, so it lands last when descending.
    assert_eq!(ids(&filter.apply(&data, NOW)), vec![1, 2, 3, 4]);
}

// =============================================================================
// Search
// =============================================================================

#[test]
fn search_is_case_insensitive_on_name_email_reference() {
    let data = fixture();
    let mut filter = BookingFilter { search: "ALICE".into(), ..BookingFilter::default() };
    assert_eq!(ids(&filter.apply(&data, NOW)), vec![1]);

    filter.search = "jones@EXAMPLE".into();
    assert_eq!(ids(&filter.apply(&data, NOW)), vec![2]);

    filter.search = "hb-003".into();
    assert_eq!(ids(&filter.apply(&data, NOW)), vec![3]);
}

#[test]
fn search_matches_phone_as_raw_substring() {
    let data = fixture();
    let filter = BookingFilter { search: "555-0104".into(), ..BookingFilter::default() };
    assert_eq!(ids(&filter.apply(&data, NOW)), vec![4]);
}

#[test]
fn search_with_no_hits_is_empty() {
    let data = fixture();
    let filter = BookingFilter { search: "zzz".into(), ..BookingFilter::default() };
    assert!(filter.apply(&data, NOW).is_empty());
}

// =============================================================================
// Status
// =============================================================================

#[test]
fn status_filter_is_exact_and_skips_missing_status() {
    let data = fixture();
    let filter = BookingFilter {
        status: StatusFilter::Only(BookingStatus::Pending),
        ..BookingFilter::default()
    };
    assert_eq!(ids(&filter.apply(&data, NOW)), vec![1]);
}

#[test]
fn status_filter_parses_all_and_statuses() {
    assert_eq!("all".parse::<StatusFilter>().unwrap(), StatusFilter::All);
    assert_eq!(
        "Confirmed".parse::<StatusFilter>().unwrap(),
        StatusFilter::Only(BookingStatus::Confirmed)
    );
    assert!("archived".parse::<StatusFilter>().is_err());
}

// =============================================================================
// Date windows
// =============================================================================

#[test]
fn booking_date_windows() {
    let data = fixture();
    let with = |date: DateFilter| BookingFilter { date, sort_by: SortKey::Reference, order: SortOrder::Asc, ..BookingFilter::default() };

    assert_eq!(ids(&with(DateFilter::Today).apply(&data, NOW)), vec![1]);
    assert_eq!(ids(&with(DateFilter::Week).apply(&data, NOW)), vec![1, 2]);
    assert_eq!(ids(&with(DateFilter::Month).apply(&data, NOW)), vec![1, 2]);
    assert_eq!(ids(&with(DateFilter::All).apply(&data, NOW)), vec![1, 2, 3, 4]);
}

#[test]
fn check_in_windows_split_at_midnight() {
    let data = fixture();
    let with = |date: DateFilter| BookingFilter { date, sort_by: SortKey::Reference, order: SortOrder::Asc, ..BookingFilter::default() };

    // Booking 3 checks in today: upcoming, not past. Booking 4 is in neither.
    assert_eq!(ids(&with(DateFilter::Upcoming).apply(&data, NOW)), vec![1, 3]);
    assert_eq!(ids(&with(DateFilter::Past).apply(&data, NOW)), vec![2]);
}

#[test]
fn month_window_is_thirty_days() {
    let data = vec![
        booking(1, "A", None, "1", "2030-02-13T00:00:00Z", "2030-03-01"),
        booking(2, "B", None, "1", "2030-02-12T23:59:59Z", "2030-03-01"),
    ];
    let filter = BookingFilter { date: DateFilter::Month, ..BookingFilter::default() };
    assert_eq!(ids(&filter.apply(&data, NOW)), vec![1]);
}

// =============================================================================
// Sorting
// =============================================================================

#[test]
fn sort_by_name_ignores_case() {
    let data = fixture();
    let filter = BookingFilter { sort_by: SortKey::FullName, order: SortOrder::Asc, ..BookingFilter::default() };
    assert_eq!(ids(&filter.apply(&data, NOW)), vec![1, 2, 3, 4]);
}

#[test]
fn sort_by_total_price_is_numeric() {
    let data = fixture();
    let filter = BookingFilter { sort_by: SortKey::TotalPrice, order: SortOrder::Asc, ..BookingFilter::default() };
    assert_eq!(ids(&filter.apply(&data, NOW)), vec![4, 2, 1, 3]);
}

#[test]
fn sort_by_check_in_and_reference() {
    let data = fixture();
    let mut filter = BookingFilter { sort_by: SortKey::CheckIn, order: SortOrder::Asc, ..BookingFilter::default() };
    assert_eq!(ids(&filter.apply(&data, NOW)), vec![4, 2, 3, 1]);

    filter.sort_by = SortKey::Reference;
    filter.order = SortOrder::Desc;
    assert_eq!(ids(&filter.apply(&data, NOW)), vec![4, 3, 2, 1]);
}

#[test]
fn toggling_order_reverses_exactly_including_ties() {
    let data = vec![
        booking(1, "Same", None, "10", "2030-03-01T00:00:00Z", "2030-03-20"),
        booking(2, "Same", None, "10", "2030-03-01T00:00:00Z", "2030-03-20"),
        booking(3, "Other", None, "5", "2030-03-02T00:00:00Z", "2030-03-20"),
    ];
    let mut filter = BookingFilter { sort_by: SortKey::TotalPrice, order: SortOrder::Asc, ..BookingFilter::default() };
    let asc = ids(&filter.apply(&data, NOW));
    assert_eq!(asc, vec![3, 1, 2]);

    filter.toggle_order();
    let mut desc = ids(&filter.apply(&data, NOW));
    desc.reverse();
    assert_eq!(desc, asc);

    filter.toggle_order();
    assert_eq!(filter.order, SortOrder::Asc);
    assert_eq!(ids(&filter.apply(&data, NOW)), asc);
}

#[test]
fn sort_keys_parse_from_field_names() {
    assert_eq!("total_price".parse::<SortKey>().unwrap(), SortKey::TotalPrice);
    assert_eq!("reference".parse::<SortKey>().unwrap(), SortKey::Reference);
    assert_eq!("booking_reference".parse::<SortKey>().unwrap(), SortKey::Reference);
    assert!("price".parse::<SortKey>().is_err());
    assert_eq!("ASC".parse::<SortOrder>().unwrap(), SortOrder::Asc);
    assert_eq!("week".parse::<DateFilter>().unwrap(), DateFilter::Week);
}

#[test]
fn matches_agrees_with_apply() {
    let data = fixture();
    let filter = BookingFilter { search: "o".into(), date: DateFilter::Week, ..BookingFilter::default() };
    let expected: Vec<i64> = data.iter().filter(|b| filter.matches(b, NOW)).map(|b| b.id).collect();
    let mut applied = ids(&filter.apply(&data, NOW));
    applied.sort_unstable();
    assert_eq!(applied, expected);
}
