//! Booking list filters combine with AND semantics.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use proptest::prelude::*;

use eventease::models::{BookingFilter, NewBooking, NewEvent, NewEventType, NewVenue};
use eventease::store::{MemoryStore, Store};

fn base() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// A stored booking as the test inserted it: venue index, hour offset and id.
type Row = (usize, i64, i64);

async fn seeded(bookings: &[(usize, i64)]) -> (MemoryStore, Vec<i64>, Vec<Row>) {
    let store = MemoryStore::new();
    let event_type = store
        .insert_event_type(&NewEventType {
            event_type_name: "Concert".into(),
        })
        .await
        .unwrap();
    let event = store
        .insert_event(&NewEvent {
            event_name: "Jazz Night".into(),
            event_date: base(),
            description: None,
            event_type_id: event_type.event_type_id,
        })
        .await
        .unwrap();

    let mut venues = Vec::new();
    for i in 0..3 {
        let venue = store
            .insert_venue(&NewVenue {
                venue_name: format!("Hall {i}"),
                location: "Durban".into(),
                capacity: 10,
                availability: true,
                image_url: None,
            })
            .await
            .unwrap();
        venues.push(venue.venue_id);
    }

    let mut rows: Vec<Row> = Vec::new();
    for &(venue, hours) in bookings {
        let inserted = store
            .insert_booking(&NewBooking {
                event_id: event.event_id,
                venue_id: venues[venue],
                booking_date: base() + Duration::hours(hours),
            })
            .await;
        // Only the first booking of a venue slot is kept.
        let taken = rows.iter().any(|&(v, h, _)| v == venue && h == hours);
        match inserted {
            Ok(booking) => {
                assert!(!taken);
                rows.push((venue, hours, booking.booking_id));
            }
            Err(_) => assert!(taken),
        }
    }
    (store, venues, rows)
}

async fn ids(store: &MemoryStore, filter: &BookingFilter) -> Vec<i64> {
    let mut ids: Vec<i64> = store
        .list_bookings(filter)
        .await
        .unwrap()
        .into_iter()
        .map(|b| b.booking_id)
        .collect();
    ids.sort_unstable();
    ids
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn combined_filter_keeps_exactly_the_matching_bookings(
        bookings in prop::collection::vec((0usize..3, 0i64..96), 0..40),
        venue in prop::option::of(0usize..3),
        start in prop::option::of(0i64..96),
        end in prop::option::of(0i64..96),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        runtime.block_on(async {
            let (store, venues, rows) = seeded(&bookings).await;
            let filter = BookingFilter {
                venue_id: venue.map(|v| venues[v]),
                start_date: start.map(|h| base() + Duration::hours(h)),
                end_date: end.map(|h| base() + Duration::hours(h)),
            };

            // Worked out from the inserted rows alone; both bounds are inclusive.
            let mut expected: Vec<i64> = rows
                .iter()
                .filter(|&&(v, h, _)| {
                    venue.map_or(true, |want| want == v)
                        && start.map_or(true, |from| h >= from)
                        && end.map_or(true, |to| h <= to)
                })
                .map(|&(_, _, id)| id)
                .collect();
            expected.sort_unstable();

            assert_eq!(ids(&store, &filter).await, expected);
        });
    }
}
