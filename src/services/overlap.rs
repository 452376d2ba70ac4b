use chrono::NaiveDateTime;
use rusqlite::Connection;

use crate::db::queries;
use crate::models::RequesterIdentity;

/// Half-open interval overlap: `[a_start, a_end)` against `[b_start, b_end)`.
/// Back-to-back ranges (one ends exactly where the other starts) do not
/// overlap, so a checkout day can double as the next customer's checkin day.
pub fn ranges_overlap(
    a_start: NaiveDateTime,
    a_end: NaiveDateTime,
    b_start: NaiveDateTime,
    b_end: NaiveDateTime,
) -> bool {
    a_start < b_end && b_start < a_end
}

/// Returns true when the requester already holds a pending booking for this
/// car whose dates overlap the requested range. Only pending bookings block;
/// confirmed, cancelled and completed ones are out of the running. A store
/// failure propagates rather than reading as "no conflict": if we cannot
/// verify, we cannot book.
pub fn has_pending_overlap(
    conn: &Connection,
    identity: &RequesterIdentity,
    car_id: i64,
    checkin: NaiveDateTime,
    checkout: NaiveDateTime,
) -> anyhow::Result<bool> {
    let candidates = queries::get_pending_bookings_for_car(conn, car_id, identity)?;

    Ok(candidates
        .iter()
        .any(|b| ranges_overlap(checkin, checkout, b.checkin_date, b.checkout_date)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::models::{BookingDraft, BookingStatus, NewCar};

    fn setup_db() -> Connection {
        db::init_db(":memory:").unwrap()
    }

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn seed_car(conn: &Connection, slug: &str) -> i64 {
        queries::create_car(
            conn,
            &NewCar {
                slug: slug.to_string(),
                name: "Test Car".to_string(),
                image_url: None,
                price_per_day: "100.00".to_string(),
                currency: "usd".to_string(),
            },
        )
        .unwrap()
        .id
    }

    fn seed_booking(
        conn: &Connection,
        car_id: i64,
        user_id: Option<&str>,
        email: &str,
        checkin: &str,
        checkout: &str,
    ) -> i64 {
        let draft = BookingDraft {
            user_id: user_id.map(str::to_string),
            car_id,
            car_name: "Test Car".to_string(),
            car_image_url: None,
            full_name: "Alice Example".to_string(),
            email: email.to_string(),
            phone: "+15551110000".to_string(),
            whatsapp: None,
            pickup_location: "Airport".to_string(),
            checkin_date: dt(checkin),
            checkout_date: dt(checkout),
            total_price: "400.00".to_string(),
            currency: "usd".to_string(),
            notes: None,
            ip_address: None,
            country: None,
            city: None,
        };
        queries::create_booking(conn, &draft).unwrap().id
    }

    #[test]
    fn test_half_open_overlap_rules() {
        let cases = [
            // identical ranges overlap
            ("2025-06-01 00:00", "2025-06-05 00:00", "2025-06-01 00:00", "2025-06-05 00:00", true),
            // partial overlap at the tail
            ("2025-06-03 00:00", "2025-06-07 00:00", "2025-06-01 00:00", "2025-06-05 00:00", true),
            // requested range fully contains the existing one
            ("2025-06-01 00:00", "2025-06-10 00:00", "2025-06-03 00:00", "2025-06-05 00:00", true),
            // existing range fully contains the requested one
            ("2025-06-03 00:00", "2025-06-04 00:00", "2025-06-01 00:00", "2025-06-05 00:00", true),
            // adjacent: new starts exactly at existing end
            ("2025-06-05 00:00", "2025-06-10 00:00", "2025-06-01 00:00", "2025-06-05 00:00", false),
            // adjacent the other way around
            ("2025-05-28 00:00", "2025-06-01 00:00", "2025-06-01 00:00", "2025-06-05 00:00", false),
            // disjoint
            ("2025-07-01 00:00", "2025-07-05 00:00", "2025-06-01 00:00", "2025-06-05 00:00", false),
        ];

        for (a1, a2, b1, b2, expected) in cases {
            assert_eq!(
                ranges_overlap(dt(a1), dt(a2), dt(b1), dt(b2)),
                expected,
                "[{a1}, {a2}) vs [{b1}, {b2})"
            );
        }
    }

    #[test]
    fn test_overlap_matches_day_by_day_oracle() {
        // Compare against a naive day-set intersection over a small grid.
        let base = dt("2025-06-01 00:00");
        for a1 in 0..8i64 {
            for a2 in (a1 + 1)..9 {
                for b1 in 0..8i64 {
                    for b2 in (b1 + 1)..9 {
                        let days_a: Vec<i64> = (a1..a2).collect();
                        let days_b: Vec<i64> = (b1..b2).collect();
                        let expected = days_a.iter().any(|d| days_b.contains(d));

                        let got = ranges_overlap(
                            base + chrono::Duration::days(a1),
                            base + chrono::Duration::days(a2),
                            base + chrono::Duration::days(b1),
                            base + chrono::Duration::days(b2),
                        );
                        assert_eq!(got, expected, "[{a1},{a2}) vs [{b1},{b2})");
                    }
                }
            }
        }
    }

    #[test]
    fn test_guest_overlap_detected() {
        let conn = setup_db();
        let car_id = seed_car(&conn, "roadster");
        seed_booking(&conn, car_id, None, "guest@example.com", "2025-06-01 00:00", "2025-06-05 00:00");

        let identity = RequesterIdentity::Guest("guest@example.com".to_string());
        let hit = has_pending_overlap(&conn, &identity, car_id, dt("2025-06-03 00:00"), dt("2025-06-07 00:00")).unwrap();
        assert!(hit);
    }

    #[test]
    fn test_adjacent_booking_does_not_block() {
        let conn = setup_db();
        let car_id = seed_car(&conn, "roadster");
        seed_booking(&conn, car_id, None, "guest@example.com", "2025-06-01 00:00", "2025-06-05 00:00");

        let identity = RequesterIdentity::Guest("guest@example.com".to_string());
        let hit = has_pending_overlap(&conn, &identity, car_id, dt("2025-06-05 00:00"), dt("2025-06-10 00:00")).unwrap();
        assert!(!hit);
    }

    #[test]
    fn test_other_car_does_not_block() {
        let conn = setup_db();
        let car_a = seed_car(&conn, "roadster");
        let car_b = seed_car(&conn, "estate");
        seed_booking(&conn, car_a, None, "guest@example.com", "2025-06-01 00:00", "2025-06-05 00:00");

        let identity = RequesterIdentity::Guest("guest@example.com".to_string());
        let hit = has_pending_overlap(&conn, &identity, car_b, dt("2025-06-01 00:00"), dt("2025-06-05 00:00")).unwrap();
        assert!(!hit);
    }

    #[test]
    fn test_identity_precedence_user_filter_ignores_email_rows() {
        let conn = setup_db();
        let car_id = seed_car(&conn, "roadster");
        // Guest booking under the email, no user id attached.
        seed_booking(&conn, car_id, None, "shared@example.com", "2025-06-01 00:00", "2025-06-05 00:00");

        // An authenticated requester who happens to use the same contact
        // email is keyed by user id alone.
        let identity = RequesterIdentity::User("user_123".to_string());
        let hit = has_pending_overlap(&conn, &identity, car_id, dt("2025-06-01 00:00"), dt("2025-06-05 00:00")).unwrap();
        assert!(!hit);
    }

    #[test]
    fn test_guest_filter_ignores_other_users_rows() {
        let conn = setup_db();
        let car_id = seed_car(&conn, "roadster");
        seed_booking(&conn, car_id, Some("user_123"), "other@example.com", "2025-06-01 00:00", "2025-06-05 00:00");

        let identity = RequesterIdentity::Guest("guest@example.com".to_string());
        let hit = has_pending_overlap(&conn, &identity, car_id, dt("2025-06-01 00:00"), dt("2025-06-05 00:00")).unwrap();
        assert!(!hit);
    }

    #[test]
    fn test_non_pending_bookings_never_block() {
        let conn = setup_db();
        let car_id = seed_car(&conn, "roadster");
        let identity = RequesterIdentity::Guest("guest@example.com".to_string());

        for status in [
            BookingStatus::Confirmed,
            BookingStatus::Cancelled,
            BookingStatus::Completed,
        ] {
            let id = seed_booking(&conn, car_id, None, "guest@example.com", "2025-06-01 00:00", "2025-06-05 00:00");
            queries::update_booking_status(&conn, id, status).unwrap();

            let hit = has_pending_overlap(&conn, &identity, car_id, dt("2025-06-01 00:00"), dt("2025-06-05 00:00")).unwrap();
            assert!(!hit, "{} booking must not block", status.as_str());
        }
    }
}
