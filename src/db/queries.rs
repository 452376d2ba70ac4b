use chrono::{NaiveDateTime, Utc};
use rusqlite::{params, Connection};

use crate::models::{AdminRole, Booking, BookingDraft, BookingStatus, Car, NewCar, RequesterIdentity};

const DATE_FMT: &str = "%Y-%m-%d %H:%M:%S";

fn now_str() -> String {
    Utc::now().naive_utc().format(DATE_FMT).to_string()
}

fn parse_dt(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, DATE_FMT).unwrap_or_else(|_| Utc::now().naive_utc())
}

// ── Bookings ──

const BOOKING_COLUMNS: &str = "id, user_id, car_id, car_name, car_image_url, full_name, email, phone, whatsapp, \
     pickup_location, checkin_date, checkout_date, total_price, currency, notes, status, \
     ip_address, country, city, created_at, updated_at";

fn parse_booking_row(row: &rusqlite::Row) -> rusqlite::Result<Booking> {
    let checkin_date: String = row.get(10)?;
    let checkout_date: String = row.get(11)?;
    let status: String = row.get(15)?;
    let created_at: String = row.get(19)?;
    let updated_at: String = row.get(20)?;

    Ok(Booking {
        id: row.get(0)?,
        user_id: row.get(1)?,
        car_id: row.get(2)?,
        car_name: row.get(3)?,
        car_image_url: row.get(4)?,
        full_name: row.get(5)?,
        email: row.get(6)?,
        phone: row.get(7)?,
        whatsapp: row.get(8)?,
        pickup_location: row.get(9)?,
        checkin_date: parse_dt(&checkin_date),
        checkout_date: parse_dt(&checkout_date),
        total_price: row.get(12)?,
        currency: row.get(13)?,
        notes: row.get(14)?,
        status: BookingStatus::parse(&status),
        ip_address: row.get(16)?,
        country: row.get(17)?,
        city: row.get(18)?,
        created_at: parse_dt(&created_at),
        updated_at: parse_dt(&updated_at),
    })
}

/// Inserts a draft with `status = 'pending'` and returns the persisted row.
pub fn create_booking(conn: &Connection, draft: &BookingDraft) -> anyhow::Result<Booking> {
    let now = now_str();
    conn.execute(
        "INSERT INTO bookings (user_id, car_id, car_name, car_image_url, full_name, email, phone, whatsapp, \
             pickup_location, checkin_date, checkout_date, total_price, currency, notes, status, \
             ip_address, country, city, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)",
        params![
            draft.user_id,
            draft.car_id,
            draft.car_name,
            draft.car_image_url,
            draft.full_name,
            draft.email,
            draft.phone,
            draft.whatsapp,
            draft.pickup_location,
            draft.checkin_date.format(DATE_FMT).to_string(),
            draft.checkout_date.format(DATE_FMT).to_string(),
            draft.total_price,
            draft.currency,
            draft.notes,
            BookingStatus::Pending.as_str(),
            draft.ip_address,
            draft.country,
            draft.city,
            now,
            now,
        ],
    )?;

    let id = conn.last_insert_rowid();
    get_booking_by_id(conn, id)?
        .ok_or_else(|| anyhow::anyhow!("booking {id} missing right after insert"))
}

pub fn get_booking_by_id(conn: &Connection, id: i64) -> anyhow::Result<Option<Booking>> {
    let result = conn.query_row(
        &format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1"),
        params![id],
        parse_booking_row,
    );

    match result {
        Ok(booking) => Ok(Some(booking)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_bookings_for_user(conn: &Connection, user_id: &str) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE user_id = ?1 ORDER BY created_at DESC, id DESC"
    ))?;

    let rows = stmt.query_map(params![user_id], parse_booking_row)?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row?);
    }
    Ok(bookings)
}

pub fn get_bookings_for_email(conn: &Connection, email: &str) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE email = ?1 ORDER BY created_at DESC, id DESC"
    ))?;

    let rows = stmt.query_map(params![email], parse_booking_row)?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row?);
    }
    Ok(bookings)
}

pub fn get_all_bookings(
    conn: &Connection,
    status_filter: Option<&str>,
) -> anyhow::Result<Vec<Booking>> {
    let mut bookings = vec![];
    match status_filter {
        Some(status) => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {BOOKING_COLUMNS} FROM bookings WHERE status = ?1 ORDER BY created_at DESC, id DESC"
            ))?;
            let rows = stmt.query_map(params![status], parse_booking_row)?;
            for row in rows {
                bookings.push(row?);
            }
        }
        None => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {BOOKING_COLUMNS} FROM bookings ORDER BY created_at DESC, id DESC"
            ))?;
            let rows = stmt.query_map([], parse_booking_row)?;
            for row in rows {
                bookings.push(row?);
            }
        }
    }
    Ok(bookings)
}

/// Sets the status and refreshes `updated_at`. Transition legality is the
/// lifecycle manager's job, not the store's. Returns the updated row, or
/// `None` when the id does not exist.
pub fn update_booking_status(
    conn: &Connection,
    id: i64,
    status: BookingStatus,
) -> anyhow::Result<Option<Booking>> {
    let count = conn.execute(
        "UPDATE bookings SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status.as_str(), now_str(), id],
    )?;

    if count == 0 {
        return Ok(None);
    }
    get_booking_by_id(conn, id)
}

/// Pending bookings for a car, filtered by the resolved identity key: the
/// user id for authenticated requesters, the contact email for guests. The
/// two filters are never combined.
pub fn get_pending_bookings_for_car(
    conn: &Connection,
    car_id: i64,
    identity: &RequesterIdentity,
) -> anyhow::Result<Vec<Booking>> {
    let (clause, key) = match identity {
        RequesterIdentity::User(id) => ("user_id = ?2", id.as_str()),
        RequesterIdentity::Guest(email) => ("email = ?2", email.as_str()),
    };

    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE car_id = ?1 AND status = 'pending' AND {clause}"
    ))?;

    let rows = stmt.query_map(params![car_id, key], parse_booking_row)?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row?);
    }
    Ok(bookings)
}

// ── Cars ──

const CAR_COLUMNS: &str =
    "id, slug, name, image_url, price_per_day, currency, status, created_at, updated_at";

fn parse_car_row(row: &rusqlite::Row) -> rusqlite::Result<Car> {
    let created_at: String = row.get(7)?;
    let updated_at: String = row.get(8)?;

    Ok(Car {
        id: row.get(0)?,
        slug: row.get(1)?,
        name: row.get(2)?,
        image_url: row.get(3)?,
        price_per_day: row.get(4)?,
        currency: row.get(5)?,
        status: row.get(6)?,
        created_at: parse_dt(&created_at),
        updated_at: parse_dt(&updated_at),
    })
}

pub fn create_car(conn: &Connection, car: &NewCar) -> anyhow::Result<Car> {
    conn.execute(
        "INSERT INTO cars (slug, name, image_url, price_per_day, currency) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![car.slug, car.name, car.image_url, car.price_per_day, car.currency],
    )?;

    let id = conn.last_insert_rowid();
    conn.query_row(
        &format!("SELECT {CAR_COLUMNS} FROM cars WHERE id = ?1"),
        params![id],
        parse_car_row,
    )
    .map_err(Into::into)
}

pub fn get_car_by_slug(conn: &Connection, slug: &str) -> anyhow::Result<Option<Car>> {
    let result = conn.query_row(
        &format!("SELECT {CAR_COLUMNS} FROM cars WHERE slug = ?1"),
        params![slug],
        parse_car_row,
    );

    match result {
        Ok(car) => Ok(Some(car)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_cars(conn: &Connection) -> anyhow::Result<Vec<Car>> {
    let mut stmt = conn.prepare(&format!("SELECT {CAR_COLUMNS} FROM cars ORDER BY name ASC"))?;
    let rows = stmt.query_map([], parse_car_row)?;

    let mut cars = vec![];
    for row in rows {
        cars.push(row?);
    }
    Ok(cars)
}

// ── Admin roles ──

pub fn is_admin_email(conn: &Connection, email: &str) -> anyhow::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM admin_roles WHERE email = ?1",
        params![email],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn add_admin_role(
    conn: &Connection,
    user_id: &str,
    email: &str,
    added_by: &str,
) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO admin_roles (user_id, email, added_by) VALUES (?1, ?2, ?3)
         ON CONFLICT(email) DO UPDATE SET user_id = excluded.user_id, added_by = excluded.added_by",
        params![user_id, email, added_by],
    )?;
    Ok(())
}

pub fn list_admins(conn: &Connection) -> anyhow::Result<Vec<AdminRole>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, email, role, added_by, created_at FROM admin_roles ORDER BY created_at DESC",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(AdminRole {
            id: row.get(0)?,
            user_id: row.get(1)?,
            email: row.get(2)?,
            role: row.get(3)?,
            added_by: row.get(4)?,
            created_at: row.get(5)?,
        })
    })?;

    let mut admins = vec![];
    for row in rows {
        admins.push(row?);
    }
    Ok(admins)
}
