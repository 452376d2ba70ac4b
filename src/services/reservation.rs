use chrono::NaiveDateTime;
use rusqlite::Connection;

use crate::db::queries;
use crate::models::{Booking, BookingDraft, BookingStatus, RequesterIdentity};
use crate::services::overlap;

#[derive(Debug)]
pub enum BookingError {
    CarNotFound,
    DuplicateBooking { guest: bool },
    InvalidDates,
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },
    Unauthorized,
    BookingNotFound,
    Persistence(anyhow::Error),
}

impl std::fmt::Display for BookingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookingError::CarNotFound => write!(f, "Car not found"),
            BookingError::DuplicateBooking { guest: false } => write!(
                f,
                "You already have a pending booking for this car during these dates. \
                 Please check your bookings or choose different dates."
            ),
            BookingError::DuplicateBooking { guest: true } => write!(
                f,
                "A pending booking for this car already exists under this email address \
                 for these dates. Please choose different dates."
            ),
            BookingError::InvalidDates => {
                write!(f, "Check-out date must be after the check-in date")
            }
            BookingError::InvalidTransition { from, to } => write!(
                f,
                "A {} booking cannot move to {}",
                from.as_str(),
                to.as_str()
            ),
            BookingError::Unauthorized => write!(f, "Unauthorized - Admin only"),
            BookingError::BookingNotFound => write!(f, "Booking not found"),
            BookingError::Persistence(_) => {
                write!(f, "Something went wrong. Please try again.")
            }
        }
    }
}

impl std::error::Error for BookingError {}

impl From<anyhow::Error> for BookingError {
    fn from(err: anyhow::Error) -> Self {
        BookingError::Persistence(err)
    }
}

/// Reservation request as it arrives from the route layer, with the car still
/// referenced by slug and the price carried as a decimal string.
#[derive(Debug, Clone)]
pub struct ReservationRequest {
    pub car_slug: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub whatsapp: Option<String>,
    pub pickup_location: String,
    pub checkin_date: NaiveDateTime,
    pub checkout_date: NaiveDateTime,
    pub total_price: String,
    pub currency: String,
    pub notes: Option<String>,
    pub ip_address: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
}

/// Creates a reservation: resolve the car, check for an overlapping pending
/// booking held by the same requester, then persist with status `pending`.
/// The check and the insert run inside one transaction so two racing
/// requests on the same connection cannot both pass the check.
pub fn create_reservation(
    conn: &mut Connection,
    identity: &RequesterIdentity,
    request: &ReservationRequest,
) -> Result<Booking, BookingError> {
    if request.checkin_date >= request.checkout_date {
        return Err(BookingError::InvalidDates);
    }

    let tx = conn
        .transaction()
        .map_err(|e| BookingError::Persistence(e.into()))?;

    let car = queries::get_car_by_slug(&tx, &request.car_slug)?.ok_or(BookingError::CarNotFound)?;

    let conflict = overlap::has_pending_overlap(
        &tx,
        identity,
        car.id,
        request.checkin_date,
        request.checkout_date,
    )?;
    if conflict {
        return Err(BookingError::DuplicateBooking {
            guest: identity.is_guest(),
        });
    }

    let user_id = match identity {
        RequesterIdentity::User(id) => Some(id.clone()),
        RequesterIdentity::Guest(_) => None,
    };

    let draft = BookingDraft {
        user_id,
        car_id: car.id,
        // Snapshot of the car's display data; kept even if the fleet record
        // is renamed later.
        car_name: car.name,
        car_image_url: car.image_url,
        full_name: request.full_name.clone(),
        email: request.email.clone(),
        phone: request.phone.clone(),
        whatsapp: request.whatsapp.clone(),
        pickup_location: request.pickup_location.clone(),
        checkin_date: request.checkin_date,
        checkout_date: request.checkout_date,
        total_price: request.total_price.clone(),
        currency: request.currency.clone(),
        notes: request.notes.clone(),
        ip_address: request.ip_address.clone(),
        country: request.country.clone(),
        city: request.city.clone(),
    };

    let booking = queries::create_booking(&tx, &draft)?;
    tx.commit().map_err(|e| BookingError::Persistence(e.into()))?;

    Ok(booking)
}

/// Admin-only status transition. The caller resolves privilege through the
/// authorization gate and passes the verdict in; illegal lifecycle moves are
/// rejected here rather than at the store.
pub fn update_status(
    conn: &Connection,
    booking_id: i64,
    new_status: BookingStatus,
    privileged: bool,
) -> Result<Booking, BookingError> {
    if !privileged {
        return Err(BookingError::Unauthorized);
    }

    let booking =
        queries::get_booking_by_id(conn, booking_id)?.ok_or(BookingError::BookingNotFound)?;

    if !booking.status.can_transition_to(new_status) {
        return Err(BookingError::InvalidTransition {
            from: booking.status,
            to: new_status,
        });
    }

    queries::update_booking_status(conn, booking_id, new_status)?
        .ok_or(BookingError::BookingNotFound)
}
