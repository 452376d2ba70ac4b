use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Booking, RequesterIdentity};
use crate::services::reservation::{self, BookingError, ReservationRequest};
use crate::state::AppState;

/// Accepts `2025-06-01T10:00:00`, `2025-06-01 10:00:00` or a bare date
/// (taken as midnight).
fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn user_id_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub fn booking_error_response(err: &BookingError) -> Response {
    let status = match err {
        BookingError::CarNotFound | BookingError::BookingNotFound => StatusCode::NOT_FOUND,
        BookingError::DuplicateBooking { .. } | BookingError::InvalidTransition { .. } => {
            StatusCode::CONFLICT
        }
        BookingError::InvalidDates => StatusCode::UNPROCESSABLE_ENTITY,
        BookingError::Unauthorized => StatusCode::UNAUTHORIZED,
        BookingError::Persistence(e) => {
            tracing::error!(error = ?e, "booking flow hit a persistence failure");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    (
        status,
        Json(serde_json::json!({"success": false, "error": err.to_string()})),
    )
        .into_response()
}

// POST /api/reservations
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationRequest {
    pub car_slug: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub whatsapp: Option<String>,
    pub pickup_location: String,
    pub checkin_date: String,
    pub checkout_date: String,
    pub total_price: String,
    pub currency: String,
    pub notes: Option<String>,
    pub ip_address: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
}

pub async fn create_reservation(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreateReservationRequest>,
) -> Result<Json<serde_json::Value>, Response> {
    let (Some(checkin_date), Some(checkout_date)) = (
        parse_datetime(&body.checkin_date),
        parse_datetime(&body.checkout_date),
    ) else {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({
                "success": false,
                "error": "Invalid date format; expected YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS"
            })),
        )
            .into_response());
    };

    // Identity established upstream; a guest request simply has no user id.
    let identity = RequesterIdentity::resolve(user_id_header(&headers), &body.email);

    let request = ReservationRequest {
        car_slug: body.car_slug,
        full_name: body.full_name,
        email: body.email,
        phone: body.phone,
        whatsapp: body.whatsapp,
        pickup_location: body.pickup_location,
        checkin_date,
        checkout_date,
        total_price: body.total_price,
        currency: body.currency,
        notes: body.notes,
        ip_address: body.ip_address,
        country: body.country,
        city: body.city,
    };

    let booking = {
        let mut db = state.db.lock().unwrap();
        reservation::create_reservation(&mut db, &identity, &request)
            .map_err(|e| booking_error_response(&e))?
    };

    tracing::info!(booking_id = booking.id, car_id = booking.car_id, "reservation created");

    Ok(Json(serde_json::json!({
        "success": true,
        "bookingId": booking.id,
        "message": "Your reservation has been submitted successfully!"
    })))
}

// GET /api/bookings
#[derive(Deserialize)]
pub struct MyBookingsQuery {
    pub email: Option<String>,
}

pub async fn list_my_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<MyBookingsQuery>,
) -> Result<Json<Vec<Booking>>, AppError> {
    let db = state.db.lock().unwrap();

    let bookings = match (user_id_header(&headers), query.email) {
        (Some(user_id), _) => queries::get_bookings_for_user(&db, &user_id)?,
        (None, Some(email)) => queries::get_bookings_for_email(&db, &email)?,
        (None, None) => {
            return Err(AppError::BadRequest(
                "provide an x-user-id header or an email query parameter".to_string(),
            ))
        }
    };

    Ok(Json(bookings))
}
