use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::db::queries;
use crate::handlers::bookings::booking_error_response;
use crate::models::{AdminRole, Booking, BookingStatus, Car, NewCar};
use crate::services::authz::AdminCredentials;
use crate::services::reservation;
use crate::state::AppState;

fn credentials(headers: &HeaderMap) -> AdminCredentials {
    let bearer_token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string);
    let email = headers
        .get("x-admin-email")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    AdminCredentials {
        bearer_token,
        email,
    }
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({"error": "unauthorized"})),
    )
        .into_response()
}

fn internal_error(e: &anyhow::Error) -> Response {
    tracing::error!(error = ?e, "admin request failed on the database");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({"error": "database error"})),
    )
        .into_response()
}

async fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<(), Response> {
    if state.authz.is_privileged(&credentials(headers)).await {
        Ok(())
    } else {
        Err(unauthorized())
    }
}

// GET /api/admin/bookings
#[derive(Deserialize)]
pub struct BookingsQuery {
    pub status: Option<String>,
}

pub async fn get_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<Vec<Booking>>, Response> {
    require_admin(&state, &headers).await?;

    let bookings = {
        let db = state.db.lock().unwrap();
        queries::get_all_bookings(&db, query.status.as_deref()).map_err(|e| internal_error(&e))?
    };

    Ok(Json(bookings))
}

// POST /api/admin/bookings/:id/status
#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

pub async fn update_booking_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<serde_json::Value>, Response> {
    let Some(new_status) = BookingStatus::try_parse(&body.status) else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "success": false,
                "error": format!("unknown status '{}'", body.status)
            })),
        )
            .into_response());
    };

    // The gate's verdict flows into the lifecycle manager, which owns the
    // unauthorized failure path.
    let privileged = state.authz.is_privileged(&credentials(&headers)).await;

    let booking = {
        let db = state.db.lock().unwrap();
        reservation::update_status(&db, id, new_status, privileged)
            .map_err(|e| booking_error_response(&e))?
    };

    tracing::info!(booking_id = id, status = new_status.as_str(), "booking status updated");

    Ok(Json(serde_json::json!({"success": true, "booking": booking})))
}

// POST /api/admin/cars
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCarRequest {
    pub slug: String,
    pub name: String,
    pub image_url: Option<String>,
    pub price_per_day: String,
    pub currency: Option<String>,
}

pub async fn create_car(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreateCarRequest>,
) -> Result<Json<Car>, Response> {
    require_admin(&state, &headers).await?;

    let car = {
        let db = state.db.lock().unwrap();
        queries::create_car(
            &db,
            &NewCar {
                slug: body.slug,
                name: body.name,
                image_url: body.image_url,
                price_per_day: body.price_per_day,
                currency: body.currency.unwrap_or_else(|| "usd".to_string()),
            },
        )
        .map_err(|e| internal_error(&e))?
    };

    Ok(Json(car))
}

// GET /api/admin/roles
pub async fn get_roles(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<AdminRole>>, Response> {
    require_admin(&state, &headers).await?;

    let admins = {
        let db = state.db.lock().unwrap();
        queries::list_admins(&db).map_err(|e| internal_error(&e))?
    };

    Ok(Json(admins))
}

// POST /api/admin/roles
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddRoleRequest {
    pub user_id: String,
    pub email: String,
    pub added_by: String,
}

pub async fn add_role(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<AddRoleRequest>,
) -> Result<Json<serde_json::Value>, Response> {
    require_admin(&state, &headers).await?;

    {
        let db = state.db.lock().unwrap();
        queries::add_admin_role(&db, &body.user_id, &body.email, &body.added_by)
            .map_err(|e| internal_error(&e))?;
    }

    Ok(Json(serde_json::json!({"ok": true})))
}
