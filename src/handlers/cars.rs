use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::Car;
use crate::state::AppState;

// GET /api/cars
pub async fn list_cars(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Car>>, AppError> {
    let db = state.db.lock().unwrap();
    let cars = queries::get_cars(&db)?;
    Ok(Json(cars))
}

// GET /api/cars/:slug
pub async fn get_car(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<Car>, AppError> {
    let db = state.db.lock().unwrap();
    let car = queries::get_car_by_slug(&db, &slug)?
        .ok_or_else(|| AppError::NotFound(format!("car '{slug}'")))?;
    Ok(Json(car))
}
