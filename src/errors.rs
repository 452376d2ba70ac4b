use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// HTTP-boundary error for the plain read endpoints. Booking-flow failures
/// carry their own taxonomy (`services::reservation::BookingError`) and are
/// rendered into the `{success, error}` envelope by the handlers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("database error")]
    Database(anyhow::Error),

    #[error("{0}")]
    BadRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized")]
    Unauthorized,
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Database(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Database(e) => {
                tracing::error!(error = ?e, "request failed on the database");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
        };

        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
