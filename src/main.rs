use std::sync::{Arc, Mutex};

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use motorent::config::AppConfig;
use motorent::db;
use motorent::handlers;
use motorent::services::authz::TokenRoleGate;
use motorent::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;
    let db = Arc::new(Mutex::new(conn));

    let authz = TokenRoleGate::new(config.admin_token.clone(), Arc::clone(&db));

    let state = Arc::new(AppState {
        db,
        config: config.clone(),
        authz: Box::new(authz),
    });

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/cars", get(handlers::cars::list_cars))
        .route("/api/cars/:slug", get(handlers::cars::get_car))
        .route("/api/reservations", post(handlers::bookings::create_reservation))
        .route("/api/bookings", get(handlers::bookings::list_my_bookings))
        .route("/api/admin/bookings", get(handlers::admin::get_bookings))
        .route(
            "/api/admin/bookings/:id/status",
            post(handlers::admin::update_booking_status),
        )
        .route("/api/admin/cars", post(handlers::admin::create_car))
        .route("/api/admin/roles", get(handlers::admin::get_roles))
        .route("/api/admin/roles", post(handlers::admin::add_role))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
