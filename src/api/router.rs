use axum::{
    body::Body,
    extract::Request,
    routing::{get, post, delete},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{admin, auth, availability, booking, catalog, health};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tower_cookies::CookieManagerLayer;
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Auth
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/refresh", post(auth::refresh))
        .route("/api/v1/auth/logout", post(auth::logout))

        // Catalog
        .route("/api/v1/services", get(catalog::list_services))
        .route("/api/v1/barbers", get(catalog::list_barbers))

        // Public Booking Flow
        .route("/api/v1/availability/slots", get(availability::get_slots))
        .route("/api/v1/availability/dates", get(availability::get_available_dates))
        .route("/api/v1/availability/check", get(availability::check_slot))
        .route("/api/v1/disabled-dates", get(availability::list_disabled_dates))
        .route("/api/v1/bookings", post(booking::create_booking))

        // Customer Booking Management
        .route("/api/v1/bookings/lookup", get(booking::lookup_bookings))
        .route("/api/v1/bookings/{booking_id}/cancel", post(booking::cancel_booking))
        .route("/api/v1/bookings/{booking_id}/calendar.ics", get(booking::download_ics))

        // Admin
        .route("/api/v1/admin/bookings", get(admin::list_bookings))
        .route("/api/v1/admin/bookings/{booking_id}/cancel", post(admin::cancel_booking))
        .route("/api/v1/admin/bookings/{booking_id}/complete", post(admin::complete_booking))
        .route("/api/v1/admin/disabled-dates", get(admin::list_disabled_dates).post(admin::disable_date))
        .route("/api/v1/admin/disabled-dates/{date}", delete(admin::enable_date))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        admin_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .layer(CookieManagerLayer::new())
        .with_state(state)
}
