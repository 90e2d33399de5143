use axum::{
    extract::{State, Path, Query},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use crate::state::AppState;
use crate::api::dtos::requests::{CreateBookingRequest, CustomerCancelRequest};
use crate::api::handlers::required_param;
use crate::domain::services::booking_service::BookingRequest;
use crate::domain::services::calendar::generate_ics;
use crate::domain::services::schedule::{parse_date, parse_slot};
use crate::error::AppError;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let request = BookingRequest {
        date: parse_date(&payload.date)?,
        time: parse_slot(&payload.time)?,
        service_id: payload.service_id,
        barber_id: payload.barber_id,
        name: payload.customer_name,
        phone: payload.customer_phone,
        email: payload.customer_email,
    };

    let booking = state.booking_service.create_booking(request).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

pub async fn lookup_bookings(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let phone = required_param(&params, "phone")?;
    let bookings = state.booking_service.bookings_by_phone(phone).await?;
    Ok(Json(bookings))
}

pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
    Json(payload): Json<CustomerCancelRequest>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.booking_service.cancel_customer_booking(&booking_id, &payload.phone).await?;
    info!("Customer cancelled booking {}", booking.id);
    Ok(Json(booking))
}

pub async fn download_ics(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let phone = required_param(&params, "phone")?;
    let booking = state.booking_service.find_customer_booking(&booking_id, phone).await?;
    if !booking.is_confirmed() {
        return Err(AppError::NotFound("No confirmed booking with this id".into()));
    }

    let service = state.booking_service.find_service(&booking.service_id).await?;
    let barber = state.booking_service.find_barber(&booking.barber_id).await?;
    let ics = generate_ics(&service, &barber, &booking);

    Ok((
        [
            (header::CONTENT_TYPE, "text/calendar; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"booking-{}.ics\"", booking.id)),
        ],
        ics,
    ))
}
