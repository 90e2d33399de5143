use axum::{
    extract::{State, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use crate::state::AppState;
use crate::api::dtos::requests::DisableDateRequest;
use crate::api::extractors::auth::AuthAdmin;
use crate::api::handlers::required_param;
use crate::domain::models::booking::BookingFilter;
use crate::domain::services::schedule::parse_date;
use crate::error::AppError;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    AuthAdmin(_admin): AuthAdmin,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let calendar = state.booking_service.calendar();

    let from = match params.get("start") {
        Some(v) => Some(calendar.day_bounds(parse_date(v)?)?.0),
        None => None,
    };
    let to = match params.get("end") {
        Some(v) => Some(calendar.day_bounds(parse_date(v)?)?.1),
        None => None,
    };

    let filter = BookingFilter {
        barber_id: params.get("barber_id").filter(|b| !b.trim().is_empty()).cloned(),
        from,
        to,
    };

    let bookings = state.booking_service.list_bookings(&filter).await?;
    Ok(Json(bookings))
}

pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    AuthAdmin(admin): AuthAdmin,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.booking_service.cancel_booking(&booking_id).await?;
    info!("Admin {} cancelled booking {}", admin.username, booking.id);
    Ok(Json(booking))
}

pub async fn complete_booking(
    State(state): State<Arc<AppState>>,
    AuthAdmin(admin): AuthAdmin,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.booking_service.complete_booking(&booking_id).await?;
    info!("Admin {} completed booking {}", admin.username, booking.id);
    Ok(Json(booking))
}

pub async fn list_disabled_dates(
    State(state): State<Arc<AppState>>,
    AuthAdmin(_admin): AuthAdmin,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let start = parse_date(required_param(&params, "start")?)?;
    let end = parse_date(required_param(&params, "end")?)?;

    let dates = state.booking_service.list_disabled_dates(start, end).await?;
    Ok(Json(dates))
}

pub async fn disable_date(
    State(state): State<Arc<AppState>>,
    AuthAdmin(admin): AuthAdmin,
    Json(payload): Json<DisableDateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let date = parse_date(&payload.date)?;
    let disabled = state.booking_service.disable_date(date, payload.reason).await?;
    info!("Admin {} disabled {}", admin.username, disabled.date);
    Ok((StatusCode::CREATED, Json(disabled)))
}

pub async fn enable_date(
    State(state): State<Arc<AppState>>,
    AuthAdmin(admin): AuthAdmin,
    Path(date): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let date = parse_date(&date)?;
    state.booking_service.enable_date(date).await?;
    info!("Admin {} re-enabled {}", admin.username, date);
    Ok(StatusCode::NO_CONTENT)
}
