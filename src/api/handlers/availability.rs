use axum::{extract::{State, Query}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::responses::{AvailableDatesResponse, SlotCheckResponse, SlotsResponse};
use crate::api::handlers::required_param;
use crate::domain::services::schedule::{format_slot, parse_date, parse_slot};
use crate::error::AppError;
use std::collections::HashMap;
use std::sync::Arc;

pub async fn get_slots(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let barber_id = required_param(&params, "barber_id")?;
    let service_id = required_param(&params, "service_id")?;
    let date = parse_date(required_param(&params, "date")?)?;

    let slots = state.booking_service.available_slots(barber_id, service_id, date).await?;

    Ok(Json(SlotsResponse {
        date: date.to_string(),
        slots,
    }))
}

pub async fn get_available_dates(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let barber_id = required_param(&params, "barber_id")?;
    let service_id = required_param(&params, "service_id")?;
    let start = parse_date(required_param(&params, "start")?)?;
    let end = parse_date(required_param(&params, "end")?)?;

    let dates = state.booking_service.available_dates(barber_id, service_id, start, end).await?;
    Ok(Json(AvailableDatesResponse { dates }))
}

pub async fn check_slot(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let barber_id = required_param(&params, "barber_id")?;
    let service_id = required_param(&params, "service_id")?;
    let date = parse_date(required_param(&params, "date")?)?;
    let time = parse_slot(required_param(&params, "time")?)?;

    let available = state.booking_service.check_slot(barber_id, service_id, date, time).await?;

    Ok(Json(SlotCheckResponse {
        date: date.to_string(),
        time: format_slot(time),
        available,
    }))
}

pub async fn list_disabled_dates(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let start = parse_date(required_param(&params, "start")?)?;
    let end = parse_date(required_param(&params, "end")?)?;

    let dates = state.booking_service.list_disabled_dates(start, end).await?;
    Ok(Json(dates))
}
