use axum::{extract::State, response::IntoResponse, Json};
use crate::state::AppState;
use crate::error::AppError;
use std::sync::Arc;

pub async fn list_services(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let services = state.booking_service.list_services().await?;
    Ok(Json(services))
}

pub async fn list_barbers(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let barbers = state.booking_service.list_barbers().await?;
    Ok(Json(barbers))
}
