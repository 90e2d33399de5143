use serde::Serialize;
use chrono::NaiveDate;

#[derive(Serialize)]
pub struct SlotsResponse {
    pub date: String,
    pub slots: Vec<String>,
}

#[derive(Serialize)]
pub struct AvailableDatesResponse {
    pub dates: Vec<NaiveDate>,
}

#[derive(Serialize)]
pub struct SlotCheckResponse {
    pub date: String,
    pub time: String,
    pub available: bool,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
