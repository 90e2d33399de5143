use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

use super::{barber::Barber, service::Service};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            "completed" => Ok(BookingStatus::Completed),
            other => Err(format!("unknown booking status '{other}'")),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Booking {
    pub id: String,
    pub service_id: String,
    pub barber_id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

pub struct NewBookingParams {
    pub service_id: String,
    pub barber_id: String,
    pub start: DateTime<Utc>,
    pub duration_min: i32,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
}

impl Booking {
    pub fn new(params: NewBookingParams) -> Self {
        let end_time = params.start + chrono::Duration::minutes(params.duration_min as i64);

        Self {
            id: Uuid::new_v4().to_string(),
            service_id: params.service_id,
            barber_id: params.barber_id,
            customer_name: params.name,
            customer_phone: params.phone,
            customer_email: params.email,
            start_time: params.start,
            end_time,
            status: BookingStatus::Confirmed.as_str().to_string(),
            created_at: Utc::now(),
        }
    }

    /// Rows with an unknown status string are treated as not occupying the calendar.
    pub fn status(&self) -> Option<BookingStatus> {
        self.status.parse().ok()
    }

    pub fn is_confirmed(&self) -> bool {
        self.status() == Some(BookingStatus::Confirmed)
    }
}

/// A booking joined with the reference data the customer and admin views display.
#[derive(Debug, Serialize, Clone)]
pub struct BookingDetails {
    #[serde(flatten)]
    pub booking: Booking,
    pub service: Option<Service>,
    pub barber: Option<Barber>,
}

#[derive(Debug, Default, Clone)]
pub struct BookingFilter {
    pub barber_id: Option<String>,
    pub from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `start_time`.
    pub to: Option<DateTime<Utc>>,
}
