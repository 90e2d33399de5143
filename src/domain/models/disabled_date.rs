use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// A calendar day (shop time) on which the salon takes no bookings.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct DisabledDate {
    pub id: String,
    pub date: NaiveDate,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl DisabledDate {
    pub fn new(date: NaiveDate, reason: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            date,
            reason: reason.filter(|r| !r.trim().is_empty()),
            created_at: Utc::now(),
        }
    }
}
