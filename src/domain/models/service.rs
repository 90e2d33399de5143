use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use chrono::Duration;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
pub struct Service {
    pub id: String,
    pub name_en: String,
    pub name_ar: String,
    pub description_en: String,
    pub description_ar: String,
    pub duration_minutes: i32,
    pub price_tnd: f64,
}

impl Service {
    pub fn duration(&self) -> Duration {
        Duration::minutes(self.duration_minutes as i64)
    }
}
