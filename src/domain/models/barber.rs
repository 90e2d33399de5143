use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
pub struct Barber {
    pub id: String,
    pub name: String,
    pub name_ar: String,
}
