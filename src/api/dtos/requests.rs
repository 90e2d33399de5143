use serde::Deserialize;

#[derive(Deserialize)]
pub struct CreateBookingRequest {
    pub service_id: String,
    pub barber_id: String,
    /// `YYYY-MM-DD`, shop time.
    pub date: String,
    /// `HH:MM` slot label.
    pub time: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
}

#[derive(Deserialize)]
pub struct CustomerCancelRequest {
    pub phone: String,
}

#[derive(Deserialize)]
pub struct DisableDateRequest {
    pub date: String,
    pub reason: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}
