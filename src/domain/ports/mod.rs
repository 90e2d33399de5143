use crate::domain::models::{
    admin::Admin, auth::RefreshTokenRecord, barber::Barber,
    booking::{Booking, BookingFilter}, disabled_date::DisabledDate, service::Service,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

#[async_trait]
pub trait BarberRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Barber>, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Barber>, AppError>;
}

#[async_trait]
pub trait ServiceRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Service>, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Service>, AppError>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Stores `booking` as confirmed. `day` is the shop-local date of its start.
    ///
    /// Fails with `DateDisabled` when `day` is disabled and with `DuplicateBooking` when a
    /// confirmed booking of the same barber overlaps it. A cancelled row at the exact
    /// (barber, start) is reactivated instead of inserting a second row.
    async fn create_confirmed(&self, booking: &Booking, day: NaiveDate) -> Result<Booking, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError>;
    /// Confirmed bookings of a barber whose interval intersects `[start, end)`.
    async fn list_confirmed_by_range(&self, barber_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Booking>, AppError>;
    async fn list_confirmed(&self, filter: &BookingFilter) -> Result<Vec<Booking>, AppError>;
    async fn list_confirmed_by_phone(&self, phone: &str) -> Result<Vec<Booking>, AppError>;
    async fn count_overlap(&self, barber_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<i64, AppError>;
    async fn cancel(&self, id: &str) -> Result<Booking, AppError>;
    async fn complete(&self, id: &str) -> Result<Booking, AppError>;
}

#[async_trait]
pub trait DisabledDateRepository: Send + Sync {
    async fn create(&self, disabled: &DisabledDate) -> Result<DisabledDate, AppError>;
    async fn find_by_date(&self, date: NaiveDate) -> Result<Option<DisabledDate>, AppError>;
    async fn list_by_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<DisabledDate>, AppError>;
    async fn delete(&self, date: NaiveDate) -> Result<(), AppError>;
}

#[async_trait]
pub trait AdminRepository: Send + Sync {
    async fn create(&self, admin: &Admin) -> Result<Admin, AppError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<Admin>, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Admin>, AppError>;
    async fn count(&self) -> Result<i64, AppError>;

    async fn store_refresh_token(&self, record: &RefreshTokenRecord) -> Result<(), AppError>;
    /// Deletes and returns the session row of `token_hash`; a token can be taken once.
    async fn take_refresh_token(&self, token_hash: &str) -> Result<Option<RefreshTokenRecord>, AppError>;
    async fn revoke_refresh_family(&self, family_id: Uuid) -> Result<(), AppError>;
}
