use crate::domain::{models::booking::{Booking, BookingFilter}, ports::BookingRepository};
use crate::error::{is_unique_violation, AppError};
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use chrono::{DateTime, NaiveDate, Utc};
use tracing::warn;

pub struct PostgresBookingRepo {
    pool: PgPool,
}

impl PostgresBookingRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for PostgresBookingRepo {
    async fn create_confirmed(&self, booking: &Booking, day: NaiveDate) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        // Creators for the same barber queue up here until our commit.
        sqlx::query("SELECT id FROM barbers WHERE id = $1 FOR UPDATE")
            .bind(&booking.barber_id)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Barber not found".into()))?;

        let disabled = sqlx::query("SELECT 1 FROM disabled_dates WHERE date = $1")
            .bind(day)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?;
        if disabled.is_some() {
            warn!("Booking rejected at insert: {} is disabled", day);
            return Err(AppError::DateDisabled);
        }

        let overlap = sqlx::query("SELECT COUNT(*) as count FROM bookings WHERE barber_id = $1 AND status = 'confirmed' AND start_time < $2 AND end_time > $3")
            .bind(&booking.barber_id).bind(booking.end_time).bind(booking.start_time)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;
        if overlap.get::<i64, _>("count") > 0 {
            warn!("Booking rejected at insert: barber {} already busy at {}", booking.barber_id, booking.start_time);
            return Err(AppError::DuplicateBooking);
        }

        let reactivated = sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET service_id = $1, customer_name = $2, customer_phone = $3, customer_email = $4, end_time = $5, status = 'confirmed', created_at = $6
             WHERE barber_id = $7 AND start_time = $8 AND status = 'cancelled'
             RETURNING *"
        )
            .bind(&booking.service_id).bind(&booking.customer_name).bind(&booking.customer_phone).bind(&booking.customer_email)
            .bind(booking.end_time).bind(booking.created_at)
            .bind(&booking.barber_id).bind(booking.start_time)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?;

        let saved = match reactivated {
            Some(row) => row,
            None => sqlx::query_as::<_, Booking>(
                "INSERT INTO bookings (id, service_id, barber_id, customer_name, customer_phone, customer_email, start_time, end_time, status, created_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                 RETURNING *"
            )
                .bind(&booking.id).bind(&booking.service_id).bind(&booking.barber_id).bind(&booking.customer_name)
                .bind(&booking.customer_phone).bind(&booking.customer_email).bind(booking.start_time).bind(booking.end_time)
                .bind(&booking.status).bind(booking.created_at)
                .fetch_one(&mut *tx).await
                .map_err(|e| if is_unique_violation(&e) { AppError::DuplicateBooking } else { AppError::Database(e) })?,
        };

        tx.commit().await.map_err(AppError::Database)?;
        Ok(saved)
    }
    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_confirmed_by_range(&self, barber_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE barber_id = $1 AND status = 'confirmed' AND start_time < $2 AND end_time > $3 ORDER BY start_time ASC").bind(barber_id).bind(end).bind(start).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_confirmed(&self, filter: &BookingFilter) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE status = 'confirmed'
             AND ($1::TEXT IS NULL OR barber_id = $1)
             AND ($2::TIMESTAMPTZ IS NULL OR start_time >= $2)
             AND ($3::TIMESTAMPTZ IS NULL OR start_time < $3)
             ORDER BY start_time ASC"
        )
            .bind(&filter.barber_id).bind(filter.from).bind(filter.to)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_confirmed_by_phone(&self, phone: &str) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE customer_phone = $1 AND status = 'confirmed' ORDER BY start_time DESC").bind(phone).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn count_overlap(&self, barber_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<i64, AppError> {
        let result = sqlx::query("SELECT COUNT(*) as count FROM bookings WHERE barber_id = $1 AND status = 'confirmed' AND start_time < $2 AND end_time > $3").bind(barber_id).bind(end).bind(start).fetch_one(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.get::<i64, _>("count"))
    }
    async fn cancel(&self, id: &str) -> Result<Booking, AppError> {
        sqlx::query_as::<_, Booking>("UPDATE bookings SET status = 'cancelled' WHERE id = $1 RETURNING *").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Booking not found".into()))
    }
    async fn complete(&self, id: &str) -> Result<Booking, AppError> {
        sqlx::query_as::<_, Booking>("UPDATE bookings SET status = 'completed' WHERE id = $1 AND status = 'confirmed' RETURNING *").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)?
            .ok_or(AppError::NotFound("No confirmed booking with this id".into()))
    }
}
