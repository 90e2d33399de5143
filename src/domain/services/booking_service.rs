use std::collections::HashMap;
use std::sync::Arc;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use tracing::{info, warn};

use crate::domain::models::{
    barber::Barber,
    booking::{Booking, BookingDetails, BookingFilter, BookingStatus, NewBookingParams},
    disabled_date::DisabledDate,
    service::Service,
};
use crate::domain::ports::{BarberRepository, BookingRepository, DisabledDateRepository, ServiceRepository};
use crate::domain::services::availability::{calculate_slots, date_block, DateBlock};
use crate::domain::services::schedule::ShopCalendar;
use crate::domain::services::validation::ContactDetails;
use crate::error::AppError;

/// Longest range the calendar may ask availability for in one call.
pub const MAX_DATE_RANGE_DAYS: i64 = 62;

pub struct BookingRequest {
    pub service_id: String,
    pub barber_id: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
}

pub struct BookingService {
    calendar: ShopCalendar,
    barber_repo: Arc<dyn BarberRepository>,
    service_repo: Arc<dyn ServiceRepository>,
    booking_repo: Arc<dyn BookingRepository>,
    disabled_date_repo: Arc<dyn DisabledDateRepository>,
}

impl BookingService {
    pub fn new(
        calendar: ShopCalendar,
        barber_repo: Arc<dyn BarberRepository>,
        service_repo: Arc<dyn ServiceRepository>,
        booking_repo: Arc<dyn BookingRepository>,
        disabled_date_repo: Arc<dyn DisabledDateRepository>,
    ) -> Self {
        Self { calendar, barber_repo, service_repo, booking_repo, disabled_date_repo }
    }

    pub fn calendar(&self) -> &ShopCalendar {
        &self.calendar
    }

    pub async fn list_services(&self) -> Result<Vec<Service>, AppError> {
        self.service_repo.list().await
    }

    pub async fn list_barbers(&self) -> Result<Vec<Barber>, AppError> {
        self.barber_repo.list().await
    }

    pub async fn find_service(&self, id: &str) -> Result<Service, AppError> {
        self.service_repo.find_by_id(id).await?
            .ok_or(AppError::NotFound("Service not found".into()))
    }

    pub async fn find_barber(&self, id: &str) -> Result<Barber, AppError> {
        self.barber_repo.find_by_id(id).await?
            .ok_or(AppError::NotFound("Barber not found".into()))
    }

    pub async fn find_booking(&self, id: &str) -> Result<Booking, AppError> {
        self.booking_repo.find_by_id(id).await?
            .ok_or(AppError::NotFound("Booking not found".into()))
    }

    pub async fn is_date_bookable(&self, date: NaiveDate) -> Result<bool, AppError> {
        let disabled = self.disabled_date_repo.find_by_date(date).await?.is_some();
        Ok(date_block(&self.calendar, date, disabled, Utc::now()).is_none())
    }

    pub async fn available_slots(&self, barber_id: &str, service_id: &str, date: NaiveDate) -> Result<Vec<String>, AppError> {
        let service = self.find_service(service_id).await?;
        self.find_barber(barber_id).await?;
        self.slots_for(barber_id, &service, date).await
    }

    async fn slots_for(&self, barber_id: &str, service: &Service, date: NaiveDate) -> Result<Vec<String>, AppError> {
        let now = Utc::now();
        let disabled = self.disabled_date_repo.find_by_date(date).await?.is_some();
        if date_block(&self.calendar, date, disabled, now).is_some() {
            return Ok(Vec::new());
        }

        let (day_start, day_end) = self.calendar.day_bounds(date)?;
        let bookings = self.booking_repo.list_confirmed_by_range(barber_id, day_start, day_end).await?;

        Ok(calculate_slots(&self.calendar, date, service.duration(), &bookings, disabled, now))
    }

    /// Dates in `[from, to]` with at least one free slot for this barber and service.
    pub async fn available_dates(&self, barber_id: &str, service_id: &str, from: NaiveDate, to: NaiveDate) -> Result<Vec<NaiveDate>, AppError> {
        if to < from {
            return Err(AppError::Validation("end must not be before start".into()));
        }
        if (to - from).num_days() > MAX_DATE_RANGE_DAYS {
            return Err(AppError::Validation(format!("Range may span at most {MAX_DATE_RANGE_DAYS} days")));
        }

        let service = self.find_service(service_id).await?;
        self.find_barber(barber_id).await?;

        let now = Utc::now();
        let (range_start, _) = self.calendar.day_bounds(from)?;
        let (_, range_end) = self.calendar.day_bounds(to)?;

        let all_bookings = self.booking_repo.list_confirmed_by_range(barber_id, range_start, range_end).await?;
        let disabled: Vec<NaiveDate> = self.disabled_date_repo.list_by_range(from, to).await?
            .into_iter()
            .map(|d| d.date)
            .collect();

        let mut available = Vec::new();
        let mut current = from;
        while current <= to {
            let (day_start, day_end) = self.calendar.day_bounds(current)?;
            let day_bookings: Vec<Booking> = all_bookings.iter()
                .filter(|b| b.start_time < day_end && b.end_time > day_start)
                .cloned()
                .collect();

            let slots = calculate_slots(&self.calendar, current, service.duration(), &day_bookings, disabled.contains(&current), now);
            if !slots.is_empty() {
                available.push(current);
            }
            current += Duration::days(1);
        }
        Ok(available)
    }

    /// Whether no confirmed booking of the barber overlaps `[start, start + duration)`.
    pub async fn check_availability(&self, barber_id: &str, start: DateTime<Utc>, duration: Duration) -> Result<bool, AppError> {
        let overlapping = self.booking_repo.count_overlap(barber_id, start, start + duration).await?;
        Ok(overlapping == 0)
    }

    pub async fn check_slot(&self, barber_id: &str, service_id: &str, date: NaiveDate, time: NaiveTime) -> Result<bool, AppError> {
        let service = self.find_service(service_id).await?;
        self.find_barber(barber_id).await?;

        if !self.calendar.hours.is_on_grid(date, time) || !self.is_date_bookable(date).await? {
            return Ok(false);
        }
        let start = self.calendar.to_utc(date, time)?;
        if start <= Utc::now() {
            return Ok(false);
        }
        self.check_availability(barber_id, start, service.duration()).await
    }

    pub async fn create_booking(&self, request: BookingRequest) -> Result<Booking, AppError> {
        let contact = ContactDetails::parse(&request.name, &request.phone, request.email.as_deref())?;

        let service = self.find_service(&request.service_id).await?;
        let barber = self.find_barber(&request.barber_id).await?;

        let now = Utc::now();
        let disabled = self.disabled_date_repo.find_by_date(request.date).await?.is_some();
        match date_block(&self.calendar, request.date, disabled, now) {
            Some(DateBlock::Disabled) => return Err(AppError::DateDisabled),
            Some(DateBlock::Past) => return Err(AppError::Validation("Cannot book in the past".into())),
            Some(DateBlock::ClosedDay) => return Err(AppError::Validation("The salon is closed on this weekday".into())),
            None => {}
        }

        if !self.calendar.hours.is_on_grid(request.date, request.time) {
            return Err(AppError::Validation("Selected time is outside opening hours".into()));
        }

        let start = self.calendar.to_utc(request.date, request.time)?;
        if start <= now {
            return Err(AppError::Validation("Cannot book in the past".into()));
        }

        if !self.check_availability(&barber.id, start, service.duration()).await? {
            warn!("Booking rejected by pre-check: barber {} at {}", barber.id, start);
            return Err(AppError::DuplicateBooking);
        }

        let booking = Booking::new(NewBookingParams {
            service_id: service.id.clone(),
            barber_id: barber.id.clone(),
            start,
            duration_min: service.duration_minutes,
            name: contact.name,
            phone: contact.phone,
            email: contact.email,
        });

        let created = self.booking_repo.create_confirmed(&booking, request.date).await?;
        info!("Booking confirmed: {} (barber {}, {} at {})", created.id, barber.id, request.date, request.time);
        Ok(created)
    }

    /// Idempotent: an already-cancelled booking is returned unchanged.
    pub async fn cancel_booking(&self, id: &str) -> Result<Booking, AppError> {
        let booking = self.find_booking(id).await?;
        match booking.status() {
            Some(BookingStatus::Cancelled) => Ok(booking),
            Some(BookingStatus::Completed) => Err(AppError::Validation("A completed booking cannot be cancelled".into())),
            _ => {
                let cancelled = self.booking_repo.cancel(id).await?;
                info!("Booking cancelled: {}", id);
                Ok(cancelled)
            }
        }
    }

    /// Customer-initiated cancel; the phone number on the booking acts as the credential.
    pub async fn cancel_customer_booking(&self, id: &str, phone: &str) -> Result<Booking, AppError> {
        self.find_customer_booking(id, phone).await?;
        self.cancel_booking(id).await
    }

    pub async fn find_customer_booking(&self, id: &str, phone: &str) -> Result<Booking, AppError> {
        let booking = self.find_booking(id).await?;
        if booking.customer_phone != phone.trim() {
            return Err(AppError::NotFound("Booking not found".into()));
        }
        Ok(booking)
    }

    pub async fn complete_booking(&self, id: &str) -> Result<Booking, AppError> {
        let booking = self.find_booking(id).await?;
        if !booking.is_confirmed() {
            return Err(AppError::Validation(format!("Only confirmed bookings can be completed (status: {})", booking.status)));
        }
        let completed = self.booking_repo.complete(id).await?;
        info!("Booking completed: {}", id);
        Ok(completed)
    }

    pub async fn bookings_by_phone(&self, phone: &str) -> Result<Vec<BookingDetails>, AppError> {
        let phone = phone.trim();
        if phone.is_empty() {
            return Err(AppError::Validation("Please enter your phone number".into()));
        }
        let bookings = self.booking_repo.list_confirmed_by_phone(phone).await?;
        self.with_details(bookings).await
    }

    pub async fn list_bookings(&self, filter: &BookingFilter) -> Result<Vec<BookingDetails>, AppError> {
        let bookings = self.booking_repo.list_confirmed(filter).await?;
        self.with_details(bookings).await
    }

    async fn with_details(&self, bookings: Vec<Booking>) -> Result<Vec<BookingDetails>, AppError> {
        let services: HashMap<String, Service> = self.service_repo.list().await?
            .into_iter()
            .map(|s| (s.id.clone(), s))
            .collect();
        let barbers: HashMap<String, Barber> = self.barber_repo.list().await?
            .into_iter()
            .map(|b| (b.id.clone(), b))
            .collect();

        Ok(bookings.into_iter()
            .map(|booking| BookingDetails {
                service: services.get(&booking.service_id).cloned(),
                barber: barbers.get(&booking.barber_id).cloned(),
                booking,
            })
            .collect())
    }

    pub async fn list_disabled_dates(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<DisabledDate>, AppError> {
        if to < from {
            return Err(AppError::Validation("end must not be before start".into()));
        }
        self.disabled_date_repo.list_by_range(from, to).await
    }

    pub async fn disable_date(&self, date: NaiveDate, reason: Option<String>) -> Result<DisabledDate, AppError> {
        let entity = DisabledDate::new(date, reason);
        let saved = self.disabled_date_repo.create(&entity).await?;
        info!("Disabled date {} ({})", saved.date, saved.reason.as_deref().unwrap_or("no reason"));
        Ok(saved)
    }

    pub async fn enable_date(&self, date: NaiveDate) -> Result<(), AppError> {
        self.disabled_date_repo.delete(date).await?;
        info!("Re-enabled date {}", date);
        Ok(())
    }
}
