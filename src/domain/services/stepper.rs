use std::sync::Arc;
use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::domain::models::{barber::Barber, booking::Booking, service::Service};
use crate::domain::services::booking_service::{BookingRequest, BookingService};
use crate::domain::services::schedule::parse_slot;
use crate::domain::services::validation::ContactDetails;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Service,
    Barber,
    DateTime,
    Details,
    Confirm,
    Done,
}

/// Message shown to the customer after the flow had to step back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// The chosen slot was taken while it was being selected.
    SlotUnavailable,
    /// Someone else booked the slot before confirmation.
    SlotTaken,
    /// The salon closed the chosen date before confirmation.
    DateDisabled,
    /// Creation failed for a transient reason; confirming again may work.
    Retry,
}

/// Drives one customer through service, barber, date/time, details and confirmation.
pub struct BookingStepper {
    bookings: Arc<BookingService>,
    step: Step,
    service: Option<Service>,
    barber: Option<Barber>,
    date: Option<NaiveDate>,
    time: Option<String>,
    slots: Vec<String>,
    contact: Option<ContactDetails>,
    notice: Option<Notice>,
    confirmed: Option<Booking>,
}

impl BookingStepper {
    pub fn new(bookings: Arc<BookingService>) -> Self {
        Self {
            bookings,
            step: Step::Service,
            service: None,
            barber: None,
            date: None,
            time: None,
            slots: Vec::new(),
            contact: None,
            notice: None,
            confirmed: None,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn notice(&self) -> Option<Notice> {
        self.notice
    }

    pub fn slots(&self) -> &[String] {
        &self.slots
    }

    pub fn service(&self) -> Option<&Service> {
        self.service.as_ref()
    }

    pub fn barber(&self) -> Option<&Barber> {
        self.barber.as_ref()
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn time(&self) -> Option<&str> {
        self.time.as_deref()
    }

    pub fn booking(&self) -> Option<&Booking> {
        self.confirmed.as_ref()
    }

    pub async fn select_service(&mut self, service_id: &str) -> Result<Step, AppError> {
        self.ensure_not_done()?;
        let service = self.bookings.find_service(service_id).await?;
        self.service = Some(service);
        self.barber = None;
        self.clear_date();
        self.notice = None;
        self.step = Step::Barber;
        Ok(self.step)
    }

    pub async fn select_barber(&mut self, barber_id: &str) -> Result<Step, AppError> {
        self.ensure_not_done()?;
        if self.service.is_none() {
            return Err(AppError::Validation("Please choose a service first".into()));
        }
        let barber = self.bookings.find_barber(barber_id).await?;
        self.barber = Some(barber);
        self.clear_date();
        self.notice = None;
        self.step = Step::DateTime;
        Ok(self.step)
    }

    pub async fn select_date(&mut self, date: NaiveDate) -> Result<Step, AppError> {
        let (barber_id, service_id) = self.selection()?;
        if !self.bookings.is_date_bookable(date).await? {
            return Err(AppError::Validation("This date is not available for bookings".into()));
        }

        self.slots = self.bookings.available_slots(&barber_id, &service_id, date).await?;
        self.date = Some(date);
        self.time = None;
        self.notice = None;
        self.step = Step::DateTime;
        Ok(self.step)
    }

    /// Picks a slot of the loaded list after re-checking it against the store. A slot that
    /// was taken in the meantime leaves the flow on `DateTime` with a refreshed list.
    pub async fn select_time(&mut self, label: &str) -> Result<Step, AppError> {
        let (barber_id, service_id) = self.selection()?;
        let date = self.date.ok_or(AppError::Validation("Please choose a date first".into()))?;
        if !self.slots.iter().any(|s| s == label) {
            return Err(AppError::Validation(format!("{label} is not an available time")));
        }

        let time = parse_slot(label)?;
        if self.bookings.check_slot(&barber_id, &service_id, date, time).await? {
            self.time = Some(label.to_string());
            self.notice = None;
        } else {
            debug!("Slot {} on {} no longer free for barber {}", label, date, barber_id);
            self.time = None;
            self.slots = self.bookings.available_slots(&barber_id, &service_id, date).await?;
            self.notice = Some(Notice::SlotUnavailable);
        }
        self.step = Step::DateTime;
        Ok(self.step)
    }

    pub fn continue_to_details(&mut self) -> Result<Step, AppError> {
        self.ensure_not_done()?;
        if self.date.is_none() || self.time.is_none() {
            return Err(AppError::Validation("Please choose a date and a time".into()));
        }
        self.step = Step::Details;
        Ok(self.step)
    }

    pub fn submit_details(&mut self, name: &str, phone: &str, email: Option<&str>) -> Result<Step, AppError> {
        if self.step != Step::Details {
            return Err(AppError::Validation("Contact details are entered after picking a time".into()));
        }
        self.contact = Some(ContactDetails::parse(name, phone, email)?);
        self.notice = None;
        self.step = Step::Confirm;
        Ok(self.step)
    }

    /// Creates the booking. Losing the slot or the date sends the customer back to
    /// `DateTime` with a notice; any other failure stays on `Confirm`.
    pub async fn confirm(&mut self) -> Result<Step, AppError> {
        if self.step != Step::Confirm {
            return Err(AppError::Validation("Nothing to confirm yet".into()));
        }
        let (barber_id, service_id) = self.selection()?;
        let (Some(date), Some(label), Some(contact)) = (self.date, self.time.clone(), self.contact.clone()) else {
            return Err(AppError::Validation("Booking details are incomplete".into()));
        };

        let request = BookingRequest {
            service_id: service_id.clone(),
            barber_id: barber_id.clone(),
            date,
            time: parse_slot(&label)?,
            name: contact.name,
            phone: contact.phone,
            email: contact.email,
        };

        match self.bookings.create_booking(request).await {
            Ok(booking) => {
                self.confirmed = Some(booking);
                self.notice = None;
                self.step = Step::Done;
                Ok(self.step)
            }
            Err(AppError::DuplicateBooking) => {
                warn!("Slot {} on {} was taken before confirmation", label, date);
                self.time = None;
                self.slots = self.bookings.available_slots(&barber_id, &service_id, date).await
                    .unwrap_or_default();
                self.notice = Some(Notice::SlotTaken);
                self.step = Step::DateTime;
                Ok(self.step)
            }
            Err(AppError::DateDisabled) => {
                warn!("Date {} was disabled before confirmation", date);
                self.clear_date();
                self.notice = Some(Notice::DateDisabled);
                self.step = Step::DateTime;
                Ok(self.step)
            }
            Err(e) => {
                self.notice = Some(Notice::Retry);
                Err(e)
            }
        }
    }

    pub fn back(&mut self) -> Step {
        self.step = match self.step {
            Step::Service | Step::Barber => Step::Service,
            Step::DateTime => Step::Barber,
            Step::Details => Step::DateTime,
            Step::Confirm => Step::Details,
            Step::Done => Step::Done,
        };
        self.notice = None;
        self.step
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.bookings.clone());
    }

    fn selection(&self) -> Result<(String, String), AppError> {
        self.ensure_not_done()?;
        match (&self.barber, &self.service) {
            (Some(barber), Some(service)) => Ok((barber.id.clone(), service.id.clone())),
            _ => Err(AppError::Validation("Please choose a service and a barber first".into())),
        }
    }

    fn ensure_not_done(&self) -> Result<(), AppError> {
        if self.step == Step::Done {
            return Err(AppError::Validation("This booking is already confirmed".into()));
        }
        Ok(())
    }

    fn clear_date(&mut self) {
        self.date = None;
        self.time = None;
        self.slots.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use crate::domain::models::{booking::{BookingFilter, NewBookingParams}, disabled_date::DisabledDate};
    use crate::domain::ports::{BarberRepository, BookingRepository, DisabledDateRepository, ServiceRepository};
    use crate::domain::services::schedule::{ShopCalendar, WorkingHours};

    struct Catalog;

    fn classic_cut() -> Service {
        Service {
            id: "svc-classic-cut".into(),
            name_en: "Classic Cut".into(),
            name_ar: "قصة كلاسيكية".into(),
            description_en: "".into(),
            description_ar: "".into(),
            duration_minutes: 30,
            price_tnd: 25.0,
        }
    }

    fn karim() -> Barber {
        Barber { id: "barber-karim".into(), name: "Karim".into(), name_ar: "كريم".into() }
    }

    #[async_trait]
    impl ServiceRepository for Catalog {
        async fn list(&self) -> Result<Vec<Service>, AppError> {
            Ok(vec![classic_cut()])
        }
        async fn find_by_id(&self, id: &str) -> Result<Option<Service>, AppError> {
            Ok(Some(classic_cut()).filter(|s| s.id == id))
        }
    }

    #[async_trait]
    impl BarberRepository for Catalog {
        async fn list(&self) -> Result<Vec<Barber>, AppError> {
            Ok(vec![karim()])
        }
        async fn find_by_id(&self, id: &str) -> Result<Option<Barber>, AppError> {
            Ok(Some(karim()).filter(|b| b.id == id))
        }
    }

    #[derive(Default)]
    struct MemoryBookings {
        rows: Mutex<Vec<Booking>>,
    }

    impl MemoryBookings {
        fn overlapping(&self, barber_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<Booking> {
            self.rows.lock().unwrap().iter()
                .filter(|b| b.barber_id == barber_id && b.is_confirmed() && b.start_time < end && b.end_time > start)
                .cloned()
                .collect()
        }
    }

    #[async_trait]
    impl BookingRepository for MemoryBookings {
        async fn create_confirmed(&self, booking: &Booking, _day: NaiveDate) -> Result<Booking, AppError> {
            if !self.overlapping(&booking.barber_id, booking.start_time, booking.end_time).is_empty() {
                return Err(AppError::DuplicateBooking);
            }
            self.rows.lock().unwrap().push(booking.clone());
            Ok(booking.clone())
        }
        async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError> {
            Ok(self.rows.lock().unwrap().iter().find(|b| b.id == id).cloned())
        }
        async fn list_confirmed_by_range(&self, barber_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Booking>, AppError> {
            Ok(self.overlapping(barber_id, start, end))
        }
        async fn list_confirmed(&self, _filter: &BookingFilter) -> Result<Vec<Booking>, AppError> {
            Ok(self.rows.lock().unwrap().clone())
        }
        async fn list_confirmed_by_phone(&self, phone: &str) -> Result<Vec<Booking>, AppError> {
            Ok(self.rows.lock().unwrap().iter().filter(|b| b.customer_phone == phone).cloned().collect())
        }
        async fn count_overlap(&self, barber_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<i64, AppError> {
            Ok(self.overlapping(barber_id, start, end).len() as i64)
        }
        async fn cancel(&self, id: &str) -> Result<Booking, AppError> {
            Err(AppError::NotFound(id.to_string()))
        }
        async fn complete(&self, id: &str) -> Result<Booking, AppError> {
            Err(AppError::NotFound(id.to_string()))
        }
    }

    #[derive(Default)]
    struct MemoryDisabledDates {
        rows: Mutex<Vec<DisabledDate>>,
    }

    #[async_trait]
    impl DisabledDateRepository for MemoryDisabledDates {
        async fn create(&self, disabled: &DisabledDate) -> Result<DisabledDate, AppError> {
            self.rows.lock().unwrap().push(disabled.clone());
            Ok(disabled.clone())
        }
        async fn find_by_date(&self, date: NaiveDate) -> Result<Option<DisabledDate>, AppError> {
            Ok(self.rows.lock().unwrap().iter().find(|d| d.date == date).cloned())
        }
        async fn list_by_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<DisabledDate>, AppError> {
            Ok(self.rows.lock().unwrap().iter().filter(|d| d.date >= start && d.date <= end).cloned().collect())
        }
        async fn delete(&self, date: NaiveDate) -> Result<(), AppError> {
            self.rows.lock().unwrap().retain(|d| d.date != date);
            Ok(())
        }
    }

    struct Fixture {
        stepper: BookingStepper,
        bookings: Arc<MemoryBookings>,
        service: Arc<BookingService>,
    }

    fn fixture() -> Fixture {
        let bookings = Arc::new(MemoryBookings::default());
        let service = Arc::new(BookingService::new(
            ShopCalendar::new(chrono_tz::UTC, WorkingHours::default()),
            Arc::new(Catalog),
            Arc::new(Catalog),
            bookings.clone(),
            Arc::new(MemoryDisabledDates::default()),
        ));
        Fixture { stepper: BookingStepper::new(service.clone()), bookings, service }
    }

    // A Monday far enough ahead to never be in the past.
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 1, 7).unwrap()
    }

    fn sunday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 1, 13).unwrap()
    }

    async fn walk_to_confirm(stepper: &mut BookingStepper, time: &str) {
        stepper.select_service("svc-classic-cut").await.unwrap();
        stepper.select_barber("barber-karim").await.unwrap();
        stepper.select_date(monday()).await.unwrap();
        stepper.select_time(time).await.unwrap();
        stepper.continue_to_details().unwrap();
        stepper.submit_details("Sami", "98123456", None).unwrap();
    }

    fn occupy(bookings: &MemoryBookings, time: (u32, u32)) {
        let start = monday().and_hms_opt(time.0, time.1, 0).unwrap().and_utc();
        bookings.rows.lock().unwrap().push(Booking::new(NewBookingParams {
            service_id: "svc-classic-cut".into(),
            barber_id: "barber-karim".into(),
            start,
            duration_min: 30,
            name: "Other".into(),
            phone: "21234567".into(),
            email: None,
        }));
    }

    #[tokio::test]
    async fn test_happy_path_reaches_done() {
        let Fixture { mut stepper, .. } = fixture();

        assert_eq!(stepper.select_service("svc-classic-cut").await.unwrap(), Step::Barber);
        assert_eq!(stepper.select_barber("barber-karim").await.unwrap(), Step::DateTime);
        stepper.select_date(monday()).await.unwrap();
        assert_eq!(stepper.slots().first().map(String::as_str), Some("09:00"));
        assert_eq!(stepper.slots().last().map(String::as_str), Some("20:30"));

        stepper.select_time("10:00").await.unwrap();
        assert_eq!(stepper.time(), Some("10:00"));
        assert_eq!(stepper.continue_to_details().unwrap(), Step::Details);
        assert_eq!(stepper.submit_details(" Sami ", "98123456", Some("")).unwrap(), Step::Confirm);
        assert_eq!(stepper.confirm().await.unwrap(), Step::Done);

        let booking = stepper.booking().unwrap();
        assert_eq!(booking.customer_name, "Sami");
        assert!(booking.is_confirmed());

        stepper.reset();
        assert_eq!(stepper.step(), Step::Service);
        assert!(stepper.booking().is_none());
    }

    #[tokio::test]
    async fn test_closed_day_is_rejected() {
        let Fixture { mut stepper, .. } = fixture();
        stepper.select_service("svc-classic-cut").await.unwrap();
        stepper.select_barber("barber-karim").await.unwrap();

        assert!(matches!(stepper.select_date(sunday()).await, Err(AppError::Validation(_))));
        assert!(stepper.date().is_none());
    }

    #[tokio::test]
    async fn test_taken_slot_during_selection_refreshes_list() {
        let Fixture { mut stepper, bookings, .. } = fixture();
        stepper.select_service("svc-classic-cut").await.unwrap();
        stepper.select_barber("barber-karim").await.unwrap();
        stepper.select_date(monday()).await.unwrap();

        occupy(&bookings, (11, 0));
        assert_eq!(stepper.select_time("11:00").await.unwrap(), Step::DateTime);

        assert_eq!(stepper.notice(), Some(Notice::SlotUnavailable));
        assert!(stepper.time().is_none());
        assert!(!stepper.slots().contains(&"11:00".to_string()));
        assert!(stepper.continue_to_details().is_err());
    }

    #[tokio::test]
    async fn test_slot_lost_before_confirm_returns_to_date_time() {
        let Fixture { mut stepper, bookings, .. } = fixture();
        walk_to_confirm(&mut stepper, "12:30").await;

        occupy(&bookings, (12, 30));
        assert_eq!(stepper.confirm().await.unwrap(), Step::DateTime);

        assert_eq!(stepper.notice(), Some(Notice::SlotTaken));
        assert_eq!(stepper.date(), Some(monday()));
        assert!(stepper.time().is_none());
        assert!(!stepper.slots().contains(&"12:30".to_string()));
    }

    #[tokio::test]
    async fn test_date_disabled_before_confirm_clears_date() {
        let Fixture { mut stepper, service, .. } = fixture();
        walk_to_confirm(&mut stepper, "15:00").await;

        service.disable_date(monday(), Some("Eid".into())).await.unwrap();
        assert_eq!(stepper.confirm().await.unwrap(), Step::DateTime);

        assert_eq!(stepper.notice(), Some(Notice::DateDisabled));
        assert!(stepper.date().is_none());
        assert!(stepper.slots().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_details_stay_on_details() {
        let Fixture { mut stepper, .. } = fixture();
        stepper.select_service("svc-classic-cut").await.unwrap();
        stepper.select_barber("barber-karim").await.unwrap();
        stepper.select_date(monday()).await.unwrap();
        stepper.select_time("09:30").await.unwrap();
        stepper.continue_to_details().unwrap();

        assert!(stepper.submit_details("Sami", "18123456", None).is_err());
        assert_eq!(stepper.step(), Step::Details);
    }

    #[tokio::test]
    async fn test_back_walks_the_steps_in_reverse() {
        let Fixture { mut stepper, .. } = fixture();
        walk_to_confirm(&mut stepper, "10:00").await;

        assert_eq!(stepper.back(), Step::Details);
        assert_eq!(stepper.back(), Step::DateTime);
        assert_eq!(stepper.back(), Step::Barber);
        assert_eq!(stepper.back(), Step::Service);
        assert_eq!(stepper.back(), Step::Service);
    }
}
