use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use crate::domain::models::booking::Booking;
use crate::domain::services::schedule::{format_slot, ShopCalendar};

/// Half-open `[start, end)` span of barber time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Interval {
    pub fn new(start: DateTime<Utc>, duration: Duration) -> Self {
        Self { start, end: start + duration }
    }

    /// Touching endpoints do not overlap.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && self.end > other.start
    }
}

impl From<&Booking> for Interval {
    fn from(booking: &Booking) -> Self {
        Self { start: booking.start_time, end: booking.end_time }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateBlock {
    Past,
    ClosedDay,
    Disabled,
}

/// Why `date` cannot take bookings at all, if it cannot. A disabled date reports
/// `Disabled` even when it is also past or a closed weekday.
pub fn date_block(calendar: &ShopCalendar, date: NaiveDate, is_disabled: bool, now: DateTime<Utc>) -> Option<DateBlock> {
    if is_disabled {
        Some(DateBlock::Disabled)
    } else if date < calendar.today(now) {
        Some(DateBlock::Past)
    } else if calendar.hours.is_closed(date.weekday()) {
        Some(DateBlock::ClosedDay)
    } else {
        None
    }
}

pub fn is_free(candidate: &Interval, booked: &[Interval]) -> bool {
    !booked.iter().any(|b| candidate.overlaps(b))
}

/// Grid slots of `date` for a service of `duration` that are still free for the barber
/// owning `existing_bookings`. Non-confirmed bookings are ignored.
pub fn calculate_slots(
    calendar: &ShopCalendar,
    date: NaiveDate,
    duration: Duration,
    existing_bookings: &[Booking],
    is_disabled: bool,
    now: DateTime<Utc>,
) -> Vec<String> {
    if date_block(calendar, date, is_disabled, now).is_some() || duration <= Duration::zero() {
        return Vec::new();
    }

    let booked: Vec<Interval> = existing_bookings.iter()
        .filter(|b| b.is_confirmed())
        .map(Interval::from)
        .collect();

    calendar.hours.slot_grid(date)
        .into_iter()
        .filter_map(|time| {
            let start = calendar.to_utc(date, time).ok()?;
            let candidate = Interval::new(start, duration);
            (start > now && is_free(&candidate, &booked)).then(|| format_slot(time))
        })
        .collect()
}
