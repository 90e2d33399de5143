use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Timelike, Utc, Weekday};
use chrono_tz::Tz;
use crate::error::AppError;
use tracing::warn;

/// Spacing of the booking grid. Service duration never changes it.
pub const SLOT_MINUTES: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpeningWindow {
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl OpeningWindow {
    pub fn contains(&self, time: NaiveTime) -> bool {
        time >= self.open && time < self.close
    }
}

/// Weekly opening policy of the shop.
#[derive(Debug, Clone)]
pub struct WorkingHours {
    pub open: NaiveTime,
    pub close: NaiveTime,
    pub half_day: Weekday,
    pub half_day_open: NaiveTime,
    pub closed_day: Weekday,
}

impl Default for WorkingHours {
    fn default() -> Self {
        Self {
            open: hm(9, 0),
            close: hm(21, 0),
            half_day: Weekday::Fri,
            half_day_open: hm(14, 0),
            closed_day: Weekday::Sun,
        }
    }
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

impl WorkingHours {
    pub fn is_closed(&self, weekday: Weekday) -> bool {
        weekday == self.closed_day
    }

    pub fn window_for(&self, weekday: Weekday) -> Option<OpeningWindow> {
        if self.is_closed(weekday) {
            return None;
        }
        let open = if weekday == self.half_day { self.half_day_open } else { self.open };
        Some(OpeningWindow { open, close: self.close })
    }

    /// Half-hour aligned start times inside the opening window of `date`'s weekday.
    pub fn slot_grid(&self, date: NaiveDate) -> Vec<NaiveTime> {
        let Some(window) = self.window_for(date.weekday()) else {
            return Vec::new();
        };

        let open_min = (window.open.hour() * 60 + window.open.minute()) as i64;
        let close_min = (window.close.hour() * 60 + window.close.minute()) as i64;
        let first = (open_min + SLOT_MINUTES - 1) / SLOT_MINUTES * SLOT_MINUTES;

        let mut slots = Vec::new();
        let mut cursor = first;
        while cursor < close_min {
            if let Some(t) = NaiveTime::from_hms_opt((cursor / 60) as u32, (cursor % 60) as u32, 0) {
                slots.push(t);
            }
            cursor += SLOT_MINUTES;
        }
        slots
    }

    pub fn is_on_grid(&self, date: NaiveDate, time: NaiveTime) -> bool {
        self.slot_grid(date).contains(&time)
    }
}

pub fn format_slot(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

pub fn parse_slot(label: &str) -> Result<NaiveTime, AppError> {
    NaiveTime::parse_from_str(label.trim(), "%H:%M")
        .map_err(|_| AppError::Validation("Invalid time format (HH:MM)".into()))
}

pub fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::Validation("Invalid date format (YYYY-MM-DD)".into()))
}

/// Working hours bound to the shop's time zone; all wall-clock reasoning goes through here.
#[derive(Debug, Clone)]
pub struct ShopCalendar {
    pub tz: Tz,
    pub hours: WorkingHours,
}

impl ShopCalendar {
    pub fn new(tz: Tz, hours: WorkingHours) -> Self {
        Self { tz, hours }
    }

    pub fn from_timezone_name(name: &str) -> Self {
        let tz: Tz = name.parse().unwrap_or_else(|_| {
            warn!("Unknown time zone '{}', falling back to Africa/Tunis", name);
            chrono_tz::Africa::Tunis
        });
        Self::new(tz, WorkingHours::default())
    }

    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.tz).date_naive()
    }

    pub fn to_utc(&self, date: NaiveDate, time: NaiveTime) -> Result<DateTime<Utc>, AppError> {
        self.tz.from_local_datetime(&date.and_time(time))
            .single()
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or(AppError::Validation("Invalid local time (ambiguous or skipped due to DST)".into()))
    }

    /// `[start of date, start of next date)` in UTC.
    pub fn day_bounds(&self, date: NaiveDate) -> Result<(DateTime<Utc>, DateTime<Utc>), AppError> {
        let start = self.start_of_day(date)?;
        let end = self.start_of_day(date + Duration::days(1))?;
        Ok((start, end))
    }

    fn start_of_day(&self, date: NaiveDate) -> Result<DateTime<Utc>, AppError> {
        self.tz.from_local_datetime(&date.and_time(NaiveTime::MIN))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or(AppError::InternalWithMsg(format!("No local midnight for {date}")))
    }
}
