//! Report clock and calendar helpers

use chrono::{DateTime, Datelike, FixedOffset, Local, NaiveDate, Utc};

/// The "now" every time-relative aggregate is anchored to.
///
/// Carries the local UTC offset so that day, hour and month bucketing follow
/// the reader's calendar rather than UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportClock {
    now: DateTime<FixedOffset>,
}

impl ReportClock {
    pub fn new(now: DateTime<FixedOffset>) -> Self {
        Self { now }
    }

    /// Clock at the current instant in the system timezone
    pub fn local() -> Self {
        Self::new(Local::now().fixed_offset())
    }

    /// Clock at a UTC instant with a zero offset
    pub fn utc(now: DateTime<Utc>) -> Self {
        Self::new(now.fixed_offset())
    }

    pub fn now(&self) -> DateTime<FixedOffset> {
        self.now
    }

    pub fn offset(&self) -> FixedOffset {
        *self.now.offset()
    }

    pub fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }

    /// Shift a UTC timestamp into the clock's local offset
    pub fn localize(&self, ts: &DateTime<Utc>) -> DateTime<FixedOffset> {
        ts.with_timezone(&self.offset())
    }

    pub fn local_date(&self, ts: &DateTime<Utc>) -> NaiveDate {
        self.localize(ts).date_naive()
    }

    /// (year, month) of the calendar month `delta` months away from today
    pub fn month_offset(&self, delta: i32) -> (i32, u32) {
        shift_month(self.now.year(), self.now.month(), delta)
    }
}

/// Move (year, month) by `delta` months, month being 1-based
pub fn shift_month(year: i32, month: u32, delta: i32) -> (i32, u32) {
    let index = year * 12 + (month as i32 - 1) + delta;
    (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = shift_month(year, month, 1);
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(28)
}

/// Whether `date` falls in the given calendar month
pub fn in_month(date: NaiveDate, year: i32, month: u32) -> bool {
    date.year() == year && date.month() == month
}
