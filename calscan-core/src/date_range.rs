//! Date window for recurrence expansion.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{CalScanError, CalScanResult};
use crate::event::EventTime;

/// Half-open window `[start, end)` of calendar dates.
///
/// Both bounds are date-only; a time is inside the window when its wall clock
/// is at or after midnight of `start` and before midnight of `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> CalScanResult<Self> {
        if start >= end {
            return Err(CalScanError::InvalidRange { start, end });
        }
        Ok(DateRange { start, end })
    }

    /// Parse two YYYY-MM-DD strings into a DateRange.
    pub fn from_args(start: &str, end: &str) -> CalScanResult<Self> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, time: &EventTime) -> bool {
        let wall_clock = time.wall_clock();
        wall_clock >= self.start_bound() && wall_clock < self.end_bound()
    }

    /// Midnight at the start of the window.
    pub fn start_bound(&self) -> NaiveDateTime {
        self.start.and_time(NaiveTime::MIN)
    }

    /// Midnight at the (excluded) end of the window.
    pub fn end_bound(&self) -> NaiveDateTime {
        self.end.and_time(NaiveTime::MIN)
    }

    /// The window grown by `margin` on both sides, for coarse pre-filtering.
    pub fn widened(&self, margin: Duration) -> (NaiveDateTime, NaiveDateTime) {
        (self.start_bound() - margin, self.end_bound() + margin)
    }
}

/// Parse YYYY-MM-DD
pub fn parse_date(s: &str) -> CalScanResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
        CalScanError::Config(format!("Invalid date format '{}'. Expected YYYY-MM-DD", s))
    })
}
