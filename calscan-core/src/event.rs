//! Event definitions as they are declared in an .ics file.

use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

/// One VEVENT of a calendar, possibly recurring.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub uid: Option<String>,
    pub summary: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub start: EventTime,
    /// DTEND as declared; see [`Event::resolved_end`] for DURATION handling
    pub end: Option<EventTime>,
    /// DURATION as declared (only meaningful when DTEND is absent)
    pub duration: Option<Duration>,
    pub status: EventStatus,

    /// RRULE, RDATE and EXDATE of a master event
    pub recurrence: Option<Recurrence>,
    /// Original start of the instance this event overrides (RECURRENCE-ID)
    pub recurrence_id: Option<EventTime>,
}

/// Recurrence information of a master event.
#[derive(Debug, Clone, PartialEq)]
pub struct Recurrence {
    /// RRULE value without the "RRULE:" prefix, empty when only RDATEs are present
    pub rrule: String,
    pub rdates: Vec<EventTime>,
    pub exdates: Vec<EventTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    Confirmed,
    Tentative,
    Cancelled,
}

/// Decoded value of a DTSTART/DTEND-like property, preserving its ICS form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventTime {
    Date(NaiveDate),
    DateTimeUtc(DateTime<Utc>),
    DateTimeFloating(NaiveDateTime),
    DateTimeZoned { datetime: NaiveDateTime, tzid: String },
}

impl Event {
    /// A label for log and error messages.
    pub fn label(&self) -> String {
        self.uid
            .clone()
            .or_else(|| self.summary.clone())
            .unwrap_or_else(|| "(unnamed event)".to_string())
    }

    pub fn is_recurring(&self) -> bool {
        self.recurrence.is_some()
    }

    /// DTEND if declared, otherwise DTSTART + DURATION.
    pub fn resolved_end(&self) -> Option<EventTime> {
        match (&self.end, self.duration) {
            (Some(end), _) => Some(end.clone()),
            (None, Some(duration)) => Some(self.start.shift(duration)),
            (None, None) => None,
        }
    }

    /// How long one instance of this event lasts.
    ///
    /// Without DTEND or DURATION an all-day event lasts one day and a timed
    /// event takes no time (RFC 5545 §3.6.1).
    pub fn length(&self) -> Duration {
        let length = match (&self.start, self.resolved_end()) {
            (EventTime::Date(_), None) => Duration::days(1),
            (_, None) => Duration::zero(),
            (EventTime::Date(start), Some(EventTime::Date(end))) => end - *start,
            (start, Some(end)) => end.instant() - start.instant(),
        };
        length.max(Duration::zero())
    }
}

impl EventTime {
    /// Wall-clock value of this time in its own zone. Dates start at midnight.
    pub fn wall_clock(&self) -> NaiveDateTime {
        match self {
            EventTime::Date(d) => d.and_time(NaiveTime::MIN),
            EventTime::DateTimeUtc(dt) => dt.naive_utc(),
            EventTime::DateTimeFloating(dt) => *dt,
            EventTime::DateTimeZoned { datetime, .. } => *datetime,
        }
    }

    /// Point in time used for ordering.
    ///
    /// Dates, floating times and times in an unknown zone are read as UTC.
    pub fn instant(&self) -> DateTime<Utc> {
        match self {
            EventTime::DateTimeUtc(dt) => *dt,
            EventTime::DateTimeZoned { datetime, tzid } => resolve_zoned(datetime, tzid)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|| datetime.and_utc()),
            other => other.wall_clock().and_utc(),
        }
    }

    /// Same kind of time, moved by `duration`. Dates move by whole days.
    pub fn shift(&self, duration: Duration) -> EventTime {
        match self {
            EventTime::Date(d) => EventTime::Date(*d + Duration::days(duration.num_days())),
            EventTime::DateTimeUtc(dt) => EventTime::DateTimeUtc(*dt + duration),
            EventTime::DateTimeFloating(dt) => EventTime::DateTimeFloating(*dt + duration),
            EventTime::DateTimeZoned { datetime, tzid } => EventTime::DateTimeZoned {
                datetime: *datetime + duration,
                tzid: tzid.clone(),
            },
        }
    }

    /// `2024-06-01 10:00:00`, the form used on occurrence lines.
    pub fn to_display_string(&self) -> String {
        self.format_with(' ')
    }

    /// `2024-06-01T10:00:00`, the decoded form printed for raw events.
    pub fn to_iso_string(&self) -> String {
        self.format_with('T')
    }

    fn format_with(&self, separator: char) -> String {
        let date_time = format!("%Y-%m-%d{separator}%H:%M:%S");
        match self {
            EventTime::Date(d) => d.format("%Y-%m-%d").to_string(),
            EventTime::DateTimeUtc(dt) => dt.format(&format!("{date_time}%:z")).to_string(),
            EventTime::DateTimeFloating(dt) => dt.format(&date_time).to_string(),
            EventTime::DateTimeZoned { datetime, tzid } => match resolve_zoned(datetime, tzid) {
                Some(dt) => dt.format(&format!("{date_time}%:z")).to_string(),
                None => datetime.format(&date_time).to_string(),
            },
        }
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_iso_string())
    }
}

/// Look up a TZID in the IANA database. Quoted TZIDs are accepted.
pub fn parse_tzid(tzid: &str) -> Option<chrono_tz::Tz> {
    tzid.trim_matches('"').parse().ok()
}

fn resolve_zoned(datetime: &NaiveDateTime, tzid: &str) -> Option<DateTime<chrono_tz::Tz>> {
    parse_tzid(tzid)?.from_local_datetime(datetime).earliest()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floating(s: &str) -> EventTime {
        EventTime::DateTimeFloating(NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M").unwrap())
    }

    fn event(start: EventTime, end: Option<EventTime>) -> Event {
        Event {
            uid: Some("uid-1".to_string()),
            summary: Some("Meeting".to_string()),
            location: None,
            description: None,
            start,
            end,
            duration: None,
            status: EventStatus::Confirmed,
            recurrence: None,
            recurrence_id: None,
        }
    }

    #[test]
    fn test_display_and_iso_forms() {
        let time = floating("2024-06-01T10:00");
        assert_eq!(time.to_display_string(), "2024-06-01 10:00:00");
        assert_eq!(time.to_iso_string(), "2024-06-01T10:00:00");

        let date = EventTime::Date(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(date.to_display_string(), "2024-06-01");

        let utc = EventTime::DateTimeUtc(Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap());
        assert_eq!(utc.to_display_string(), "2024-06-01 10:00:00+00:00");
    }

    #[test]
    fn test_zoned_time_uses_resolved_offset() {
        let zoned = EventTime::DateTimeZoned {
            datetime: NaiveDateTime::parse_from_str("2024-06-01T10:00", "%Y-%m-%dT%H:%M").unwrap(),
            tzid: "America/New_York".to_string(),
        };
        assert_eq!(zoned.to_iso_string(), "2024-06-01T10:00:00-04:00");
        assert_eq!(zoned.instant(), Utc.with_ymd_and_hms(2024, 6, 1, 14, 0, 0).unwrap());

        let unknown = EventTime::DateTimeZoned {
            datetime: NaiveDateTime::parse_from_str("2024-06-01T10:00", "%Y-%m-%dT%H:%M").unwrap(),
            tzid: "Eastern Standard Time".to_string(),
        };
        assert_eq!(unknown.to_iso_string(), "2024-06-01T10:00:00");
    }

    #[test]
    fn test_resolved_end_falls_back_to_duration() {
        let mut e = event(floating("2024-06-01T10:00"), None);
        assert_eq!(e.resolved_end(), None);
        assert_eq!(e.length(), Duration::zero());

        e.duration = Some(Duration::minutes(90));
        assert_eq!(e.resolved_end(), Some(floating("2024-06-01T11:30")));
        assert_eq!(e.length(), Duration::minutes(90));
    }

    #[test]
    fn test_all_day_event_without_end_lasts_one_day() {
        let e = event(EventTime::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()), None);
        assert_eq!(e.length(), Duration::days(1));
    }
}
