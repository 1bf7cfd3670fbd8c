//! Plain-text rendering of occurrences and events.
//!
//! The output is line oriented with no column alignment or colors, so it can be
//! piped into other tools.

use calscan_core::{Event, Occurrence};

/// Extension trait for rendering calscan types as report lines.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for Occurrence {
    /// `Start: 2024-06-01 10:00:00 Summary: Meeting`
    fn render(&self) -> String {
        format!(
            "Start: {} Summary: {}",
            self.start.to_display_string(),
            self.summary.as_deref().unwrap_or_default()
        )
    }
}

impl Render for Event {
    /// Four lines: summary, location, decoded start and decoded end.
    /// Missing fields render as empty lines.
    fn render(&self) -> String {
        [
            self.summary.clone().unwrap_or_default(),
            self.location.clone().unwrap_or_default(),
            self.start.to_string(),
            self.resolved_end()
                .map(|end| end.to_string())
                .unwrap_or_default(),
        ]
        .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calscan_core::{EventStatus, EventTime};
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn floating(s: &str) -> EventTime {
        EventTime::DateTimeFloating(NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M").unwrap())
    }

    fn event() -> Event {
        Event {
            uid: Some("meeting".to_string()),
            summary: Some("Meeting".to_string()),
            location: Some("Room 4".to_string()),
            description: None,
            start: floating("2024-06-01T10:00"),
            end: Some(floating("2024-06-01T11:00")),
            duration: None,
            status: EventStatus::Confirmed,
            recurrence: None,
            recurrence_id: None,
        }
    }

    #[test]
    fn test_render_occurrence() {
        let occurrence = Occurrence::single(&event());
        assert_eq!(
            occurrence.render(),
            "Start: 2024-06-01 10:00:00 Summary: Meeting"
        );
    }

    #[test]
    fn test_render_event() {
        assert_eq!(
            event().render(),
            "Meeting\nRoom 4\n2024-06-01T10:00:00\n2024-06-01T11:00:00"
        );
    }

    #[test]
    fn test_render_event_with_missing_fields() {
        let mut e = event();
        e.summary = None;
        e.location = None;
        e.end = None;
        assert_eq!(e.render(), "\n\n2024-06-01T10:00:00\n");
    }

    #[test]
    fn test_render_all_day_event_with_duration() {
        let mut e = event();
        e.start = EventTime::Date(NaiveDate::from_ymd_opt(2024, 7, 4).unwrap());
        e.end = None;
        e.duration = Some(Duration::days(2));
        assert_eq!(e.render(), "Meeting\nRoom 4\n2024-07-04\n2024-07-06");
    }
}
