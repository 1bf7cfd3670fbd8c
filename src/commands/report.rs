use std::io::Write;

use anyhow::Result;
use calscan_core::{Calendar, DateRange};

use super::{events, expand_checked, occurrences};

/// Print the occurrences inside `range`, then every event definition.
///
/// Expansion happens before anything is written, so a failed expansion
/// leaves the output empty.
pub fn run(
    calendar: &Calendar,
    range: &DateRange,
    keep_going: bool,
    out: &mut impl Write,
) -> Result<()> {
    let expansion = expand_checked(calendar, range, keep_going)?;

    occurrences::run(&expansion.occurrences, out)?;
    events::run(calendar, out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calendar(vevents: &str) -> Calendar {
        Calendar::from_ics(&format!(
            "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:TEST\r\n{vevents}END:VCALENDAR\r\n"
        ))
        .unwrap()
    }

    fn report(calendar: &Calendar, from: &str, to: &str, keep_going: bool) -> Result<String> {
        let range = DateRange::from_args(from, to)?;
        let mut out = Vec::new();
        run(calendar, &range, keep_going, &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn test_single_meeting_report() {
        let cal = calendar(
            "BEGIN:VEVENT\r\n\
UID:meeting\r\n\
SUMMARY:Meeting\r\n\
DTSTART:20240601T100000\r\n\
DTEND:20240601T110000\r\n\
END:VEVENT\r\n",
        );

        let output = report(&cal, "2024-01-01", "2026-01-01", false).unwrap();
        assert_eq!(
            output,
            "Start: 2024-06-01 10:00:00 Summary: Meeting\n\
Meeting\n\
\n\
2024-06-01T10:00:00\n\
2024-06-01T11:00:00\n"
        );
    }

    #[test]
    fn test_recurring_event_listed_once_as_definition() {
        let cal = calendar(
            "BEGIN:VEVENT\r\n\
UID:weekly\r\n\
SUMMARY:Weekly\r\n\
DTSTART:20240101T090000\r\n\
RRULE:FREQ=WEEKLY\r\n\
END:VEVENT\r\n",
        );

        let output = report(&cal, "2024-01-01", "2024-01-22", false).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Start: 2024-01-01 09:00:00 Summary: Weekly",
                "Start: 2024-01-08 09:00:00 Summary: Weekly",
                "Start: 2024-01-15 09:00:00 Summary: Weekly",
                "Weekly",
                "",
                "2024-01-01T09:00:00",
                "",
            ]
        );
    }

    #[test]
    fn test_expansion_failure_prints_nothing() {
        let cal = calendar(
            "BEGIN:VEVENT\r\n\
UID:ok\r\n\
SUMMARY:Fine\r\n\
DTSTART:20240601T100000\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:broken\r\n\
SUMMARY:Broken\r\n\
DTSTART:20240101T090000\r\n\
RRULE:FREQ=SOMETIMES\r\n\
END:VEVENT\r\n",
        );

        let range = DateRange::from_args("2024-01-01", "2026-01-01").unwrap();
        let mut out = Vec::new();
        assert!(run(&cal, &range, false, &mut out).is_err());
        assert!(out.is_empty());

        let output = report(&cal, "2024-01-01", "2026-01-01", true).unwrap();
        assert!(output.starts_with("Start: 2024-06-01 10:00:00 Summary: Fine\n"));
        assert!(output.contains("Broken\n"));
    }
}
