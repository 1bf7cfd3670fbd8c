//! ICS parsing using the icalendar crate's parser.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use icalendar::{
    DatePerhapsTime,
    parser::{Component, Property, read_calendar, unfold},
};

use crate::calendar::{Calendar, CalendarMetadata};
use crate::error::{CalScanError, CalScanResult};
use crate::event::{Event, EventStatus, EventTime, Recurrence};

/// Parse the content of an .ics file into a Calendar.
pub fn parse_calendar(content: &str) -> CalScanResult<Calendar> {
    // Files saved by some Windows tools start with a UTF-8 byte order mark
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let unfolded = unfold(content);

    let first_line = unfolded.lines().map(str::trim).find(|l| !l.is_empty());
    if !first_line.is_some_and(|l| l.eq_ignore_ascii_case("BEGIN:VCALENDAR")) {
        return Err(CalScanError::IcsParse(
            "content does not start with BEGIN:VCALENDAR".to_string(),
        ));
    }

    let calendar =
        read_calendar(&unfolded).map_err(|e| CalScanError::IcsParse(e.to_string()))?;

    // Depending on the input the VCALENDAR is either the root or its only child
    let root = calendar.components.iter().find(|c| c.name == "VCALENDAR");
    let properties = root.map_or(&calendar.properties, |c| &c.properties);

    let mut vevents = Vec::new();
    collect_components(&calendar.components, "VEVENT", &mut vevents);
    let mut vtimezones = Vec::new();
    collect_components(&calendar.components, "VTIMEZONE", &mut vtimezones);

    let metadata = CalendarMetadata {
        prodid: find_value(properties, "PRODID"),
        version: find_value(properties, "VERSION"),
        name: find_value(properties, "X-WR-CALNAME").map(|v| unescape_text(&v)),
        timezones: vtimezones
            .iter()
            .filter_map(|c| c.find_prop("TZID"))
            .map(|p| p.val.to_string())
            .collect(),
    };

    let events = vevents
        .into_iter()
        .map(parse_event)
        .collect::<CalScanResult<Vec<_>>>()?;

    Ok(Calendar::new(metadata, events))
}

/// Depth-first walk collecting every component named `name`.
fn collect_components<'c, 'a>(
    components: &'c [Component<'a>],
    name: &str,
    found: &mut Vec<&'c Component<'a>>,
) {
    for component in components {
        if component.name == name {
            found.push(component);
        }
        collect_components(&component.components, name, found);
    }
}

fn find_value(properties: &[Property], name: &str) -> Option<String> {
    properties
        .iter()
        .find(|p| p.name == name)
        .map(|p| p.val.to_string())
}

/// Parse a VEVENT component into an Event
fn parse_event(vevent: &Component) -> CalScanResult<Event> {
    let uid = vevent.find_prop("UID").map(|p| p.val.to_string());
    let describe = || uid.clone().unwrap_or_else(|| "(no UID)".to_string());

    let start = vevent
        .find_prop("DTSTART")
        .and_then(decode_time)
        .ok_or_else(|| {
            CalScanError::IcsParse(format!("event {} has no valid DTSTART", describe()))
        })?;

    let end = match vevent.find_prop("DTEND") {
        Some(prop) => Some(decode_time(prop).ok_or_else(|| {
            CalScanError::IcsParse(format!("event {} has an invalid DTEND", describe()))
        })?),
        None => None,
    };

    let duration = match vevent.find_prop("DURATION") {
        Some(prop) => Some(parse_duration(prop.val.as_ref()).ok_or_else(|| {
            CalScanError::IcsParse(format!(
                "event {} has an invalid DURATION '{}'",
                describe(),
                prop.val.as_ref()
            ))
        })?),
        None => None,
    };

    let text = |name: &str| vevent.find_prop(name).map(|p| unescape_text(p.val.as_ref()));

    let status = vevent
        .find_prop("STATUS")
        .map(|p| match p.val.as_ref() {
            "TENTATIVE" => EventStatus::Tentative,
            "CANCELLED" => EventStatus::Cancelled,
            _ => EventStatus::Confirmed,
        })
        .unwrap_or(EventStatus::Confirmed);

    // Recurrence (RRULE, RDATE, EXDATE)
    let rrule = vevent.find_prop("RRULE").map(|p| p.val.to_string());
    let rdates = collect_time_lists(vevent, "RDATE");
    let exdates = collect_time_lists(vevent, "EXDATE");
    let recurrence = if rrule.is_some() || !rdates.is_empty() {
        Some(Recurrence {
            rrule: rrule.unwrap_or_default(),
            rdates,
            exdates,
        })
    } else {
        None
    };

    let recurrence_id = vevent.find_prop("RECURRENCE-ID").and_then(decode_time);

    Ok(Event {
        summary: text("SUMMARY"),
        location: text("LOCATION"),
        description: text("DESCRIPTION"),
        uid,
        start,
        end,
        duration,
        status,
        recurrence,
        recurrence_id,
    })
}

/// Decode a single-valued date or date-time property
fn decode_time(prop: &Property) -> Option<EventTime> {
    DatePerhapsTime::try_from(prop).ok().map(to_event_time)
}

/// Convert icalendar's DatePerhapsTime to our EventTime, preserving timezone info
fn to_event_time(dpt: DatePerhapsTime) -> EventTime {
    match dpt {
        DatePerhapsTime::Date(d) => EventTime::Date(d),
        DatePerhapsTime::DateTime(cal_dt) => match cal_dt {
            icalendar::CalendarDateTime::Utc(dt) => EventTime::DateTimeUtc(dt),
            icalendar::CalendarDateTime::Floating(naive) => EventTime::DateTimeFloating(naive),
            icalendar::CalendarDateTime::WithTimezone { date_time, tzid } => {
                EventTime::DateTimeZoned {
                    datetime: date_time,
                    tzid: tzid.trim_matches('"').to_string(),
                }
            }
        },
    }
}

fn collect_time_lists(vevent: &Component, name: &str) -> Vec<EventTime> {
    vevent
        .properties
        .iter()
        .filter(|p| p.name == name)
        .flat_map(parse_time_list)
        .collect()
}

/// Parse an EXDATE or RDATE property into a list of EventTime values.
///
/// Handles:
/// - TZID parameter: `EXDATE;TZID=America/New_York:20240108T100000`
/// - VALUE=DATE: `EXDATE;VALUE=DATE:20240108`
/// - UTC: `EXDATE:20240108T100000Z`
/// - Floating: `EXDATE:20240108T100000`
/// - Comma-separated values: `EXDATE;TZID=...:20240108T100000,20240115T100000`
///
/// Values that fit none of these (e.g. RDATE periods) are skipped.
fn parse_time_list(prop: &Property) -> Vec<EventTime> {
    let tzid = prop
        .params
        .iter()
        .find(|p| p.key == "TZID")
        .and_then(|p| p.val.as_ref().map(|v| v.as_ref().trim_matches('"').to_string()));

    let is_date = prop
        .params
        .iter()
        .any(|p| p.key == "VALUE" && p.val.as_ref().map(|v| v.as_ref()) == Some("DATE"));

    prop.val
        .as_ref()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| {
            if is_date || s.len() == 8 {
                NaiveDate::parse_from_str(s, "%Y%m%d").ok().map(EventTime::Date)
            } else if let Some(naive) = s.strip_suffix('Z') {
                NaiveDateTime::parse_from_str(naive, "%Y%m%dT%H%M%S")
                    .ok()
                    .map(|dt| EventTime::DateTimeUtc(dt.and_utc()))
            } else if let Some(ref tz) = tzid {
                NaiveDateTime::parse_from_str(s, "%Y%m%dT%H%M%S")
                    .ok()
                    .map(|dt| EventTime::DateTimeZoned {
                        datetime: dt,
                        tzid: tz.clone(),
                    })
            } else {
                NaiveDateTime::parse_from_str(s, "%Y%m%dT%H%M%S")
                    .ok()
                    .map(EventTime::DateTimeFloating)
            }
        })
        .collect()
}

/// Parse a DURATION value (`PT1H30M`, `-P1D`, `P2W`)
fn parse_duration(value: &str) -> Option<Duration> {
    let value = value.trim();
    let is_negative = value.starts_with('-');
    let duration_str = value.trim_start_matches(['-', '+']);

    let duration = iso8601::duration(duration_str).ok()?;
    let std_duration: std::time::Duration = duration.into();
    let duration = Duration::from_std(std_duration).ok()?;

    Some(if is_negative { -duration } else { duration })
}

/// Undo TEXT escaping (RFC 5545 §3.3.11)
fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
