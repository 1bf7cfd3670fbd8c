//! RRULE expansion for recurring events.
//!
//! Expands every event of a calendar into the concrete occurrences that start
//! inside a [`DateRange`], respecting RDATEs, EXDATEs and instance overrides
//! (events carrying a RECURRENCE-ID).

use std::collections::HashSet;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use rrule::RRuleSet;

use crate::calendar::Calendar;
use crate::date_range::DateRange;
use crate::error::{CalScanError, CalScanResult};
use crate::event::{Event, EventStatus, EventTime, Recurrence, parse_tzid};
use crate::occurrence::Occurrence;

/// Maximum number of instances generated for a single event.
const MAX_INSTANCES: u16 = u16::MAX;

/// Occurrences of a calendar inside a window, plus the events that could not be expanded.
#[derive(Debug, Default)]
pub struct Expansion {
    /// Sorted by start, then summary
    pub occurrences: Vec<Occurrence>,
    pub failures: Vec<ExpansionFailure>,
}

/// A recurring event whose rule could not be expanded.
#[derive(Debug)]
pub struct ExpansionFailure {
    pub event: String,
    pub error: CalScanError,
}

impl Expansion {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Expand all events of `calendar` into occurrences starting inside `range`.
///
/// A malformed recurrence only fails its own event; it is reported in
/// [`Expansion::failures`] and the remaining events are still expanded.
pub fn expand(calendar: &Calendar, range: &DateRange) -> Expansion {
    let events = calendar.events();

    let recurring_uids: HashSet<&str> = events
        .iter()
        .filter(|e| e.is_recurring() && e.recurrence_id.is_none())
        .filter_map(|e| e.uid.as_deref())
        .collect();

    // Generated instances replaced by an override, keyed by (uid, original start)
    let overridden: HashSet<(&str, DateTime<Utc>)> = events
        .iter()
        .filter_map(|e| Some((e.uid.as_deref()?, e.recurrence_id.as_ref()?)))
        .filter(|(uid, _)| recurring_uids.contains(uid))
        .map(|(uid, rid)| (uid, rid.instant()))
        .collect();

    let mut expansion = Expansion::default();

    for event in events {
        let is_override = event.recurrence_id.is_some()
            && event
                .uid
                .as_deref()
                .is_some_and(|uid| recurring_uids.contains(uid));

        if is_override {
            if event.status != EventStatus::Cancelled && range.contains(&event.start) {
                expansion.occurrences.push(Occurrence::single(event));
            }
            continue;
        }

        let recurrence = match &event.recurrence {
            Some(r) => r,
            None => {
                if range.contains(&event.start) {
                    expansion.occurrences.push(Occurrence::single(event));
                }
                continue;
            }
        };

        match expand_recurring_event(event, recurrence, range) {
            Ok(starts) => {
                tracing::debug!(event = %event.label(), instances = starts.len(), "expanded");
                let uid = event.uid.as_deref().unwrap_or_default();
                expansion.occurrences.extend(
                    starts
                        .into_iter()
                        .filter(|start| !overridden.contains(&(uid, start.instant())))
                        .map(|start| Occurrence::instance(event, start)),
                );
            }
            Err(error) => expansion.failures.push(ExpansionFailure {
                event: event.label(),
                error,
            }),
        }
    }

    expansion.occurrences.sort_by(|a, b| {
        a.start
            .instant()
            .cmp(&b.start.instant())
            .then_with(|| a.summary.cmp(&b.summary))
    });

    tracing::info!(
        occurrences = expansion.occurrences.len(),
        failures = expansion.failures.len(),
        from = %range.start(),
        to = %range.end(),
        "expanded calendar"
    );

    expansion
}

/// Start times of all instances of a recurring master inside `range`.
///
/// Every returned time keeps the EventTime variant of the master's DTSTART.
pub fn expand_recurring_event(
    master: &Event,
    recurrence: &Recurrence,
    range: &DateRange,
) -> CalScanResult<Vec<EventTime>> {
    if let EventTime::DateTimeZoned { tzid, .. } = &master.start {
        if parse_tzid(tzid).is_none() {
            tracing::debug!(
                event = %master.label(),
                tzid = %tzid,
                "unknown TZID, expanding as floating time"
            );
        }
    }

    // An RDATE-only set needs no rule engine
    if recurrence.rrule.is_empty() {
        let excluded: HashSet<DateTime<Utc>> = recurrence
            .exdates
            .iter()
            .map(|t| anchor_to_start(t, &master.start).instant())
            .collect();
        let mut starts: Vec<EventTime> = std::iter::once(master.start.clone())
            .chain(
                recurrence
                    .rdates
                    .iter()
                    .map(|t| anchor_to_start(t, &master.start)),
            )
            .filter(|t| !excluded.contains(&t.instant()))
            .filter(|t| range.contains(t))
            .collect();
        starts.sort_by_key(EventTime::instant);
        starts.dedup();
        return Ok(starts);
    }

    let rrule_str = build_rrule_string(&master.start, recurrence);

    let rrule_set: RRuleSet = rrule_str.parse().map_err(|e| CalScanError::Expansion {
        event: master.label(),
        message: format!("{e}"),
    })?;

    // Coarse UTC bounds one day wider than the window; the exact cut happens on
    // the event's wall clock below
    let tz: rrule::Tz = Utc.into();
    let (after, before) = range.widened(Duration::days(1));
    let result = rrule_set
        .after(after.and_utc().with_timezone(&tz))
        .before(before.and_utc().with_timezone(&tz))
        .all(MAX_INSTANCES);

    if result.limited {
        tracing::warn!(
            event = %master.label(),
            limit = MAX_INSTANCES,
            "recurrence produced too many instances, output is truncated"
        );
    }

    Ok(result
        .dates
        .iter()
        .map(|dt| occurrence_to_event_time(dt, &master.start))
        .filter(|start| range.contains(start))
        .collect())
}

/// Build an iCalendar-format rule set string for the rrule crate parser.
fn build_rrule_string(start: &EventTime, recurrence: &Recurrence) -> String {
    let mut lines = vec![property_line("DTSTART", start)];

    lines.push(format!(
        "RRULE:{}",
        normalize_until(&recurrence.rrule, start)
    ));

    for rdate in &recurrence.rdates {
        lines.push(property_line("RDATE", &anchor_to_start(rdate, start)));
    }
    for exdate in &recurrence.exdates {
        lines.push(property_line("EXDATE", &anchor_to_start(exdate, start)));
    }

    lines.join("\n")
}

/// Render a time as a content line the rrule crate accepts.
///
/// The rrule crate needs a datetime, so all-day dates become midnight UTC.
/// Floating times and times in an unknown zone are expanded as if they were UTC.
fn property_line(name: &str, time: &EventTime) -> String {
    match time {
        EventTime::Date(d) => format!("{name}:{}T000000Z", d.format("%Y%m%d")),
        EventTime::DateTimeUtc(dt) => format!("{name}:{}", dt.format("%Y%m%dT%H%M%SZ")),
        EventTime::DateTimeFloating(dt) => format!("{name}:{}Z", dt.format("%Y%m%dT%H%M%S")),
        EventTime::DateTimeZoned { datetime, tzid } => match parse_tzid(tzid) {
            Some(tz) => format!(
                "{name};TZID={}:{}",
                tz.name(),
                datetime.format("%Y%m%dT%H%M%S")
            ),
            None => format!("{name}:{}Z", datetime.format("%Y%m%dT%H%M%S")),
        },
    }
}

/// Rewrite UNTIL so it is a UTC date-time, which the rrule crate requires
/// whenever DTSTART carries a zone (and we always give it one).
fn normalize_until(rrule: &str, start: &EventTime) -> String {
    rrule
        .split(';')
        .map(|part| match part.split_once('=') {
            Some((key, value)) if key.eq_ignore_ascii_case("UNTIL") => {
                format!("UNTIL={}", until_as_utc(value, start))
            }
            _ => part.to_string(),
        })
        .collect::<Vec<_>>()
        .join(";")
}

fn until_as_utc(value: &str, start: &EventTime) -> String {
    if value.ends_with('Z') {
        return value.to_string();
    }

    // Date-only UNTIL includes the whole day
    let local = if value.len() == 8 {
        NaiveDate::parse_from_str(value, "%Y%m%d")
            .ok()
            .and_then(|d| d.and_hms_opt(23, 59, 59))
    } else {
        NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S").ok()
    };
    let Some(local) = local else {
        return value.to_string();
    };

    let zoned = match start {
        EventTime::DateTimeZoned { tzid, .. } => parse_tzid(tzid)
            .and_then(|tz| tz.from_local_datetime(&local).earliest())
            .map(|dt| dt.with_timezone(&Utc)),
        _ => None,
    };

    zoned
        .unwrap_or_else(|| local.and_utc())
        .format("%Y%m%dT%H%M%SZ")
        .to_string()
}

/// Give a date-only RDATE/EXDATE the time of day and zone of a timed master,
/// so it lines up with the generated instances.
fn anchor_to_start(time: &EventTime, start: &EventTime) -> EventTime {
    let EventTime::Date(date) = time else {
        return time.clone();
    };

    match start {
        EventTime::Date(_) => time.clone(),
        EventTime::DateTimeUtc(dt) => EventTime::DateTimeUtc(date.and_time(dt.time()).and_utc()),
        EventTime::DateTimeFloating(dt) => EventTime::DateTimeFloating(date.and_time(dt.time())),
        EventTime::DateTimeZoned { datetime, tzid } => EventTime::DateTimeZoned {
            datetime: date.and_time(datetime.time()),
            tzid: tzid.clone(),
        },
    }
}

/// Convert an rrule occurrence datetime back to an EventTime matching the master's variant.
fn occurrence_to_event_time(dt: &DateTime<rrule::Tz>, master_start: &EventTime) -> EventTime {
    match master_start {
        EventTime::Date(_) => EventTime::Date(dt.date_naive()),
        EventTime::DateTimeUtc(_) => EventTime::DateTimeUtc(dt.with_timezone(&Utc)),
        EventTime::DateTimeFloating(_) => EventTime::DateTimeFloating(dt.naive_utc()),
        EventTime::DateTimeZoned { tzid, .. } => EventTime::DateTimeZoned {
            datetime: dt.naive_local(),
            tzid: tzid.clone(),
        },
    }
}
