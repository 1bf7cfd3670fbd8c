//! Concrete instances of events inside a date window.

use crate::event::{Event, EventTime};

/// One dated instance of an event.
#[derive(Debug, Clone, PartialEq)]
pub struct Occurrence {
    pub uid: Option<String>,
    pub summary: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub start: EventTime,
    pub end: EventTime,
    /// Generated instant this occurrence stands for; None for non-recurring events
    pub recurrence_id: Option<EventTime>,
}

impl Occurrence {
    /// The event as it is declared, for non-recurring events and overrides.
    pub fn single(event: &Event) -> Self {
        Occurrence {
            uid: event.uid.clone(),
            summary: event.summary.clone(),
            location: event.location.clone(),
            description: event.description.clone(),
            start: event.start.clone(),
            end: event
                .resolved_end()
                .unwrap_or_else(|| event.start.shift(event.length())),
            recurrence_id: event.recurrence_id.clone(),
        }
    }

    /// An instance of a recurring master starting at `start`.
    pub fn instance(master: &Event, start: EventTime) -> Self {
        let end = start.shift(master.length());
        Occurrence {
            uid: master.uid.clone(),
            summary: master.summary.clone(),
            location: master.location.clone(),
            description: master.description.clone(),
            recurrence_id: Some(start.clone()),
            start,
            end,
        }
    }
}
