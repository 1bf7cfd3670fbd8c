//! Loading calendars from .ics files.

use std::path::Path;

use crate::error::{CalScanError, CalScanResult};
use crate::event::Event;
use crate::ics::parse_calendar;

/// Calendar-level properties of a parsed file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalendarMetadata {
    pub prodid: Option<String>,
    pub version: Option<String>,
    /// X-WR-CALNAME
    pub name: Option<String>,
    /// TZIDs declared by VTIMEZONE components
    pub timezones: Vec<String>,
}

/// A parsed .ics file. Immutable once loaded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Calendar {
    metadata: CalendarMetadata,
    events: Vec<Event>,
}

impl Calendar {
    pub fn new(metadata: CalendarMetadata, events: Vec<Event>) -> Self {
        Calendar { metadata, events }
    }

    /// Read and parse the .ics file at `path`.
    pub fn load(path: &Path) -> CalScanResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| CalScanError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!(path = %path.display(), bytes = content.len(), "read calendar file");

        let calendar = Self::from_ics(&content)?;

        tracing::info!(
            path = %path.display(),
            events = calendar.events.len(),
            recurring = calendar.events.iter().filter(|e| e.is_recurring()).count(),
            "loaded calendar"
        );

        Ok(calendar)
    }

    pub fn from_ics(content: &str) -> CalScanResult<Self> {
        parse_calendar(content)
    }

    pub fn metadata(&self) -> &CalendarMetadata {
        &self.metadata
    }

    /// All VEVENTs in document order, including instance overrides.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
