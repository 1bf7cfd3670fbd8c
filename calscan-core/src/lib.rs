//! Core types for calscan.
//!
//! This crate loads .ics files and expands their recurring events:
//! - `calendar` and `ics` for reading files into [`Calendar`]
//! - `recurrence` for expanding events into [`Occurrence`]s inside a [`DateRange`]
//! - `config` for the file/environment configuration used by the CLI

pub mod calendar;
pub mod config;
pub mod date_range;
pub mod error;
pub mod event;
pub mod ics;
pub mod occurrence;
pub mod recurrence;

pub use calendar::{Calendar, CalendarMetadata};
pub use date_range::DateRange;
pub use error::{CalScanError, CalScanResult};
pub use event::{Event, EventStatus, EventTime, Recurrence};
pub use occurrence::Occurrence;
pub use recurrence::{Expansion, ExpansionFailure, expand};
