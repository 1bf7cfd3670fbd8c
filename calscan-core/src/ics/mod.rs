//! ICS file parsing.
//!
//! This module turns .ics content into a [`Calendar`](crate::calendar::Calendar)
//! according to RFC 5545.

mod parse;

pub use parse::parse_calendar;
