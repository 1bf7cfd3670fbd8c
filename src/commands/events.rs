use std::io::Write;

use anyhow::Result;
use calscan_core::Calendar;

use crate::render::Render;

/// Print every event definition of the calendar, regardless of the date window.
pub fn run(calendar: &Calendar, out: &mut impl Write) -> Result<()> {
    for event in calendar.events() {
        writeln!(out, "{}", event.render())?;
    }

    Ok(())
}
