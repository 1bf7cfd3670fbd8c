use std::io::Write;

use anyhow::Result;
use calscan_core::Occurrence;

use crate::render::Render;

/// Print one line per occurrence.
pub fn run(occurrences: &[Occurrence], out: &mut impl Write) -> Result<()> {
    for occurrence in occurrences {
        writeln!(out, "{}", occurrence.render())?;
    }

    Ok(())
}
