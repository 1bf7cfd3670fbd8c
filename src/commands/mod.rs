pub mod events;
pub mod occurrences;
pub mod report;

use anyhow::Result;
use calscan_core::{Calendar, DateRange, Expansion, expand};

/// Expand the calendar, failing unless every recurring event could be expanded.
///
/// With `keep_going` the failures are only logged and the partial expansion is returned.
pub fn expand_checked(
    calendar: &Calendar,
    range: &DateRange,
    keep_going: bool,
) -> Result<Expansion> {
    let expansion = expand(calendar, range);

    if expansion.is_complete() {
        return Ok(expansion);
    }

    for failure in &expansion.failures {
        if keep_going {
            tracing::warn!(event = %failure.event, "skipping event: {}", failure.error);
        } else {
            tracing::error!(event = %failure.event, "{}", failure.error);
        }
    }

    if !keep_going {
        anyhow::bail!(
            "{} event(s) could not be expanded (use --keep-going to report the rest)",
            expansion.failures.len()
        );
    }

    Ok(expansion)
}
