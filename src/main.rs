mod commands;
mod render;

use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use calscan_core::Calendar;
use calscan_core::config::ScanConfig;
use calscan_core::date_range::parse_date;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "calscan")]
#[command(about = "Print the events of an .ics file and expand recurring events inside a date window")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// The .ics file to read (default: calendar_path from the config)
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    /// First day of the window, inclusive (YYYY-MM-DD)
    #[arg(long, global = true)]
    from: Option<String>,

    /// End of the window, exclusive (YYYY-MM-DD)
    #[arg(long, global = true)]
    to: Option<String>,

    /// Read configuration from this TOML file instead of ~/.config/calscan/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Report the remaining events when some recurrence rules cannot be expanded
    #[arg(long, global = true)]
    keep_going: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Clone, Copy, Default)]
enum Commands {
    /// Occurrences inside the window, then every event definition (default)
    #[default]
    Report,
    /// Only the occurrences inside the window
    Occurrences,
    /// Only the event definitions, ignoring the window
    Events,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("calscan={log_level},calscan_core={log_level}").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = resolve_config(&cli)?;
    let calendar_path = config.calendar_path();
    let calendar = Calendar::load(&calendar_path)
        .with_context(|| format!("Failed to load calendar {}", calendar_path.display()))?;

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match cli.command.unwrap_or_default() {
        Commands::Report => {
            let range = config.date_range()?;
            commands::report::run(&calendar, &range, cli.keep_going, &mut out)?;
        }
        Commands::Occurrences => {
            let range = config.date_range()?;
            let expansion = commands::expand_checked(&calendar, &range, cli.keep_going)?;
            commands::occurrences::run(&expansion.occurrences, &mut out)?;
        }
        Commands::Events => commands::events::run(&calendar, &mut out)?,
    }

    out.flush()?;
    Ok(())
}

/// Configuration file and environment, overridden by command-line flags.
fn resolve_config(cli: &Cli) -> Result<ScanConfig> {
    let mut config = ScanConfig::load(cli.config.as_deref())?;

    if let Some(file) = &cli.file {
        config.calendar_path = file.clone();
    }
    if let Some(from) = &cli.from {
        config.from = parse_date(from)?;
    }
    if let Some(to) = &cli.to {
        config.to = parse_date(to)?;
    }

    tracing::debug!(
        path = %config.calendar_path.display(),
        from = %config.from,
        to = %config.to,
        "resolved configuration"
    );

    Ok(config)
}
