//! calscan configuration.
//!
//! Values come from, in increasing precedence: built-in defaults, the TOML
//! file at ~/.config/calscan/config.toml (or an explicit `--config` file),
//! and `CALSCAN_*` environment variables. Command-line flags are applied on
//! top by the CLI.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use crate::date_range::DateRange;
use crate::error::{CalScanError, CalScanResult};

static DEFAULT_CALENDAR_PATH: &str = "./calendarTestFiles/gt-scheduler.ics";

const ENV_PREFIX: &str = "CALSCAN";

fn default_calendar_path() -> PathBuf {
    PathBuf::from(DEFAULT_CALENDAR_PATH)
}

fn default_from() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default()
}

fn default_to() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 1).unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScanConfig {
    /// The .ics file to read; `~` is expanded
    #[serde(default = "default_calendar_path")]
    pub calendar_path: PathBuf,

    /// First day of the expansion window
    #[serde(default = "default_from")]
    pub from: NaiveDate,

    /// First day after the expansion window
    #[serde(default = "default_to")]
    pub to: NaiveDate,
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            calendar_path: default_calendar_path(),
            from: default_from(),
            to: default_to(),
        }
    }
}

impl ScanConfig {
    /// ~/.config/calscan/config.toml, if the platform has a config directory
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("calscan").join("config.toml"))
    }

    /// Load the configuration.
    ///
    /// An explicit `config_file` must exist; the default location is optional
    /// and never created.
    pub fn load(config_file: Option<&Path>) -> CalScanResult<Self> {
        Self::load_with_env(config_file, Environment::with_prefix(ENV_PREFIX))
    }

    fn load_with_env(config_file: Option<&Path>, environment: Environment) -> CalScanResult<Self> {
        let mut builder = Config::builder();

        let file = match config_file {
            Some(path) => Some((path.to_path_buf(), true)),
            None => Self::config_path().map(|path| (path, false)),
        };
        if let Some((path, required)) = file {
            tracing::debug!(path = %path.display(), required, "reading config file");
            builder = builder.add_source(
                File::new(&path.to_string_lossy(), FileFormat::Toml).required(required),
            );
        }

        builder
            .add_source(environment)
            .build()
            .map_err(|e| CalScanError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| CalScanError::Config(e.to_string()))
    }

    /// The calendar path with `~` expanded.
    pub fn calendar_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.calendar_path.to_string_lossy()).into_owned();

        PathBuf::from(full_path_str)
    }

    pub fn date_range(&self) -> CalScanResult<DateRange> {
        DateRange::new(self.from, self.to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn config_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = ScanConfig::default();
        assert_eq!(config.calendar_path, PathBuf::from(DEFAULT_CALENDAR_PATH));

        let range = config.date_range().unwrap();
        assert_eq!(range.start(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(range.end(), NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
    }

    #[test]
    fn test_load_from_file() {
        let file = config_file(
            "calendar_path = \"/tmp/work.ics\"\n\
             from = \"2025-03-01\"\n\
             to = \"2025-04-01\"\n",
        );

        let config = ScanConfig::load(Some(file.path())).expect("Should load");
        assert_eq!(config.calendar_path, PathBuf::from("/tmp/work.ics"));
        assert_eq!(config.from, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        assert_eq!(config.to, NaiveDate::from_ymd_opt(2025, 4, 1).unwrap());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let file = config_file("to = \"2024-02-01\"\n");

        let config = ScanConfig::load(Some(file.path())).expect("Should load");
        assert_eq!(config.from, default_from());
        assert_eq!(config.to, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    }

    fn environment(vars: &[(&str, &str)]) -> Environment {
        Environment::with_prefix(ENV_PREFIX).source(Some(
            vars.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        ))
    }

    #[test]
    fn test_environment_overrides_file() {
        let file = config_file(
            "from = \"2025-01-01\"\n\
             to = \"2026-01-01\"\n",
        );

        let env = environment(&[
            ("CALSCAN_FROM", "2024-06-01"),
            ("CALSCAN_CALENDAR_PATH", "/tmp/env.ics"),
        ]);
        let config = ScanConfig::load_with_env(Some(file.path()), env).expect("Should load");
        assert_eq!(config.from, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(config.to, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        assert_eq!(config.calendar_path, PathBuf::from("/tmp/env.ics"));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ScanConfig::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, CalScanError::Config(_)));
    }

    #[test]
    fn test_invalid_date_is_an_error() {
        let file = config_file("from = \"yesterday\"\n");
        assert!(ScanConfig::load(Some(file.path())).is_err());
    }

    #[test]
    fn test_tilde_expansion() {
        let config = ScanConfig {
            calendar_path: PathBuf::from("~/calendars/work.ics"),
            ..ScanConfig::default()
        };
        assert!(!config.calendar_path().to_string_lossy().starts_with('~'));
    }
}
