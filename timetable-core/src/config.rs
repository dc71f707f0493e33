//! Engine settings.
//!
//! Read from `~/.config/timetable/config.toml`, then overridden by
//! `TIMETABLE_*` environment variables (e.g. `TIMETABLE_TIMEZONE`).

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::day_clock::DayClock;
use crate::day_index::DEFAULT_MAX_SEARCH_DAYS;
use crate::error::{TimetableError, TimetableResult};
use crate::fetch::DEFAULT_FETCH_TIMEOUT;
use crate::next_event::DEFAULT_REFRESH_SECS;

/// What a successful refetch does to the viewed day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CursorPolicy {
    /// Stay on the day being viewed; only the first load picks a day.
    #[default]
    Keep,
    /// Jump back to the most relevant day on every load.
    Reset,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// IANA zone used for day boundaries and floating times. UTC if unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,

    /// Seconds between next-event recomputations.
    pub refresh_interval_secs: u64,

    /// Minutes between feed reloads in `watch` mode.
    pub feed_refresh_minutes: u64,

    /// How far prev/next navigation looks for a day with events.
    pub max_search_days: u32,

    pub fetch_timeout_secs: u64,

    pub cursor_on_refresh: CursorPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            timezone: None,
            refresh_interval_secs: DEFAULT_REFRESH_SECS as u64,
            feed_refresh_minutes: 30,
            max_search_days: DEFAULT_MAX_SEARCH_DAYS,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT.as_secs(),
            cursor_on_refresh: CursorPolicy::Keep,
        }
    }
}

impl Settings {
    pub fn config_path() -> TimetableResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| TimetableError::Config("Could not determine config directory".into()))?
            .join("timetable");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, creating a commented-out config file
    /// on first run.
    pub fn load() -> TimetableResult<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            Self::create_default_config(&path)?;
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> TimetableResult<Self> {
        let settings: Settings = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("TIMETABLE"))
            .build()
            .map_err(|e| TimetableError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| TimetableError::Config(e.to_string()))?;

        // Fail early on a bad zone name rather than on first use
        settings.day_clock()?;
        Ok(settings)
    }

    pub fn day_clock(&self) -> TimetableResult<DayClock> {
        match self.timezone.as_deref() {
            Some(name) if !name.trim().is_empty() => DayClock::from_name(name.trim()),
            _ => Ok(DayClock::utc()),
        }
    }

    pub fn refresh_interval(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.refresh_interval_secs.max(1) as i64)
    }

    pub fn feed_refresh_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.feed_refresh_minutes.max(1) * 60)
    }

    pub fn fetch_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.fetch_timeout_secs.max(1))
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> TimetableResult<()> {
        let contents = format!(
            "\
# timetable configuration

# Timezone used to decide which day an event belongs to:
# timezone = \"Europe/Dublin\"

# Seconds between next-event refreshes:
# refresh_interval_secs = {}

# Minutes between feed reloads in `timetable watch`:
# feed_refresh_minutes = 30

# How many days prev/next navigation searches for events:
# max_search_days = {}

# \"keep\" stays on the viewed day after a reload, \"reset\" jumps back:
# cursor_on_refresh = \"keep\"
",
            DEFAULT_REFRESH_SECS, DEFAULT_MAX_SEARCH_DAYS
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                TimetableError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| TimetableError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timetable").join("config.toml");

        Settings::create_default_config(&path).unwrap();
        let settings = Settings::load_from(&path).unwrap();

        assert_eq!(settings.max_search_days, DEFAULT_MAX_SEARCH_DAYS);
        assert_eq!(settings.refresh_interval(), chrono::Duration::seconds(60));
        assert_eq!(settings.cursor_on_refresh, CursorPolicy::Keep);
        assert_eq!(settings.day_clock().unwrap(), DayClock::utc());
    }

    #[test]
    fn test_values_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "timezone = \"Europe/Dublin\"\nmax_search_days = 30\ncursor_on_refresh = \"reset\"\n",
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();

        assert_eq!(settings.max_search_days, 30);
        assert_eq!(settings.cursor_on_refresh, CursorPolicy::Reset);
        assert_eq!(
            settings.day_clock().unwrap(),
            DayClock::from_name("Europe/Dublin").unwrap()
        );
    }

    #[test]
    fn test_bad_timezone_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "timezone = \"Nowhere/Land\"\n").unwrap();

        assert!(matches!(
            Settings::load_from(&path),
            Err(TimetableError::Config(_))
        ));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(settings, Settings::default());
    }
}
