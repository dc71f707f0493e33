//! Persistent key-value storage for the calendar URL.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crate::error::{TimetableError, TimetableResult};

/// Key under which the calendar URL is stored.
pub const CALENDAR_URL_KEY: &str = "calendar_url";

/// Opaque string store that survives restarts.
pub trait ConfigStore {
    fn get(&self, key: &str) -> TimetableResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> TimetableResult<()>;
}

/// In-process store, for tests and embedding.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(key: &str, value: &str) -> Self {
        let mut store = Self::default();
        store.values.insert(key.to_string(), value.to_string());
        store
    }
}

impl ConfigStore for MemoryStore {
    fn get(&self, key: &str) -> TimetableResult<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> TimetableResult<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store backed by a flat TOML table, by default
/// `~/.config/timetable/state.toml`.
#[derive(Debug, Clone)]
pub struct TomlFileStore {
    path: PathBuf,
}

impl TomlFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        TomlFileStore { path: path.into() }
    }

    pub fn default_path() -> TimetableResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| TimetableError::Config("Could not determine config directory".into()))?
            .join("timetable");

        Ok(config_dir.join("state.toml"))
    }

    pub fn open_default() -> TimetableResult<Self> {
        Ok(Self::new(Self::default_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> TimetableResult<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        toml::from_str(&content).map_err(|e| {
            TimetableError::Config(format!("Could not read {}: {}", self.path.display(), e))
        })
    }
}

impl ConfigStore for TomlFileStore {
    fn get(&self, key: &str) -> TimetableResult<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> TimetableResult<()> {
        let mut values = self.load()?;
        values.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(&values).map_err(|e| TimetableError::Config(e.to_string()))?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.toml");

        let mut store = TomlFileStore::new(&path);
        assert_eq!(store.get(CALENDAR_URL_KEY).unwrap(), None);

        store
            .set(CALENDAR_URL_KEY, "https://example.edu/cal.ics")
            .unwrap();
        store.set("other", "value").unwrap();

        let reopened = TomlFileStore::new(&path);
        assert_eq!(
            reopened.get(CALENDAR_URL_KEY).unwrap().as_deref(),
            Some("https://example.edu/cal.ics")
        );
        assert_eq!(reopened.get("other").unwrap().as_deref(), Some("value"));
    }

    #[test]
    fn test_file_store_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = TomlFileStore::new(dir.path().join("state.toml"));

        store.set(CALENDAR_URL_KEY, "https://a.example/1.ics").unwrap();
        store.set(CALENDAR_URL_KEY, "https://a.example/2.ics").unwrap();

        assert_eq!(
            store.get(CALENDAR_URL_KEY).unwrap().as_deref(),
            Some("https://a.example/2.ics")
        );
    }

    #[test]
    fn test_corrupt_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.toml");
        std::fs::write(&path, "calendar_url = [unterminated").unwrap();

        let store = TomlFileStore::new(&path);
        assert!(matches!(
            store.get(CALENDAR_URL_KEY),
            Err(TimetableError::Config(_))
        ));
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::with(CALENDAR_URL_KEY, "https://x.example/a.ics");
        assert!(store.get(CALENDAR_URL_KEY).unwrap().is_some());
        store.set(CALENDAR_URL_KEY, "").unwrap();
        assert_eq!(store.get(CALENDAR_URL_KEY).unwrap().as_deref(), Some(""));
    }
}
