//! Settings persistence.
//!
//! One pretty-printed JSON document holds the five tunables and the
//! exclusion list. It is read once at startup and rewritten on every change.
//! Persistence is best-effort: a missing or corrupt file degrades to
//! defaults, and a failed write is logged and otherwise ignored — the
//! session keeps its in-memory settings either way.

use crate::config::ScrollConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The persisted document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    #[serde(flatten)]
    pub config: ScrollConfig,
    pub excluded_apps: Vec<String>,
    /// RFC 3339 stamp of the last write; informational only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/glidewheel/settings.json`, when the platform has a
    /// per-user config directory.
    pub fn default_location() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("glidewheel").join("settings.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the document, falling back to defaults on any problem. The
    /// config is sanitized so hand-edited files cannot smuggle in
    /// out-of-range values.
    pub fn load(&self) -> Settings {
        let data = match std::fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no settings file, using defaults");
                return Settings::default();
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "failed to read settings: {e}");
                return Settings::default();
            }
        };

        let mut settings: Settings = match serde_json::from_slice(&data) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "corrupt settings file: {e}");
                return Settings::default();
            }
        };
        settings.config = settings.config.sanitized();
        settings
    }

    /// Write the document. Failures are logged and swallowed.
    pub fn persist(&self, config: &ScrollConfig, excluded_apps: Vec<String>) {
        let settings = Settings {
            config: config.clone(),
            excluded_apps,
            updated_at: Some(chrono::Utc::now().to_rfc3339()),
        };
        if let Err(e) = self.try_write(&settings) {
            tracing::warn!(path = %self.path.display(), "failed to persist settings: {e}");
        }
    }

    fn try_write(&self, settings: &Settings) -> crate::error::GlideResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(settings)?;
        std::fs::write(&self.path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::AccelCurve;

    fn store_in(dir: &tempfile::TempDir) -> SettingsStore {
        SettingsStore::new(dir.path().join("settings.json"))
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = store_in(&dir).load();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_persist_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let config = ScrollConfig {
            speed_multi: 120.0,
            friction: 0.05,
            natural_scroll: true,
            accel_curve: AccelCurve::EaseInOut,
            ..Default::default()
        };
        store.persist(&config, vec!["com.example.game".into()]);

        let loaded = store.load();
        assert_eq!(loaded.config, config);
        assert_eq!(loaded.excluded_apps, vec!["com.example.game".to_string()]);
        assert!(loaded.updated_at.is_some());
    }

    #[test]
    fn test_persist_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("nested").join("settings.json"));
        store.persist(&ScrollConfig::default(), vec![]);
        assert!(store.path().exists());
    }

    #[test]
    fn test_corrupt_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), b"{not json").unwrap();
        assert_eq!(store.load(), Settings::default());
    }

    #[test]
    fn test_loaded_config_is_sanitized() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), br#"{"friction": 50.0, "speedMulti": -3.0}"#).unwrap();

        let settings = store.load();
        assert_eq!(settings.config.friction, ScrollConfig::FRICTION_RANGE.1);
        assert_eq!(settings.config.speed_multi, ScrollConfig::SPEED_RANGE.0);
    }

    #[test]
    fn test_unknown_fields_are_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), br#"{"speedMulti": 90.0, "futureKnob": 1}"#).unwrap();
        assert_eq!(store.load().config.speed_multi, 90.0);
    }

    #[test]
    fn test_write_failure_is_swallowed() {
        // Point the store at a path whose parent is a file, so the write
        // must fail; persist should not panic.
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();
        let store = SettingsStore::new(blocker.join("settings.json"));
        store.persist(&ScrollConfig::default(), vec![]);
    }
}
