/// Sound preferences
///
/// Two user-facing settings persisted between sessions: whether sound is
/// enabled and the master volume.
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::config::APP_DIR_NAME;
use crate::error::ConfigError;

pub const SOUND_ENABLED_KEY: &str = "_soundEnabled";
pub const SOUND_VOLUME_KEY: &str = "_soundVolume";

/// Key-value storage for preferences
pub trait PreferenceStore: Send {
    fn get(&self, key: &str) -> Option<Value>;

    fn set(&mut self, key: &str, value: Value) -> Result<(), ConfigError>;
}

#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    values: HashMap<String, Value>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), ConfigError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// Preferences kept in a JSON object on disk, rewritten on every change
#[derive(Debug)]
pub struct JsonPreferenceStore {
    path: PathBuf,
    values: BTreeMap<String, Value>,
}

impl JsonPreferenceStore {
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME).join("preferences.json"))
            .ok_or(ConfigError::NoConfigDir)
    }

    pub fn open_default() -> Result<Self, ConfigError> {
        Self::open(Self::default_path()?)
    }

    /// Open the store at `path`. A missing file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        if !path.exists() {
            tracing::debug!("No preferences at {}, starting fresh", path.display());
            return Ok(Self {
                path,
                values: BTreeMap::new(),
            });
        }

        let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::LoadFailed {
            path: path.display().to_string(),
            source: Box::new(e),
        })?;
        let values = serde_json::from_str(&contents).map_err(|e| ConfigError::LoadFailed {
            path: path.display().to_string(),
            source: Box::new(e),
        })?;

        tracing::debug!("Loaded preferences from {}", path.display());
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::DirectoryCreationFailed {
                path: parent.display().to_string(),
                source: e,
            })?;
        }

        let json = serde_json::to_string_pretty(&self.values).map_err(|e| ConfigError::SaveFailed {
            path: self.path.display().to_string(),
            source: Box::new(e),
        })?;
        std::fs::write(&self.path, json).map_err(|e| ConfigError::SaveFailed {
            path: self.path.display().to_string(),
            source: Box::new(e),
        })
    }
}

impl PreferenceStore for JsonPreferenceStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), ConfigError> {
        self.values.insert(key.to_string(), value);
        self.save()
    }
}

/// Typed view over the two sound preferences
pub struct SoundPreferences {
    store: Box<dyn PreferenceStore>,
}

impl SoundPreferences {
    pub fn new(store: Box<dyn PreferenceStore>) -> Self {
        Self { store }
    }

    /// Defaults to enabled, writing the default on first access
    pub fn sound_enabled(&mut self) -> bool {
        match self.store.get(SOUND_ENABLED_KEY).and_then(|v| v.as_bool()) {
            Some(enabled) => enabled,
            None => {
                self.write(SOUND_ENABLED_KEY, Value::Bool(true));
                true
            }
        }
    }

    pub fn set_sound_enabled(&mut self, enabled: bool) {
        self.write(SOUND_ENABLED_KEY, Value::Bool(enabled));
    }

    /// Defaults to full volume, writing the default on first access
    pub fn sound_volume(&mut self) -> f32 {
        match self.store.get(SOUND_VOLUME_KEY).and_then(|v| v.as_f64()) {
            Some(volume) => (volume as f32).clamp(0.0, 1.0),
            None => {
                self.write(SOUND_VOLUME_KEY, Value::from(1.0));
                1.0
            }
        }
    }

    /// Store the clamped volume and return it
    pub fn set_sound_volume(&mut self, volume: f32) -> f32 {
        let volume = volume.clamp(0.0, 1.0);
        self.write(SOUND_VOLUME_KEY, Value::from(volume as f64));
        volume
    }

    fn write(&mut self, key: &str, value: Value) {
        if let Err(e) = self.store.set(key, value) {
            tracing::warn!("Failed to persist preference {}: {}", key, e);
        }
    }
}

impl std::fmt::Debug for SoundPreferences {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoundPreferences").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_written_on_first_access() {
        let mut prefs = SoundPreferences::new(Box::new(MemoryPreferenceStore::new()));
        assert!(prefs.sound_enabled());
        assert_eq!(prefs.sound_volume(), 1.0);
        assert_eq!(prefs.store.get(SOUND_ENABLED_KEY), Some(Value::Bool(true)));
        assert!(prefs.store.get(SOUND_VOLUME_KEY).is_some());
    }

    #[test]
    fn test_volume_clamped() {
        let mut prefs = SoundPreferences::new(Box::new(MemoryPreferenceStore::new()));
        assert_eq!(prefs.set_sound_volume(1.5), 1.0);
        assert_eq!(prefs.set_sound_volume(-0.5), 0.0);
        assert_eq!(prefs.sound_volume(), 0.0);
    }

    #[test]
    fn test_json_store_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("preferences.json");

        {
            let store = JsonPreferenceStore::open(&path).unwrap();
            let mut prefs = SoundPreferences::new(Box::new(store));
            prefs.set_sound_enabled(false);
            prefs.set_sound_volume(0.25);
        }

        let store = JsonPreferenceStore::open(&path).unwrap();
        let mut prefs = SoundPreferences::new(Box::new(store));
        assert!(!prefs.sound_enabled());
        assert_eq!(prefs.sound_volume(), 0.25);
    }

    #[test]
    fn test_json_store_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preferences.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(
            JsonPreferenceStore::open(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
    }
}
