use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Application folder under the platform config directory
pub const APP_DIR_NAME: &str = "AmbienceMixer";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Maximum number of pooled sources (None = grow on demand)
    pub max_sources: Option<usize>,

    /// Distance under which spatial sources play at full volume
    pub default_min_distance: f32,

    /// Distance at which spatial sources become inaudible
    pub default_max_distance: f32,

    /// Stereo spread in degrees
    pub default_spread: f32,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_sources: None,
            default_min_distance: 5.0,
            default_max_distance: 50.0,
            default_spread: 150.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixerConfig {
    /// Exponential smoothing rate for theme gain (0.0-1.0)
    pub fade_factor: f32,

    /// Default time for the damper to restore full ambient volume
    pub damper_restore_seconds: f32,

    /// Gain below which an inactive theme is reclaimed
    pub reclaim_threshold: f32,

    /// Lower bound of the first random-sound countdown after activation
    pub warmup_min_delay: f32,

    /// Lower clamp for every random-sound interval
    pub min_random_delay: f32,

    /// Fixed seed for reproducible random scheduling
    pub rng_seed: Option<u64>,

    pub pool: PoolConfig,
}

impl Default for MixerConfig {
    fn default() -> Self {
        Self {
            fade_factor: 0.5,
            damper_restore_seconds: 2.0,
            reclaim_threshold: 0.001,
            warmup_min_delay: 5.0,
            min_random_delay: 10.0,
            rng_seed: None,
            pool: PoolConfig::default(),
        }
    }
}

impl MixerConfig {
    /// Load configuration from the platform-specific config directory.
    /// Creates default config if file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Load configuration from an explicit path, writing defaults when absent.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            tracing::info!("Created default mixer config at: {}", path.display());
            return Ok(config);
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.display().to_string(),
            source: Box::new(e),
        })?;
        let config: MixerConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.display().to_string(),
                source: Box::new(e),
            })?;
        config.validate()?;

        tracing::info!("Loaded mixer config from: {}", path.display());
        Ok(config)
    }

    /// Save configuration to the platform-specific config directory
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::config_path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::DirectoryCreationFailed {
                path: parent.display().to_string(),
                source: e,
            })?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.display().to_string(),
            source: Box::new(e),
        })?;
        fs::write(path, json).map_err(|e| ConfigError::SaveFailed {
            path: path.display().to_string(),
            source: Box::new(e),
        })?;

        Ok(())
    }

    /// Reject values the mixer cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let values = [
            ("fade_factor", self.fade_factor),
            ("damper_restore_seconds", self.damper_restore_seconds),
            ("reclaim_threshold", self.reclaim_threshold),
            ("warmup_min_delay", self.warmup_min_delay),
            ("min_random_delay", self.min_random_delay),
            ("pool.default_min_distance", self.pool.default_min_distance),
            ("pool.default_max_distance", self.pool.default_max_distance),
            ("pool.default_spread", self.pool.default_spread),
        ];
        if let Some((name, value)) = values.iter().find(|(_, value)| !value.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "{} must be finite, got {}",
                name, value
            )));
        }

        if !(0.0..=1.0).contains(&self.fade_factor) {
            return Err(ConfigError::Invalid(format!(
                "fade_factor must be within [0, 1], got {}",
                self.fade_factor
            )));
        }
        if !(0.0..1.0).contains(&self.reclaim_threshold) {
            return Err(ConfigError::Invalid(format!(
                "reclaim_threshold must be within [0, 1), got {}",
                self.reclaim_threshold
            )));
        }
        if self.warmup_min_delay < 0.0 || self.min_random_delay < 0.0 {
            return Err(ConfigError::Invalid(
                "random sound delays must not be negative".to_string(),
            ));
        }
        if self.pool.default_min_distance > self.pool.default_max_distance {
            return Err(ConfigError::Invalid(
                "pool.default_min_distance exceeds pool.default_max_distance".to_string(),
            ));
        }
        if self.pool.max_sources == Some(0) {
            return Err(ConfigError::Invalid(
                "pool.max_sources must allow at least one source".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the config file path (in the user config folder)
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME).join("mixer.json"))
            .ok_or(ConfigError::NoConfigDir)
    }
}
