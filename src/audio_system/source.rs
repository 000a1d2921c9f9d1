/// Pooled audio sources
///
/// Handles, per-source settings and the distance model shared by every backend.
use std::fmt;

use glam::Vec3;

use super::backend::Emitter;
use crate::config::PoolConfig;
use crate::sound::ClipHandle;

/// Identifies one use of a pooled source.
///
/// The generation changes every time the slot is handed out again, so a
/// handle kept after release never addresses the next user's playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceHandle {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl fmt::Display for SourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "source#{}.{}", self.index, self.generation)
    }
}

/// What a source's position follows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceAnchor {
    /// Moves with the listener every tick (2D sounds, ambient beds)
    Listener,

    /// Stays where it was placed
    World,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RolloffMode {
    /// Full volume up to min distance, silent at max distance
    Linear,

    /// Inverse distance beyond min distance
    Logarithmic,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmitterSettings {
    pub volume: f32,
    pub pitch: f32,

    /// 0.0 = pure 2D, 1.0 = fully distance attenuated
    pub spatial_blend: f32,
    pub min_distance: f32,
    pub max_distance: f32,

    /// Stereo spread in degrees
    pub spread: f32,
    pub rolloff: RolloffMode,
}

impl EmitterSettings {
    pub fn from_pool_config(config: &PoolConfig) -> Self {
        Self {
            min_distance: config.default_min_distance,
            max_distance: config.default_max_distance,
            spread: config.default_spread,
            ..Self::default()
        }
    }

    /// Distance gain in [0, 1]
    pub fn attenuation(&self, distance: f32) -> f32 {
        if distance <= self.min_distance {
            return 1.0;
        }
        match self.rolloff {
            RolloffMode::Linear => {
                let span = self.max_distance - self.min_distance;
                if span <= f32::EPSILON {
                    return 0.0;
                }
                (1.0 - (distance - self.min_distance) / span).clamp(0.0, 1.0)
            }
            RolloffMode::Logarithmic => (self.min_distance / distance).clamp(0.0, 1.0),
        }
    }
}

impl Default for EmitterSettings {
    fn default() -> Self {
        Self {
            volume: 1.0,
            pitch: 1.0,
            spatial_blend: 0.0,
            min_distance: 5.0,
            max_distance: 50.0,
            spread: 150.0,
            rolloff: RolloffMode::Linear,
        }
    }
}

/// One reusable emitter slot
pub struct PooledSource {
    pub(crate) emitter: Box<dyn Emitter>,
    pub(crate) generation: u32,
    pub(crate) in_use: bool,
    pub(crate) settings: EmitterSettings,
    pub(crate) anchor: SourceAnchor,
    pub(crate) position: Vec3,
    pub(crate) looping: bool,
    pub(crate) clip: Option<ClipHandle>,

    /// Seconds until automatic release (one-shots only)
    pub(crate) remaining: Option<f32>,
}

impl PooledSource {
    pub(crate) fn new(emitter: Box<dyn Emitter>, settings: EmitterSettings) -> Self {
        Self {
            emitter,
            generation: 0,
            in_use: false,
            settings,
            anchor: SourceAnchor::World,
            position: Vec3::ZERO,
            looping: false,
            clip: None,
            remaining: None,
        }
    }

    pub fn is_in_use(&self) -> bool {
        self.in_use
    }

    pub fn settings(&self) -> &EmitterSettings {
        &self.settings
    }

    pub fn anchor(&self) -> SourceAnchor {
        self.anchor
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn clip(&self) -> Option<&ClipHandle> {
        self.clip.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.emitter.is_playing()
    }

    /// Gain sent to the emitter: volume, master level and distance model
    pub(crate) fn output_gain(&self, master: f32, listener: Option<Vec3>) -> f32 {
        let attenuation = listener
            .map(|l| self.settings.attenuation(self.position.distance(l)))
            .unwrap_or(1.0);
        let spatial = 1.0 + (attenuation - 1.0) * self.settings.spatial_blend;
        self.settings.volume * master * spatial
    }
}

impl fmt::Debug for PooledSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledSource")
            .field("generation", &self.generation)
            .field("in_use", &self.in_use)
            .field("settings", &self.settings)
            .field("anchor", &self.anchor)
            .field("looping", &self.looping)
            .field("remaining", &self.remaining)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = EmitterSettings::default();
        assert_eq!(settings.volume, 1.0);
        assert_eq!(settings.spatial_blend, 0.0);
        assert_eq!(settings.min_distance, 5.0);
        assert_eq!(settings.max_distance, 50.0);
        assert_eq!(settings.spread, 150.0);
        assert_eq!(settings.rolloff, RolloffMode::Linear);
    }

    #[test]
    fn test_linear_rolloff() {
        let settings = EmitterSettings {
            min_distance: 10.0,
            max_distance: 30.0,
            ..Default::default()
        };
        assert_eq!(settings.attenuation(3.0), 1.0);
        assert!((settings.attenuation(20.0) - 0.5).abs() < 1e-6);
        assert_eq!(settings.attenuation(45.0), 0.0);
    }

    #[test]
    fn test_logarithmic_rolloff() {
        let settings = EmitterSettings {
            min_distance: 2.0,
            rolloff: RolloffMode::Logarithmic,
            ..Default::default()
        };
        assert!((settings.attenuation(8.0) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_handle_display() {
        let handle = SourceHandle { index: 3, generation: 7 };
        assert_eq!(handle.to_string(), "source#3.7");
    }
}
