//! Ambient theme mixing for games.
//!
//! Pooled audio emitters, one-shot and looped playback, and crossfading
//! between named area themes with randomly scheduled incidental sounds.

pub mod audio_system;
pub mod config;
pub mod error;
pub mod manifest;
pub mod messaging;
pub mod preferences;
pub mod sound;
pub mod theme;

pub use audio_system::{AudioManager, PlaybackEngine, SourceHandle};
pub use config::{MixerConfig, PoolConfig};
pub use error::{AppResult, ConfigError, MixerError, MixerResult, ValidationError};
pub use sound::{Clip, SoundDescriptor, SoundRegistry, SoundRegistryEntry};
pub use theme::{AreaTheme, RandomSoundRule, ThemeMixer, ThemePhase, ThemeTrigger};
