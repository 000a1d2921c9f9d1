/// Audio system module
///
/// Pooled emitters, the playback surface built on them, and the manager
/// that ties playback, theme mixing and user preferences together.
///
/// ## Architecture
///
/// ```text
/// AudioManager
///   ├── VolumeDamper      (global ambient factor)
///   ├── ThemeMixer        (crossfades area themes)
///   └── PlaybackEngine
///         ├── SoundRegistry
///         ├── Listener
///         └── SourcePool
///               └── Emitter × N   (rodio sinks, or mock emitters in tests)
/// ```
///
/// ## Usage
///
/// ```rust,ignore
/// let mut manager = AudioManager::new(
///     Box::new(RodioBackend::try_default()?),
///     Box::new(listener.clone()),
///     registry,
///     MixerConfig::load()?,
///     Box::new(JsonPreferenceStore::open_default()?),
/// )?;
///
/// manager.register_themes(themes)?;
/// manager.activate_theme(Some("Cave"));
///
/// loop {
///     manager.update(dt);
/// }
/// ```
pub mod backend;
pub mod effects;
pub mod manager;
pub mod mock;
pub mod player;
pub mod pool;
pub mod rodio_backend;
pub mod source;

// Re-export commonly used types
pub use backend::{AudioBackend, Emitter, FixedListener, Listener, SharedListener};
pub use effects::{GainFade, MasterVolume, VolumeDamper};
pub use manager::AudioManager;
pub use mock::{MockBackend, MockEmitterState};
pub use player::PlaybackEngine;
pub use pool::SourcePool;
pub use rodio_backend::RodioBackend;
pub use source::{EmitterSettings, PooledSource, RolloffMode, SourceAnchor, SourceHandle};
