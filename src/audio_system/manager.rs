/// Audio manager
///
/// The single entry point a host constructs at startup. Owns playback, the
/// theme mixer, the ambient damper and the sound preferences, and advances
/// all of them from one `update` call per frame.
use glam::Vec3;

use super::backend::{AudioBackend, Listener};
use super::effects::VolumeDamper;
use super::player::PlaybackEngine;
use super::source::SourceHandle;
use crate::config::MixerConfig;
use crate::error::{ConfigError, MixerResult};
use crate::messaging::{EventBus, ThemeRequestSender};
use crate::preferences::{PreferenceStore, SoundPreferences};
use crate::sound::{SoundDescriptor, SoundRegistry};
use crate::theme::{AreaTheme, ThemeMixer, ThemeTrigger};

pub struct AudioManager {
    engine: PlaybackEngine,
    mixer: ThemeMixer,
    damper: VolumeDamper,
    preferences: SoundPreferences,
    events: EventBus,
    config: MixerConfig,
}

impl AudioManager {
    /// Create the manager and apply the stored sound preferences.
    ///
    /// Fails when `config` does not pass [`MixerConfig::validate`].
    pub fn new(
        backend: Box<dyn AudioBackend>,
        listener: Box<dyn Listener>,
        registry: SoundRegistry,
        config: MixerConfig,
        store: Box<dyn PreferenceStore>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        tracing::info!(
            "Creating audio manager ({} backend, {} registered sounds)",
            backend.name(),
            registry.len()
        );

        let events = EventBus::new();
        let engine = PlaybackEngine::new(backend, listener, registry, &config);
        let mixer = ThemeMixer::new(&config, events.clone());

        let mut manager = Self {
            engine,
            mixer,
            damper: VolumeDamper::new(),
            preferences: SoundPreferences::new(store),
            events,
            config,
        };

        let volume = manager.preferences.sound_volume();
        let enabled = manager.preferences.sound_enabled();
        manager.apply_sound_settings(enabled, volume);
        Ok(manager)
    }

    pub fn engine(&self) -> &PlaybackEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut PlaybackEngine {
        &mut self.engine
    }

    pub fn mixer(&self) -> &ThemeMixer {
        &self.mixer
    }

    pub fn damper(&self) -> &VolumeDamper {
        &self.damper
    }

    pub fn config(&self) -> &MixerConfig {
        &self.config
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    // ---- Themes ----

    pub fn register_themes(&mut self, themes: Vec<AreaTheme>) -> MixerResult<()> {
        self.mixer.register_themes(themes, self.engine.registry())
    }

    /// Takes effect on the next `update`
    pub fn activate_theme(&self, name: Option<&str>) {
        self.mixer.activate_theme(name);
    }

    pub fn theme_requests(&self) -> ThemeRequestSender {
        self.mixer.request_sender()
    }

    /// Trigger that requests `theme_name` when fired
    pub fn trigger(&self, theme_name: Option<&str>) -> ThemeTrigger {
        ThemeTrigger::new(theme_name.map(str::to_string), self.mixer.request_sender())
    }

    pub fn set_fade_factor(&mut self, value: f32) {
        self.mixer.set_fade_factor(value);
    }

    // ---- Ambient damper ----

    /// Duck ambience to `value` and restore over the configured time
    pub fn dump(&mut self, value: f32) {
        let seconds = self.config.damper_restore_seconds;
        self.damper.dump(value, seconds);
    }

    pub fn dump_for(&mut self, value: f32, restore_seconds: f32) {
        self.damper.dump(value, restore_seconds);
    }

    pub fn set_ambient_factor(&mut self, value: f32) {
        self.damper.set_factor(value);
    }

    // ---- Playback ----

    pub fn play_one_shot(
        &mut self,
        sound: &SoundDescriptor,
        volume: f32,
        pitch: f32,
    ) -> MixerResult<SourceHandle> {
        self.engine.play_one_shot(sound, volume, pitch)
    }

    pub fn play_at(
        &mut self,
        sound: &SoundDescriptor,
        point: Vec3,
        min_distance: f32,
        max_distance: f32,
        volume: f32,
        pitch: f32,
    ) -> MixerResult<SourceHandle> {
        self.engine
            .play_at(sound, point, min_distance, max_distance, volume, pitch)
    }

    pub fn play_looped(
        &mut self,
        sound: &SoundDescriptor,
        volume: f32,
        pitch: f32,
    ) -> MixerResult<SourceHandle> {
        self.engine.play_looped(sound, volume, pitch)
    }

    pub fn stop(&mut self, handle: SourceHandle) -> MixerResult<()> {
        self.engine.stop(handle)
    }

    pub fn stop_all(&mut self) {
        self.engine.stop_all();
    }

    // ---- Preferences ----

    pub fn sound_enabled(&mut self) -> bool {
        self.preferences.sound_enabled()
    }

    pub fn set_sound_enabled(&mut self, enabled: bool) {
        self.preferences.set_sound_enabled(enabled);
        let volume = self.preferences.sound_volume();
        self.apply_sound_settings(enabled, volume);
    }

    pub fn sound_volume(&mut self) -> f32 {
        self.preferences.sound_volume()
    }

    pub fn set_sound_volume(&mut self, volume: f32) {
        let volume = self.preferences.set_sound_volume(volume);
        self.engine.set_master_volume(volume);
    }

    fn apply_sound_settings(&mut self, enabled: bool, volume: f32) {
        self.engine.set_master_volume(volume);
        self.engine.set_paused(!enabled);
        tracing::debug!("Sound enabled={} volume={:.2}", enabled, volume);
    }

    /// Advance one frame
    pub fn update(&mut self, dt: f32) {
        self.damper.update(dt);
        self.engine.update(dt);
        self.mixer.update(dt, self.damper.factor(), &mut self.engine);
    }
}
