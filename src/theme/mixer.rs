/// Theme mixer
///
/// Crossfades between area themes. At most one theme is the active target;
/// every other live theme fades toward silence and is reclaimed once it
/// drops below the reclaim threshold.
use std::collections::HashSet;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::area::AreaTheme;
use super::state::{RandomCountdown, ThemePhase, ThemeVoice};
use crate::audio_system::{PlaybackEngine, SourceHandle};
use crate::config::MixerConfig;
use crate::error::{MixerResult, ValidationError};
use crate::messaging::commands::ThemeRequestQueue;
use crate::messaging::{EventBus, MixerEvent, ThemeRequest, ThemeRequestSender};
use crate::sound::SoundRegistry;

pub struct ThemeMixer {
    themes: Vec<Arc<AreaTheme>>,
    active: Option<Arc<AreaTheme>>,
    voices: Vec<ThemeVoice>,
    fade_factor: f32,
    reclaim_threshold: f32,
    warmup_min_delay: f32,
    min_random_delay: f32,
    rng: StdRng,
    requests: ThemeRequestQueue,
    events: EventBus,
}

impl ThemeMixer {
    /// Create a mixer with no registered themes.
    ///
    /// Out-of-range fade and delay settings are clamped rather than rejected.
    pub fn new(config: &MixerConfig, events: EventBus) -> Self {
        let rng = match config.rng_seed {
            // Offset so the mixer does not mirror the engine's clip picks
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
            None => StdRng::from_entropy(),
        };
        Self {
            themes: Vec::new(),
            active: None,
            voices: Vec::new(),
            fade_factor: clamp_unit(config.fade_factor),
            reclaim_threshold: clamp_unit(config.reclaim_threshold),
            warmup_min_delay: config.warmup_min_delay.max(0.0),
            min_random_delay: config.min_random_delay.max(0.0),
            rng,
            requests: ThemeRequestQueue::new(),
            events,
        }
    }

    /// Replace the registered theme set.
    ///
    /// The set is validated as a whole; on error nothing changes. On success
    /// no theme is the active target, so voices of the previous set fade out.
    /// A live voice whose name reappears in the new set is carried over to
    /// the new theme.
    pub fn register_themes(
        &mut self,
        themes: Vec<AreaTheme>,
        registry: &SoundRegistry,
    ) -> MixerResult<()> {
        if let Err(e) = validate_themes(&themes, registry) {
            tracing::error!("Theme registration rejected: {}", e);
            self.events.publish(MixerEvent::RegistrationRejected {
                reason: e.to_string(),
            });
            return Err(e.into());
        }

        let count = themes.len();
        self.themes = themes.into_iter().map(Arc::new).collect();
        for voice in self.voices.iter_mut() {
            if let Some(theme) = self.themes.iter().find(|t| t.name() == voice.name()) {
                voice.rebind(Arc::clone(theme));
            }
        }
        self.active = None;
        tracing::info!("Registered {} area themes", count);
        self.events.publish(MixerEvent::ThemesRegistered { count });
        Ok(())
    }

    /// Queue an activation; `None` or an empty name fades everything out
    pub fn activate_theme(&self, name: Option<&str>) {
        self.requests.sender().activate(name);
    }

    /// Handle for queueing requests from other threads
    pub fn request_sender(&self) -> ThemeRequestSender {
        self.requests.sender()
    }

    /// Fraction of the remaining gain gap closed per second
    pub fn fade_factor(&self) -> f32 {
        self.fade_factor
    }

    /// Set the fade factor, clamped to [0, 1]
    pub fn set_fade_factor(&mut self, value: f32) {
        self.fade_factor = clamp_unit(value);
    }

    /// Registered themes in registration order
    pub fn themes(&self) -> impl Iterator<Item = &AreaTheme> {
        self.themes.iter().map(|t| t.as_ref())
    }

    /// Name of the current target theme
    pub fn active_theme(&self) -> Option<&str> {
        self.active.as_deref().map(AreaTheme::name)
    }

    /// Names of themes currently holding sources
    pub fn live_themes(&self) -> impl Iterator<Item = &str> {
        self.voices.iter().map(ThemeVoice::name)
    }

    pub fn live_count(&self) -> usize {
        self.voices.len()
    }

    /// Lifecycle phase of a theme by name
    pub fn phase(&self, name: &str) -> ThemePhase {
        let Some(theme) = self.themes.iter().find(|t| t.name() == name) else {
            return ThemePhase::Unregistered;
        };
        let Some(voice) = self.voices.iter().find(|v| v.is_theme(theme)) else {
            return ThemePhase::Idle;
        };

        if !self.is_active(theme) {
            ThemePhase::FadingOut
        } else if voice.gain.value() >= 1.0 - self.reclaim_threshold {
            ThemePhase::SteadyActive
        } else {
            ThemePhase::FadingIn
        }
    }

    /// Current fade gain of a live theme, 0 when it holds no sources
    pub fn gain_ratio(&self, name: &str) -> f32 {
        self.voices
            .iter()
            .filter(|v| v.name() == name)
            .map(|v| v.gain.value())
            .fold(0.0, f32::max)
    }

    /// Ambient source of a live theme
    pub fn ambient_source(&self, name: &str) -> Option<SourceHandle> {
        self.voices.iter().find(|v| v.name() == name).map(|v| v.ambient)
    }

    fn is_active(&self, theme: &Arc<AreaTheme>) -> bool {
        self.active.as_ref().is_some_and(|a| Arc::ptr_eq(a, theme))
    }

    /// Advance one tick: apply queued requests, fade, fire random sounds
    /// and reclaim silent themes.
    ///
    /// Random sound countdowns hold while the engine is paused.
    pub fn update(&mut self, dt: f32, damper: f32, engine: &mut PlaybackEngine) {
        for request in self.requests.drain() {
            self.apply_request(request, engine);
        }

        let active = self.active.clone();
        let fade_factor = self.fade_factor;
        let min_random_delay = self.min_random_delay;
        let paused = engine.is_paused();

        for voice in self.voices.iter_mut() {
            let target_active = active.as_ref().is_some_and(|a| voice.is_theme(a));
            let target = if target_active { 1.0 } else { 0.0 };
            let gain = voice.gain.step(target, dt, fade_factor);
            let volume = voice.theme.base_volume() * gain * damper;

            if engine.set_volume(voice.ambient, volume).is_err() {
                tracing::trace!("Ambient source of {} is gone", voice.name());
            }

            voice.one_shots.retain(|handle| engine.is_playing(*handle));
            for handle in &voice.one_shots {
                let _ = engine.set_volume(*handle, volume);
            }

            if paused {
                continue;
            }

            for countdown in voice.countdowns.iter_mut() {
                countdown.remaining -= dt;
                if countdown.remaining > 0.0 {
                    continue;
                }

                let rule = &voice.theme.random_sounds()[countdown.rule];
                if let Ok(handle) = engine.play_one_shot(&rule.sound, volume, 1.0) {
                    voice.one_shots.push(handle);
                    self.events.publish(MixerEvent::RandomSoundFired {
                        theme: voice.theme.name().to_string(),
                        sound: rule.sound.tag().map(str::to_string),
                    });
                }

                let (min, max) = rule.delay_range(min_random_delay);
                countdown.remaining = self.rng.gen_range(min..=max);
            }
        }

        let threshold = self.reclaim_threshold;
        let events = &self.events;
        self.voices.retain(|voice| {
            let target_active = active.as_ref().is_some_and(|a| voice.is_theme(a));
            if target_active || !voice.gain.is_below(threshold) {
                return true;
            }

            if let Err(e) = engine.stop(voice.ambient) {
                tracing::debug!("Ambient of {} already released: {}", voice.name(), e);
            }
            tracing::debug!("Reclaimed theme {}", voice.name());
            events.publish(MixerEvent::ThemeReclaimed {
                name: voice.name().to_string(),
            });
            false
        });
    }

    fn apply_request(&mut self, request: ThemeRequest, engine: &mut PlaybackEngine) {
        let name = match request {
            ThemeRequest::Activate(name) => name,
            ThemeRequest::DeactivateAll => {
                if self.active.take().is_some() {
                    tracing::debug!("Deactivated all themes");
                    self.events.publish(MixerEvent::ThemesDeactivated);
                }
                return;
            }
        };

        let Some(theme) = self.themes.iter().find(|t| t.name() == name).cloned() else {
            tracing::warn!("No such theme: {}", name);
            self.events.publish(MixerEvent::ActivationFailed {
                name,
                reason: "not registered".to_string(),
            });
            return;
        };

        if self.is_active(&theme) {
            return;
        }

        if !self.voices.iter().any(|v| v.is_theme(&theme)) {
            match self.start_voice(&theme, engine) {
                Ok(voice) => {
                    self.voices.push(voice);
                    self.events.publish(MixerEvent::ThemeStarted { name: name.clone() });
                }
                Err(e) => {
                    // The engine has already warned about the failed source
                    tracing::debug!("Theme {} not started: {}", name, e);
                    self.events.publish(MixerEvent::ActivationFailed {
                        name,
                        reason: e.to_string(),
                    });
                    return;
                }
            }
        }

        tracing::info!("Active theme: {}", name);
        self.active = Some(theme);
        self.events.publish(MixerEvent::ThemeActivated { name });
    }

    fn start_voice(
        &mut self,
        theme: &Arc<AreaTheme>,
        engine: &mut PlaybackEngine,
    ) -> MixerResult<ThemeVoice> {
        let ambient = engine.play_looped(theme.ambient(), 0.0, 1.0)?;

        let mut countdowns = Vec::new();
        for (rule_index, rule) in theme.random_sounds().iter().enumerate() {
            if !engine.registry().is_playable(&rule.sound) {
                tracing::debug!(
                    "Skipping unplayable random sound {} of theme {}",
                    rule_index,
                    theme.name()
                );
                continue;
            }
            let (_, max) = rule.delay_range(self.min_random_delay);
            let max = max.max(0.0);
            let warmup = self.warmup_min_delay.clamp(0.0, max);
            countdowns.push(RandomCountdown {
                rule: rule_index,
                remaining: self.rng.gen_range(warmup..=max),
            });
        }

        Ok(ThemeVoice::new(Arc::clone(theme), ambient, countdowns))
    }
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn validate_themes(themes: &[AreaTheme], registry: &SoundRegistry) -> Result<(), ValidationError> {
    let mut names = HashSet::new();
    for (index, theme) in themes.iter().enumerate() {
        if !registry.is_playable(theme.ambient()) {
            return Err(ValidationError::UnplayableAmbient { index });
        }
        if theme.name().is_empty() {
            return Err(ValidationError::EmptyThemeName { index });
        }
        if !names.insert(theme.name()) {
            return Err(ValidationError::DuplicateTheme(theme.name().to_string()));
        }
    }
    Ok(())
}
