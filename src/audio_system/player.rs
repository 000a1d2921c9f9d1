/// Playback engine
///
/// The public playback surface: one-shots heard at the listener, one-shots
/// placed in the world, loops. Owns the source pool and the sound registry.
use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::backend::{AudioBackend, Listener};
use super::effects::MasterVolume;
use super::pool::SourcePool;
use super::source::{PooledSource, SourceAnchor, SourceHandle};
use crate::config::MixerConfig;
use crate::error::{MixerError, MixerResult};
use crate::sound::{SoundDescriptor, SoundRegistry};

const MIN_PITCH: f32 = 0.01;
const MAX_PITCH: f32 = 3.0;

#[derive(Debug, Clone, Copy)]
struct PlayRequest {
    anchor: SourceAnchor,
    position: Vec3,
    volume: f32,
    pitch: f32,
    distances: Option<(f32, f32)>,
    looping: bool,
}

/// Plays sounds on pooled sources and advances their lifetimes
pub struct PlaybackEngine {
    pool: SourcePool,
    registry: SoundRegistry,
    listener: Box<dyn Listener>,
    rng: StdRng,
    master: MasterVolume,
    paused: bool,
}

impl PlaybackEngine {
    /// Create an engine; `rng_seed` makes clip choice reproducible
    pub fn new(
        backend: Box<dyn AudioBackend>,
        listener: Box<dyn Listener>,
        registry: SoundRegistry,
        config: &MixerConfig,
    ) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            pool: SourcePool::new(backend, &config.pool),
            registry,
            listener,
            rng,
            master: MasterVolume::default(),
            paused: false,
        }
    }

    /// Sounds this engine resolves descriptors against
    pub fn registry(&self) -> &SoundRegistry {
        &self.registry
    }

    /// Swap the registry, e.g. after the sound list was edited
    pub fn replace_registry(&mut self, registry: SoundRegistry) {
        self.registry = registry;
    }

    /// Get the source pool
    pub fn pool(&self) -> &SourcePool {
        &self.pool
    }

    /// Current listener position, or `NoActiveListener`
    pub fn listener_position(&self) -> MixerResult<Vec3> {
        self.listener.position().ok_or(MixerError::NoActiveListener)
    }

    /// Play a non-spatial sound at the listener
    pub fn play_one_shot(
        &mut self,
        sound: &SoundDescriptor,
        volume: f32,
        pitch: f32,
    ) -> MixerResult<SourceHandle> {
        let result = self.listener_position().and_then(|position| {
            self.start(
                sound,
                PlayRequest {
                    anchor: SourceAnchor::Listener,
                    position,
                    volume,
                    pitch,
                    distances: None,
                    looping: false,
                },
            )
        });
        log_failure("one-shot", sound, result)
    }

    /// Play a spatial sound at `point` with distance falloff
    pub fn play_at(
        &mut self,
        sound: &SoundDescriptor,
        point: Vec3,
        min_distance: f32,
        max_distance: f32,
        volume: f32,
        pitch: f32,
    ) -> MixerResult<SourceHandle> {
        let result = self.start(
            sound,
            PlayRequest {
                anchor: SourceAnchor::World,
                position: point,
                volume,
                pitch,
                distances: Some((min_distance.max(0.0), max_distance.max(min_distance))),
                looping: false,
            },
        );
        log_failure("3D one-shot", sound, result)
    }

    /// Play a loop at the listener. The caller stops it with [`Self::stop`].
    pub fn play_looped(
        &mut self,
        sound: &SoundDescriptor,
        volume: f32,
        pitch: f32,
    ) -> MixerResult<SourceHandle> {
        let result = self.listener_position().and_then(|position| {
            self.start(
                sound,
                PlayRequest {
                    anchor: SourceAnchor::Listener,
                    position,
                    volume,
                    pitch,
                    distances: None,
                    looping: true,
                },
            )
        });
        log_failure("loop", sound, result)
    }

    fn start(&mut self, sound: &SoundDescriptor, request: PlayRequest) -> MixerResult<SourceHandle> {
        let clip = self.registry.resolve_clip(sound, &mut self.rng)?;
        let listener = self.listener.position();
        let master = self.master.effective();
        let paused = self.paused;

        let handle = self.pool.acquire(request.anchor, request.position)?;
        let source = self.pool.get_mut(handle).ok_or(MixerError::InvalidHandle)?;

        source.settings.volume = request.volume.clamp(0.0, 1.0);
        source.settings.pitch = request.pitch.clamp(MIN_PITCH, MAX_PITCH);
        if let Some((min_distance, max_distance)) = request.distances {
            source.settings.spatial_blend = 1.0;
            source.settings.min_distance = min_distance;
            source.settings.max_distance = max_distance;
        }
        source.looping = request.looping;
        source.remaining = (!request.looping).then(|| clip.duration_secs());

        let gain = source.output_gain(master, listener);
        source.emitter.play(&clip, request.looping, gain, source.settings.pitch);
        if paused {
            source.emitter.pause();
        }

        tracing::trace!(
            "Playing {} on {} (looping={}, gain={:.3})",
            clip.name(),
            handle,
            request.looping,
            gain
        );
        source.clip = Some(clip);
        Ok(handle)
    }

    /// Stop a source and return it to the pool
    pub fn stop(&mut self, handle: SourceHandle) -> MixerResult<()> {
        self.pool.release(handle)
    }

    /// Silence every active source.
    ///
    /// Sources stay checked out; one-shots still release at their clip end
    /// and loops stay with their owner.
    pub fn stop_all(&mut self) {
        let mut stopped = 0;
        for (_, source) in self.pool.iter_active_mut() {
            source.emitter.stop();
            stopped += 1;
        }
        tracing::debug!("Stopped {} audio sources", stopped);
    }

    /// Set a source's volume, clamped to [0, 1]
    pub fn set_volume(&mut self, handle: SourceHandle, volume: f32) -> MixerResult<()> {
        let listener = self.listener.position();
        let master = self.master.effective();
        let source = self.pool.get_mut(handle).ok_or(MixerError::InvalidHandle)?;
        source.settings.volume = volume.clamp(0.0, 1.0);
        let gain = source.output_gain(master, listener);
        source.emitter.set_gain(gain);
        Ok(())
    }

    /// Set a source's pitch, clamped to [0.01, 3]
    pub fn set_pitch(&mut self, handle: SourceHandle, pitch: f32) -> MixerResult<()> {
        let source = self.pool.get_mut(handle).ok_or(MixerError::InvalidHandle)?;
        source.settings.pitch = pitch.clamp(MIN_PITCH, MAX_PITCH);
        source.emitter.set_pitch(source.settings.pitch);
        Ok(())
    }

    /// Volume of a source, `None` for stale handles
    pub fn volume(&self, handle: SourceHandle) -> Option<f32> {
        self.pool.get(handle).map(|s| s.settings.volume)
    }

    /// Whether the source is still checked out and producing sound
    pub fn is_playing(&self, handle: SourceHandle) -> bool {
        self.pool.get(handle).is_some_and(PooledSource::is_playing)
    }

    /// Look up a checked-out source
    pub fn source(&self, handle: SourceHandle) -> Option<&PooledSource> {
        self.pool.get(handle)
    }

    /// Get master volume level
    pub fn master_volume(&self) -> f32 {
        self.master.level()
    }

    /// Set master volume level and refresh every source's gain
    pub fn set_master_volume(&mut self, volume: f32) {
        self.master.set_level(volume);
        self.refresh_gains();
    }

    /// Check if playback is paused
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Pause or resume everything; one-shot lifetimes freeze while paused
    pub fn set_paused(&mut self, paused: bool) {
        if self.paused == paused {
            return;
        }
        self.paused = paused;
        self.master.set_muted(paused);
        for (_, source) in self.pool.iter_active_mut() {
            if paused {
                source.emitter.pause();
            } else {
                source.emitter.resume();
            }
        }
        self.refresh_gains();
        tracing::debug!("Playback {}", if paused { "paused" } else { "resumed" });
    }

    fn refresh_gains(&mut self) {
        let listener = self.listener.position();
        let master = self.master.effective();
        for (_, source) in self.pool.iter_active_mut() {
            let gain = source.output_gain(master, listener);
            source.emitter.set_gain(gain);
        }
    }

    /// Advance one frame: follow the listener, expire finished one-shots
    pub fn update(&mut self, dt: f32) {
        let listener = self.listener.position();
        let master = self.master.effective();
        let paused = self.paused;
        let mut expired = Vec::new();

        for (handle, source) in self.pool.iter_active_mut() {
            if source.anchor == SourceAnchor::Listener {
                if let Some(position) = listener {
                    source.position = position;
                    source.emitter.set_position(position);
                }
            }

            let gain = source.output_gain(master, listener);
            source.emitter.set_gain(gain);

            if paused {
                continue;
            }
            if let Some(remaining) = source.remaining.as_mut() {
                *remaining -= dt;
                if *remaining <= 0.0 {
                    expired.push(handle);
                }
            }
        }

        for handle in expired {
            if self.pool.release(handle).is_ok() {
                tracing::trace!("Released finished one-shot {}", handle);
            }
        }
    }
}

fn log_failure(
    what: &str,
    sound: &SoundDescriptor,
    result: MixerResult<SourceHandle>,
) -> MixerResult<SourceHandle> {
    if let Err(e) = &result {
        tracing::warn!(
            "Failed to start {} for {}: {}",
            what,
            sound.tag().unwrap_or("<untagged sound>"),
            e
        );
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio_system::backend::{FixedListener, SharedListener};
    use crate::audio_system::mock::MockBackend;
    use crate::sound::{Clip, SoundRegistryEntry};
    use std::time::Duration;

    fn engine_with(listener: Box<dyn Listener>) -> (PlaybackEngine, MockBackend) {
        let backend = MockBackend::new();
        let registry = SoundRegistry::from_entries(vec![SoundRegistryEntry::new(
            "Impact/Wood",
            "Impact",
            vec![Clip::silent("wood_hit", Duration::from_millis(500)).into_handle()],
        )])
        .unwrap();
        let config = MixerConfig {
            rng_seed: Some(1),
            ..Default::default()
        };
        let engine = PlaybackEngine::new(Box::new(backend.clone()), listener, registry, &config);
        (engine, backend)
    }

    fn engine() -> (PlaybackEngine, MockBackend) {
        engine_with(Box::new(FixedListener(Vec3::ZERO)))
    }

    fn wood() -> SoundDescriptor {
        SoundDescriptor::registered("Impact/Wood")
    }

    #[test]
    fn test_one_shot_releases_after_clip_length() {
        let (mut engine, backend) = engine();
        let handle = engine.play_one_shot(&wood(), 0.8, 1.0).unwrap();

        assert!(engine.is_playing(handle));
        assert_eq!(backend.emitter(0).clip.as_deref(), Some("wood_hit"));
        assert_eq!(backend.emitter(0).gain, 0.8);

        for _ in 0..3 {
            engine.update(0.125);
        }
        assert!(engine.pool().contains(handle));

        engine.update(0.125);
        assert!(!engine.pool().contains(handle));
        assert_eq!(engine.pool().free_count(), 1);
        assert!(!backend.emitter(0).active);
    }

    #[test]
    fn test_play_at_is_spatial() {
        let (mut engine, backend) = engine();
        let handle = engine
            .play_at(&wood(), Vec3::new(20.0, 0.0, 0.0), 10.0, 30.0, 1.0, 1.0)
            .unwrap();

        let source = engine.source(handle).unwrap();
        assert_eq!(source.settings().spatial_blend, 1.0);
        assert_eq!(source.settings().min_distance, 10.0);
        assert_eq!(source.settings().max_distance, 30.0);
        assert_eq!(source.anchor(), SourceAnchor::World);
        assert!((backend.emitter(0).gain - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_unknown_sound_fails_without_acquiring() {
        let (mut engine, backend) = engine();
        let result = engine.play_one_shot(&SoundDescriptor::registered("Impact/Glass"), 1.0, 1.0);

        assert!(matches!(result, Err(MixerError::NotFound(_))));
        assert_eq!(backend.created(), 0);
    }

    #[test]
    fn test_missing_listener_fails_fast() {
        let (mut engine, backend) = engine_with(Box::new(SharedListener::detached()));

        assert!(matches!(
            engine.play_one_shot(&wood(), 1.0, 1.0),
            Err(MixerError::NoActiveListener)
        ));
        assert!(matches!(
            engine.play_looped(&wood(), 1.0, 1.0),
            Err(MixerError::NoActiveListener)
        ));
        assert_eq!(backend.created(), 0);

        // World-placed sounds do not need a listener
        assert!(engine.play_at(&wood(), Vec3::ONE, 1.0, 5.0, 1.0, 1.0).is_ok());
    }

    #[test]
    fn test_looped_source_is_kept_until_stopped() {
        let (mut engine, backend) = engine();
        let handle = engine.play_looped(&wood(), 1.0, 1.0).unwrap();
        assert!(backend.emitter(0).looping);

        for _ in 0..100 {
            engine.update(0.1);
        }
        assert!(engine.is_playing(handle));

        engine.stop(handle).unwrap();
        assert!(!engine.pool().contains(handle));
        assert!(matches!(engine.stop(handle), Err(MixerError::InvalidHandle)));
    }

    #[test]
    fn test_stop_all_mutes_without_releasing() {
        let (mut engine, backend) = engine();
        let loop_handle = engine.play_looped(&wood(), 1.0, 1.0).unwrap();
        let shot = engine.play_one_shot(&wood(), 1.0, 1.0).unwrap();

        engine.stop_all();
        assert_eq!(backend.playing_count(), 0);
        assert!(engine.pool().contains(loop_handle));
        assert!(engine.pool().contains(shot));
        assert_eq!(engine.pool().in_use_count(), 2);

        engine.update(0.6);
        assert!(!engine.pool().contains(shot));
        assert!(engine.pool().contains(loop_handle));
    }

    #[test]
    fn test_listener_anchored_sources_follow_listener() {
        let listener = SharedListener::new(Vec3::ZERO);
        let (mut engine, backend) = engine_with(Box::new(listener.clone()));
        let handle = engine.play_looped(&wood(), 1.0, 1.0).unwrap();

        listener.set(Vec3::new(4.0, 0.0, 2.0));
        engine.update(0.016);

        assert_eq!(engine.source(handle).unwrap().position(), Vec3::new(4.0, 0.0, 2.0));
        assert_eq!(backend.emitter(0).position, Vec3::new(4.0, 0.0, 2.0));
    }

    #[test]
    fn test_volume_and_pitch_control() {
        let (mut engine, backend) = engine();
        let handle = engine.play_looped(&wood(), 1.0, 1.0).unwrap();

        engine.set_volume(handle, 1.7).unwrap();
        assert_eq!(engine.volume(handle), Some(1.0));

        engine.set_volume(handle, 0.25).unwrap();
        engine.set_pitch(handle, 0.8).unwrap();
        assert_eq!(backend.emitter(0).gain, 0.25);
        assert_eq!(backend.emitter(0).pitch, 0.8);

        engine.set_master_volume(0.5);
        assert_eq!(backend.emitter(0).gain, 0.125);
    }

    #[test]
    fn test_pause_freezes_one_shot_lifetime() {
        let (mut engine, backend) = engine();
        let handle = engine.play_one_shot(&wood(), 1.0, 1.0).unwrap();

        engine.set_paused(true);
        assert!(backend.emitter(0).paused);
        assert_eq!(backend.emitter(0).gain, 0.0);
        engine.update(5.0);
        assert!(engine.pool().contains(handle));

        engine.set_paused(false);
        assert_eq!(backend.emitter(0).gain, 1.0);
        engine.update(0.6);
        assert!(!engine.pool().contains(handle));
    }
}
