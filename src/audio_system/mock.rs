/// Mock audio backend
///
/// Records what the pool asks of each emitter instead of producing sound.
/// Used by tests and by hosts running without an output device.
use std::sync::Arc;

use glam::Vec3;
use parking_lot::Mutex;

use super::backend::{AudioBackend, Emitter};
use crate::error::MixerResult;
use crate::sound::ClipHandle;

/// Snapshot of one mock emitter
#[derive(Debug, Clone, PartialEq)]
pub struct MockEmitterState {
    pub active: bool,
    pub playing: bool,
    pub paused: bool,
    pub looping: bool,
    pub gain: f32,
    pub pitch: f32,
    pub position: Vec3,
    pub clip: Option<String>,
    pub plays: u32,
    pub stops: u32,
}

impl Default for MockEmitterState {
    fn default() -> Self {
        Self {
            active: true,
            playing: false,
            paused: false,
            looping: false,
            gain: 1.0,
            pitch: 1.0,
            position: Vec3::ZERO,
            clip: None,
            plays: 0,
            stops: 0,
        }
    }
}

type SharedState = Arc<Mutex<MockEmitterState>>;

/// Backend whose clones share the list of created emitters
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    emitters: Arc<Mutex<Vec<SharedState>>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of emitters created so far
    pub fn created(&self) -> usize {
        self.emitters.lock().len()
    }

    /// State of the emitter created `index`-th.
    ///
    /// Panics if no such emitter exists.
    pub fn emitter(&self, index: usize) -> MockEmitterState {
        self.emitters.lock()[index].lock().clone()
    }

    pub fn emitters(&self) -> Vec<MockEmitterState> {
        self.emitters.lock().iter().map(|s| s.lock().clone()).collect()
    }

    /// Emitters currently producing sound
    pub fn playing_count(&self) -> usize {
        self.emitters
            .lock()
            .iter()
            .filter(|s| {
                let state = s.lock();
                state.playing && !state.paused
            })
            .count()
    }
}

impl AudioBackend for MockBackend {
    fn create_emitter(&mut self) -> MixerResult<Box<dyn Emitter>> {
        let state = SharedState::default();
        self.emitters.lock().push(Arc::clone(&state));
        Ok(Box::new(MockEmitter { state }))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

struct MockEmitter {
    state: SharedState,
}

impl Emitter for MockEmitter {
    fn play(&mut self, clip: &ClipHandle, looping: bool, gain: f32, pitch: f32) {
        let mut state = self.state.lock();
        state.playing = true;
        state.paused = false;
        state.looping = looping;
        state.gain = gain;
        state.pitch = pitch;
        state.clip = Some(clip.name().to_string());
        state.plays += 1;
    }

    fn stop(&mut self) {
        let mut state = self.state.lock();
        if state.playing {
            state.stops += 1;
        }
        state.playing = false;
        state.paused = false;
    }

    fn pause(&mut self) {
        self.state.lock().paused = true;
    }

    fn resume(&mut self) {
        self.state.lock().paused = false;
    }

    fn set_gain(&mut self, gain: f32) {
        self.state.lock().gain = gain;
    }

    fn set_pitch(&mut self, pitch: f32) {
        self.state.lock().pitch = pitch;
    }

    fn set_position(&mut self, position: Vec3) {
        self.state.lock().position = position;
    }

    fn is_playing(&self) -> bool {
        self.state.lock().playing
    }

    fn set_active(&mut self, active: bool) {
        self.state.lock().active = active;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sound::Clip;
    use std::time::Duration;

    #[test]
    fn test_mock_records_playback() {
        let mut backend = MockBackend::new();
        let observer = backend.clone();
        let mut emitter = backend.create_emitter().unwrap();
        let clip = Clip::silent("wind", Duration::from_secs(4)).into_handle();

        emitter.play(&clip, true, 0.4, 1.2);
        let state = observer.emitter(0);
        assert!(state.playing);
        assert!(state.looping);
        assert_eq!(state.gain, 0.4);
        assert_eq!(state.clip.as_deref(), Some("wind"));
        assert_eq!(observer.playing_count(), 1);

        emitter.stop();
        assert!(!emitter.is_playing());
        assert_eq!(observer.emitter(0).stops, 1);
        assert_eq!(observer.playing_count(), 0);
    }
}
