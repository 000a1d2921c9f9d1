/// Output backend seam
///
/// The pool only talks to emitters through these traits, so the rodio output
/// and the recording mock are interchangeable.
use std::sync::Arc;

use glam::Vec3;
use parking_lot::RwLock;

use crate::error::MixerResult;
use crate::sound::ClipHandle;

/// A single voice of the output device.
///
/// Gain arrives fully resolved (volume, master level, distance model).
pub trait Emitter {
    /// Start `clip` from the beginning, replacing whatever was queued
    fn play(&mut self, clip: &ClipHandle, looping: bool, gain: f32, pitch: f32);

    fn stop(&mut self);

    fn pause(&mut self);

    fn resume(&mut self);

    fn set_gain(&mut self, gain: f32);

    fn set_pitch(&mut self, pitch: f32);

    fn set_position(&mut self, position: Vec3);

    /// Whether audio is still coming out of this emitter
    fn is_playing(&self) -> bool;

    /// Pooled emitters are deactivated on release and reactivated on reuse
    fn set_active(&mut self, active: bool);
}

pub trait AudioBackend {
    fn create_emitter(&mut self) -> MixerResult<Box<dyn Emitter>>;

    fn name(&self) -> &'static str;
}

/// Where sounds are heard from
pub trait Listener {
    /// Current listener position, `None` when no listener exists
    fn position(&self) -> Option<Vec3>;
}

/// A listener that never moves
#[derive(Debug, Clone, Copy)]
pub struct FixedListener(pub Vec3);

impl Listener for FixedListener {
    fn position(&self) -> Option<Vec3> {
        Some(self.0)
    }
}

/// Listener position owned by game code.
///
/// Clones share the same position, so the camera/player system keeps one
/// clone and moves it while the engine holds another.
#[derive(Debug, Clone, Default)]
pub struct SharedListener {
    position: Arc<RwLock<Option<Vec3>>>,
}

impl SharedListener {
    pub fn new(position: Vec3) -> Self {
        Self {
            position: Arc::new(RwLock::new(Some(position))),
        }
    }

    /// A listener slot with nobody in it yet
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn set(&self, position: Vec3) {
        *self.position.write() = Some(position);
    }

    pub fn clear(&self) {
        *self.position.write() = None;
    }
}

impl Listener for SharedListener {
    fn position(&self) -> Option<Vec3> {
        *self.position.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_listener() {
        let listener = FixedListener(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(listener.position(), Some(Vec3::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn test_shared_listener_clones_share_position() {
        let listener = SharedListener::detached();
        let view = listener.clone();
        assert_eq!(view.position(), None);

        listener.set(Vec3::X);
        assert_eq!(view.position(), Some(Vec3::X));

        listener.clear();
        assert_eq!(view.position(), None);
    }
}
