/// Ambient volume damper
///
/// A global multiplier on theme volume. `dump` drops it and tweens it back to
/// full volume linearly; used to duck ambience under dialogue or cutscenes.

#[derive(Debug, Clone, Copy, PartialEq)]
struct Restore {
    from: f32,
    elapsed: f32,
    duration: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VolumeDamper {
    factor: f32,
    restore: Option<Restore>,
}

impl VolumeDamper {
    pub fn new() -> Self {
        Self {
            factor: 1.0,
            restore: None,
        }
    }

    /// Drop to `value` now and restore to 1 over `restore_seconds`.
    ///
    /// Replaces any restoration already in flight.
    pub fn dump(&mut self, value: f32, restore_seconds: f32) {
        self.factor = value.clamp(0.0, 1.0);
        self.restore = Some(Restore {
            from: self.factor,
            elapsed: 0.0,
            duration: restore_seconds,
        });
        tracing::debug!(
            "Ambient volume dumped to {:.2}, restoring over {:.2}s",
            self.factor,
            restore_seconds
        );
    }

    /// Pin the factor without tweening, cancelling any restoration
    pub fn set_factor(&mut self, value: f32) {
        self.factor = value.clamp(0.0, 1.0);
        self.restore = None;
    }

    pub fn factor(&self) -> f32 {
        self.factor
    }

    pub fn is_restoring(&self) -> bool {
        self.restore.is_some()
    }

    /// Advance the restoration by one frame
    pub fn update(&mut self, dt: f32) {
        let Some(restore) = self.restore.as_mut() else {
            return;
        };

        restore.elapsed += dt;
        if restore.duration <= 0.0 || restore.elapsed >= restore.duration {
            self.factor = 1.0;
            self.restore = None;
        } else {
            self.factor = restore.from + (1.0 - restore.from) * restore.elapsed / restore.duration;
        }
    }
}

impl Default for VolumeDamper {
    fn default() -> Self {
        Self::new()
    }
}
