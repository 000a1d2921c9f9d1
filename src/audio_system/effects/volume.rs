/// Master volume
///
/// Listener-level gain applied on top of every source. Muting keeps the
/// configured level so unmuting restores it.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MasterVolume {
    level: f32,
    muted: bool,
}

impl MasterVolume {
    pub fn new(level: f32) -> Self {
        Self {
            level: level.clamp(0.0, 1.0),
            muted: false,
        }
    }

    /// Configured level, regardless of mute
    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn set_level(&mut self, level: f32) {
        self.level = level.clamp(0.0, 1.0);
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Gain actually applied to sources
    pub fn effective(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.level
        }
    }
}

impl Default for MasterVolume {
    fn default() -> Self {
        Self::new(1.0)
    }
}
