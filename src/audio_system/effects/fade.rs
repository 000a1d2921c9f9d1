/// Exponential gain fade
///
/// Moves a gain toward its target by a fixed fraction of the remaining
/// distance each tick, so it approaches but never overshoots the target.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainFade {
    value: f32,
}

impl GainFade {
    pub fn new(value: f32) -> Self {
        Self {
            value: value.clamp(0.0, 1.0),
        }
    }

    /// Start from silence
    pub fn silent() -> Self {
        Self::new(0.0)
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    /// Advance one tick toward `target` and return the new gain
    pub fn step(&mut self, target: f32, dt: f32, rate: f32) -> f32 {
        let t = (dt * rate).clamp(0.0, 1.0);
        self.value += (target - self.value) * t;
        self.value
    }

    /// Gain is low enough to treat as inaudible
    pub fn is_below(&self, threshold: f32) -> bool {
        self.value <= threshold
    }
}

impl Default for GainFade {
    fn default() -> Self {
        Self::silent()
    }
}

/// Ticks of length `dt` needed to close all but `epsilon` of a full fade
pub fn settle_ticks(dt: f32, rate: f32, epsilon: f32) -> u32 {
    let t = (dt * rate).clamp(0.0, 1.0);
    if t >= 1.0 {
        return 1;
    }
    if t <= 0.0 || epsilon <= 0.0 {
        return u32::MAX;
    }
    (epsilon.ln() / (1.0 - t).ln()).ceil() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fade_in_is_monotonic() {
        let mut fade = GainFade::silent();
        let mut last = fade.value();
        for _ in 0..600 {
            let value = fade.step(1.0, 1.0 / 60.0, 0.5);
            assert!(value >= last);
            assert!(value <= 1.0);
            last = value;
        }
        assert!(last > 0.9);
    }

    #[test]
    fn test_fade_out_is_monotonic() {
        let mut fade = GainFade::new(1.0);
        let mut last = fade.value();
        for _ in 0..600 {
            let value = fade.step(0.0, 1.0 / 60.0, 0.5);
            assert!(value <= last);
            assert!(value >= 0.0);
            last = value;
        }
        assert!(fade.is_below(0.1));
    }

    #[test]
    fn test_large_step_lands_on_target() {
        let mut fade = GainFade::silent();
        assert_eq!(fade.step(1.0, 10.0, 0.5), 1.0);
    }

    #[test]
    fn test_settle_ticks_matches_simulation() {
        let dt = 1.0 / 60.0;
        let ticks = settle_ticks(dt, 0.5, 0.05);

        let mut fade = GainFade::silent();
        for _ in 0..ticks {
            fade.step(1.0, dt, 0.5);
        }
        assert!(fade.value() > 0.949);

        let mut fade = GainFade::silent();
        for _ in 0..ticks - 10 {
            fade.step(1.0, dt, 0.5);
        }
        assert!(fade.value() < 0.95);
    }

    #[test]
    fn test_settle_ticks_edge_cases() {
        assert_eq!(settle_ticks(1.0, 1.0, 0.01), 1);
        assert_eq!(settle_ticks(0.016, 0.0, 0.01), u32::MAX);
    }
}
