/// Area themes
///
/// A theme is an ambient loop plus incidental sounds fired at random
/// intervals while the theme is audible.
use crate::sound::SoundDescriptor;

#[derive(Debug, Clone)]
pub struct RandomSoundRule {
    pub sound: SoundDescriptor,
    min_delay_seconds: f32,
    max_delay_seconds: f32,
}

impl RandomSoundRule {
    pub fn new(sound: SoundDescriptor, min_delay_seconds: f32, max_delay_seconds: f32) -> Self {
        Self {
            sound,
            min_delay_seconds,
            max_delay_seconds,
        }
    }

    /// Interval bounds with the minimum raised to `floor`
    pub fn delay_range(&self, floor: f32) -> (f32, f32) {
        let min = self.min_delay_seconds.max(floor);
        (min, self.max_delay_seconds.max(min))
    }
}

#[derive(Debug, Clone)]
pub struct AreaTheme {
    name: String,
    ambient: SoundDescriptor,
    random_sounds: Vec<RandomSoundRule>,
    base_volume: f32,
}

impl AreaTheme {
    /// Theme named after its ambient sound
    pub fn new(ambient: SoundDescriptor) -> Self {
        Self {
            name: ambient.tag().unwrap_or_default().to_string(),
            ambient,
            random_sounds: Vec::new(),
            base_volume: 1.0,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_random_sound(mut self, rule: RandomSoundRule) -> Self {
        self.random_sounds.push(rule);
        self
    }

    pub fn with_base_volume(mut self, volume: f32) -> Self {
        self.base_volume = volume.clamp(0.0, 1.0);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ambient(&self) -> &SoundDescriptor {
        &self.ambient
    }

    pub fn random_sounds(&self) -> &[RandomSoundRule] {
        &self.random_sounds
    }

    pub fn base_volume(&self) -> f32 {
        self.base_volume
    }
}
