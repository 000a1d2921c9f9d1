/// Sound descriptors
///
/// A descriptor names what to play: either clips carried inline or an id to
/// look up in the registry.
use serde::{Deserialize, Serialize};

use super::clip::ClipHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundKind {
    /// Plays the first inline clip
    Custom,

    /// Plays a random clip of a registry entry
    Registered,
}

#[derive(Debug, Clone)]
pub struct SoundDescriptor {
    kind: SoundKind,
    registry_id: String,
    inline_clips: Vec<ClipHandle>,
}

impl SoundDescriptor {
    /// Reference a registry entry by id
    pub fn registered(registry_id: impl Into<String>) -> Self {
        Self {
            kind: SoundKind::Registered,
            registry_id: registry_id.into(),
            inline_clips: Vec::new(),
        }
    }

    /// Carry clips inline. Only the first one is ever played.
    pub fn custom(clips: Vec<ClipHandle>) -> Self {
        Self {
            kind: SoundKind::Custom,
            registry_id: String::new(),
            inline_clips: clips,
        }
    }

    /// Wrap a single clip
    pub fn wrap(clip: ClipHandle) -> Self {
        Self::custom(vec![clip])
    }

    /// Tag a custom sound; the tag names themes built on it
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.registry_id = tag.into();
        self
    }

    pub fn kind(&self) -> SoundKind {
        self.kind
    }

    pub fn registry_id(&self) -> &str {
        &self.registry_id
    }

    pub fn inline_clips(&self) -> &[ClipHandle] {
        &self.inline_clips
    }

    /// Name used for themes whose ambient bed is this sound
    pub fn tag(&self) -> Option<&str> {
        let tag = match self.kind {
            SoundKind::Registered => self.registry_id.as_str(),
            SoundKind::Custom if !self.registry_id.is_empty() => self.registry_id.as_str(),
            SoundKind::Custom => self.inline_clips.first().map(|c| c.name())?,
        };
        (!tag.is_empty()).then_some(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sound::clip::Clip;
    use std::time::Duration;

    #[test]
    fn test_registered_tag_is_id() {
        let sound = SoundDescriptor::registered("Ambient/Forest");
        assert_eq!(sound.kind(), SoundKind::Registered);
        assert_eq!(sound.tag(), Some("Ambient/Forest"));
    }

    #[test]
    fn test_custom_tag_falls_back_to_clip_name() {
        let clip = Clip::silent("rain_loop", Duration::from_secs(10)).into_handle();
        let sound = SoundDescriptor::wrap(clip.clone());
        assert_eq!(sound.tag(), Some("rain_loop"));

        let tagged = SoundDescriptor::wrap(clip).with_tag("Storm");
        assert_eq!(tagged.tag(), Some("Storm"));
    }

    #[test]
    fn test_empty_custom_has_no_tag() {
        assert_eq!(SoundDescriptor::custom(Vec::new()).tag(), None);
        assert_eq!(SoundDescriptor::registered("").tag(), None);
    }
}
