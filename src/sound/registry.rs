/// Sound registry
///
/// Maps stable sound ids to interchangeable clips and resolves descriptors to
/// a concrete clip.
use std::collections::HashMap;

use rand::Rng;

use super::clip::ClipHandle;
use super::descriptor::{SoundDescriptor, SoundKind};
use crate::error::{MixerError, MixerResult, ValidationError};

#[derive(Debug, Clone)]
pub struct SoundRegistryEntry {
    pub registry_id: String,

    /// Authoring folder, e.g. "Footsteps/Indoor"
    pub group_path: String,

    pub clips: Vec<ClipHandle>,
}

impl SoundRegistryEntry {
    pub fn new(
        registry_id: impl Into<String>,
        group_path: impl Into<String>,
        clips: Vec<ClipHandle>,
    ) -> Self {
        Self {
            registry_id: registry_id.into(),
            group_path: group_path.into(),
            clips,
        }
    }
}

#[derive(Debug, Default)]
pub struct SoundRegistry {
    entries: Vec<SoundRegistryEntry>,
    by_id: HashMap<String, usize>,
}

impl SoundRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from an entry list
    pub fn from_entries(entries: Vec<SoundRegistryEntry>) -> MixerResult<Self> {
        let mut registry = Self::new();
        registry.replace_entries(entries)?;
        Ok(registry)
    }

    /// Replace the authoritative list.
    ///
    /// The whole list is rejected on a duplicate id or an entry without clips,
    /// leaving the current entries in place.
    pub fn replace_entries(&mut self, entries: Vec<SoundRegistryEntry>) -> MixerResult<()> {
        let index = Self::index(&entries)?;
        self.entries = entries;
        self.by_id = index;
        tracing::debug!("Sound registry holds {} entries", self.entries.len());
        Ok(())
    }

    /// Append one entry, rejecting an id that is already registered
    pub fn add_entry(&mut self, entry: SoundRegistryEntry) -> MixerResult<()> {
        if entry.clips.is_empty() {
            return Err(ValidationError::EmptySoundEntry(entry.registry_id).into());
        }
        if self.by_id.contains_key(&entry.registry_id) {
            return Err(ValidationError::DuplicateSound(entry.registry_id).into());
        }
        self.by_id.insert(entry.registry_id.clone(), self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    fn index(entries: &[SoundRegistryEntry]) -> Result<HashMap<String, usize>, ValidationError> {
        let mut by_id = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            if entry.clips.is_empty() {
                return Err(ValidationError::EmptySoundEntry(entry.registry_id.clone()));
            }
            if by_id.insert(entry.registry_id.clone(), i).is_some() {
                return Err(ValidationError::DuplicateSound(entry.registry_id.clone()));
            }
        }
        Ok(by_id)
    }

    pub fn get(&self, registry_id: &str) -> Option<&SoundRegistryEntry> {
        self.by_id.get(registry_id).map(|&i| &self.entries[i])
    }

    /// Entries whose group path starts with `prefix`
    pub fn entries_in_group<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = &'a SoundRegistryEntry> + 'a {
        self.entries
            .iter()
            .filter(move |e| e.group_path.starts_with(prefix))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pick the clip to play for a descriptor
    pub fn resolve_clip<R: Rng + ?Sized>(
        &self,
        sound: &SoundDescriptor,
        rng: &mut R,
    ) -> MixerResult<ClipHandle> {
        match sound.kind() {
            SoundKind::Custom => sound
                .inline_clips()
                .first()
                .cloned()
                .ok_or_else(|| MixerError::NotFound("custom sound is empty".to_string())),
            SoundKind::Registered => {
                let entry = self
                    .get(sound.registry_id())
                    .ok_or_else(|| MixerError::NotFound(sound.registry_id().to_string()))?;
                let pick = rng.gen_range(0..entry.clips.len());
                Ok(entry.clips[pick].clone())
            }
        }
    }

    /// Whether a descriptor would resolve to a clip
    pub fn is_playable(&self, sound: &SoundDescriptor) -> bool {
        match sound.kind() {
            SoundKind::Custom => !sound.inline_clips().is_empty(),
            SoundKind::Registered => self.get(sound.registry_id()).is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sound::clip::Clip;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;
    use std::time::Duration;

    fn clip(name: &str) -> ClipHandle {
        Clip::silent(name, Duration::from_millis(500)).into_handle()
    }

    fn steps_registry() -> SoundRegistry {
        SoundRegistry::from_entries(vec![
            SoundRegistryEntry::new(
                "Footsteps/Indoor",
                "Footsteps",
                vec![clip("step_1"), clip("step_2"), clip("step_3")],
            ),
            SoundRegistryEntry::new("Ambient/Forest", "Ambient", vec![clip("forest")]),
        ])
        .unwrap()
    }

    #[test]
    fn test_registered_resolves_to_member_of_entry() {
        let registry = steps_registry();
        let sound = SoundDescriptor::registered("Footsteps/Indoor");
        let mut rng = StdRng::seed_from_u64(11);
        let entry = registry.get("Footsteps/Indoor").unwrap();

        for _ in 0..50 {
            let picked = registry.resolve_clip(&sound, &mut rng).unwrap();
            assert!(entry.clips.iter().any(|c| Arc::ptr_eq(c, &picked)));
        }
    }

    #[test]
    fn test_registered_picks_every_alternative() {
        let registry = steps_registry();
        let sound = SoundDescriptor::registered("Footsteps/Indoor");
        let mut rng = StdRng::seed_from_u64(3);

        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(registry.resolve_clip(&sound, &mut rng).unwrap().name().to_string());
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_custom_resolves_to_first_clip() {
        let registry = SoundRegistry::new();
        let first = clip("first");
        let sound = SoundDescriptor::custom(vec![first.clone(), clip("second")]);
        let mut rng = StdRng::seed_from_u64(0);

        for _ in 0..10 {
            let picked = registry.resolve_clip(&sound, &mut rng).unwrap();
            assert!(Arc::ptr_eq(&picked, &first));
        }
    }

    #[test]
    fn test_unresolvable_sounds() {
        let registry = steps_registry();
        let mut rng = StdRng::seed_from_u64(0);

        let missing = SoundDescriptor::registered("Ambient/Desert");
        assert!(!registry.is_playable(&missing));
        assert!(matches!(
            registry.resolve_clip(&missing, &mut rng),
            Err(MixerError::NotFound(id)) if id == "Ambient/Desert"
        ));

        let empty = SoundDescriptor::custom(Vec::new());
        assert!(!registry.is_playable(&empty));
        assert!(registry.resolve_clip(&empty, &mut rng).is_err());
    }

    #[test]
    fn test_replace_rejects_duplicates_and_keeps_old_entries() {
        let mut registry = steps_registry();
        let result = registry.replace_entries(vec![
            SoundRegistryEntry::new("A", "", vec![clip("a")]),
            SoundRegistryEntry::new("A", "", vec![clip("b")]),
        ]);

        assert!(matches!(
            result,
            Err(MixerError::Validation(ValidationError::DuplicateSound(id))) if id == "A"
        ));
        assert_eq!(registry.len(), 2);
        assert!(registry.get("Ambient/Forest").is_some());
    }

    #[test]
    fn test_replace_rejects_empty_entry() {
        let mut registry = SoundRegistry::new();
        let result = registry.replace_entries(vec![SoundRegistryEntry::new("Hollow", "", Vec::new())]);
        assert!(result.is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_entries_in_group() {
        let registry = steps_registry();
        let ids: Vec<_> = registry
            .entries_in_group("Foot")
            .map(|e| e.registry_id.as_str())
            .collect();
        assert_eq!(ids, vec!["Footsteps/Indoor"]);
    }
}
