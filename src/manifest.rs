/// Sound manifest
///
/// JSON description of a registry and its themes, with clip paths relative to
/// the manifest file:
///
/// ```json
/// {
///   "sounds": [
///     { "id": "Ambient/Cave", "group": "Ambient", "clips": ["cave.ogg"] },
///     { "id": "Cave/Drip", "group": "Cave", "clips": ["drip1.wav", "drip2.wav"] }
///   ],
///   "themes": [
///     {
///       "name": "Cave",
///       "ambient": { "registered": "Ambient/Cave" },
///       "random_sounds": [
///         { "sound": { "registered": "Cave/Drip" }, "min_delay": 10, "max_delay": 25 }
///       ]
///     },
///     { "ambient": { "custom": { "clip": "wind.ogg", "tag": "Wind" } } }
///   ]
/// }
/// ```
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::sound::{Clip, ClipHandle, SoundDescriptor, SoundRegistry, SoundRegistryEntry};
use crate::theme::{AreaTheme, RandomSoundRule};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SoundManifest {
    #[serde(default)]
    pub sounds: Vec<SoundSpec>,

    #[serde(default)]
    pub themes: Vec<ThemeSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoundSpec {
    pub id: String,

    #[serde(default)]
    pub group: String,

    pub clips: Vec<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundRef {
    Registered(String),
    Custom {
        clip: PathBuf,
        #[serde(default)]
        tag: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomSoundSpec {
    pub sound: SoundRef,
    pub min_delay: f32,
    pub max_delay: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeSpec {
    /// Defaults to the ambient sound's tag
    #[serde(default)]
    pub name: Option<String>,

    pub ambient: SoundRef,

    #[serde(default)]
    pub random_sounds: Vec<RandomSoundSpec>,

    #[serde(default = "full_volume")]
    pub base_volume: f32,
}

fn full_volume() -> f32 {
    1.0
}

/// Built registry and themes
#[derive(Debug)]
pub struct LoadedManifest {
    pub registry: SoundRegistry,
    pub themes: Vec<AreaTheme>,
}

impl SoundManifest {
    pub fn parse(json: &str) -> AppResult<Self> {
        serde_json::from_str(json).context("Failed to parse sound manifest")
    }

    /// Read a manifest and build it with clip paths relative to its folder
    pub fn load(path: &Path) -> AppResult<LoadedManifest> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read sound manifest {}", path.display()))?;
        let manifest = Self::parse(&json)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        manifest.build(base_dir)
    }

    /// Decode every referenced clip once and assemble the registry and themes
    pub fn build(&self, base_dir: &Path) -> AppResult<LoadedManifest> {
        let mut clips = ClipCache::new(base_dir);

        let mut entries = Vec::with_capacity(self.sounds.len());
        for sound in &self.sounds {
            let handles = sound
                .clips
                .iter()
                .map(|path| clips.get(path))
                .collect::<AppResult<Vec<_>>>()
                .with_context(|| format!("Failed to load clips of sound {}", sound.id))?;
            entries.push(SoundRegistryEntry::new(&sound.id, &sound.group, handles));
        }
        let registry = SoundRegistry::from_entries(entries)?;

        let mut themes = Vec::with_capacity(self.themes.len());
        for (index, spec) in self.themes.iter().enumerate() {
            let ambient = clips
                .descriptor(&spec.ambient)
                .with_context(|| format!("Failed to load ambient of theme #{}", index))?;

            let mut theme = AreaTheme::new(ambient).with_base_volume(spec.base_volume);
            if let Some(name) = &spec.name {
                theme = theme.with_name(name);
            }
            for rule in &spec.random_sounds {
                let sound = clips.descriptor(&rule.sound)?;
                theme = theme.with_random_sound(RandomSoundRule::new(
                    sound,
                    rule.min_delay,
                    rule.max_delay,
                ));
            }
            themes.push(theme);
        }

        tracing::info!(
            "Loaded manifest: {} sounds, {} themes, {} clips",
            registry.len(),
            themes.len(),
            clips.len()
        );
        Ok(LoadedManifest { registry, themes })
    }
}

/// Decoded clips keyed by resolved path
struct ClipCache<'a> {
    base_dir: &'a Path,
    clips: HashMap<PathBuf, ClipHandle>,
}

impl<'a> ClipCache<'a> {
    fn new(base_dir: &'a Path) -> Self {
        Self {
            base_dir,
            clips: HashMap::new(),
        }
    }

    fn get(&mut self, path: &Path) -> AppResult<ClipHandle> {
        let path = self.base_dir.join(path);
        if let Some(clip) = self.clips.get(&path) {
            return Ok(ClipHandle::clone(clip));
        }

        let clip = Clip::load(&path)
            .with_context(|| format!("Failed to load clip {}", path.display()))?
            .into_handle();
        self.clips.insert(path, ClipHandle::clone(&clip));
        Ok(clip)
    }

    fn descriptor(&mut self, sound: &SoundRef) -> AppResult<SoundDescriptor> {
        Ok(match sound {
            SoundRef::Registered(id) => SoundDescriptor::registered(id),
            SoundRef::Custom { clip, tag } => {
                let descriptor = SoundDescriptor::wrap(self.get(clip)?);
                match tag {
                    Some(tag) => descriptor.with_tag(tag),
                    None => descriptor,
                }
            }
        })
    }

    fn len(&self) -> usize {
        self.clips.len()
    }
}
