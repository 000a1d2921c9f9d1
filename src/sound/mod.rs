/// Sound data module
///
/// Clips, descriptors and the registry that turns a descriptor into the clip
/// to play.

pub mod clip;
pub mod descriptor;
pub mod registry;

pub use clip::{tone_wav, Clip, ClipHandle};
pub use descriptor::{SoundDescriptor, SoundKind};
pub use registry::{SoundRegistry, SoundRegistryEntry};
