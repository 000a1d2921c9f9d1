/// Gain effects module
///
/// Gain shaping applied on top of source volume: exponential theme fades,
/// the listener-level master volume, and the ambient damper.

pub mod damper;
pub mod fade;
pub mod volume;

pub use damper::VolumeDamper;
pub use fade::{settle_ticks, GainFade};
pub use volume::MasterVolume;
