/// Area themes and the crossfading mixer
///
/// ```text
/// ThemeTrigger ──ThemeRequest──> ThemeMixer ──> PlaybackEngine
///                                   │
///                                   └──MixerEvent──> EventBus
/// ```
pub mod area;
pub mod mixer;
pub mod state;
pub mod trigger;

pub use area::{AreaTheme, RandomSoundRule};
pub use mixer::ThemeMixer;
pub use state::ThemePhase;
pub use trigger::ThemeTrigger;
