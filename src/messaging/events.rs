/// Event types for the mixer
///
/// Events represent things that have happened (past tense).
/// They are broadcast to all subscribers.

/// Mixer events
#[derive(Debug, Clone, PartialEq)]
pub enum MixerEvent {
    /// A new theme set replaced the previous one
    ThemesRegistered { count: usize },

    /// A theme set failed validation and was discarded
    RegistrationRejected { reason: String },

    /// A theme acquired its ambient source and began fading in
    ThemeStarted { name: String },

    /// A theme became the active target
    ThemeActivated { name: String },

    /// No theme is the active target anymore
    ThemesDeactivated,

    /// An activation request could not be honoured
    ActivationFailed { name: String, reason: String },

    /// A theme faded out and released its sources
    ThemeReclaimed { name: String },

    /// A theme fired one of its random sounds
    RandomSoundFired { theme: String, sound: Option<String> },
}

impl MixerEvent {
    /// Theme the event refers to, if any
    pub fn theme_name(&self) -> Option<&str> {
        match self {
            MixerEvent::ThemeStarted { name }
            | MixerEvent::ThemeActivated { name }
            | MixerEvent::ActivationFailed { name, .. }
            | MixerEvent::ThemeReclaimed { name } => Some(name),
            MixerEvent::RandomSoundFired { theme, .. } => Some(theme),
            MixerEvent::ThemesRegistered { .. }
            | MixerEvent::RegistrationRejected { .. }
            | MixerEvent::ThemesDeactivated => None,
        }
    }
}
