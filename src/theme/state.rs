/// Theme lifecycle state
///
/// Phases a theme goes through and the runtime record kept for every theme
/// that is currently audible or becoming audible.
use std::sync::Arc;

use super::area::AreaTheme;
use crate::audio_system::effects::GainFade;
use crate::audio_system::SourceHandle;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ThemePhase {
    /// No registered theme has this name
    Unregistered,

    /// Registered, no sources held
    Idle,

    /// Active target, gain still rising
    FadingIn,

    /// Active target at full gain
    SteadyActive,

    /// No longer the target, gain falling toward reclaim
    FadingOut,
}

impl ThemePhase {
    /// Whether the theme holds sources in this phase
    pub fn is_live(&self) -> bool {
        matches!(
            self,
            ThemePhase::FadingIn | ThemePhase::SteadyActive | ThemePhase::FadingOut
        )
    }

    pub fn description(&self) -> &'static str {
        match self {
            ThemePhase::Unregistered => "Unregistered",
            ThemePhase::Idle => "Idle",
            ThemePhase::FadingIn => "Fading in",
            ThemePhase::SteadyActive => "Active",
            ThemePhase::FadingOut => "Fading out",
        }
    }
}

impl std::fmt::Display for ThemePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

/// Time left before a random sound rule fires again
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RandomCountdown {
    pub rule: usize,
    pub remaining: f32,
}

/// Runtime record of a live theme
#[derive(Debug)]
pub(crate) struct ThemeVoice {
    pub theme: Arc<AreaTheme>,
    pub gain: GainFade,
    pub ambient: SourceHandle,
    pub one_shots: Vec<SourceHandle>,
    pub countdowns: Vec<RandomCountdown>,
}

impl ThemeVoice {
    pub fn new(theme: Arc<AreaTheme>, ambient: SourceHandle, countdowns: Vec<RandomCountdown>) -> Self {
        Self {
            theme,
            gain: GainFade::silent(),
            ambient,
            one_shots: Vec::new(),
            countdowns,
        }
    }

    pub fn name(&self) -> &str {
        self.theme.name()
    }

    pub fn is_theme(&self, theme: &Arc<AreaTheme>) -> bool {
        Arc::ptr_eq(&self.theme, theme)
    }

    /// Point the voice at a re-registered theme of the same name.
    ///
    /// The ambient loop keeps playing; countdowns for rules the new theme no
    /// longer has are dropped.
    pub fn rebind(&mut self, theme: Arc<AreaTheme>) {
        let rules = theme.random_sounds().len();
        self.countdowns.retain(|c| c.rule < rules);
        self.theme = theme;
    }
}
