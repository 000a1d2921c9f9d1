/// Area trigger
///
/// Bound to a region of the host's world; the host calls [`ThemeTrigger::fire`]
/// when the player enters it.
use crate::messaging::ThemeRequestSender;

#[derive(Debug, Clone)]
pub struct ThemeTrigger {
    theme_name: Option<String>,
    sender: ThemeRequestSender,
}

impl ThemeTrigger {
    /// A trigger without a theme name fades every theme out
    pub fn new(theme_name: Option<String>, sender: ThemeRequestSender) -> Self {
        Self { theme_name, sender }
    }

    pub fn theme_name(&self) -> Option<&str> {
        self.theme_name.as_deref()
    }

    pub fn fire(&self) {
        self.sender.activate(self.theme_name());
    }
}
