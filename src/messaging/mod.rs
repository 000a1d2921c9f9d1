/// Messaging between hosts and the mixer
///
/// - **Requests** flow in: theme activations queued from any thread and
///   applied on the next mixer tick.
/// - **Events** flow out: lifecycle notifications broadcast to subscribers.
pub mod bus;
pub mod commands;
pub mod events;

pub use bus::{EventBus, SubscriberId};
pub use commands::{ThemeRequest, ThemeRequestSender};
pub use events::MixerEvent;
