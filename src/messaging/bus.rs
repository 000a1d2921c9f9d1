/// Event bus for mixer notifications
///
/// Hosts subscribe to learn about theme lifecycle changes without polling
/// the mixer. Clones share the same subscriber list.
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::RwLock;

use super::events::MixerEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(usize);

struct Subscriber {
    id: SubscriberId,
    sender: Sender<MixerEvent>,
}

#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Arc<RwLock<Vec<Subscriber>>>,
    next_id: Arc<AtomicUsize>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to events, returns a receiver and subscription ID
    pub fn subscribe(&self) -> (Receiver<MixerEvent>, SubscriberId) {
        let (tx, rx) = unbounded();
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers.write().push(Subscriber { id, sender: tx });
        (rx, id)
    }

    pub fn unsubscribe(&self, id: SubscriberId) {
        self.subscribers.write().retain(|s| s.id != id);
    }

    /// Send an event to every subscriber, dropping closed ones
    pub fn publish(&self, event: MixerEvent) {
        tracing::trace!("Event: {:?}", event);

        let closed: Vec<SubscriberId> = self
            .subscribers
            .read()
            .iter()
            .filter(|s| s.sender.try_send(event.clone()).is_err())
            .map(|s| s.id)
            .collect();

        if !closed.is_empty() {
            self.subscribers.write().retain(|s| !closed.contains(&s.id));
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_and_unsubscribe() {
        let bus = EventBus::new();
        let (_rx, id) = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);

        bus.unsubscribe(id);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_publish_reaches_all_subscribers() {
        let bus = EventBus::new();
        let (rx1, _) = bus.subscribe();
        let (rx2, _) = bus.subscribe();

        bus.publish(MixerEvent::ThemesRegistered { count: 2 });

        assert_eq!(rx1.try_recv().unwrap(), MixerEvent::ThemesRegistered { count: 2 });
        assert_eq!(rx2.try_recv().unwrap(), MixerEvent::ThemesRegistered { count: 2 });
    }

    #[test]
    fn test_dropped_receiver_is_pruned() {
        let bus = EventBus::new();
        let (rx, _) = bus.subscribe();
        drop(rx);
        let (_keep, _) = bus.subscribe();

        bus.publish(MixerEvent::ThemesDeactivated);
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[test]
    fn test_clones_share_subscribers() {
        let bus = EventBus::new();
        let other = bus.clone();
        let (_rx, _) = bus.subscribe();
        assert_eq!(other.subscriber_count(), 1);
    }
}
