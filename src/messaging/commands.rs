/// Theme requests
///
/// Requests are queued from any thread and drained by the mixer at the
/// start of its next tick, in the order they were sent.
use crossbeam_channel::{unbounded, Receiver, Sender};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeRequest {
    /// Make the named theme the active target
    Activate(String),

    /// Fade every theme out
    DeactivateAll,
}

impl ThemeRequest {
    /// An empty or missing name deactivates all themes
    pub fn from_name(name: Option<&str>) -> Self {
        match name {
            Some(name) if !name.is_empty() => ThemeRequest::Activate(name.to_string()),
            _ => ThemeRequest::DeactivateAll,
        }
    }

    pub fn description(&self) -> String {
        match self {
            ThemeRequest::Activate(name) => format!("Activate theme: {}", name),
            ThemeRequest::DeactivateAll => "Deactivate all themes".to_string(),
        }
    }
}

/// Cloneable handle for queueing theme requests
#[derive(Debug, Clone)]
pub struct ThemeRequestSender {
    tx: Sender<ThemeRequest>,
}

impl ThemeRequestSender {
    pub fn send(&self, request: ThemeRequest) {
        tracing::debug!("{}", request.description());
        if self.tx.send(request).is_err() {
            tracing::warn!("Theme request dropped, mixer is gone");
        }
    }

    pub fn activate(&self, name: Option<&str>) {
        self.send(ThemeRequest::from_name(name));
    }
}

/// Mixer-side end of the request channel
#[derive(Debug)]
pub(crate) struct ThemeRequestQueue {
    tx: Sender<ThemeRequest>,
    rx: Receiver<ThemeRequest>,
}

impl ThemeRequestQueue {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn sender(&self) -> ThemeRequestSender {
        ThemeRequestSender {
            tx: self.tx.clone(),
        }
    }

    /// Requests queued so far
    pub fn drain(&self) -> Vec<ThemeRequest> {
        self.rx.try_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_from_name() {
        assert_eq!(
            ThemeRequest::from_name(Some("Indoor")),
            ThemeRequest::Activate("Indoor".to_string())
        );
        assert_eq!(ThemeRequest::from_name(Some("")), ThemeRequest::DeactivateAll);
        assert_eq!(ThemeRequest::from_name(None), ThemeRequest::DeactivateAll);
    }

    #[test]
    fn test_queue_preserves_order() {
        let queue = ThemeRequestQueue::new();
        let sender = queue.sender();

        sender.activate(Some("A"));
        sender.activate(None);
        sender.clone().activate(Some("B"));

        assert_eq!(
            queue.drain(),
            vec![
                ThemeRequest::Activate("A".to_string()),
                ThemeRequest::DeactivateAll,
                ThemeRequest::Activate("B".to_string()),
            ]
        );
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn test_sender_from_other_thread() {
        let queue = ThemeRequestQueue::new();
        let sender = queue.sender();

        std::thread::spawn(move || sender.activate(Some("Outdoor")))
            .join()
            .unwrap();

        assert_eq!(queue.drain(), vec![ThemeRequest::Activate("Outdoor".to_string())]);
    }
}
