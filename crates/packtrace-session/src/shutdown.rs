//! Cooperative stop signalling.

use tokio::sync::broadcast;

/// Broadcast handle for stopping a running session.
///
/// Cloneable; every watcher task holds a receiver and observes the signal
/// within at most one of its own polling intervals.
#[derive(Clone)]
pub struct StopSignal {
    sender: broadcast::Sender<()>,
}

impl StopSignal {
    /// Create a new stop signal.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self { sender }
    }

    /// Get a receiver for the signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.sender.subscribe()
    }

    /// Signal all subscribers to stop. Idempotent.
    pub fn trigger(&self) {
        let _ = self.sender.send(());
    }
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn all_subscribers_observe_the_signal() {
        let signal = StopSignal::new();
        let mut first = signal.subscribe();
        let mut second = signal.subscribe();

        signal.trigger();

        tokio::time::timeout(Duration::from_millis(100), first.recv())
            .await
            .unwrap()
            .unwrap();
        tokio::time::timeout(Duration::from_millis(100), second.recv())
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn trigger_without_subscribers_is_harmless() {
        let signal = StopSignal::new();
        signal.trigger();
        signal.trigger();
    }
}
