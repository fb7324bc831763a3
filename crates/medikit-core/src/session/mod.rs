//! Session lifecycle events.
//!
//! The authentication store publishes a [`SessionEvent`] whenever the session
//! ends. The dependent stores (user profile, medication list) each hold a
//! subscription and clear themselves when the event arrives, so the clears
//! never run inside the caller's stack and one dependent failing cannot
//! suppress the other. Embedders can obtain their own subscription through
//! [`Client::subscribe_session_events`](crate::Client::subscribe_session_events)
//! (e.g. to navigate back to the login screen).

use tokio::sync::broadcast;

const CHANNEL_BUFFER_CAPACITY: usize = 16;

/// Events describing session lifecycle transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The active session ended. Dependent stores reset to their default
    /// state on receipt.
    Ended,
}

/// The publishing side of the session event bus.
#[derive(Clone)]
pub(crate) struct SessionEventChannel {
    sender: broadcast::Sender<SessionEvent>,
}

impl SessionEventChannel {
    pub(crate) fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_BUFFER_CAPACITY);
        Self { sender }
    }

    /// Creates a subscription receiving all events published after this call.
    pub(crate) fn subscribe(&self) -> SessionEventSubscription {
        SessionEventSubscription {
            receiver: self.sender.subscribe(),
        }
    }

    /// Publishes an event to all current subscribers. Publishing never blocks
    /// and never fails the caller.
    pub(crate) fn publish(&self, event: SessionEvent) {
        if self.sender.send(event).is_err() {
            tracing::debug!(?event, "no session event subscribers");
        }
    }
}

/// A subscription to session lifecycle events.
///
/// Events published while the subscriber is not waiting are buffered.
pub struct SessionEventSubscription {
    receiver: broadcast::Receiver<SessionEvent>,
}

impl SessionEventSubscription {
    /// Waits for the next session event.
    ///
    /// Returns `None` once the publishing side has been dropped. A subscriber
    /// that falls too far behind skips to the oldest buffered event rather
    /// than failing.
    pub async fn next(&mut self) -> Option<SessionEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "session event subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_published_before_waiting_are_buffered() {
        let channel = SessionEventChannel::new();
        let mut subscription = channel.subscribe();

        channel.publish(SessionEvent::Ended);
        channel.publish(SessionEvent::Ended);

        assert_eq!(subscription.next().await, Some(SessionEvent::Ended));
        assert_eq!(subscription.next().await, Some(SessionEvent::Ended));
    }

    #[tokio::test]
    async fn subscription_ends_when_channel_is_dropped() {
        let channel = SessionEventChannel::new();
        let mut subscription = channel.subscribe();
        drop(channel);

        assert_eq!(subscription.next().await, None);
    }

    #[test]
    fn publishing_without_subscribers_does_not_fail() {
        let channel = SessionEventChannel::new();
        channel.publish(SessionEvent::Ended);
    }
}
