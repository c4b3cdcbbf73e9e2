/**
 * Change Broadcasting
 *
 * This module fans change events out to every connected WebSocket client.
 *
 * # Broadcasting
 *
 * Events are serialized once and the resulting text is sent through a
 * `tokio::sync::broadcast` channel; each open connection holds one receiver
 * and forwards what it gets. A connection that has gone away has dropped its
 * receiver, so it is skipped without any bookkeeping.
 *
 * # Delivery
 *
 * Fire-and-forget. There is no acknowledgment, retry or backlog: a client
 * that was not connected when an event was published never sees it and has
 * to re-fetch the project snapshot.
 */

use tokio::sync::broadcast;

use crate::shared::ChangeEvent;

/// Events buffered per receiver before a slow client starts skipping
pub const BROADCAST_CAPACITY: usize = 256;

/// Fan-out of serialized change events to connected clients
#[derive(Debug, Clone)]
pub struct ChangeBroadcaster {
    sender: broadcast::Sender<String>,
}

impl ChangeBroadcaster {
    /// Create a broadcaster buffering `capacity` events per client
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Register a new client; it receives every event published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.sender.subscribe()
    }

    /// Number of currently connected clients
    pub fn connection_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Broadcast an event to all connected clients
    ///
    /// # Returns
    ///
    /// Number of clients the message was queued for (0 if none are connected
    /// or the event could not be serialized). Never fails the caller.
    pub fn publish(&self, event: &ChangeEvent) -> usize {
        let message = match serde_json::to_string(event) {
            Ok(message) => message,
            Err(e) => {
                tracing::error!("[Realtime] Failed to serialize {} event: {:?}", event.event_type.as_str(), e);
                return 0;
            }
        };

        match self.sender.send(message) {
            Ok(subscriber_count) => {
                tracing::info!(
                    "[Realtime] {} event broadcast to {} clients",
                    event.event_type.as_str(),
                    subscriber_count
                );
                subscriber_count
            }
            Err(_) => {
                tracing::debug!(
                    "[Realtime] No clients connected for {} event",
                    event.event_type.as_str()
                );
                0
            }
        }
    }
}

impl Default for ChangeBroadcaster {
    fn default() -> Self {
        Self::new(BROADCAST_CAPACITY)
    }
}
