//! Event broadcaster for authorization lifecycle events.
//!
//! The `EventBroadcaster` is the bus the authorization endpoint publishes to
//! and observers subscribe to. It uses tokio's broadcast channel, so sending
//! never waits on a receiver.

use std::sync::Arc;
use tokio::sync::broadcast;

use super::types::AuthorizationEvent;

/// Default buffer size for the broadcast channel.
/// Events beyond this limit will cause older events to be dropped for slow receivers.
pub const DEFAULT_BUFFER_SIZE: usize = 1024;

/// Broadcaster for authorization events.
///
/// This is a thread-safe broadcaster that can be cloned and shared across the application.
/// Multiple subscribers can receive events from a single sender.
///
/// # Example
///
/// ```
/// use indexmap::IndexMap;
/// use octofhir_core::events::{AuthorizationEvent, EventBroadcaster};
///
/// let broadcaster = EventBroadcaster::new();
/// let _receiver = broadcaster.subscribe();
///
/// broadcaster.send(AuthorizationEvent::success(
///     "my-app",
///     "query",
///     "https://app.example.com/cb",
///     "https://auth.example.com",
///     IndexMap::new(),
/// ));
///
/// // Receive in another task
/// // let event = _receiver.recv().await?;
/// ```
#[derive(Clone)]
pub struct EventBroadcaster {
    sender: broadcast::Sender<AuthorizationEvent>,
}

impl EventBroadcaster {
    /// Create a new broadcaster with default buffer size.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUFFER_SIZE)
    }

    /// Create a new broadcaster with custom buffer size.
    ///
    /// A capacity of zero is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Create a new broadcaster wrapped in an Arc for sharing.
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Send an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event.
    /// Returns 0 if there are no active subscribers.
    pub fn send(&self, event: AuthorizationEvent) -> usize {
        self.sender.send(event).unwrap_or_default()
    }

    /// Subscribe to events.
    ///
    /// Returns a receiver that will receive all events broadcast after subscription.
    /// Note: Events sent before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<AuthorizationEvent> {
        self.sender.subscribe()
    }

    /// Get the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Check if there are any active subscribers.
    pub fn has_subscribers(&self) -> bool {
        self.sender.receiver_count() > 0
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBroadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBroadcaster")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}
