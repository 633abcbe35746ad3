//! Event Bus implementation.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

use super::events::{AppEvent, Topic};

const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Subscription handle for unsubscribing from events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", &self.0.to_string()[..8])
    }
}

/// Filter to receive only specific topics
#[derive(Debug, Clone, Default)]
pub enum EventFilter {
    /// Receive all events.
    #[default]
    All,
    /// Receive events on any of these topics.
    Topics(Vec<Topic>),
}

impl EventFilter {
    /// Check if an event matches this filter
    pub fn matches(&self, event: &AppEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Topics(topics) => topics.contains(&event.topic()),
        }
    }
}

type EventHandler = Arc<dyn Fn(AppEvent) + Send + Sync>;

/// Error types for event bus operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EventBusError {
    /// No subscribers are listening
    #[error("No active subscribers")]
    NoSubscribers,
}

/// Typed event bus shared between the host application and the engine
pub struct EventBus {
    /// Broadcast channel sender for async receivers
    sender: broadcast::Sender<AppEvent>,
    /// Registered synchronous handlers
    handlers: RwLock<HashMap<SubscriptionId, (EventFilter, EventHandler)>>,
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new event bus with a custom broadcast capacity
    pub fn with_capacity(channel_capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(channel_capacity.max(1));
        Self {
            sender,
            handlers: RwLock::new(HashMap::new()),
        }
    }

    /// Publish an event to all subscribers
    ///
    /// Synchronous handlers run on the publishing thread, outside the
    /// handler lock, so a handler may itself subscribe or unsubscribe.
    /// Returns the number of async receivers reached.
    pub fn publish(&self, event: AppEvent) -> Result<usize, EventBusError> {
        tracing::trace!("Publishing: {}", event.description());

        let matching: Vec<EventHandler> = {
            let handlers = self.handlers.read();
            handlers
                .values()
                .filter(|(filter, _)| filter.matches(&event))
                .map(|(_, handler)| Arc::clone(handler))
                .collect()
        };
        let delivered_sync = !matching.is_empty();

        for handler in matching {
            handler(event.clone());
        }

        match self.sender.send(event) {
            Ok(count) => Ok(count),
            Err(_) if delivered_sync => Ok(0),
            Err(_) => Err(EventBusError::NoSubscribers),
        }
    }

    /// Subscribe to events with a synchronous handler
    pub fn subscribe<F>(&self, filter: EventFilter, handler: F) -> SubscriptionId
    where
        F: Fn(AppEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId::new();
        self.handlers.write().insert(id, (filter, Arc::new(handler)));
        tracing::debug!("Subscription {} added", id);
        id
    }

    /// Get a receiver for polling events from an async task
    pub fn receiver(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    /// Unsubscribe from events
    ///
    /// Returns true if the subscription was found and removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self.handlers.write().remove(&id).is_some();
        if removed {
            tracing::debug!("Subscription {} removed", id);
        }
        removed
    }

    /// Get the number of active synchronous subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.handlers.read().len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .field("receivers", &self.sender.receiver_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_subscribe_and_unsubscribe() {
        let bus = EventBus::new();

        let id = bus.subscribe(EventFilter::All, |_| {});
        assert_eq!(bus.subscriber_count(), 1);

        assert!(bus.unsubscribe(id));
        assert_eq!(bus.subscriber_count(), 0);

        // Double unsubscribe should return false
        assert!(!bus.unsubscribe(id));
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus = EventBus::new();
        assert_eq!(
            bus.publish(AppEvent::Rotation { degrees: 0.0 }),
            Err(EventBusError::NoSubscribers)
        );
    }

    #[test]
    fn test_topic_filtering() {
        let bus = EventBus::new();
        let rotations = Arc::new(AtomicUsize::new(0));
        let titles = Arc::new(AtomicUsize::new(0));

        let r = rotations.clone();
        bus.subscribe(EventFilter::Topics(vec![Topic::Rotation]), move |_| {
            r.fetch_add(1, Ordering::SeqCst);
        });
        let t = titles.clone();
        bus.subscribe(EventFilter::Topics(vec![Topic::Title]), move |_| {
            t.fetch_add(1, Ordering::SeqCst);
        });

        bus.publish(AppEvent::Rotation { degrees: 45.0 }).ok();
        bus.publish(AppEvent::Rotation { degrees: 90.0 }).ok();
        bus.publish(AppEvent::TitleChanged {
            title: "loading...".into(),
        })
        .ok();

        assert_eq!(rotations.load(Ordering::SeqCst), 2);
        assert_eq!(titles.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_handler_may_unsubscribe_itself() {
        let bus = Arc::new(EventBus::new());
        let slot: Arc<parking_lot::Mutex<Option<SubscriptionId>>> = Default::default();

        let bus_ref = Arc::downgrade(&bus);
        let slot_ref = slot.clone();
        let id = bus.subscribe(EventFilter::All, move |_| {
            if let (Some(bus), Some(id)) = (bus_ref.upgrade(), *slot_ref.lock()) {
                bus.unsubscribe(id);
            }
        });
        *slot.lock() = Some(id);

        bus.publish(AppEvent::DrawPointsToggled { enabled: true }).ok();
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_async_receiver() {
        let bus = EventBus::new();
        let mut receiver = bus.receiver();

        bus.publish(AppEvent::Rotation { degrees: 135.0 }).ok();

        match receiver.try_recv() {
            Ok(AppEvent::Rotation { degrees }) => assert_eq!(degrees, 135.0),
            other => panic!("Wrong event received: {:?}", other),
        }
    }
}
