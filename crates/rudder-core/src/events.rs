//! In-process event aggregator

use std::sync::Arc;

use dashmap::DashMap;
use tracing::trace;

use rudder_domain::events::ScreenEvent;
use rudder_domain::ports::aggregator::{EventAggregator, EventSubscriber, SubscriptionId};

/// Default [`EventAggregator`] delivering events synchronously to every
/// current subscriber.
///
/// Delivery order across subscribers is unspecified; subscribers must not
/// rely on it.
#[derive(Default)]
pub struct InProcessEventAggregator {
    subscribers: DashMap<SubscriptionId, Arc<dyn EventSubscriber>>,
}

impl InProcessEventAggregator {
    /// An aggregator with no subscribers
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of active subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl EventAggregator for InProcessEventAggregator {
    fn subscribe(&self, subscriber: Arc<dyn EventSubscriber>) -> SubscriptionId {
        let id = SubscriptionId::new();
        self.subscribers.insert(id, subscriber);
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.subscribers.remove(&id);
    }

    fn publish(&self, event: &ScreenEvent) {
        trace!(screen = %event.screen(), "Publishing screen event");
        for subscriber in self.subscribers.iter() {
            subscriber.value().handle(event);
        }
    }
}

impl std::fmt::Debug for InProcessEventAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InProcessEventAggregator")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
