//! Event aggregator capability
//!
//! Consumed around activation/deactivation for screens opting into
//! automatic handler registration. Implementations live with the host;
//! an in-process default ships with the core crate.

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::events::ScreenEvent;

/// Handle for an active subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    /// Mint a fresh id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Receives published screen events.
pub trait EventSubscriber: Send + Sync {
    /// Handle one event
    fn handle(&self, event: &ScreenEvent);
}

/// Publish/subscribe contract for screen events.
pub trait EventAggregator: Send + Sync {
    /// Register a subscriber, returning its handle
    fn subscribe(&self, subscriber: Arc<dyn EventSubscriber>) -> SubscriptionId;

    /// Remove a subscriber by handle; unknown handles are ignored
    fn unsubscribe(&self, id: SubscriptionId);

    /// Deliver an event to every current subscriber
    fn publish(&self, event: &ScreenEvent);
}
