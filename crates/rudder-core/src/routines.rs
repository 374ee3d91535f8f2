//! Lifecycle routines
//!
//! Routines are cross-cutting reactions to the recognized lifecycle
//! events of a proxied screen. They run after the interceptor has
//! finished routing the lifecycle call, in registration order, and every
//! routine sees every event.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, warn};

use rudder_domain::error::Result;
use rudder_domain::events::ScreenEvent;
use rudder_domain::ports::aggregator::{EventAggregator, SubscriptionId};
use rudder_domain::ports::screen::Screen;
use rudder_domain::types::{ScreenId, ViewHandle};

use crate::proxy::mixin::MixinProvider;

/// A cross-cutting lifecycle reaction.
pub trait Routine: Send + Sync {
    /// Stable routine name, used in diagnostics
    fn name(&self) -> &str;

    /// The screen finished one-time initialization
    fn after_initialize(&self, screen_id: ScreenId, screen: &mut dyn Screen) -> Result<()> {
        let _ = (screen_id, screen);
        Ok(())
    }

    /// The screen's view finished loading
    fn after_view_ready(
        &self,
        screen_id: ScreenId,
        screen: &mut dyn Screen,
        view: &ViewHandle,
    ) -> Result<()> {
        let _ = (screen_id, screen, view);
        Ok(())
    }

    /// The screen became active
    fn after_activate(&self, screen_id: ScreenId, screen: &mut dyn Screen) -> Result<()> {
        let _ = (screen_id, screen);
        Ok(())
    }

    /// The screen was deactivated
    fn after_deactivate(
        &self,
        screen_id: ScreenId,
        screen: &mut dyn Screen,
        close: bool,
    ) -> Result<()> {
        let _ = (screen_id, screen, close);
        Ok(())
    }

    /// The screen was closed
    fn after_close(
        &self,
        screen_id: ScreenId,
        screen: &mut dyn Screen,
        dialog_result: Option<bool>,
    ) -> Result<()> {
        let _ = (screen_id, screen, dialog_result);
        Ok(())
    }

    /// Opt-in mixin provider for proxies built with this routine
    fn mixin_provider(&self) -> Option<Arc<dyn MixinProvider>> {
        None
    }
}

/// Ordered routine list attached to one proxy.
///
/// Every routine runs for every event; a failing routine is logged and
/// the sweep continues, with the first failure surfaced afterwards.
#[derive(Default)]
pub struct RoutineChain {
    routines: Vec<Arc<dyn Routine>>,
}

impl RoutineChain {
    /// A chain over the given routines, in order
    pub fn new(routines: Vec<Arc<dyn Routine>>) -> Self {
        Self { routines }
    }

    /// The chained routines
    pub fn routines(&self) -> &[Arc<dyn Routine>] {
        &self.routines
    }

    fn sweep<F>(&self, screen: &mut dyn Screen, mut event: F) -> Result<()>
    where
        F: FnMut(&dyn Routine, &mut dyn Screen) -> Result<()>,
    {
        let mut first_error = None;
        for routine in &self.routines {
            if let Err(error) = event(routine.as_ref(), screen) {
                warn!(routine = routine.name(), %error, "Routine failed");
                first_error.get_or_insert(error);
            }
        }
        match first_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Fire the initialize event
    pub fn after_initialize(&self, screen_id: ScreenId, screen: &mut dyn Screen) -> Result<()> {
        self.sweep(screen, |r, s| r.after_initialize(screen_id, s))
    }

    /// Fire the view-ready event
    pub fn after_view_ready(
        &self,
        screen_id: ScreenId,
        screen: &mut dyn Screen,
        view: &ViewHandle,
    ) -> Result<()> {
        self.sweep(screen, |r, s| r.after_view_ready(screen_id, s, view))
    }

    /// Fire the activate event
    pub fn after_activate(&self, screen_id: ScreenId, screen: &mut dyn Screen) -> Result<()> {
        self.sweep(screen, |r, s| r.after_activate(screen_id, s))
    }

    /// Fire the deactivate event
    pub fn after_deactivate(
        &self,
        screen_id: ScreenId,
        screen: &mut dyn Screen,
        close: bool,
    ) -> Result<()> {
        self.sweep(screen, |r, s| r.after_deactivate(screen_id, s, close))
    }

    /// Fire the close event
    pub fn after_close(
        &self,
        screen_id: ScreenId,
        screen: &mut dyn Screen,
        dialog_result: Option<bool>,
    ) -> Result<()> {
        self.sweep(screen, |r, s| r.after_close(screen_id, s, dialog_result))
    }
}

impl std::fmt::Debug for RoutineChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.routines.iter().map(|r| r.name()))
            .finish()
    }
}

/// Publishes a [`ScreenEvent`] for every recognized lifecycle event.
pub struct LifecycleBroadcastRoutine {
    aggregator: Arc<dyn EventAggregator>,
}

impl LifecycleBroadcastRoutine {
    /// A routine publishing to the given aggregator
    pub fn new(aggregator: Arc<dyn EventAggregator>) -> Self {
        Self { aggregator }
    }
}

impl Routine for LifecycleBroadcastRoutine {
    fn name(&self) -> &str {
        "lifecycle-broadcast"
    }

    fn after_initialize(&self, screen_id: ScreenId, _screen: &mut dyn Screen) -> Result<()> {
        self.aggregator
            .publish(&ScreenEvent::Initialized { screen: screen_id });
        Ok(())
    }

    fn after_view_ready(
        &self,
        screen_id: ScreenId,
        _screen: &mut dyn Screen,
        _view: &ViewHandle,
    ) -> Result<()> {
        self.aggregator
            .publish(&ScreenEvent::ViewReady { screen: screen_id });
        Ok(())
    }

    fn after_activate(&self, screen_id: ScreenId, _screen: &mut dyn Screen) -> Result<()> {
        self.aggregator
            .publish(&ScreenEvent::Activated { screen: screen_id });
        Ok(())
    }

    fn after_deactivate(
        &self,
        screen_id: ScreenId,
        _screen: &mut dyn Screen,
        close: bool,
    ) -> Result<()> {
        self.aggregator.publish(&ScreenEvent::Deactivated {
            screen: screen_id,
            was_closed: close,
        });
        Ok(())
    }

    fn after_close(
        &self,
        screen_id: ScreenId,
        _screen: &mut dyn Screen,
        dialog_result: Option<bool>,
    ) -> Result<()> {
        self.aggregator.publish(&ScreenEvent::Closed {
            screen: screen_id,
            dialog_result,
        });
        Ok(())
    }
}

impl std::fmt::Debug for LifecycleBroadcastRoutine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleBroadcastRoutine").finish()
    }
}

/// Subscribes a screen's event subscriber to the aggregator while the
/// screen is active.
pub struct EventSubscriptionRoutine {
    aggregator: Arc<dyn EventAggregator>,
    active: DashMap<ScreenId, SubscriptionId>,
}

impl EventSubscriptionRoutine {
    /// A routine over the given aggregator
    pub fn new(aggregator: Arc<dyn EventAggregator>) -> Self {
        Self {
            aggregator,
            active: DashMap::new(),
        }
    }
}

impl Routine for EventSubscriptionRoutine {
    fn name(&self) -> &str {
        "event-subscription"
    }

    fn after_activate(&self, screen_id: ScreenId, screen: &mut dyn Screen) -> Result<()> {
        if self.active.contains_key(&screen_id) {
            return Ok(());
        }
        if let Some(subscriber) = screen.event_subscriber() {
            let subscription = self.aggregator.subscribe(subscriber);
            self.active.insert(screen_id, subscription);
            debug!(screen = %screen_id, "Subscribed screen to event aggregator");
        }
        Ok(())
    }

    fn after_deactivate(
        &self,
        screen_id: ScreenId,
        screen: &mut dyn Screen,
        close: bool,
    ) -> Result<()> {
        let _ = (screen, close);
        if let Some((_, subscription)) = self.active.remove(&screen_id) {
            self.aggregator.unsubscribe(subscription);
            debug!(screen = %screen_id, "Unsubscribed screen from event aggregator");
        }
        Ok(())
    }
}

impl std::fmt::Debug for EventSubscriptionRoutine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSubscriptionRoutine")
            .field("active", &self.active.len())
            .finish()
    }
}
