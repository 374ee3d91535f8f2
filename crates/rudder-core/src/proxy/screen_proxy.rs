//! The screen proxy
//!
//! Decorator standing in for a runtime-generated subclass: wraps a base
//! screen instance, reifies every lifecycle call into an invocation,
//! routes it through the interceptor, then fires the routine chain for
//! the recognized lifecycle events.

use std::sync::{Arc, Mutex};

use tracing::trace;

use rudder_domain::descriptor::ScreenDescriptor;
use rudder_domain::error::{Error, Result};
use rudder_domain::ports::aggregator::EventSubscriber;
use rudder_domain::ports::screen::{lifecycle, Screen};
use rudder_domain::types::{ArgumentList, MethodSignature, ReturnValue, ScreenId, ViewHandle};

use crate::interception::{Interceptor, MethodInvocation};
use crate::proxy::mixin::Mixin;
use crate::routines::RoutineChain;

/// How screens circulate once built: the mutex serializes lifecycle
/// calls, the `Arc` lets the tracker hold a weak edge.
pub type SharedScreen = Arc<Mutex<ScreenProxy>>;

/// Whether a deactivation observer stays registered after firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserverRetention {
    /// Keep the observer for future deactivations
    Keep,
    /// Remove the observer; it was one-shot
    Drop,
}

/// Observer invoked after every deactivation with the was-closed flag.
pub type DeactivationObserver = Box<dyn FnMut(ScreenId, bool) -> ObserverRetention + Send + Sync>;

/// An intercepting decorator around a base screen.
pub struct ScreenProxy {
    id: ScreenId,
    inner: Box<dyn Screen>,
    descriptor: Arc<ScreenDescriptor>,
    interceptor: Interceptor,
    routines: RoutineChain,
    mixins: Vec<Mixin>,
    observers: Vec<DeactivationObserver>,
    initialized: bool,
}

impl ScreenProxy {
    /// Assemble a proxy; normally done by the generator
    pub fn new(
        inner: Box<dyn Screen>,
        descriptor: Arc<ScreenDescriptor>,
        interceptor: Interceptor,
        routines: RoutineChain,
        mixins: Vec<Mixin>,
    ) -> Self {
        Self {
            id: ScreenId::new(),
            inner,
            descriptor,
            interceptor,
            routines,
            mixins,
            observers: Vec::new(),
            initialized: false,
        }
    }

    /// Stable id of this proxy instance
    pub fn id(&self) -> ScreenId {
        self.id
    }

    /// Whether one-time initialization already ran
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// The wrapped base screen
    pub fn base(&self) -> &dyn Screen {
        self.inner.as_ref()
    }

    /// Mutable access to the wrapped base screen
    pub fn base_mut(&mut self) -> &mut dyn Screen {
        self.inner.as_mut()
    }

    /// Register a deactivation observer
    pub fn add_deactivation_observer(&mut self, observer: DeactivationObserver) {
        self.observers.push(observer);
    }

    fn notify_deactivated(&mut self, close: bool) {
        let id = self.id;
        self.observers
            .retain_mut(|observe| matches!(observe(id, close), ObserverRetention::Keep));
    }
}

impl Screen for ScreenProxy {
    fn descriptor(&self) -> Arc<ScreenDescriptor> {
        Arc::clone(&self.descriptor)
    }

    fn on_initialize(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }
        trace!(screen = %self.id, "Initializing");
        let mut invocation = MethodInvocation::new(lifecycle::initialize(), ArgumentList::new());
        self.interceptor
            .intercept(&self.descriptor, &mut invocation, self.inner.as_mut(), |s, _| {
                s.on_initialize()?;
                Ok(ReturnValue::void())
            })?;
        self.initialized = true;
        self.routines.after_initialize(self.id, self.inner.as_mut())
    }

    fn on_view_ready(&mut self, view: ViewHandle) -> Result<()> {
        let mut args = ArgumentList::new();
        args.push(view.clone());
        let mut invocation = MethodInvocation::new(lifecycle::view_ready(), args);
        self.interceptor
            .intercept(&self.descriptor, &mut invocation, self.inner.as_mut(), |s, a| {
                let view = a.get::<ViewHandle>(0)?.clone();
                s.on_view_ready(view)?;
                Ok(ReturnValue::void())
            })?;
        self.routines
            .after_view_ready(self.id, self.inner.as_mut(), &view)
    }

    fn on_activate(&mut self) -> Result<()> {
        // first activation performs one-time initialization
        self.on_initialize()?;
        let mut invocation = MethodInvocation::new(lifecycle::activate(), ArgumentList::new());
        self.interceptor
            .intercept(&self.descriptor, &mut invocation, self.inner.as_mut(), |s, _| {
                s.on_activate()?;
                Ok(ReturnValue::void())
            })?;
        self.routines.after_activate(self.id, self.inner.as_mut())
    }

    fn on_deactivate(&mut self, close: bool) -> Result<()> {
        let mut args = ArgumentList::new();
        args.push(close);
        let mut invocation = MethodInvocation::new(lifecycle::deactivate(), args);
        self.interceptor
            .intercept(&self.descriptor, &mut invocation, self.inner.as_mut(), |s, a| {
                let close = *a.get::<bool>(0)?;
                s.on_deactivate(close)?;
                Ok(ReturnValue::void())
            })?;
        let swept = self.routines.after_deactivate(self.id, self.inner.as_mut(), close);
        // observers fire even when a routine failed
        self.notify_deactivated(close);
        swept
    }

    fn on_close(&mut self, dialog_result: Option<bool>) -> Result<()> {
        let mut args = ArgumentList::new();
        args.push(dialog_result);
        let mut invocation = MethodInvocation::new(lifecycle::close(), args);
        self.interceptor
            .intercept(&self.descriptor, &mut invocation, self.inner.as_mut(), |s, a| {
                let dialog_result = *a.get::<Option<bool>>(0)?;
                s.on_close(dialog_result)?;
                Ok(ReturnValue::void())
            })?;
        self.routines
            .after_close(self.id, self.inner.as_mut(), dialog_result)
    }

    fn call(&mut self, method: &MethodSignature, args: &mut ArgumentList) -> Result<ReturnValue> {
        let signature = method.clone();
        let mut invocation = MethodInvocation::new(method.clone(), std::mem::take(args));
        let mixins = &self.mixins;
        self.interceptor.intercept(
            &self.descriptor,
            &mut invocation,
            self.inner.as_mut(),
            move |s, a| {
                if s.descriptor().declares(&signature) {
                    s.call(&signature, a)
                } else if let Some(mixin) = mixins.iter().find(|m| m.handles(&signature)) {
                    mixin.invoke(&signature, a)
                } else {
                    Err(Error::not_found(format!(
                        "virtual method `{}`",
                        signature.name
                    )))
                }
            },
        )?;
        Ok(invocation.into_return_value())
    }

    fn event_subscriber(&self) -> Option<Arc<dyn EventSubscriber>> {
        self.inner.event_subscriber()
    }
}

impl std::fmt::Debug for ScreenProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScreenProxy")
            .field("id", &self.id)
            .field("base", &self.descriptor.proxy_of().map(|k| k.name()))
            .field("initialized", &self.initialized)
            .finish()
    }
}
