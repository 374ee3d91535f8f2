//! Proxy building
//!
//! The front door of the engine: validates the screen descriptor and the
//! controller's routes against each other, gathers mixins and grafted
//! interfaces, pre-resolves constructor arguments through the container
//! capability, invokes the generator and registers the result with the
//! tracker.

use std::sync::{Arc, Mutex};

use tracing::debug;

use rudder_domain::descriptor::ScreenDescriptor;
use rudder_domain::error::{Error, Result};
use rudder_domain::ports::container::{ConstructorArgumentSource, ScopedResource};
use rudder_domain::ports::screen::notification_interfaces;
use rudder_domain::types::{ArgumentList, TypeKey};

use crate::controller::Controller;
use crate::proxy::generator::{DecoratingProxyGenerator, ProxyBuildSpec, ProxyGenerator};
use crate::proxy::mixin::{Mixin, ProxyOptions};
use crate::proxy::screen_proxy::{ObserverRetention, SharedScreen};
use crate::routines::Routine;
use crate::routing::{table_for, MethodRoutingTable};
use crate::tracking::ScreenTracker;

/// Builder for intercepting screen proxies.
pub struct ScreenProxyBuilder {
    descriptor: Arc<ScreenDescriptor>,
    controller: Arc<dyn Controller>,
    options: ProxyOptions,
    argument_source: Option<Arc<dyn ConstructorArgumentSource>>,
    routines: Vec<Arc<dyn Routine>>,
    mixins: Vec<Mixin>,
    generator: Arc<dyn ProxyGenerator>,
    tracker: Option<Arc<ScreenTracker>>,
    scoped_resource: Option<Box<dyn ScopedResource>>,
}

impl ScreenProxyBuilder {
    /// Start building a proxy for the screen type behind `descriptor`,
    /// intercepted by `controller`
    pub fn new(descriptor: Arc<ScreenDescriptor>, controller: Arc<dyn Controller>) -> Self {
        Self {
            descriptor,
            controller,
            options: ProxyOptions::new(),
            argument_source: None,
            routines: Vec::new(),
            mixins: Vec::new(),
            generator: Arc::new(DecoratingProxyGenerator::new()),
            tracker: None,
            scoped_resource: None,
        }
    }

    /// Caller-facing build options
    pub fn with_options(mut self, options: ProxyOptions) -> Self {
        self.options = options;
        self
    }

    /// Resolve base constructor arguments through this capability
    pub fn with_argument_source(mut self, source: Arc<dyn ConstructorArgumentSource>) -> Self {
        self.argument_source = Some(source);
        self
    }

    /// Append a lifecycle routine; controller routines run first
    pub fn with_routine(mut self, routine: Arc<dyn Routine>) -> Self {
        self.routines.push(routine);
        self
    }

    /// Graft an explicit mixin
    pub fn with_mixin(mut self, mixin: Mixin) -> Self {
        self.mixins.push(mixin);
        self
    }

    /// Replace the proxy generator
    pub fn with_generator(mut self, generator: Arc<dyn ProxyGenerator>) -> Self {
        self.generator = generator;
        self
    }

    /// Register the built screen with this tracker
    pub fn with_tracker(mut self, tracker: Arc<ScreenTracker>) -> Self {
        self.tracker = Some(tracker);
        self
    }

    /// Scoped resource released when the screen deactivates for close
    pub fn with_scoped_resource(mut self, resource: Box<dyn ScopedResource>) -> Self {
        self.scoped_resource = Some(resource);
        self
    }

    fn validate_routes(&self, table: &MethodRoutingTable) -> Result<()> {
        for route in table.entries() {
            if route.inject_interface().is_some() {
                continue;
            }
            if !self.descriptor.declares_named(route.target_name()) {
                return Err(Error::configuration(format!(
                    "controller `{}` routes `{}`, which `{}` does not declare \
                     and no inject interface covers",
                    self.controller.name(),
                    route.target_name(),
                    self.descriptor.type_key()
                )));
            }
        }
        Ok(())
    }

    fn grafted_interfaces(&self, table: &MethodRoutingTable, mixins: &[Mixin]) -> Vec<TypeKey> {
        let excluded = notification_interfaces();
        let mut grafted: Vec<TypeKey> = Vec::new();
        let candidates = self
            .options
            .additional_interfaces()
            .iter()
            .chain(table.inject_interfaces())
            .copied()
            .chain(mixins.iter().map(Mixin::interface));
        for key in candidates {
            if self.descriptor.implements(&key) || excluded.contains(&key) {
                continue;
            }
            if !grafted.contains(&key) {
                grafted.push(key);
            }
        }
        grafted
    }

    /// Build the proxy and hand it out as a shared screen.
    pub fn build(self) -> Result<SharedScreen> {
        if !self.descriptor.declares_lifecycle_set() {
            return Err(Error::configuration(format!(
                "screen type `{}` does not declare the full lifecycle method set",
                self.descriptor.type_key()
            )));
        }
        if self.scoped_resource.is_some() && self.tracker.is_none() {
            return Err(Error::configuration(
                "a scoped resource needs a tracker to take custody of it",
            ));
        }

        let table = table_for(&self.controller);
        self.validate_routes(&table)?;

        let mut routines = self.controller.routines();
        routines.extend(self.routines.iter().cloned());

        let mut mixins = self.mixins.clone();
        let providers = self
            .controller
            .mixin_provider()
            .into_iter()
            .chain(routines.iter().filter_map(|r| r.mixin_provider()));
        for provider in providers {
            mixins.extend(provider.mixins(&self.descriptor, &self.options)?);
        }

        let additional_interfaces = self.grafted_interfaces(&table, &mixins);

        let constructor_arguments = match &self.argument_source {
            Some(source) => source
                .resolve_constructor_arguments(&self.descriptor.type_key())?
                .unwrap_or_default(),
            None => ArgumentList::new(),
        };

        let spec = ProxyBuildSpec {
            base: Arc::clone(&self.descriptor),
            controller: Arc::clone(&self.controller),
            options: self.options,
            constructor_arguments,
            additional_interfaces,
            mixins,
            routines,
        };
        let mut proxy = self.generator.generate(spec)?;
        let id = proxy.id();

        if let Some(tracker) = self.tracker {
            let release_on_close = Arc::clone(&tracker);
            proxy.add_deactivation_observer(Box::new(move |screen_id, close| {
                if close {
                    release_on_close.release(screen_id);
                    ObserverRetention::Drop
                } else {
                    ObserverRetention::Keep
                }
            }));
            let shared = Arc::new(Mutex::new(proxy));
            tracker.track(id, &shared, self.scoped_resource);
            debug!(screen = %id, "Built tracked screen proxy");
            return Ok(shared);
        }

        debug!(screen = %id, "Built screen proxy");
        Ok(Arc::new(Mutex::new(proxy)))
    }
}

impl std::fmt::Debug for ScreenProxyBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScreenProxyBuilder")
            .field("screen", &self.descriptor.type_key().name())
            .field("controller", &self.controller.name())
            .field("tracked", &self.tracker.is_some())
            .finish()
    }
}
