//! Runtime composition
//!
//! Wires the container shadow, tracker, aggregator and generator into a
//! ready-to-use screen builder so hosts assemble the whole engine in one
//! place.

use std::sync::Arc;

use tracing::debug;

use rudder_core::proxy::{DecoratingProxyGenerator, ProxyGenerator, ProxyOptions};
use rudder_core::{
    Controller, EventSubscriptionRoutine, InProcessEventAggregator, ScreenProxyBuilder,
    ScreenTracker,
};
use rudder_di::{ComponentRegistry, ContainerArgumentResolver, LifetimeScope, ScopeGuard};
use rudder_domain::descriptor::ScreenDescriptor;
use rudder_domain::ports::aggregator::EventAggregator;

use crate::config::RudderConfig;

/// Assembled engine: container shadow, tracker, aggregator, generator.
pub struct RudderRuntime {
    config: RudderConfig,
    registry: Arc<ComponentRegistry>,
    root_scope: Arc<LifetimeScope>,
    tracker: Arc<ScreenTracker>,
    aggregator: Arc<dyn EventAggregator>,
    generator: Arc<dyn ProxyGenerator>,
}

impl RudderRuntime {
    /// Start composing a runtime
    pub fn builder() -> RudderRuntimeBuilder {
        RudderRuntimeBuilder::default()
    }

    /// The loaded configuration
    pub fn config(&self) -> &RudderConfig {
        &self.config
    }

    /// The component registry screens are looked up in
    pub fn registry(&self) -> &Arc<ComponentRegistry> {
        &self.registry
    }

    /// The root lifetime scope ambient services live in
    pub fn root_scope(&self) -> &Arc<LifetimeScope> {
        &self.root_scope
    }

    /// The screen tracker
    pub fn tracker(&self) -> &Arc<ScreenTracker> {
        &self.tracker
    }

    /// The event aggregator
    pub fn aggregator(&self) -> &Arc<dyn EventAggregator> {
        &self.aggregator
    }

    /// A proxy builder for one screen, pre-wired with this runtime's
    /// argument resolution, tracking, failure policy and event routine.
    ///
    /// Each screen gets its own child lifetime scope; the scope is
    /// disposed when the screen deactivates for close.
    pub fn screen_builder(
        &self,
        descriptor: Arc<ScreenDescriptor>,
        controller: Arc<dyn Controller>,
    ) -> ScreenProxyBuilder {
        let scope = self.root_scope.begin_child();
        let resolver = Arc::new(ContainerArgumentResolver::new(
            Arc::clone(&self.registry),
            Arc::clone(&scope),
        ));
        debug!(screen = %descriptor.type_key(), "Preparing screen builder");
        ScreenProxyBuilder::new(descriptor, controller)
            .with_options(
                ProxyOptions::new()
                    .with_failure_policy(self.config.interception.failure_policy),
            )
            .with_argument_source(resolver)
            .with_routine(Arc::new(EventSubscriptionRoutine::new(Arc::clone(
                &self.aggregator,
            ))))
            .with_tracker(Arc::clone(&self.tracker))
            .with_scoped_resource(Box::new(ScopeGuard::new(scope)))
            .with_generator(Arc::clone(&self.generator))
    }
}

impl std::fmt::Debug for RudderRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RudderRuntime")
            .field("registry", &self.registry)
            .field("tracker", &self.tracker)
            .finish()
    }
}

/// Builder for [`RudderRuntime`].
#[derive(Default)]
pub struct RudderRuntimeBuilder {
    config: Option<RudderConfig>,
    registry: Option<Arc<ComponentRegistry>>,
    root_scope: Option<Arc<LifetimeScope>>,
    aggregator: Option<Arc<dyn EventAggregator>>,
    generator: Option<Arc<dyn ProxyGenerator>>,
}

impl RudderRuntimeBuilder {
    /// Use this configuration instead of the defaults
    pub fn with_config(mut self, config: RudderConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use a pre-populated component registry
    pub fn with_registry(mut self, registry: Arc<ComponentRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Use a pre-populated root scope
    pub fn with_root_scope(mut self, scope: Arc<LifetimeScope>) -> Self {
        self.root_scope = Some(scope);
        self
    }

    /// Replace the event aggregator
    pub fn with_aggregator(mut self, aggregator: Arc<dyn EventAggregator>) -> Self {
        self.aggregator = Some(aggregator);
        self
    }

    /// Replace the proxy generator
    pub fn with_generator(mut self, generator: Arc<dyn ProxyGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Assemble the runtime
    pub fn build(self) -> RudderRuntime {
        RudderRuntime {
            config: self.config.unwrap_or_default(),
            registry: self
                .registry
                .unwrap_or_else(|| Arc::new(ComponentRegistry::new())),
            root_scope: self.root_scope.unwrap_or_else(LifetimeScope::root),
            tracker: Arc::new(ScreenTracker::new()),
            aggregator: self
                .aggregator
                .unwrap_or_else(|| Arc::new(InProcessEventAggregator::new())),
            generator: self
                .generator
                .unwrap_or_else(|| Arc::new(DecoratingProxyGenerator::new())),
        }
    }
}
