//! Proxy generation
//!
//! The capability seam for producing an intercepting screen out of a
//! build spec. The default generator decorates: it constructs the base
//! instance through the descriptor factory and wraps it, rather than
//! emitting a subclass at runtime.

use std::sync::Arc;

use tracing::debug;

use rudder_domain::descriptor::ScreenDescriptor;
use rudder_domain::error::{Error, Result};
use rudder_domain::types::{ArgumentList, TypeKey};

use crate::controller::Controller;
use crate::interception::Interceptor;
use crate::proxy::mixin::{Mixin, ProxyOptions};
use crate::proxy::screen_proxy::ScreenProxy;
use crate::routines::{Routine, RoutineChain};

/// Everything a generator needs to produce one proxy.
pub struct ProxyBuildSpec {
    /// Base screen type descriptor
    pub base: Arc<ScreenDescriptor>,
    /// Controller whose routes the proxy enforces
    pub controller: Arc<dyn Controller>,
    /// Caller-facing build options
    pub options: ProxyOptions,
    /// Resolved constructor arguments for the base instance
    pub constructor_arguments: ArgumentList,
    /// Interfaces to graft, already filtered against the base type
    pub additional_interfaces: Vec<TypeKey>,
    /// Mixins backing the grafted interfaces
    pub mixins: Vec<Mixin>,
    /// Lifecycle routines, in firing order
    pub routines: Vec<Arc<dyn Routine>>,
}

impl std::fmt::Debug for ProxyBuildSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyBuildSpec")
            .field("base", &self.base.type_key().name())
            .field("controller", &self.controller.name())
            .field("interfaces", &self.additional_interfaces.len())
            .field("mixins", &self.mixins.len())
            .finish()
    }
}

/// Produces intercepting screens from build specs.
pub trait ProxyGenerator: Send + Sync {
    /// Generate a proxy for the given spec
    fn generate(&self, spec: ProxyBuildSpec) -> Result<ScreenProxy>;
}

/// Default generator: decorate a factory-constructed base instance.
#[derive(Debug, Default)]
pub struct DecoratingProxyGenerator;

impl DecoratingProxyGenerator {
    /// A fresh generator
    pub fn new() -> Self {
        Self
    }

    fn validate(base: &ScreenDescriptor) -> Result<()> {
        if base.is_sealed() {
            return Err(Error::configuration(format!(
                "screen type `{}` is sealed and cannot be proxied",
                base.type_key()
            )));
        }
        if base.is_interface_only() {
            return Err(Error::configuration(format!(
                "`{}` describes a bare interface; a concrete screen type is required",
                base.type_key()
            )));
        }
        if base.factory().is_none() {
            return Err(Error::configuration(format!(
                "screen type `{}` has no construction factory",
                base.type_key()
            )));
        }
        Ok(())
    }
}

impl ProxyGenerator for DecoratingProxyGenerator {
    fn generate(&self, spec: ProxyBuildSpec) -> Result<ScreenProxy> {
        Self::validate(&spec.base)?;

        // validated above
        let Some(factory) = spec.base.factory() else {
            return Err(Error::internal("screen factory disappeared during generation"));
        };
        let inner = factory(spec.constructor_arguments)?;

        let descriptor = spec.base.derive_proxy(
            spec.additional_interfaces,
            spec.options.attributes().to_vec(),
        );
        let interceptor = Interceptor::bind(
            Arc::clone(&spec.controller),
            spec.options.failure_policy(),
        );

        debug!(
            base = %spec.base.type_key(),
            controller = spec.controller.name(),
            "Generated screen proxy"
        );
        Ok(ScreenProxy::new(
            inner,
            descriptor,
            interceptor,
            RoutineChain::new(spec.routines),
            spec.mixins,
        ))
    }
}
