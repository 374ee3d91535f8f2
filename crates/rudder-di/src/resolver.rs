//! Constructor argument resolution
//!
//! Re-runs a registration's constructor-binding negotiation the way the
//! shadowed container would at resolve time: discover candidate
//! constructors, keep the ones satisfiable from ambient services only,
//! apply the selection strategy, then resolve each parameter in order.

use std::sync::Arc;

use tracing::debug;

use rudder_domain::error::{Error, Result};
use rudder_domain::ports::container::ConstructorArgumentSource;
use rudder_domain::types::{ArgumentList, TypeKey};

use crate::registry::{Activator, ComponentRegistry, ConstructorBinding, ConstructorSelector};
use crate::scope::LifetimeScope;

/// [`ConstructorArgumentSource`] over a [`ComponentRegistry`] and a
/// [`LifetimeScope`].
pub struct ContainerArgumentResolver {
    registry: Arc<ComponentRegistry>,
    scope: Arc<LifetimeScope>,
}

impl ContainerArgumentResolver {
    /// Resolve against the given registry and scope
    pub fn new(registry: Arc<ComponentRegistry>, scope: Arc<LifetimeScope>) -> Self {
        Self { registry, scope }
    }

    fn satisfiable<'a>(&self, bindings: &'a [ConstructorBinding]) -> Vec<&'a ConstructorBinding> {
        bindings
            .iter()
            .filter(|b| {
                b.parameter_types()
                    .iter()
                    .all(|p| self.scope.is_registered(p))
            })
            .collect()
    }
}

impl ConstructorArgumentSource for ContainerArgumentResolver {
    fn resolve_constructor_arguments(
        &self,
        screen_type: &TypeKey,
    ) -> Result<Option<ArgumentList>> {
        let Some(registration) = self.registry.get(screen_type) else {
            debug!(screen = %screen_type, "No registration, using default construction path");
            return Ok(None);
        };

        let Activator::Reflection(activator) = registration.activator() else {
            return Err(Error::configuration(format!(
                "screen `{screen_type}` is registered with a `{}` activator; \
                 constructor pre-resolution requires reflection activation",
                registration.activator().kind()
            )));
        };

        let satisfiable = self.satisfiable(activator.constructors());

        if satisfiable.is_empty() {
            // Value-object screens with no injected dependencies: under the
            // most-parameters strategy a parameterless constructor is an
            // acceptable fallback instead of a hard failure.
            if activator.selector() == ConstructorSelector::MostParameters {
                debug!(screen = %screen_type, "No satisfiable binding, assuming parameterless constructor");
                return Ok(Some(ArgumentList::new()));
            }
            return Err(Error::resolution(format!(
                "no satisfiable constructor for `{screen_type}`"
            )));
        }

        let selected = activator.selector().select(screen_type, &satisfiable)?;

        let mut arguments = ArgumentList::new();
        for parameter in selected.parameter_types() {
            arguments.push_boxed(self.scope.resolve(parameter)?);
        }

        debug!(
            screen = %screen_type,
            parameters = arguments.len(),
            "Resolved constructor arguments"
        );
        Ok(Some(arguments))
    }
}

impl std::fmt::Debug for ContainerArgumentResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerArgumentResolver")
            .field("registry", &self.registry)
            .finish()
    }
}
