//! # rudder-di
//!
//! DI container shadow: an introspectable component registry, lifetime
//! scopes with parent fallback, and the constructor argument resolver
//! that replicates the container's binding negotiation behind the
//! `ConstructorArgumentSource` capability.
//!
//! This crate is not a general-purpose container. It models exactly the
//! slice of container behavior the proxy builder must pre-run: activator
//! kind, candidate constructors, satisfiability against ambient
//! services, and the most-parameters selection strategy.

pub mod registry;
pub mod resolver;
pub mod scope;

pub use registry::{
    Activator, ComponentRegistry, ConstructorBinding, ConstructorSelector, ReflectionActivator,
    Registration,
};
pub use resolver::ContainerArgumentResolver;
pub use scope::{LifetimeScope, ScopeGuard};
