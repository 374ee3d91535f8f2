//! Lifetime scopes
//!
//! Hierarchical service resolution: a child scope sees its own services
//! first and falls back to its parent. A `ScopeGuard` ties a child scope
//! to one screen's lifetime and releases it exactly once on the
//! deactivated-and-closed event.

use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use rudder_domain::error::{Error, Result};
use rudder_domain::ports::container::ScopedResource;
use rudder_domain::types::TypeKey;

type ServiceProvider = Arc<dyn Fn(&LifetimeScope) -> Result<Box<dyn Any + Send>> + Send + Sync>;

/// A resolution scope with optional parent fallback.
pub struct LifetimeScope {
    parent: Option<Arc<LifetimeScope>>,
    services: DashMap<TypeKey, ServiceProvider>,
    disposed: AtomicBool,
}

impl LifetimeScope {
    /// Create a root scope
    pub fn root() -> Arc<Self> {
        Arc::new(Self {
            parent: None,
            services: DashMap::new(),
            disposed: AtomicBool::new(false),
        })
    }

    /// Begin a child scope; resolution falls back to `self`
    pub fn begin_child(self: &Arc<Self>) -> Arc<Self> {
        Arc::new(Self {
            parent: Some(Arc::clone(self)),
            services: DashMap::new(),
            disposed: AtomicBool::new(false),
        })
    }

    /// Register a service produced by a factory on every resolution
    pub fn register<T, F>(&self, factory: F)
    where
        T: Any + Send,
        F: Fn(&LifetimeScope) -> Result<T> + Send + Sync + 'static,
    {
        let provider: ServiceProvider =
            Arc::new(move |scope| Ok(Box::new(factory(scope)?) as Box<dyn Any + Send>));
        self.services.insert(TypeKey::of::<T>(), provider);
    }

    /// Register a service resolved by cloning a held instance.
    ///
    /// Shared services are typically `Arc<dyn Trait>` values, so the
    /// clone is a pointer copy.
    pub fn register_instance<T>(&self, value: T)
    where
        T: Any + Send + Sync + Clone,
    {
        let provider: ServiceProvider =
            Arc::new(move |_| Ok(Box::new(value.clone()) as Box<dyn Any + Send>));
        self.services.insert(TypeKey::of::<T>(), provider);
    }

    /// Whether a service type is resolvable from this scope or a parent
    pub fn is_registered(&self, key: &TypeKey) -> bool {
        self.services.contains_key(key)
            || self
                .parent
                .as_ref()
                .is_some_and(|p| p.is_registered(key))
    }

    /// Resolve a service as a boxed value
    pub fn resolve(&self, key: &TypeKey) -> Result<Box<dyn Any + Send>> {
        if self.is_disposed() {
            return Err(Error::resolution(format!(
                "cannot resolve `{key}` from a disposed scope"
            )));
        }
        if let Some(provider) = self.services.get(key).map(|p| Arc::clone(&p)) {
            return provider(self);
        }
        match &self.parent {
            Some(parent) => parent.resolve(key),
            None => Err(Error::resolution(format!(
                "no registration for service `{key}`"
            ))),
        }
    }

    /// Resolve a service as a typed value
    pub fn resolve_typed<T: Any + Send>(&self) -> Result<T> {
        let boxed = self.resolve(&TypeKey::of::<T>())?;
        boxed
            .downcast::<T>()
            .map(|b| *b)
            .map_err(|_| Error::type_mismatch(std::any::type_name::<T>(), "resolved service"))
    }

    /// Drop all service registrations in this scope
    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
        self.services.clear();
    }

    /// Whether `dispose` ran
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for LifetimeScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifetimeScope")
            .field("services", &self.services.len())
            .field("has_parent", &self.parent.is_some())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

/// Owns a child scope for one screen and disposes it on release.
pub struct ScopeGuard {
    scope: Arc<LifetimeScope>,
    released: AtomicBool,
}

impl ScopeGuard {
    /// Guard the given scope
    pub fn new(scope: Arc<LifetimeScope>) -> Self {
        Self {
            scope,
            released: AtomicBool::new(false),
        }
    }

    /// The guarded scope
    pub fn scope(&self) -> &Arc<LifetimeScope> {
        &self.scope
    }
}

impl ScopedResource for ScopeGuard {
    fn release(&self) {
        if !self.released.swap(true, Ordering::SeqCst) {
            self.scope.dispose();
            debug!("Released screen lifetime scope");
        }
    }
}

impl std::fmt::Debug for ScopeGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeGuard")
            .field("released", &self.released.load(Ordering::SeqCst))
            .finish()
    }
}
