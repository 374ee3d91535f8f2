//! Method routing tables
//!
//! The explicit-registration replacement for attribute reflection: a
//! controller declares its routes through `RoutingTableBuilder`, and the
//! resulting `MethodRoutingTable` is built once per controller type and
//! cached for the life of the process (types are immutable for the
//! process, so the cache is never invalidated).

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use downcast_rs::Downcast;
use once_cell::sync::OnceCell;
use tracing::debug;

use rudder_domain::descriptor::ScreenDescriptor;
use rudder_domain::error::Result;
use rudder_domain::ports::screen::Screen;
use rudder_domain::types::{ArgumentList, MethodSignature, ReturnValue, TypeKey};

use crate::controller::Controller;
use crate::routing::signature::SignatureMatcher;

/// Type-erased controller handler.
///
/// The original's "leading screen parameter" maps to the
/// `&mut dyn Screen` argument; the remaining parameters travel in the
/// `ArgumentList` exactly as the intercepted method received them.
pub type RouteHandler =
    Arc<dyn Fn(&dyn Controller, &mut dyn Screen, &mut ArgumentList) -> Result<ReturnValue> + Send + Sync>;

/// One controller handler eligible to intercept a screen method.
#[derive(Clone)]
pub struct RouteDescriptor {
    target_name: String,
    screen_type: TypeKey,
    parameter_types: Vec<TypeKey>,
    return_type: TypeKey,
    call_base: bool,
    inject_interface: Option<TypeKey>,
    handler: RouteHandler,
}

impl RouteDescriptor {
    /// The screen method name this route intercepts
    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    /// The declared screen base parameter type
    pub fn screen_type(&self) -> TypeKey {
        self.screen_type
    }

    /// The intercepted method's own parameter types
    pub fn parameter_types(&self) -> &[TypeKey] {
        &self.parameter_types
    }

    /// The intercepted method's return type
    pub fn return_type(&self) -> TypeKey {
        self.return_type
    }

    /// Whether the screen's own implementation should still run
    pub fn call_base(&self) -> bool {
        self.call_base
    }

    /// Interface the proxy must implement for this target to resolve
    pub fn inject_interface(&self) -> Option<TypeKey> {
        self.inject_interface
    }

    /// The handler function
    pub fn handler(&self) -> &RouteHandler {
        &self.handler
    }
}

impl std::fmt::Debug for RouteDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteDescriptor")
            .field("target_name", &self.target_name)
            .field("screen_type", &self.screen_type.name())
            .field("call_base", &self.call_base)
            .finish()
    }
}

/// Name-keyed routing table for one controller type.
pub struct MethodRoutingTable {
    entries: Vec<Arc<RouteDescriptor>>,
    buckets: HashMap<String, Vec<Arc<RouteDescriptor>>>,
    inject_interfaces: Vec<TypeKey>,
}

impl MethodRoutingTable {
    fn from_entries(entries: Vec<RouteDescriptor>) -> Self {
        let entries: Vec<Arc<RouteDescriptor>> = entries.into_iter().map(Arc::new).collect();
        let mut buckets: HashMap<String, Vec<Arc<RouteDescriptor>>> = HashMap::new();
        let mut inject_interfaces = Vec::new();
        for descriptor in &entries {
            buckets
                .entry(descriptor.target_name.clone())
                .or_default()
                .push(Arc::clone(descriptor));
            if let Some(key) = descriptor.inject_interface {
                if !inject_interfaces.contains(&key) {
                    inject_interfaces.push(key);
                }
            }
        }
        Self {
            entries,
            buckets,
            inject_interfaces,
        }
    }

    /// Matching descriptors for an invocation, in declaration order.
    ///
    /// A descriptor matches when the invoked method's name hits its
    /// bucket, the proxy's runtime type satisfies the descriptor's
    /// declared screen type, and the remaining parameter types and return
    /// type are exactly equal. Several matches mean all of them run.
    pub fn target_methods(
        &self,
        proxy: &ScreenDescriptor,
        invoked: &MethodSignature,
    ) -> Vec<Arc<RouteDescriptor>> {
        let Some(bucket) = self.buckets.get(&invoked.name) else {
            return Vec::new();
        };
        bucket
            .iter()
            .filter(|d| proxy.assignable_to(&d.screen_type))
            .filter(|d| {
                SignatureMatcher::matches(invoked, None, &d.return_type, &d.parameter_types)
            })
            .cloned()
            .collect()
    }

    /// All descriptors, in declaration order
    pub fn entries(&self) -> &[Arc<RouteDescriptor>] {
        &self.entries
    }

    /// Union of inject-interface keys across all routes
    pub fn inject_interfaces(&self) -> &[TypeKey] {
        &self.inject_interfaces
    }

    /// Number of routes
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no routes
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for MethodRoutingTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodRoutingTable")
            .field("routes", &self.entries.len())
            .field("targets", &self.buckets.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Declarative builder populated by `Controller::configure_routes`.
#[derive(Default)]
pub struct RoutingTableBuilder {
    entries: Vec<RouteDescriptor>,
}

impl RoutingTableBuilder {
    /// Empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a route targeting the given screen method name.
    ///
    /// Registering the same handler under several names reproduces the
    /// original's attribute multiplicity.
    pub fn route<S: Into<String>>(&mut self, target_name: S) -> RouteBuilder<'_> {
        RouteBuilder {
            entries: &mut self.entries,
            target_name: target_name.into(),
            screen_type: TypeKey::of::<dyn Screen>(),
            parameter_types: Vec::new(),
            return_type: TypeKey::of::<()>(),
            call_base: true,
            inject_interface: None,
        }
    }

    /// Finish building
    pub fn build(self) -> MethodRoutingTable {
        MethodRoutingTable::from_entries(self.entries)
    }
}

/// Builder for one route entry.
pub struct RouteBuilder<'a> {
    entries: &'a mut Vec<RouteDescriptor>,
    target_name: String,
    screen_type: TypeKey,
    parameter_types: Vec<TypeKey>,
    return_type: TypeKey,
    call_base: bool,
    inject_interface: Option<TypeKey>,
}

impl RouteBuilder<'_> {
    /// Narrow the route to screens assignable to `S`
    pub fn for_screen<S: ?Sized + 'static>(mut self) -> Self {
        self.screen_type = TypeKey::of::<S>();
        self
    }

    /// Declare the intercepted method's parameter types
    pub fn with_parameters(mut self, parameter_types: Vec<TypeKey>) -> Self {
        self.parameter_types = parameter_types;
        self
    }

    /// Declare the intercepted method's return type
    pub fn returning<T: 'static>(mut self) -> Self {
        self.return_type = TypeKey::of::<T>();
        self
    }

    /// Whether the screen's own implementation still runs (default true)
    pub fn call_base(mut self, call_base: bool) -> Self {
        self.call_base = call_base;
        self
    }

    /// Require the proxy to implement an interface so the target method
    /// resolves even when the concrete screen type lacks it
    pub fn inject_interface<I: ?Sized + 'static>(mut self) -> Self {
        self.inject_interface = Some(TypeKey::of::<I>());
        self
    }

    /// Attach the handler and commit the route
    pub fn handler<F>(self, handler: F)
    where
        F: Fn(&dyn Controller, &mut dyn Screen, &mut ArgumentList) -> Result<ReturnValue>
            + Send
            + Sync
            + 'static,
    {
        self.entries.push(RouteDescriptor {
            target_name: self.target_name,
            screen_type: self.screen_type,
            parameter_types: self.parameter_types,
            return_type: self.return_type,
            call_base: self.call_base,
            inject_interface: self.inject_interface,
            handler: Arc::new(handler),
        });
    }
}

/// Cached routing table for the controller's concrete type.
///
/// Built at most once per type behind the map's entry lock; the table is
/// immutable once returned.
pub fn table_for(controller: &Arc<dyn Controller>) -> Arc<MethodRoutingTable> {
    static CACHE: OnceCell<DashMap<TypeId, Arc<MethodRoutingTable>>> = OnceCell::new();
    let cache = CACHE.get_or_init(DashMap::new);
    // key on the controller inside the Arc, not the Arc itself
    cache
        .entry(controller.as_ref().as_any().type_id())
        .or_insert_with(|| {
            debug!(controller = controller.name(), "Building method routing table");
            let mut builder = RoutingTableBuilder::new();
            controller.configure_routes(&mut builder);
            Arc::new(builder.build())
        })
        .value()
        .clone()
}
