//! Controller contract
//!
//! A controller owns use-case logic for one or more screens and declares
//! which screen methods it intercepts. Routes are declared once per
//! controller type; the engine caches the resulting table process-wide.

use std::sync::Arc;

use downcast_rs::{impl_downcast, DowncastSync};

use crate::proxy::mixin::MixinProvider;
use crate::routines::Routine;
use crate::routing::RoutingTableBuilder;

/// Use-case logic layered on top of screens through method interception.
pub trait Controller: DowncastSync {
    /// Stable controller name, used in diagnostics
    fn name(&self) -> &str;

    /// Declare the routes this controller type handles.
    ///
    /// Called at most once per concrete controller type; the declaration
    /// order here is the order handlers run in when several routes match
    /// the same invocation.
    ///
    /// The built table is shared by every instance of the type, so the
    /// declaration must be instance-independent: handlers must not
    /// capture `self` state. A handler reaches the instance it was
    /// invoked on by downcasting its `&dyn Controller` argument.
    fn configure_routes(&self, routes: &mut RoutingTableBuilder);

    /// Lifecycle routines to attach to proxies built for this controller
    fn routines(&self) -> Vec<Arc<dyn Routine>> {
        Vec::new()
    }

    /// Opt-in mixin provider for proxies built for this controller
    fn mixin_provider(&self) -> Option<Arc<dyn MixinProvider>> {
        None
    }
}

impl_downcast!(sync Controller);
