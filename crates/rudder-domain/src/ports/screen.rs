//! Screen capability set
//!
//! The polymorphic contract the proxy intercepts: five lifecycle methods
//! plus a type-erased entry point for any other virtual method a screen
//! type declares in its descriptor.

use std::sync::Arc;

use downcast_rs::{impl_downcast, DowncastSync};

use crate::descriptor::ScreenDescriptor;
use crate::error::{Error, Result};
use crate::ports::aggregator::EventSubscriber;
use crate::types::{ArgumentList, MethodSignature, ReturnValue, TypeKey, ViewHandle};

/// A view-model with a defined activation lifecycle.
pub trait Screen: DowncastSync {
    /// Runtime-type metadata for this screen
    fn descriptor(&self) -> Arc<ScreenDescriptor>;

    /// One-time initialization, before first activation
    fn on_initialize(&mut self) -> Result<()> {
        Ok(())
    }

    /// The view attached to this screen finished loading
    fn on_view_ready(&mut self, view: ViewHandle) -> Result<()> {
        let _ = view;
        Ok(())
    }

    /// The screen became active
    fn on_activate(&mut self) -> Result<()> {
        Ok(())
    }

    /// The screen was deactivated; `close` means it will not reactivate
    fn on_deactivate(&mut self, close: bool) -> Result<()> {
        let _ = close;
        Ok(())
    }

    /// The screen was closed, with an optional dialog result
    fn on_close(&mut self, dialog_result: Option<bool>) -> Result<()> {
        let _ = dialog_result;
        Ok(())
    }

    /// Dispatch a non-lifecycle virtual method declared in the descriptor
    fn call(&mut self, method: &MethodSignature, args: &mut ArgumentList) -> Result<ReturnValue> {
        let _ = args;
        Err(Error::not_found(format!(
            "virtual method `{}` on `{}`",
            method.name,
            self.descriptor().type_key()
        )))
    }

    /// Opt-in for automatic event-aggregator registration around
    /// activation and deactivation
    fn event_subscriber(&self) -> Option<Arc<dyn EventSubscriber>> {
        None
    }
}

impl_downcast!(sync Screen);

/// Well-known lifecycle method names and signatures.
pub mod lifecycle {
    use super::{MethodSignature, TypeKey, ViewHandle};

    /// `on_initialize` method name
    pub const INITIALIZE: &str = "on_initialize";
    /// `on_view_ready` method name
    pub const VIEW_READY: &str = "on_view_ready";
    /// `on_activate` method name
    pub const ACTIVATE: &str = "on_activate";
    /// `on_deactivate` method name
    pub const DEACTIVATE: &str = "on_deactivate";
    /// `on_close` method name
    pub const CLOSE: &str = "on_close";

    /// Signature of `on_initialize`
    pub fn initialize() -> MethodSignature {
        MethodSignature::returning_unit(INITIALIZE, vec![])
    }

    /// Signature of `on_view_ready`
    pub fn view_ready() -> MethodSignature {
        MethodSignature::returning_unit(VIEW_READY, vec![TypeKey::of::<ViewHandle>()])
    }

    /// Signature of `on_activate`
    pub fn activate() -> MethodSignature {
        MethodSignature::returning_unit(ACTIVATE, vec![])
    }

    /// Signature of `on_deactivate`
    pub fn deactivate() -> MethodSignature {
        MethodSignature::returning_unit(DEACTIVATE, vec![TypeKey::of::<bool>()])
    }

    /// Signature of `on_close`
    pub fn close() -> MethodSignature {
        MethodSignature::returning_unit(CLOSE, vec![TypeKey::of::<Option<bool>>()])
    }

    /// All five lifecycle signatures, in lifecycle order
    pub fn all() -> Vec<MethodSignature> {
        vec![initialize(), view_ready(), activate(), deactivate(), close()]
    }
}

/// Property-change notification contract assumed present on concrete
/// screen implementations.
///
/// The proxy builder must never re-mix interfaces in
/// [`notification_interfaces`] onto a proxy; doing so would duplicate an
/// implementation the base type already carries.
pub trait PropertyChangeNotifier: Send + Sync {
    /// Raise a property-changed notification
    fn property_changed(&self, property: &str);
}

/// Interface keys excluded from proxy mixing.
pub fn notification_interfaces() -> Vec<TypeKey> {
    vec![TypeKey::of::<dyn PropertyChangeNotifier>()]
}
