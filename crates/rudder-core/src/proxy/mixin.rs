//! Proxy mixins and build options
//!
//! A mixin grafts an extra interface onto a generated proxy: the proxy
//! descriptor gains the interface key and its method signatures, and
//! invocations of those methods dispatch to the mixin instead of the
//! base screen. The stand-in for runtime interface mixing on generated
//! subclasses.

use std::sync::Arc;

use rudder_domain::descriptor::ScreenDescriptor;
use rudder_domain::error::Result;
use rudder_domain::types::{ArgumentList, AttributeSpec, MethodSignature, ReturnValue, TypeKey};

use crate::interception::HandlerFailurePolicy;

/// Dispatch target for a grafted interface's methods.
pub type MixinDispatch =
    Arc<dyn Fn(&MethodSignature, &mut ArgumentList) -> Result<ReturnValue> + Send + Sync>;

/// One interface implementation grafted onto a proxy.
#[derive(Clone)]
pub struct Mixin {
    interface: TypeKey,
    methods: Vec<MethodSignature>,
    dispatch: MixinDispatch,
}

impl Mixin {
    /// A mixin for the given interface key and its method signatures
    pub fn new<F>(interface: TypeKey, methods: Vec<MethodSignature>, dispatch: F) -> Self
    where
        F: Fn(&MethodSignature, &mut ArgumentList) -> Result<ReturnValue> + Send + Sync + 'static,
    {
        Self {
            interface,
            methods,
            dispatch: Arc::new(dispatch),
        }
    }

    /// A marker mixin: grafts the interface key with no callable methods.
    ///
    /// Enough for routes that only need the interface present on the
    /// proxy so their target resolves.
    pub fn marker(interface: TypeKey) -> Self {
        Self::new(interface, vec![], |method, _| {
            Err(rudder_domain::error::Error::not_found(format!(
                "mixin method `{}`",
                method.name
            )))
        })
    }

    /// The grafted interface key
    pub fn interface(&self) -> TypeKey {
        self.interface
    }

    /// Method signatures the mixin answers
    pub fn methods(&self) -> &[MethodSignature] {
        &self.methods
    }

    /// Whether the mixin answers the given signature
    pub fn handles(&self, method: &MethodSignature) -> bool {
        self.methods.contains(method)
    }

    /// Dispatch a method to the mixin
    pub fn invoke(&self, method: &MethodSignature, args: &mut ArgumentList) -> Result<ReturnValue> {
        (self.dispatch)(method, args)
    }
}

impl std::fmt::Debug for Mixin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mixin")
            .field("interface", &self.interface.name())
            .field("methods", &self.methods.len())
            .finish()
    }
}

/// Supplies mixins at proxy-build time.
///
/// Controllers and routines opt in; the builder calls every provider with
/// the base descriptor and the build options, and a provider error aborts
/// the build.
pub trait MixinProvider: Send + Sync {
    /// Mixins to graft for this base type under these options
    fn mixins(&self, base: &ScreenDescriptor, options: &ProxyOptions) -> Result<Vec<Mixin>>;
}

/// Caller-facing proxy build options.
#[derive(Clone, Debug, Default)]
pub struct ProxyOptions {
    additional_interfaces: Vec<TypeKey>,
    attributes: Vec<AttributeSpec>,
    failure_policy: HandlerFailurePolicy,
}

impl ProxyOptions {
    /// Default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Graft an extra interface key onto the proxy
    pub fn with_interface(mut self, key: TypeKey) -> Self {
        if !self.additional_interfaces.contains(&key) {
            self.additional_interfaces.push(key);
        }
        self
    }

    /// Stamp an attribute on the proxy descriptor
    pub fn with_attribute(mut self, attribute: AttributeSpec) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Handler failure policy for the proxy's interceptor
    pub fn with_failure_policy(mut self, policy: HandlerFailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Requested extra interfaces
    pub fn additional_interfaces(&self) -> &[TypeKey] {
        &self.additional_interfaces
    }

    /// Requested attributes
    pub fn attributes(&self) -> &[AttributeSpec] {
        &self.attributes
    }

    /// Configured failure policy
    pub fn failure_policy(&self) -> HandlerFailurePolicy {
        self.failure_policy
    }
}
