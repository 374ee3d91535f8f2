//! Screen type descriptors
//!
//! Explicit runtime-type metadata replacing CLR-style reflection: a
//! `ScreenDescriptor` records what a reflected type would have exposed —
//! base chain, implemented interfaces, declared virtual methods, openness
//! flags and a construction factory. Proxy descriptors additionally carry
//! the base type key they were generated from plus stamped attributes.

use std::sync::Arc;

use crate::error::Result;
use crate::ports::screen::{lifecycle, Screen};
use crate::types::{ArgumentList, AttributeSpec, MethodSignature, TypeKey};

/// Constructs a base screen instance from resolved constructor arguments.
pub type ScreenFactory = Arc<dyn Fn(ArgumentList) -> Result<Box<dyn Screen>> + Send + Sync>;

/// Runtime-type metadata for a screen type.
#[derive(Clone)]
pub struct ScreenDescriptor {
    type_key: TypeKey,
    bases: Vec<TypeKey>,
    interfaces: Vec<TypeKey>,
    methods: Vec<MethodSignature>,
    sealed: bool,
    interface_only: bool,
    factory: Option<ScreenFactory>,
    proxy_of: Option<TypeKey>,
    attributes: Vec<AttributeSpec>,
}

impl ScreenDescriptor {
    /// Start describing the screen type `T`
    pub fn for_type<T: 'static>() -> ScreenDescriptorBuilder {
        ScreenDescriptorBuilder::new(TypeKey::of::<T>())
    }

    /// The described type's key
    pub fn type_key(&self) -> TypeKey {
        self.type_key
    }

    /// Base-type keys, nearest first
    pub fn bases(&self) -> &[TypeKey] {
        &self.bases
    }

    /// Implemented interface keys
    pub fn interfaces(&self) -> &[TypeKey] {
        &self.interfaces
    }

    /// Declared virtual method signatures
    pub fn methods(&self) -> &[MethodSignature] {
        &self.methods
    }

    /// Whether the type is closed for subclassing
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Whether the descriptor describes a bare interface
    pub fn is_interface_only(&self) -> bool {
        self.interface_only
    }

    /// The construction factory, if any
    pub fn factory(&self) -> Option<&ScreenFactory> {
        self.factory.as_ref()
    }

    /// For proxy descriptors, the base screen type key
    pub fn proxy_of(&self) -> Option<TypeKey> {
        self.proxy_of
    }

    /// Whether this descriptor was derived for a proxy
    pub fn is_proxy(&self) -> bool {
        self.proxy_of.is_some()
    }

    /// Attributes stamped on the (proxy) type
    pub fn attributes(&self) -> &[AttributeSpec] {
        &self.attributes
    }

    /// Whether a value of this type satisfies the given type key.
    ///
    /// True for the type itself, any base, any implemented interface, and
    /// the universal `dyn Screen` key. A controller handler declared
    /// against a broader screen type thereby intercepts calls on proxies
    /// of more derived types.
    pub fn assignable_to(&self, key: &TypeKey) -> bool {
        *key == TypeKey::of::<dyn Screen>()
            || self.type_key == *key
            || self.bases.contains(key)
            || self.interfaces.contains(key)
    }

    /// Whether the interface key is already satisfied by this type
    pub fn implements(&self, key: &TypeKey) -> bool {
        self.interfaces.contains(key)
    }

    /// Whether the exact method signature is declared by this type
    pub fn declares(&self, signature: &MethodSignature) -> bool {
        self.methods.contains(signature)
    }

    /// Whether a method with the given name is declared under any signature
    pub fn declares_named(&self, name: &str) -> bool {
        self.methods.iter().any(|m| m.name == name)
    }

    /// Whether all five lifecycle signatures are declared
    pub fn declares_lifecycle_set(&self) -> bool {
        lifecycle::all().iter().all(|sig| self.declares(sig))
    }

    /// Derive the descriptor a generated proxy reports: same identity plus
    /// the grafted interfaces, the stamped attributes, and the base marker
    /// used by view-locator normalization.
    pub fn derive_proxy(
        &self,
        additional_interfaces: Vec<TypeKey>,
        attributes: Vec<AttributeSpec>,
    ) -> Arc<Self> {
        let mut interfaces = self.interfaces.clone();
        for key in additional_interfaces {
            if !interfaces.contains(&key) {
                interfaces.push(key);
            }
        }
        let mut stamped = self.attributes.clone();
        stamped.extend(attributes);
        Arc::new(Self {
            type_key: self.type_key,
            bases: self.bases.clone(),
            interfaces,
            methods: self.methods.clone(),
            sealed: self.sealed,
            interface_only: self.interface_only,
            factory: self.factory.clone(),
            proxy_of: Some(self.proxy_of.unwrap_or(self.type_key)),
            attributes: stamped,
        })
    }
}

impl std::fmt::Debug for ScreenDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScreenDescriptor")
            .field("type_key", &self.type_key.name())
            .field("methods", &self.methods.len())
            .field("interfaces", &self.interfaces.len())
            .field("sealed", &self.sealed)
            .field("proxy", &self.is_proxy())
            .finish()
    }
}

/// Builder for [`ScreenDescriptor`]
pub struct ScreenDescriptorBuilder {
    descriptor: ScreenDescriptor,
}

impl ScreenDescriptorBuilder {
    fn new(type_key: TypeKey) -> Self {
        Self {
            descriptor: ScreenDescriptor {
                type_key,
                bases: Vec::new(),
                interfaces: Vec::new(),
                methods: Vec::new(),
                sealed: false,
                interface_only: false,
                factory: None,
                proxy_of: None,
                attributes: Vec::new(),
            },
        }
    }

    /// Record a base type, nearest first
    pub fn with_base<B: ?Sized + 'static>(mut self) -> Self {
        self.descriptor.bases.push(TypeKey::of::<B>());
        self
    }

    /// Record an implemented interface
    pub fn implements<I: ?Sized + 'static>(mut self) -> Self {
        self.descriptor.interfaces.push(TypeKey::of::<I>());
        self
    }

    /// Record an implemented interface by key
    pub fn implements_key(mut self, key: TypeKey) -> Self {
        self.descriptor.interfaces.push(key);
        self
    }

    /// Declare a virtual method
    pub fn declares(mut self, signature: MethodSignature) -> Self {
        self.descriptor.methods.push(signature);
        self
    }

    /// Declare the five lifecycle methods
    pub fn declares_lifecycle(mut self) -> Self {
        self.descriptor.methods.extend(lifecycle::all());
        self
    }

    /// Mark the type closed for subclassing
    pub fn sealed(mut self) -> Self {
        self.descriptor.sealed = true;
        self
    }

    /// Mark the descriptor as describing a bare interface
    pub fn interface_only(mut self) -> Self {
        self.descriptor.interface_only = true;
        self
    }

    /// Attach the construction factory
    pub fn factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(ArgumentList) -> Result<Box<dyn Screen>> + Send + Sync + 'static,
    {
        self.descriptor.factory = Some(Arc::new(factory));
        self
    }

    /// Stamp an attribute on the described type
    pub fn attribute(mut self, attribute: AttributeSpec) -> Self {
        self.descriptor.attributes.push(attribute);
        self
    }

    /// Finish building
    pub fn build(self) -> Arc<ScreenDescriptor> {
        Arc::new(self.descriptor)
    }
}
