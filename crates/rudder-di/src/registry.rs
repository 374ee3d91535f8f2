//! Component registry with introspectable activation metadata
//!
//! Models the slice of a DI container the argument resolver must shadow:
//! which activator a registration uses, the candidate constructors of a
//! reflection activator, and the constructor-selection strategy. Anything
//! beyond that slice stays the container's business.

use dashmap::DashMap;

use rudder_domain::error::{Error, Result};
use rudder_domain::types::TypeKey;

/// How a registration activates its component.
#[derive(Clone, Debug)]
pub enum Activator {
    /// Standard reflection-based activation with candidate constructors
    Reflection(ReflectionActivator),
    /// A pre-built instance was registered
    ProvidedInstance,
    /// A factory delegate was registered
    Delegate,
}

impl Activator {
    /// Short label for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Reflection(_) => "reflection",
            Self::ProvidedInstance => "provided-instance",
            Self::Delegate => "delegate",
        }
    }
}

/// One candidate constructor: its ordered parameter types.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstructorBinding {
    parameter_types: Vec<TypeKey>,
}

impl ConstructorBinding {
    /// Describe a constructor by its parameter types
    pub fn new(parameter_types: Vec<TypeKey>) -> Self {
        Self { parameter_types }
    }

    /// A parameterless constructor
    pub fn parameterless() -> Self {
        Self::new(Vec::new())
    }

    /// The ordered parameter types
    pub fn parameter_types(&self) -> &[TypeKey] {
        &self.parameter_types
    }
}

/// Constructor-selection strategy among satisfiable bindings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ConstructorSelector {
    /// Prefer the constructor with the most parameters
    #[default]
    MostParameters,
}

impl ConstructorSelector {
    /// Pick one binding out of the satisfiable set.
    ///
    /// A tie at the maximum parameter count is an ambiguous binding and a
    /// resolution error, matching the shadowed container.
    pub fn select<'a>(
        &self,
        service: &TypeKey,
        bindings: &[&'a ConstructorBinding],
    ) -> Result<&'a ConstructorBinding> {
        match self {
            Self::MostParameters => {
                let max = bindings
                    .iter()
                    .map(|b| b.parameter_types().len())
                    .max()
                    .ok_or_else(|| {
                        Error::resolution(format!("no satisfiable constructor for `{service}`"))
                    })?;
                let mut at_max = bindings
                    .iter()
                    .filter(|b| b.parameter_types().len() == max);
                let selected = at_max.next().ok_or_else(|| {
                    Error::resolution(format!("no satisfiable constructor for `{service}`"))
                })?;
                if at_max.next().is_some() {
                    return Err(Error::resolution(format!(
                        "ambiguous constructor binding for `{service}`: \
                         multiple constructors take {max} parameters"
                    )));
                }
                Ok(selected)
            }
        }
    }
}

/// Reflection-based activator: candidate constructors plus the selection
/// strategy the container would apply at resolve time.
#[derive(Clone, Debug)]
pub struct ReflectionActivator {
    constructors: Vec<ConstructorBinding>,
    selector: ConstructorSelector,
}

impl ReflectionActivator {
    /// Create with the default most-parameters selector
    pub fn new() -> Self {
        Self {
            constructors: Vec::new(),
            selector: ConstructorSelector::default(),
        }
    }

    /// Add a candidate constructor
    pub fn with_constructor(mut self, binding: ConstructorBinding) -> Self {
        self.constructors.push(binding);
        self
    }

    /// Override the selection strategy
    pub fn with_selector(mut self, selector: ConstructorSelector) -> Self {
        self.selector = selector;
        self
    }

    /// The candidate constructors, in declaration order
    pub fn constructors(&self) -> &[ConstructorBinding] {
        &self.constructors
    }

    /// The selection strategy
    pub fn selector(&self) -> ConstructorSelector {
        self.selector
    }
}

impl Default for ReflectionActivator {
    fn default() -> Self {
        Self::new()
    }
}

/// One service registration.
#[derive(Clone, Debug)]
pub struct Registration {
    service: TypeKey,
    activator: Activator,
}

impl Registration {
    /// A reflection-activated registration
    pub fn reflection(service: TypeKey, activator: ReflectionActivator) -> Self {
        Self {
            service,
            activator: Activator::Reflection(activator),
        }
    }

    /// A pre-built-instance registration
    pub fn provided_instance(service: TypeKey) -> Self {
        Self {
            service,
            activator: Activator::ProvidedInstance,
        }
    }

    /// A factory-delegate registration
    pub fn delegate(service: TypeKey) -> Self {
        Self {
            service,
            activator: Activator::Delegate,
        }
    }

    /// The registered service key
    pub fn service(&self) -> TypeKey {
        self.service
    }

    /// The registration's activator
    pub fn activator(&self) -> &Activator {
        &self.activator
    }
}

/// Registry of service registrations, keyed by service type.
#[derive(Default)]
pub struct ComponentRegistry {
    registrations: DashMap<TypeKey, Registration>,
}

impl ComponentRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a registration
    pub fn register(&self, registration: Registration) {
        self.registrations
            .insert(registration.service(), registration);
    }

    /// Look up the registration for a service
    pub fn get(&self, service: &TypeKey) -> Option<Registration> {
        self.registrations.get(service).map(|r| r.clone())
    }

    /// Whether a service is registered
    pub fn contains(&self, service: &TypeKey) -> bool {
        self.registrations.contains_key(service)
    }

    /// Number of registrations
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("registrations", &self.registrations.len())
            .finish()
    }
}
