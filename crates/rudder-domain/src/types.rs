//! Value objects shared across the workspace
//!
//! Rust has no runtime reflection, so method identity and argument
//! marshalling are explicit: `TypeKey` stands in for a reflected type,
//! `MethodSignature` for a reflected method, and `ArgumentList` /
//! `ReturnValue` carry type-erased values with typed accessors that fail
//! before any side effect.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Identity of a Rust type: `TypeId` plus the static name for diagnostics.
///
/// Equality and hashing use the id only; the name is display material.
/// Works for unsized types, so interface keys like
/// `TypeKey::of::<dyn MyTrait>()` are valid.
#[derive(Clone, Copy, Debug)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Key for the type `T`
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The underlying `TypeId`
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The static type name (diagnostics only, not identity)
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A method's routable identity: name, return type, positional parameters.
///
/// The parameter list excludes the receiver; for controller handlers it
/// also excludes the leading screen argument, which is structural.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MethodSignature {
    /// Method name, case-sensitive
    pub name: String,
    /// Exact return type
    pub return_type: TypeKey,
    /// Positional parameter types
    pub parameter_types: Vec<TypeKey>,
}

impl MethodSignature {
    /// Create a signature
    pub fn new<S: Into<String>>(
        name: S,
        return_type: TypeKey,
        parameter_types: Vec<TypeKey>,
    ) -> Self {
        Self {
            name: name.into(),
            return_type,
            parameter_types,
        }
    }

    /// Create a signature returning `()`
    pub fn returning_unit<S: Into<String>>(name: S, parameter_types: Vec<TypeKey>) -> Self {
        Self::new(name, TypeKey::of::<()>(), parameter_types)
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.parameter_types.len())
    }
}

/// Ordered, type-erased argument storage for an invocation.
#[derive(Default)]
pub struct ArgumentList {
    values: Vec<Box<dyn Any + Send>>,
}

impl ArgumentList {
    /// Empty argument list
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from already-boxed values
    pub fn from_values(values: Vec<Box<dyn Any + Send>>) -> Self {
        Self { values }
    }

    /// Append a typed value
    pub fn push<T: Any + Send>(&mut self, value: T) {
        self.values.push(Box::new(value));
    }

    /// Append an already-boxed value
    pub fn push_boxed(&mut self, value: Box<dyn Any + Send>) {
        self.values.push(value);
    }

    /// Number of arguments
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Typed read access to the argument at `index`
    pub fn get<T: Any>(&self, index: usize) -> Result<&T> {
        let value = self.values.get(index).ok_or_else(|| {
            Error::invalid_argument(format!(
                "argument index {index} out of bounds (len {})",
                self.values.len()
            ))
        })?;
        value.downcast_ref::<T>().ok_or_else(|| {
            Error::type_mismatch(std::any::type_name::<T>(), format!("argument {index}"))
        })
    }

    /// Typed mutable access to the argument at `index`
    pub fn get_mut<T: Any>(&mut self, index: usize) -> Result<&mut T> {
        let len = self.values.len();
        let value = self.values.get_mut(index).ok_or_else(|| {
            Error::invalid_argument(format!("argument index {index} out of bounds (len {len})"))
        })?;
        value.downcast_mut::<T>().ok_or_else(|| {
            Error::type_mismatch(std::any::type_name::<T>(), format!("argument {index}"))
        })
    }

    /// Consume the list, yielding the boxed values
    pub fn into_values(self) -> Vec<Box<dyn Any + Send>> {
        self.values
    }
}

impl fmt::Debug for ArgumentList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgumentList")
            .field("len", &self.values.len())
            .finish()
    }
}

/// Type-erased return slot of an invocation.
pub struct ReturnValue(Option<Box<dyn Any + Send>>);

impl ReturnValue {
    /// A void return
    pub fn void() -> Self {
        Self(None)
    }

    /// A typed return value
    pub fn of<T: Any + Send>(value: T) -> Self {
        Self(Some(Box::new(value)))
    }

    /// Whether the slot is void
    pub fn is_void(&self) -> bool {
        self.0.is_none()
    }

    /// Typed read access to the value, if present and of type `T`
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.as_deref().and_then(|value| value.downcast_ref())
    }

    /// Consume the slot, yielding the boxed value
    pub fn into_inner(self) -> Option<Box<dyn Any + Send>> {
        self.0
    }
}

impl fmt::Debug for ReturnValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReturnValue")
            .field("is_void", &self.is_void())
            .finish()
    }
}

/// Opaque handle for a tracked screen instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScreenId(Uuid);

impl ScreenId {
    /// Mint a fresh id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ScreenId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Type-erased handle to the view passed into `on_view_ready`.
pub type ViewHandle = Arc<dyn Any + Send + Sync>;

/// Named metadata stamped onto generated proxy descriptors.
///
/// The explicit-table stand-in for the original's custom attributes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeSpec {
    /// Attribute name
    pub name: String,
    /// Attribute value
    pub value: String,
}

impl AttributeSpec {
    /// Create an attribute
    pub fn new<N: Into<String>, V: Into<String>>(name: N, value: V) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Marker {}

    #[test]
    fn type_key_equality_ignores_name() {
        assert_eq!(TypeKey::of::<u32>(), TypeKey::of::<u32>());
        assert_ne!(TypeKey::of::<u32>(), TypeKey::of::<i32>());
    }

    #[test]
    fn type_key_supports_unsized_types() {
        let key = TypeKey::of::<dyn Marker>();
        assert_eq!(key, TypeKey::of::<dyn Marker>());
        assert_ne!(key, TypeKey::of::<u32>());
    }

    #[test]
    fn argument_list_typed_access() {
        let mut args = ArgumentList::new();
        args.push(7_i32);
        args.push("hello".to_string());

        assert_eq!(*args.get::<i32>(0).unwrap(), 7);
        assert_eq!(args.get::<String>(1).unwrap(), "hello");
        assert!(matches!(
            args.get::<bool>(0),
            Err(Error::TypeMismatch { .. })
        ));
        assert!(matches!(
            args.get::<i32>(5),
            Err(Error::InvalidArgument { .. })
        ));
    }

    #[test]
    fn return_value_roundtrip() {
        let value = ReturnValue::of(42_u64);
        assert!(!value.is_void());
        assert_eq!(value.downcast_ref::<u64>(), Some(&42));
        assert_eq!(value.downcast_ref::<i32>(), None);
        assert!(ReturnValue::void().is_void());
        assert_eq!(ReturnValue::void().downcast_ref::<u64>(), None);
    }

    #[test]
    fn screen_ids_are_unique() {
        assert_ne!(ScreenId::new(), ScreenId::new());
    }
}
