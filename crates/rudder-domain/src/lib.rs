//! # rudder-domain
//!
//! Domain layer for rudder: error taxonomy, value objects, screen type
//! descriptors, lifecycle events and the port traits at the boundary to
//! the hosting MVVM framework, the DI container and the UI thread.
//!
//! Contains no engine logic; the routing/interception core lives in
//! `rudder-core` and the container shadow in `rudder-di`.

pub mod descriptor;
pub mod error;
pub mod events;
pub mod ports;
pub mod types;

pub use descriptor::{ScreenDescriptor, ScreenDescriptorBuilder, ScreenFactory};
pub use error::{Error, Result};
pub use events::ScreenEvent;
pub use types::{
    ArgumentList, AttributeSpec, MethodSignature, ReturnValue, ScreenId, TypeKey, ViewHandle,
};
