//! DI container capabilities
//!
//! The core never introspects a container directly; it consumes a
//! capability that pre-resolves constructor arguments by replicating the
//! container's own binding negotiation, and a scoped-resource capability
//! for per-screen lifetimes released on deactivation.

use crate::error::Result;
use crate::types::{ArgumentList, TypeKey};

/// Replicates a DI container's constructor-binding algorithm for a screen
/// type.
pub trait ConstructorArgumentSource: Send + Sync {
    /// Produce the ordered constructor argument list for `screen_type`.
    ///
    /// `Ok(None)` is the sentinel for "no registration — use the
    /// generator's default/no-arg construction path". Configuration and
    /// resolution failures propagate unmodified.
    fn resolve_constructor_arguments(&self, screen_type: &TypeKey)
        -> Result<Option<ArgumentList>>;
}

/// A resource scoped to one screen's lifetime, released exactly once when
/// the screen deactivates for good.
pub trait ScopedResource: Send + Sync {
    /// Release the resource; must be idempotent
    fn release(&self);
}
