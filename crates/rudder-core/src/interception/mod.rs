//! Invocation interception
//!
//! The proxy-side engine: every virtual method call on a proxied screen
//! is reified into a [`MethodInvocation`] and run through the
//! [`Interceptor`], which consults the controller's routing table and
//! orchestrates base calls and handler execution.

pub mod interceptor;
pub mod invocation;

pub use interceptor::{HandlerFailurePolicy, Interceptor};
pub use invocation::MethodInvocation;
