//! Proxy layer
//!
//! Build-time assembly (builder, generator, mixins) and the runtime
//! decorator itself.

pub mod builder;
pub mod generator;
pub mod mixin;
pub mod screen_proxy;

pub use builder::ScreenProxyBuilder;
pub use generator::{DecoratingProxyGenerator, ProxyBuildSpec, ProxyGenerator};
pub use mixin::{Mixin, MixinDispatch, MixinProvider, ProxyOptions};
pub use screen_proxy::{DeactivationObserver, ObserverRetention, ScreenProxy, SharedScreen};
