//! # rudder
//!
//! Controller-on-top-of-MVVM: layer use-case controllers over screen
//! view-models by intercepting their lifecycle and virtual methods
//! through decorating proxies, with explicit method routing tables,
//! container-aware constructor resolution and weak screen tracking.
//!
//! This facade crate re-exports the public surface of the workspace and
//! adds configuration loading, logging setup and runtime composition.

pub mod config;
pub mod logging;
pub mod runtime;

pub use config::{ConfigLoader, InterceptionConfig, LoggingConfig, RudderConfig};
pub use logging::init_logging;
pub use runtime::{RudderRuntime, RudderRuntimeBuilder};

pub use rudder_core::{
    result_channel, table_for, ui_channel, Controller, DecoratingProxyGenerator,
    EventSubscriptionRoutine, HandlerFailurePolicy, InProcessEventAggregator, Interceptor,
    LifecycleBroadcastRoutine, MethodInvocation, MethodRoutingTable, Mixin, MixinProvider,
    ObserverRetention, PendingResult, ProxyAwareNormalizer, ProxyBuildSpec, ProxyGenerator,
    ProxyOptions, ResultSource, Routine, RoutineChain, RoutingTableBuilder, ScreenProxy,
    ScreenProxyBuilder, ScreenTracker, SharedScreen, SignatureMatcher, UiHandle,
    ViewModelKeyNormalizer, WindowConductor,
};
pub use rudder_di::{
    Activator, ComponentRegistry, ConstructorBinding, ConstructorSelector,
    ContainerArgumentResolver, LifetimeScope, ReflectionActivator, Registration, ScopeGuard,
};
pub use rudder_domain::descriptor::{ScreenDescriptor, ScreenDescriptorBuilder, ScreenFactory};
pub use rudder_domain::error::{Error, Result};
pub use rudder_domain::events::ScreenEvent;
pub use rudder_domain::ports::aggregator::{EventAggregator, EventSubscriber, SubscriptionId};
pub use rudder_domain::ports::container::{ConstructorArgumentSource, ScopedResource};
pub use rudder_domain::ports::dispatch::{UiDispatcher, UiTask, WindowManager};
pub use rudder_domain::ports::screen::{lifecycle, PropertyChangeNotifier, Screen};
pub use rudder_domain::types::{
    ArgumentList, AttributeSpec, MethodSignature, ReturnValue, ScreenId, TypeKey, ViewHandle,
};
