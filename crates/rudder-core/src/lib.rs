//! # rudder-core
//!
//! The interception engine: method routing tables, the invocation
//! interceptor, the decorating screen proxy and its builder, lifecycle
//! routines, the weak screen tracker, view-locator normalization and the
//! UI-thread conduction utilities.
//!
//! Everything here is host-agnostic: UI dispatch, window management and
//! the DI container are consumed through the capability traits declared
//! in `rudder-domain`.

pub mod conductor;
pub mod controller;
pub mod events;
pub mod interception;
pub mod proxy;
pub mod routines;
pub mod routing;
pub mod tracking;
pub mod view;

pub use conductor::{
    result_channel, ui_channel, PendingResult, ResultSource, UiHandle, WindowConductor,
};
pub use controller::Controller;
pub use events::InProcessEventAggregator;
pub use interception::{HandlerFailurePolicy, Interceptor, MethodInvocation};
pub use proxy::{
    DecoratingProxyGenerator, Mixin, MixinProvider, ObserverRetention, ProxyBuildSpec,
    ProxyGenerator, ProxyOptions, ScreenProxy, ScreenProxyBuilder, SharedScreen,
};
pub use routines::{
    EventSubscriptionRoutine, LifecycleBroadcastRoutine, Routine, RoutineChain,
};
pub use routing::{
    table_for, MethodRoutingTable, RouteDescriptor, RoutingTableBuilder, SignatureMatcher,
};
pub use tracking::ScreenTracker;
pub use view::{ProxyAwareNormalizer, ViewModelKeyNormalizer};
