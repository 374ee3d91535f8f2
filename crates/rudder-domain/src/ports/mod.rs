//! Port traits consumed and produced by the core engine
//!
//! Everything here is an in-process object-capability contract: the
//! hosting MVVM framework, the DI container and the UI thread are
//! collaborators reached only through these traits.

pub mod aggregator;
pub mod container;
pub mod dispatch;
pub mod screen;

pub use aggregator::{EventAggregator, EventSubscriber, SubscriptionId};
pub use container::{ConstructorArgumentSource, ScopedResource};
pub use dispatch::{UiDispatcher, UiTask, WindowManager};
pub use screen::{lifecycle, notification_interfaces, PropertyChangeNotifier, Screen};
