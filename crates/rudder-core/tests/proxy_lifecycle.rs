//! End-to-end proxy behavior: building, lifecycle interception, routing,
//! tracking and event-aggregator integration.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use rudder_core::{
    EventSubscriptionRoutine, HandlerFailurePolicy, InProcessEventAggregator,
    LifecycleBroadcastRoutine, ProxyOptions, RoutingTableBuilder, ScreenProxyBuilder,
    ScreenTracker,
};
use rudder_domain::descriptor::ScreenDescriptor;
use rudder_domain::error::Result;
use rudder_domain::events::ScreenEvent;
use rudder_domain::ports::aggregator::{EventAggregator, EventSubscriber};
use rudder_domain::ports::container::ScopedResource;
use rudder_domain::ports::screen::{lifecycle, Screen};
use rudder_domain::types::{MethodSignature, ReturnValue, TypeKey};

struct ShellScreen {
    descriptor: Arc<ScreenDescriptor>,
    activations: Arc<AtomicUsize>,
    subscriber: Option<Arc<dyn EventSubscriber>>,
}

impl Screen for ShellScreen {
    fn descriptor(&self) -> Arc<ScreenDescriptor> {
        Arc::clone(&self.descriptor)
    }

    fn on_activate(&mut self) -> Result<()> {
        self.activations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn event_subscriber(&self) -> Option<Arc<dyn EventSubscriber>> {
        self.subscriber.clone()
    }
}

fn shell_descriptor(
    activations: Arc<AtomicUsize>,
    subscriber: Option<Arc<dyn EventSubscriber>>,
) -> Arc<ScreenDescriptor> {
    ScreenDescriptor::for_type::<ShellScreen>()
        .declares_lifecycle()
        .factory(move |_args| {
            Ok(Box::new(ShellScreen {
                descriptor: bare_descriptor(),
                activations: Arc::clone(&activations),
                subscriber: subscriber.clone(),
            }) as Box<dyn Screen>)
        })
        .build()
}

fn bare_descriptor() -> Arc<ScreenDescriptor> {
    ScreenDescriptor::for_type::<ShellScreen>()
        .declares_lifecycle()
        .build()
}

struct ShellController {
    handled: AtomicUsize,
}

impl rudder_core::Controller for ShellController {
    fn name(&self) -> &str {
        "shell"
    }

    // the table is shared per type, so state lives on the instance and
    // handlers reach it through the controller argument
    fn configure_routes(&self, routes: &mut RoutingTableBuilder) {
        routes
            .route(lifecycle::ACTIVATE)
            .handler(|controller, _, _| {
                let shell = controller.downcast_ref::<ShellController>().unwrap();
                shell.handled.fetch_add(1, Ordering::SeqCst);
                Ok(ReturnValue::void())
            });
    }
}

#[test]
fn activation_initializes_once_and_routes_to_the_controller() {
    let activations = Arc::new(AtomicUsize::new(0));
    let controller = Arc::new(ShellController {
        handled: AtomicUsize::new(0),
    });
    let screen = ScreenProxyBuilder::new(
        shell_descriptor(Arc::clone(&activations), None),
        Arc::clone(&controller) as Arc<dyn rudder_core::Controller>,
    )
    .build()
    .unwrap();

    {
        let mut proxy = screen.lock().unwrap();
        assert!(!proxy.is_initialized());
        proxy.on_activate().unwrap();
        proxy.on_activate().unwrap();
        assert!(proxy.is_initialized());
    }

    // base ran on both activations, handler too
    assert_eq!(activations.load(Ordering::SeqCst), 2);
    assert_eq!(controller.handled.load(Ordering::SeqCst), 2);
}

struct SilentController;

impl rudder_core::Controller for SilentController {
    fn name(&self) -> &str {
        "silent"
    }
    fn configure_routes(&self, _routes: &mut RoutingTableBuilder) {}
}

#[test]
fn unrouted_lifecycle_passes_through_transparently() {
    let activations = Arc::new(AtomicUsize::new(0));
    let screen = ScreenProxyBuilder::new(
        shell_descriptor(Arc::clone(&activations), None),
        Arc::new(SilentController),
    )
    .build()
    .unwrap();

    screen.lock().unwrap().on_activate().unwrap();
    assert_eq!(activations.load(Ordering::SeqCst), 1);
}

struct MissingTargetController;

impl rudder_core::Controller for MissingTargetController {
    fn name(&self) -> &str {
        "missing-target"
    }

    fn configure_routes(&self, routes: &mut RoutingTableBuilder) {
        routes
            .route("refresh")
            .handler(|_, _, _| Ok(ReturnValue::void()));
    }
}

#[test]
fn route_to_undeclared_method_fails_the_build() {
    let err = ScreenProxyBuilder::new(
        shell_descriptor(Arc::new(AtomicUsize::new(0)), None),
        Arc::new(MissingTargetController),
    )
    .build()
    .unwrap_err();
    assert!(matches!(
        err,
        rudder_domain::error::Error::Configuration { .. }
    ));
}

trait Refreshable {}

struct InjectingController;

impl rudder_core::Controller for InjectingController {
    fn name(&self) -> &str {
        "injecting"
    }

    fn configure_routes(&self, routes: &mut RoutingTableBuilder) {
        routes
            .route("refresh")
            .inject_interface::<dyn Refreshable>()
            .returning::<u32>()
            .call_base(false)
            .handler(|_, _, _| Ok(ReturnValue::of(11_u32)));
    }
}

#[test]
fn inject_interface_grafts_and_handler_supplies_the_result() {
    let screen = ScreenProxyBuilder::new(
        shell_descriptor(Arc::new(AtomicUsize::new(0)), None),
        Arc::new(InjectingController),
    )
    .build()
    .unwrap();

    let mut proxy = screen.lock().unwrap();
    assert!(proxy
        .descriptor()
        .implements(&TypeKey::of::<dyn Refreshable>()));

    let refresh = MethodSignature::new("refresh", TypeKey::of::<u32>(), vec![]);
    let mut args = rudder_domain::types::ArgumentList::new();
    let value = proxy.call(&refresh, &mut args).unwrap();
    assert_eq!(value.downcast_ref::<u32>(), Some(&11));
}

struct CountingResource(Arc<AtomicUsize>);

impl ScopedResource for CountingResource {
    fn release(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn closing_deactivation_releases_the_tracked_screen_exactly_once() {
    let tracker = Arc::new(ScreenTracker::new());
    let released = Arc::new(AtomicUsize::new(0));
    let screen = ScreenProxyBuilder::new(
        shell_descriptor(Arc::new(AtomicUsize::new(0)), None),
        Arc::new(SilentController),
    )
    .with_tracker(Arc::clone(&tracker))
    .with_scoped_resource(Box::new(CountingResource(Arc::clone(&released))))
    .build()
    .unwrap();

    let id = screen.lock().unwrap().id();
    assert!(tracker.live(id).is_some());

    // a plain deactivation keeps the screen tracked
    screen.lock().unwrap().on_deactivate(false).unwrap();
    assert!(tracker.contains(id));
    assert_eq!(released.load(Ordering::SeqCst), 0);

    screen.lock().unwrap().on_deactivate(true).unwrap();
    assert!(!tracker.contains(id));
    assert_eq!(released.load(Ordering::SeqCst), 1);

    // the observer was one-shot; a repeat close changes nothing
    screen.lock().unwrap().on_deactivate(true).unwrap();
    assert_eq!(released.load(Ordering::SeqCst), 1);
}

struct Recording(Mutex<Vec<ScreenEvent>>);

impl EventSubscriber for Recording {
    fn handle(&self, event: &ScreenEvent) {
        self.0.lock().unwrap().push(event.clone());
    }
}

#[test]
fn event_subscription_follows_activation() {
    let aggregator: Arc<InProcessEventAggregator> = Arc::new(InProcessEventAggregator::new());
    let recorder = Arc::new(Recording(Mutex::new(Vec::new())));
    let screen = ScreenProxyBuilder::new(
        shell_descriptor(
            Arc::new(AtomicUsize::new(0)),
            Some(Arc::clone(&recorder) as Arc<dyn EventSubscriber>),
        ),
        Arc::new(SilentController),
    )
    .with_routine(Arc::new(EventSubscriptionRoutine::new(
        Arc::clone(&aggregator) as Arc<dyn EventAggregator>,
    )))
    .build()
    .unwrap();

    screen.lock().unwrap().on_activate().unwrap();
    assert_eq!(aggregator.subscriber_count(), 1);

    screen.lock().unwrap().on_deactivate(false).unwrap();
    assert_eq!(aggregator.subscriber_count(), 0);
}

#[test]
fn lifecycle_broadcast_publishes_recognized_events() {
    let aggregator: Arc<InProcessEventAggregator> = Arc::new(InProcessEventAggregator::new());
    let recorder = Arc::new(Recording(Mutex::new(Vec::new())));
    aggregator.subscribe(Arc::clone(&recorder) as Arc<dyn EventSubscriber>);

    let screen = ScreenProxyBuilder::new(
        shell_descriptor(Arc::new(AtomicUsize::new(0)), None),
        Arc::new(SilentController),
    )
    .with_routine(Arc::new(LifecycleBroadcastRoutine::new(
        Arc::clone(&aggregator) as Arc<dyn EventAggregator>,
    )))
    .build()
    .unwrap();

    {
        let mut proxy = screen.lock().unwrap();
        proxy.on_activate().unwrap();
        proxy.on_deactivate(true).unwrap();
        proxy.on_close(Some(true)).unwrap();
    }

    let events = recorder.0.lock().unwrap();
    let kinds: Vec<&'static str> = events
        .iter()
        .map(|e| match e {
            ScreenEvent::Initialized { .. } => "initialized",
            ScreenEvent::ViewReady { .. } => "view_ready",
            ScreenEvent::Activated { .. } => "activated",
            ScreenEvent::Deactivated { .. } => "deactivated",
            ScreenEvent::Closed { .. } => "closed",
        })
        .collect();
    assert_eq!(kinds, vec!["initialized", "activated", "deactivated", "closed"]);
}

#[test]
fn sealed_screen_types_cannot_be_proxied() {
    let descriptor = ScreenDescriptor::for_type::<ShellScreen>()
        .declares_lifecycle()
        .sealed()
        .factory(|_| {
            Ok(Box::new(ShellScreen {
                descriptor: bare_descriptor(),
                activations: Arc::new(AtomicUsize::new(0)),
                subscriber: None,
            }) as Box<dyn Screen>)
        })
        .build();

    let err = ScreenProxyBuilder::new(descriptor, Arc::new(SilentController))
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        rudder_domain::error::Error::Configuration { .. }
    ));
}

#[test]
fn failure_policy_flows_through_build_options() {
    struct FailingController;

    impl rudder_core::Controller for FailingController {
        fn name(&self) -> &str {
            "failing"
        }

        fn configure_routes(&self, routes: &mut RoutingTableBuilder) {
            routes.route(lifecycle::ACTIVATE).handler(|_, _, _| {
                Err(rudder_domain::error::Error::handler(
                    lifecycle::ACTIVATE,
                    "boom",
                ))
            });
        }
    }

    let screen = ScreenProxyBuilder::new(
        shell_descriptor(Arc::new(AtomicUsize::new(0)), None),
        Arc::new(FailingController),
    )
    .with_options(ProxyOptions::new().with_failure_policy(HandlerFailurePolicy::IsolateAndLog))
    .build()
    .unwrap();

    // isolated, so the lifecycle call still succeeds
    screen.lock().unwrap().on_activate().unwrap();
}
