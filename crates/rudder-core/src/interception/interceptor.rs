//! Interception engine
//!
//! Decides, per invocation, whether the base screen method runs and which
//! controller handlers fire, and arbitrates the final return value.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use rudder_domain::descriptor::ScreenDescriptor;
use rudder_domain::error::Result;
use rudder_domain::ports::screen::Screen;
use rudder_domain::types::{ArgumentList, ReturnValue};

use crate::controller::Controller;
use crate::interception::invocation::MethodInvocation;
use crate::routing::{table_for, MethodRoutingTable};

/// What happens when a controller handler returns an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HandlerFailurePolicy {
    /// Abort the invocation and surface the error to the caller
    #[default]
    Propagate,
    /// Log the failure and keep running the remaining handlers
    IsolateAndLog,
}

/// Per-proxy interception engine bound to one controller.
pub struct Interceptor {
    controller: Arc<dyn Controller>,
    table: Arc<MethodRoutingTable>,
    policy: HandlerFailurePolicy,
}

impl Interceptor {
    /// Bind a controller, building or fetching its cached routing table
    pub fn bind(controller: Arc<dyn Controller>, policy: HandlerFailurePolicy) -> Self {
        let table = table_for(&controller);
        Self {
            controller,
            table,
            policy,
        }
    }

    /// The bound controller
    pub fn controller(&self) -> &Arc<dyn Controller> {
        &self.controller
    }

    /// The bound controller's routing table
    pub fn table(&self) -> &Arc<MethodRoutingTable> {
        &self.table
    }

    /// Run one invocation through the interception algorithm.
    ///
    /// With no matching route the invocation passes straight through to
    /// `base`. Otherwise the base method runs first if any matched route
    /// keeps it enabled, then every matched handler runs in declaration
    /// order. A handler whose route disables the base call supplies the
    /// return value; when several such routes match, the last one wins.
    /// Handlers on base-preserving routes run for their side effects only.
    pub fn intercept<F>(
        &self,
        proxy: &ScreenDescriptor,
        invocation: &mut MethodInvocation,
        screen: &mut dyn Screen,
        base: F,
    ) -> Result<()>
    where
        F: FnOnce(&mut dyn Screen, &mut ArgumentList) -> Result<ReturnValue>,
    {
        let matched = self.table.target_methods(proxy, invocation.method());

        if matched.is_empty() {
            let value = base(screen, invocation.arguments_mut())?;
            invocation.set_return_value(value);
            return Ok(());
        }

        trace!(
            controller = self.controller.name(),
            method = %invocation.method().name,
            routes = matched.len(),
            "Intercepting invocation"
        );

        let call_base = matched.iter().any(|d| d.call_base());
        if call_base {
            let value = base(screen, invocation.arguments_mut())?;
            invocation.set_return_value(value);
        }

        for descriptor in &matched {
            let outcome =
                (descriptor.handler())(self.controller.as_ref(), screen, invocation.arguments_mut());
            match outcome {
                Ok(value) => {
                    if !descriptor.call_base() {
                        invocation.set_return_value(value);
                    }
                }
                Err(error) => match self.policy {
                    HandlerFailurePolicy::Propagate => return Err(error),
                    HandlerFailurePolicy::IsolateAndLog => {
                        warn!(
                            controller = self.controller.name(),
                            method = %invocation.method().name,
                            %error,
                            "Controller handler failed, continuing"
                        );
                    }
                },
            }
        }

        Ok(())
    }
}

impl std::fmt::Debug for Interceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interceptor")
            .field("controller", &self.controller.name())
            .field("routes", &self.table.len())
            .field("policy", &self.policy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use rudder_domain::error::Error;
    use rudder_domain::ports::screen::lifecycle;
    use rudder_domain::types::MethodSignature;

    use crate::routing::RoutingTableBuilder;

    type Trace = Arc<Mutex<Vec<String>>>;

    struct ShellScreen {
        descriptor: Arc<ScreenDescriptor>,
        trace: Trace,
    }

    impl ShellScreen {
        fn new(trace: Trace) -> Self {
            Self {
                descriptor: ScreenDescriptor::for_type::<ShellScreen>()
                    .declares_lifecycle()
                    .build(),
                trace,
            }
        }
    }

    impl Screen for ShellScreen {
        fn descriptor(&self) -> Arc<ScreenDescriptor> {
            Arc::clone(&self.descriptor)
        }

        fn on_activate(&mut self) -> Result<()> {
            self.trace.lock().unwrap().push("base".into());
            Ok(())
        }
    }

    struct TracingController {
        trace: Trace,
        routes: fn(&mut RoutingTableBuilder, Trace),
    }

    impl Controller for TracingController {
        fn name(&self) -> &str {
            "tracing-controller"
        }

        fn configure_routes(&self, routes: &mut RoutingTableBuilder) {
            (self.routes)(routes, Arc::clone(&self.trace));
        }
    }

    // A distinct type per routing layout keeps the process-wide table
    // cache from bleeding between tests.
    macro_rules! controller {
        ($name:ident, $routes:expr) => {{
            struct $name(TracingController);
            impl Controller for $name {
                fn name(&self) -> &str {
                    self.0.name()
                }
                fn configure_routes(&self, routes: &mut RoutingTableBuilder) {
                    self.0.configure_routes(routes);
                }
            }
            let trace: Trace = Arc::new(Mutex::new(Vec::new()));
            let controller: Arc<dyn Controller> = Arc::new($name(TracingController {
                trace: Arc::clone(&trace),
                routes: $routes,
            }));
            (controller, trace)
        }};
    }

    fn run(
        interceptor: &Interceptor,
        screen: &mut ShellScreen,
        method: MethodSignature,
    ) -> Result<MethodInvocation> {
        let descriptor = screen.descriptor();
        let mut invocation = MethodInvocation::new(method, ArgumentList::new());
        interceptor.intercept(&descriptor, &mut invocation, screen, |s, _| {
            s.on_activate()?;
            Ok(ReturnValue::void())
        })?;
        Ok(invocation)
    }

    #[test]
    fn unmatched_invocation_passes_through_to_base() {
        let (controller, trace) = controller!(PassThrough, |_routes, _trace| {});
        let interceptor = Interceptor::bind(controller, HandlerFailurePolicy::default());
        let mut screen = ShellScreen::new(Arc::clone(&trace));

        run(&interceptor, &mut screen, lifecycle::activate()).unwrap();
        assert_eq!(*trace.lock().unwrap(), vec!["base"]);
    }

    #[test]
    fn base_runs_once_before_handlers() {
        let (controller, trace) = controller!(BaseFirst, |routes, trace| {
            for tag in ["first", "second"] {
                let trace = Arc::clone(&trace);
                routes.route(lifecycle::ACTIVATE).handler(move |_, _, _| {
                    trace.lock().unwrap().push(tag.into());
                    Ok(ReturnValue::void())
                });
            }
        });
        let interceptor = Interceptor::bind(controller, HandlerFailurePolicy::default());
        let mut screen = ShellScreen::new(Arc::clone(&trace));

        run(&interceptor, &mut screen, lifecycle::activate()).unwrap();
        assert_eq!(*trace.lock().unwrap(), vec!["base", "first", "second"]);
    }

    #[test]
    fn all_routes_disabling_base_skip_it_and_last_handler_wins() {
        let (controller, trace) = controller!(LastWins, |routes, _trace| {
            routes
                .route(lifecycle::ACTIVATE)
                .returning::<u32>()
                .call_base(false)
                .handler(|_, _, _| Ok(ReturnValue::of(1_u32)));
            routes
                .route(lifecycle::ACTIVATE)
                .returning::<u32>()
                .call_base(false)
                .handler(|_, _, _| Ok(ReturnValue::of(2_u32)));
        });
        let interceptor = Interceptor::bind(controller, HandlerFailurePolicy::default());
        let mut screen = ShellScreen::new(Arc::clone(&trace));

        let invocation = run(
            &interceptor,
            &mut screen,
            MethodSignature::new(lifecycle::ACTIVATE, rudder_domain::types::TypeKey::of::<u32>(), vec![]),
        )
        .unwrap();
        assert!(trace.lock().unwrap().is_empty());
        assert_eq!(invocation.into_return_value().downcast_ref::<u32>(), Some(&2));
    }

    #[test]
    fn mixed_flags_keep_base_and_give_result_to_disabling_route() {
        let (controller, trace) = controller!(MixedFlags, |routes, trace| {
            let t = Arc::clone(&trace);
            routes
                .route(lifecycle::ACTIVATE)
                .call_base(true)
                .handler(move |_, _, _| {
                    t.lock().unwrap().push("keeper".into());
                    Ok(ReturnValue::of("ignored"))
                });
            let t = Arc::clone(&trace);
            routes
                .route(lifecycle::ACTIVATE)
                .call_base(false)
                .handler(move |_, _, _| {
                    t.lock().unwrap().push("decider".into());
                    Ok(ReturnValue::void())
                });
        });
        let interceptor = Interceptor::bind(controller, HandlerFailurePolicy::default());
        let mut screen = ShellScreen::new(Arc::clone(&trace));

        let invocation = run(&interceptor, &mut screen, lifecycle::activate()).unwrap();
        assert_eq!(*trace.lock().unwrap(), vec!["base", "keeper", "decider"]);
        // the base-preserving handler's return value was discarded
        assert!(invocation.return_value().is_void());
    }

    #[test]
    fn propagate_policy_stops_at_first_failing_handler() {
        let (controller, trace) = controller!(Propagating, |routes, trace| {
            routes
                .route(lifecycle::ACTIVATE)
                .handler(|_, _, _| Err(Error::handler(lifecycle::ACTIVATE, "boom")));
            let t = trace;
            routes.route(lifecycle::ACTIVATE).handler(move |_, _, _| {
                t.lock().unwrap().push("unreachable".into());
                Ok(ReturnValue::void())
            });
        });
        let interceptor = Interceptor::bind(controller, HandlerFailurePolicy::Propagate);
        let mut screen = ShellScreen::new(Arc::clone(&trace));

        let err = run(&interceptor, &mut screen, lifecycle::activate()).unwrap_err();
        assert!(matches!(err, Error::Handler { .. }));
        assert_eq!(*trace.lock().unwrap(), vec!["base"]);
    }

    #[test]
    fn isolate_policy_runs_remaining_handlers() {
        let (controller, trace) = controller!(Isolating, |routes, trace| {
            routes
                .route(lifecycle::ACTIVATE)
                .handler(|_, _, _| Err(Error::handler(lifecycle::ACTIVATE, "boom")));
            let t = trace;
            routes.route(lifecycle::ACTIVATE).handler(move |_, _, _| {
                t.lock().unwrap().push("survivor".into());
                Ok(ReturnValue::void())
            });
        });
        let interceptor = Interceptor::bind(controller, HandlerFailurePolicy::IsolateAndLog);
        let mut screen = ShellScreen::new(Arc::clone(&trace));

        run(&interceptor, &mut screen, lifecycle::activate()).unwrap();
        assert_eq!(*trace.lock().unwrap(), vec!["base", "survivor"]);
    }
}
