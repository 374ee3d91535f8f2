//! Whole-engine integration: container-backed construction, interception,
//! tracking, windowing and configuration precedence.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use rudder::{
    lifecycle, ui_channel, ArgumentList, ConfigLoader, ConstructorBinding, Controller,
    HandlerFailurePolicy, ReflectionActivator, Registration, Result, ReturnValue, RudderConfig,
    RudderRuntime, RoutingTableBuilder, Screen, ScreenDescriptor, ScreenId, TypeKey,
    WindowConductor, WindowManager,
};

#[derive(Clone, Debug, PartialEq)]
struct Database(&'static str);

struct ShellScreen {
    descriptor: Arc<ScreenDescriptor>,
    activations: Arc<AtomicUsize>,
}

impl Screen for ShellScreen {
    fn descriptor(&self) -> Arc<ScreenDescriptor> {
        Arc::clone(&self.descriptor)
    }

    fn on_activate(&mut self) -> Result<()> {
        self.activations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn shell_descriptor(
    activations: Arc<AtomicUsize>,
    seen_database: Arc<Mutex<Option<Database>>>,
) -> Arc<ScreenDescriptor> {
    ScreenDescriptor::for_type::<ShellScreen>()
        .declares_lifecycle()
        .factory(move |args: ArgumentList| {
            let database = args.get::<Database>(0)?.clone();
            *seen_database.lock().unwrap() = Some(database);
            Ok(Box::new(ShellScreen {
                descriptor: ScreenDescriptor::for_type::<ShellScreen>()
                    .declares_lifecycle()
                    .build(),
                activations: Arc::clone(&activations),
            }) as Box<dyn Screen>)
        })
        .build()
}

struct ShellController {
    handled: AtomicUsize,
}

impl ShellController {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            handled: AtomicUsize::new(0),
        })
    }
}

impl Controller for ShellController {
    fn name(&self) -> &str {
        "shell"
    }

    // routes are cached per controller type, so the handler reaches the
    // invoked instance through its controller argument
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

fn runtime_with_database() -> RudderRuntime {
    let runtime = RudderRuntime::builder()
        .with_config(RudderConfig::default())
        .build();
    runtime.registry().register(Registration::reflection(
        TypeKey::of::<ShellScreen>(),
        ReflectionActivator::new()
            .with_constructor(ConstructorBinding::new(vec![TypeKey::of::<Database>()])),
    ));
    runtime.root_scope().register_instance(Database("primary"));
    runtime
}

#[test]
fn screens_are_constructed_from_container_services_and_intercepted() {
    let runtime = runtime_with_database();
    let activations = Arc::new(AtomicUsize::new(0));
    let controller = ShellController::new();
    let seen_database = Arc::new(Mutex::new(None));

    let screen = runtime
        .screen_builder(
            shell_descriptor(Arc::clone(&activations), Arc::clone(&seen_database)),
            Arc::clone(&controller) as Arc<dyn Controller>,
        )
        .build()
        .unwrap();

    assert_eq!(*seen_database.lock().unwrap(), Some(Database("primary")));

    let id = screen.lock().unwrap().id();
    assert!(runtime.tracker().live(id).is_some());

    screen.lock().unwrap().on_activate().unwrap();
    assert_eq!(activations.load(Ordering::SeqCst), 1);
    assert_eq!(controller.handled.load(Ordering::SeqCst), 1);

    // closing deactivation removes the screen from the tracker and
    // disposes its scope
    screen.lock().unwrap().on_deactivate(true).unwrap();
    assert!(!runtime.tracker().contains(id));
}

struct RecordedWindows {
    shown: Mutex<Vec<ScreenId>>,
    dialog_result: Option<bool>,
}

#[async_trait]
impl WindowManager for RecordedWindows {
    async fn show_window(&self, screen: ScreenId) -> Result<()> {
        self.shown.lock().unwrap().push(screen);
        Ok(())
    }

    async fn show_dialog(&self, screen: ScreenId) -> Result<Option<bool>> {
        self.shown.lock().unwrap().push(screen);
        Ok(self.dialog_result)
    }
}

#[tokio::test]
async fn dialog_conduction_activates_and_closes_on_the_ui_channel() {
    let runtime = runtime_with_database();
    let activations = Arc::new(AtomicUsize::new(0));
    let controller = ShellController::new();
    let screen = runtime
        .screen_builder(
            shell_descriptor(Arc::clone(&activations), Arc::new(Mutex::new(None))),
            Arc::clone(&controller) as Arc<dyn Controller>,
        )
        .build()
        .unwrap();
    let id = screen.lock().unwrap().id();

    let (ui, mut tasks) = ui_channel();
    let pump = tokio::spawn(async move {
        while let Some(task) = tasks.recv().await {
            task();
        }
    });

    let manager = Arc::new(RecordedWindows {
        shown: Mutex::new(Vec::new()),
        dialog_result: Some(true),
    });
    let conductor = WindowConductor::new(ui.clone(), Arc::clone(&manager) as Arc<dyn WindowManager>);

    let dialog_result = conductor.show_dialog(&screen).await.unwrap();
    assert_eq!(dialog_result, Some(true));
    assert_eq!(*manager.shown.lock().unwrap(), vec![id]);
    assert_eq!(activations.load(Ordering::SeqCst), 1);
    // the cached routing table still dispatches to this test's instance
    assert_eq!(controller.handled.load(Ordering::SeqCst), 1);

    // the closing lifecycle ran, so the tracker let go of the screen
    assert!(!runtime.tracker().contains(id));

    drop(ui);
    drop(conductor);
    pump.await.unwrap();
}

#[test]
fn environment_overrides_file_which_overrides_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rudder.toml");
    std::fs::write(
        &path,
        "[logging]\nlevel = \"debug\"\n\n[interception]\nfailure_policy = \"isolate-and-log\"\n",
    )
    .unwrap();

    std::env::set_var("RUDDERIT_LOGGING_LEVEL", "warn");
    let config = ConfigLoader::new()
        .with_config_path(&path)
        .with_env_prefix("RUDDERIT")
        .load()
        .unwrap();
    std::env::remove_var("RUDDERIT_LOGGING_LEVEL");

    // file overrode the default policy, env overrode the file's level
    assert_eq!(config.logging.level, "warn");
    assert_eq!(
        config.interception.failure_policy,
        HandlerFailurePolicy::IsolateAndLog
    );
}
