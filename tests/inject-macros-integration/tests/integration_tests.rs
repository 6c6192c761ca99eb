//! Centralized integration tests for inject-macros crate

use di_abstractions::{Injectable, InjectionTarget, ScopeAware, ScopeHandle, SharedObject};
use di_impl::{BindingRegistry, ModuleChain};
use infrastructure_common::{Disposable, InjectorConfig, MethodConvention};
use inject_macros::{injection_target, Injectable};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

trait Logger: Send + Sync {
    fn prefix(&self) -> String;
}

#[derive(Injectable)]
struct ConsoleLogger {
    #[inject(id = "prefix", default = "console".to_string())]
    prefix: String,
}

impl Logger for ConsoleLogger {
    fn prefix(&self) -> String {
        self.prefix.clone()
    }
}

#[derive(Injectable)]
struct RetryingClient {
    #[inject(id = "retries")]
    retries: i32,
    #[inject(id = "timeout", default = 30)]
    timeout_secs: u64,
    logger: Option<Arc<dyn Logger>>,
    #[inject(skip)]
    attempts: AtomicUsize,
}

static CLOSED: AtomicUsize = AtomicUsize::new(0);

#[derive(Injectable)]
#[inject(disposable)]
struct Pool {
    #[inject(id = "size")]
    size: usize,
}

impl Disposable for Pool {
    fn dispose(&self) {
        CLOSED.fetch_add(self.size, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct Widget {
    logger: Mutex<Option<Arc<dyn Logger>>>,
    width: Mutex<u32>,
    setup_calls: AtomicUsize,
    scope: Mutex<Option<ScopeHandle>>,
}

#[injection_target(scope_aware)]
impl Widget {
    fn inject_logger(&self, logger: Option<Arc<dyn Logger>>) {
        *self.logger.lock() = logger;
    }

    fn inject_width(&self, #[inject(id = "width", default = 640)] width: u32) {
        *self.width.lock() = width;
    }

    fn setup(&self) {
        self.setup_calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl ScopeAware for Widget {
    fn attach_scope(&self, handle: ScopeHandle) {
        *self.scope.lock() = Some(handle);
    }
}

#[derive(Default)]
struct Label;

#[injection_target]
impl Label {}

#[test]
fn test_derived_constructor_with_identifiers_and_defaults() {
    let registry = BindingRegistry::new("app");
    registry.bind::<i32>(Some("retries")).unwrap().to_instance(Arc::new(3));
    registry
        .bind::<dyn Logger>(None)
        .unwrap()
        .to_constructor::<ConsoleLogger>(|logger| logger, true);

    let client = registry.instantiate::<RetryingClient>(0).unwrap();
    assert_eq!(client.retries, 3);
    assert_eq!(client.timeout_secs, 30);
    assert_eq!(client.logger.as_ref().map(|l| l.prefix()), Some("console".to_string()));
    assert_eq!(client.attempts.load(Ordering::SeqCst), 0);

    let constructor = &RetryingClient::constructors()[0];
    let names: Vec<&str> = constructor.parameters().iter().map(|p| p.name()).collect();
    assert_eq!(names, ["retries", "timeout_secs", "logger"]);
}

#[test]
fn test_bound_identifier_overrides_default() {
    let registry = BindingRegistry::new("app");
    registry
        .bind::<String>(Some("prefix"))
        .unwrap()
        .to_instance(Arc::new("file".to_string()));
    registry.bind::<ConsoleLogger>(None).unwrap().to_self(false);

    let logger = registry.get::<ConsoleLogger>(None).unwrap().unwrap();
    assert_eq!(logger.prefix(), "file");
}

#[test]
fn test_disposable_component_is_disposed_on_unbind() {
    let registry = BindingRegistry::new("app");
    registry.bind::<usize>(Some("size")).unwrap().to_instance(Arc::new(4));
    registry.bind::<Pool>(None).unwrap().to_self(true);

    let pool = registry.get::<Pool>(None).unwrap().unwrap();
    assert_eq!(pool.size, 4);
    let before = CLOSED.load(Ordering::SeqCst);
    registry.unbind::<Pool>(None).unwrap();
    assert_eq!(CLOSED.load(Ordering::SeqCst), before + 4);
}

#[test]
fn test_method_injection_follows_naming_convention() {
    let registry = Arc::new(BindingRegistry::new("app"));
    registry
        .bind::<dyn Logger>(None)
        .unwrap()
        .to_constructor::<ConsoleLogger>(|logger| logger, true);
    let chain = ModuleChain::new(registry.clone());

    let widget = Arc::new(Widget::default());
    let object: SharedObject = widget.clone();
    chain.inject(&object).unwrap();

    assert_eq!(widget.logger.lock().as_ref().map(|l| l.prefix()), Some("console".to_string()));
    assert_eq!(*widget.width.lock(), 640);
    assert_eq!(widget.setup_calls.load(Ordering::SeqCst), 0);
    assert!(widget.scope.lock().is_some());
    assert_eq!(widget.injection_methods().len(), 3);
}

#[test]
fn test_custom_convention_selects_other_methods() {
    let config = InjectorConfig {
        injection_method_pattern: "setup".to_string(),
        ..InjectorConfig::default()
    };
    let chain = ModuleChain::from_config(&config);
    assert_eq!(chain.registry().method_convention(), &MethodConvention::new("setup"));

    let widget = Arc::new(Widget::default());
    let object: SharedObject = widget.clone();
    chain.inject(&object).unwrap();
    chain.inject(&object).unwrap();

    assert_eq!(widget.setup_calls.load(Ordering::SeqCst), 2);
    assert_eq!(*widget.width.lock(), 0);
}

#[test]
fn test_scope_handle_from_generated_target() {
    let chain = ModuleChain::new(Arc::new(BindingRegistry::new("app")));
    let widget = Arc::new(Widget::default());
    let context: SharedObject = widget.clone();
    chain.inject(&context).unwrap();

    let handle = widget.scope.lock().clone().unwrap();
    let label: SharedObject = Arc::new(Label);
    assert!(handle.inject(label.clone()).unwrap());
    let tracker = chain.scope_tracker().unwrap();
    assert_eq!(tracker.tracked_objects(&context).len(), 1);

    assert!(handle.clear().unwrap());
    assert!(!tracker.is_tracking(&context));
    assert!(label.injection_methods().is_empty());
}
