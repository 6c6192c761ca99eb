//! Centralized integration tests for di-impl crate

use di_abstractions::{
    ComponentResolverExt, CompositeObject, InjectionMethod, InjectionTarget, ParameterInfo,
    ScopeAware, ScopeHandle, SharedObject,
};
use di_impl::{BindingRegistry, ModuleChain};
use infrastructure_common::{DependencyError, InjectorConfig};
use infrastructure_composition::InjectorBuilder;
use parking_lot::Mutex;
use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// 场景中的叶子节点
#[derive(Default)]
struct Node {
    speed: Mutex<Option<f64>>,
    injected: AtomicUsize,
}

impl InjectionTarget for Node {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn injection_methods(&self) -> Vec<InjectionMethod> {
        vec![InjectionMethod::new::<Node, _>(
            "inject_speed",
            vec![ParameterInfo::of::<f64>("speed").with_identifier("speed")],
            |node, args| {
                *node.speed.lock() = args.get::<f64>(0).map(|s| *s);
                node.injected.fetch_add(1, Ordering::SeqCst);
            },
        )]
    }
}

/// 场景中的分组节点
struct Group {
    children: Vec<SharedObject>,
}

impl CompositeObject for Group {
    fn constituents(&self) -> Vec<SharedObject> {
        self.children.clone()
    }
}

impl InjectionTarget for Group {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_composite(&self) -> Option<&dyn CompositeObject> {
        Some(self)
    }
}

/// 运行时派生子弹的发射器
#[derive(Default)]
struct Emitter {
    scope: Mutex<Option<ScopeHandle>>,
}

impl Emitter {
    fn emit(&self) -> Arc<Node> {
        let bullet = Arc::new(Node::default());
        if let Some(scope) = self.scope.lock().as_ref() {
            let object: SharedObject = bullet.clone();
            let _ = scope.inject(object);
        }
        bullet
    }
}

impl ScopeAware for Emitter {
    fn attach_scope(&self, handle: ScopeHandle) {
        *self.scope.lock() = Some(handle);
    }
}

impl InjectionTarget for Emitter {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_scope_aware(&self) -> Option<&dyn ScopeAware> {
        Some(self)
    }
}

/// 统计移除次数的模块
#[derive(Default)]
struct RemovalCounter {
    removed: AtomicUsize,
}

impl di_abstractions::InjectionModule for RemovalCounter {
    fn module_name(&self) -> &str {
        "removal-counter"
    }

    fn inject(&self, _target: &SharedObject) -> Result<(), DependencyError> {
        Ok(())
    }

    fn remove(&self, _target: &SharedObject) -> Result<(), DependencyError> {
        self.removed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn clone_module(&self) -> Option<Arc<dyn di_abstractions::InjectionModule>> {
        Some(Arc::new(RemovalCounter::default()))
    }

    fn describe(&self) -> String {
        format!("removal-counter: {}", self.removed.load(Ordering::SeqCst))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn build_chain(counter: Arc<RemovalCounter>) -> anyhow::Result<Arc<ModuleChain>> {
    let chain = InjectorBuilder::new()
        .with_config(InjectorConfig {
            name: "scene".to_string(),
            ..InjectorConfig::default()
        })
        .configure(|registry| {
            registry.bind::<f64>(Some("speed"))?.to_instance(Arc::new(2.5));
            Ok(())
        })
        .add_module(counter)
        .build()?;
    Ok(chain)
}

#[test]
fn test_composite_scene_injects_every_leaf_once() -> anyhow::Result<()> {
    let counter = Arc::new(RemovalCounter::default());
    let chain = build_chain(counter.clone())?;

    let a = Arc::new(Node::default());
    let b = Arc::new(Node::default());
    let shared_a: SharedObject = a.clone();
    let shared_b: SharedObject = b.clone();
    let inner: SharedObject = Arc::new(Group {
        children: vec![shared_b.clone(), shared_a.clone()],
    });
    let scene: SharedObject = Arc::new(Group {
        children: vec![shared_a, inner],
    });

    chain.inject(&scene)?;
    assert_eq!(*a.speed.lock(), Some(2.5));
    assert_eq!(*b.speed.lock(), Some(2.5));
    assert_eq!(a.injected.load(Ordering::SeqCst), 1);
    assert_eq!(b.injected.load(Ordering::SeqCst), 1);

    chain.remove(&scene)?;
    assert_eq!(counter.removed.load(Ordering::SeqCst), 2);
    Ok(())
}

#[test]
fn test_emitter_spawned_objects_are_removed_with_context() -> anyhow::Result<()> {
    let counter = Arc::new(RemovalCounter::default());
    let chain = build_chain(counter.clone())?;

    let emitter = Arc::new(Emitter::default());
    let context: SharedObject = emitter.clone();
    chain.inject(&context)?;

    let first = emitter.emit();
    let second = emitter.emit();
    assert_eq!(*first.speed.lock(), Some(2.5));
    assert_eq!(*second.speed.lock(), Some(2.5));

    let tracker = chain.scope_tracker().expect("默认启用作用域跟踪器");
    assert_eq!(tracker.tracked_objects(&context).len(), 2);

    chain.remove(&context)?;
    // 两颗子弹各一次，发射器本身一次
    assert_eq!(counter.removed.load(Ordering::SeqCst), 3);

    let handle = emitter.scope.lock().clone().expect("已分配作用域句柄");
    assert!(handle.clear()?);
    assert_eq!(counter.removed.load(Ordering::SeqCst), 3);
    Ok(())
}

#[test]
fn test_cloned_chain_shares_resolved_singletons() -> anyhow::Result<()> {
    let counter = Arc::new(RemovalCounter::default());
    let chain = build_chain(counter)?;
    let built = Arc::new(AtomicUsize::new(0));
    let factory_counter = built.clone();
    chain.registry().bind::<String>(Some("session"))?.to_func(
        move |_| {
            let n = factory_counter.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(format!("session-{n}")))
        },
        true,
    );
    let original = chain.registry().require::<String>(Some("session"))?;

    let cloned = chain.clone_chain();
    assert_eq!(cloned.modules().len(), chain.modules().len());
    let inherited = cloned.registry().require::<String>(Some("session"))?;
    assert!(Arc::ptr_eq(&original, &inherited));
    assert_eq!(built.load(Ordering::SeqCst), 1);

    cloned.registry().unbind::<f64>(Some("speed"))?;
    assert!(chain.registry().contains::<f64>(Some("speed")));
    assert!(cloned.log().contains("removal-counter: 0"));
    Ok(())
}

#[test]
fn test_rebinding_during_resolution_keeps_later_value() -> anyhow::Result<()> {
    let registry = Arc::new(BindingRegistry::new("rebind"));
    let weak = Arc::downgrade(&registry);
    registry.bind::<u32>(None)?.to_func(
        move |_| {
            if let Some(registry) = weak.upgrade() {
                registry.bind::<u32>(None)?.to_instance(Arc::new(7));
            }
            Ok(Arc::new(1))
        },
        true,
    );

    assert_eq!(*registry.require::<u32>(None)?, 7);
    assert_eq!(*registry.require::<u32>(None)?, 7);
    Ok(())
}

#[test]
fn test_factory_errors_reach_the_caller() {
    let registry = BindingRegistry::new("errors");
    registry
        .bind::<String>(Some("dsn"))
        .unwrap()
        .to_func(|_| Err(DependencyError::creation_failed("Database", "连接被拒绝")), true);
    registry
        .bind::<u64>(None)
        .unwrap()
        .to_func(|resolver| resolver.require::<u64>(None), false);

    let err = registry.get::<String>(Some("dsn")).unwrap_err();
    assert!(matches!(err, DependencyError::ComponentCreationFailed { .. }));
    assert!(err.to_string().contains("连接被拒绝"));

    let err = registry.get::<u64>(None).unwrap_err();
    assert!(err.is_circular());
}
