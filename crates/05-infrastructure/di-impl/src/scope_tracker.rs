//! 上下文作用域跟踪器
//!
//! 上下文对象在运行时派生的辅助对象经由跟踪器注入到宿主模块链，
//! 并按上下文记录下来，之后可以通过 `clear_context` 一次性移除。

use di_abstractions::{
    object_id, same_object, ContextScope, InjectionModule, ScopeHandle, SharedObject,
};
use indexmap::IndexMap;
use infrastructure_common::{DependencyError, DependencyResult};
use parking_lot::Mutex;
use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, trace, warn};

/// 跟踪器委托注入与移除的宿主
pub trait InjectionHost: Send + Sync {
    /// 注入对象
    fn inject(&self, object: &SharedObject) -> DependencyResult<()>;

    /// 移除对象
    fn remove(&self, object: &SharedObject) -> DependencyResult<()>;
}

struct ContextRecord {
    context: SharedObject,
    objects: IndexMap<usize, SharedObject>,
}

/// 上下文作用域跟踪器
pub struct ScopeTracker {
    host: Weak<dyn InjectionHost>,
    self_ref: Weak<ScopeTracker>,
    contexts: Mutex<IndexMap<usize, ContextRecord>>,
    disposed: AtomicBool,
}

impl ScopeTracker {
    /// 模块名称
    pub const MODULE_NAME: &'static str = "ScopeTracker";

    /// 创建跟踪器
    pub fn new(host: Weak<dyn InjectionHost>) -> Arc<Self> {
        Arc::new_cyclic(|self_ref| Self {
            host,
            self_ref: self_ref.clone(),
            contexts: Mutex::new(IndexMap::new()),
            disposed: AtomicBool::new(false),
        })
    }

    fn host(&self) -> DependencyResult<Arc<dyn InjectionHost>> {
        self.host.upgrade().ok_or_else(|| DependencyError::HostUnavailable {
            module: Self::MODULE_NAME.to_string(),
        })
    }

    /// 为上下文创建作用域句柄
    pub fn handle_for(&self, context: &SharedObject) -> ScopeHandle {
        let scope: Weak<dyn ContextScope> = self.self_ref.clone();
        ScopeHandle::new(context, scope)
    }

    /// 是否已释放
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    /// 对象是否为正在跟踪的上下文
    pub fn is_tracking(&self, context: &SharedObject) -> bool {
        self.contexts.lock().contains_key(&object_id(context))
    }

    /// 上下文下记录的对象（按注入顺序）
    pub fn tracked_objects(&self, context: &SharedObject) -> Vec<SharedObject> {
        self.contexts
            .lock()
            .get(&object_id(context))
            .map(|record| record.objects.values().cloned().collect())
            .unwrap_or_default()
    }

    /// 正在跟踪的上下文数量
    pub fn context_count(&self) -> usize {
        self.contexts.lock().len()
    }

    /// 释放跟踪器并丢弃所有记录；重复调用无效果
    ///
    /// 只丢弃记录，不会对已记录的对象执行移除。
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        let contexts = std::mem::take(&mut *self.contexts.lock());
        debug!("作用域跟踪器释放, 丢弃 {} 个上下文记录", contexts.len());
    }
}

impl ContextScope for ScopeTracker {
    fn inject_for_context(&self, context: &SharedObject, object: SharedObject) -> DependencyResult<()> {
        if self.is_disposed() {
            trace!("跟踪器已释放, 忽略注入 {}", object.target_type());
            return Ok(());
        }
        self.host()?.inject(&object)?;
        let mut contexts = self.contexts.lock();
        let record = contexts
            .entry(object_id(context))
            .or_insert_with(|| ContextRecord {
                context: context.clone(),
                objects: IndexMap::new(),
            });
        trace!(
            "上下文 {} 记录对象 {}",
            record.context.target_type(),
            object.target_type()
        );
        record.objects.insert(object_id(&object), object);
        Ok(())
    }

    fn remove_from_context(&self, context: &SharedObject, object: &SharedObject) -> DependencyResult<()> {
        if self.is_disposed() {
            trace!("跟踪器已释放, 忽略移除 {}", object.target_type());
            return Ok(());
        }
        self.host()?.remove(object)?;
        let mut contexts = self.contexts.lock();
        if let Some(record) = contexts.get_mut(&object_id(context)) {
            record.objects.shift_remove(&object_id(object));
        }
        Ok(())
    }

    fn clear_context(&self, context: &SharedObject) -> DependencyResult<()> {
        if self.is_disposed() {
            return Ok(());
        }
        let (host, record) = {
            let mut contexts = self.contexts.lock();
            let id = object_id(context);
            if !contexts.contains_key(&id) {
                return Ok(());
            }
            // 宿主不可用时保留记录
            let host = self.host()?;
            let Some(record) = contexts.shift_remove(&id) else {
                return Ok(());
            };
            (host, record)
        };
        debug!(
            "清空上下文 {}: {} 个对象",
            record.context.target_type(),
            record.objects.len()
        );

        let mut first_error = None;
        for object in record.objects.values() {
            if same_object(object, &record.context) {
                continue;
            }
            if let Err(err) = host.remove(object) {
                warn!("清空上下文时移除 {} 失败: {}", object.target_type(), err);
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl InjectionModule for ScopeTracker {
    fn module_name(&self) -> &str {
        Self::MODULE_NAME
    }

    fn inject(&self, target: &SharedObject) -> DependencyResult<()> {
        if self.is_disposed() {
            return Ok(());
        }
        if let Some(aware) = target.as_scope_aware() {
            trace!("为 {} 分配作用域句柄", target.target_type());
            aware.attach_scope(self.handle_for(target));
        }
        Ok(())
    }

    fn remove(&self, target: &SharedObject) -> DependencyResult<()> {
        if self.is_tracking(target) {
            return self.clear_context(target);
        }
        Ok(())
    }

    fn clone_module(&self) -> Option<Arc<dyn InjectionModule>> {
        None
    }

    fn describe(&self) -> String {
        let contexts = self.contexts.lock();
        let objects: usize = contexts.values().map(|record| record.objects.len()).sum();
        format!(
            "ScopeTracker: {} 个上下文, {} 个对象{}",
            contexts.len(),
            objects,
            if self.is_disposed() { " (已释放)" } else { "" }
        )
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use di_abstractions::{InjectionTarget, ScopeAware};

    #[derive(Default)]
    struct RecordingHost {
        injected: Mutex<Vec<usize>>,
        removed: Mutex<Vec<usize>>,
    }

    impl InjectionHost for RecordingHost {
        fn inject(&self, object: &SharedObject) -> DependencyResult<()> {
            self.injected.lock().push(object_id(object));
            Ok(())
        }

        fn remove(&self, object: &SharedObject) -> DependencyResult<()> {
            self.removed.lock().push(object_id(object));
            Ok(())
        }
    }

    struct Plain;

    impl InjectionTarget for Plain {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[derive(Default)]
    struct Owner {
        handle: Mutex<Option<ScopeHandle>>,
    }

    impl ScopeAware for Owner {
        fn attach_scope(&self, handle: ScopeHandle) {
            *self.handle.lock() = Some(handle);
        }
    }

    impl InjectionTarget for Owner {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_scope_aware(&self) -> Option<&dyn ScopeAware> {
            Some(self)
        }
    }

    fn setup() -> (Arc<RecordingHost>, Arc<ScopeTracker>) {
        let host = Arc::new(RecordingHost::default());
        let weak: Weak<dyn InjectionHost> = Arc::downgrade(&host) as Weak<dyn InjectionHost>;
        (host, ScopeTracker::new(weak))
    }

    #[test]
    fn test_clear_context_removes_each_object_once() {
        let (host, tracker) = setup();
        let context: SharedObject = Arc::new(Plain);
        let first: SharedObject = Arc::new(Plain);
        let second: SharedObject = Arc::new(Plain);

        tracker.inject_for_context(&context, first.clone()).unwrap();
        tracker.inject_for_context(&context, second.clone()).unwrap();
        tracker.inject_for_context(&context, first.clone()).unwrap();
        assert_eq!(tracker.tracked_objects(&context).len(), 2);
        assert_eq!(host.injected.lock().len(), 3);

        tracker.clear_context(&context).unwrap();
        assert_eq!(*host.removed.lock(), vec![object_id(&first), object_id(&second)]);
        assert!(!tracker.is_tracking(&context));

        tracker.clear_context(&context).unwrap();
        assert_eq!(host.removed.lock().len(), 2);
    }

    #[test]
    fn test_clear_context_skips_context_itself() {
        let (host, tracker) = setup();
        let context: SharedObject = Arc::new(Plain);
        tracker.inject_for_context(&context, context.clone()).unwrap();
        tracker.clear_context(&context).unwrap();
        assert!(host.removed.lock().is_empty());
    }

    #[test]
    fn test_remove_from_context_drops_record() {
        let (host, tracker) = setup();
        let context: SharedObject = Arc::new(Plain);
        let object: SharedObject = Arc::new(Plain);
        tracker.inject_for_context(&context, object.clone()).unwrap();
        tracker.remove_from_context(&context, &object).unwrap();
        assert!(tracker.tracked_objects(&context).is_empty());

        tracker.clear_context(&context).unwrap();
        assert_eq!(host.removed.lock().len(), 1);
    }

    #[test]
    fn test_scope_aware_object_receives_working_handle() {
        let (host, tracker) = setup();
        let owner = Arc::new(Owner::default());
        let context: SharedObject = owner.clone();
        InjectionModule::inject(tracker.as_ref(), &context).unwrap();

        let handle = owner.handle.lock().clone().unwrap();
        assert!(handle.is_alive());
        let spawned: SharedObject = Arc::new(Plain);
        assert!(handle.inject(spawned.clone()).unwrap());
        assert!(handle.clear().unwrap());
        assert_eq!(*host.removed.lock(), vec![object_id(&spawned)]);

        drop(tracker);
        assert!(!handle.is_alive());
        assert!(!handle.clear().unwrap());
    }

    #[test]
    fn test_removing_tracked_context_clears_it() {
        let (host, tracker) = setup();
        let context: SharedObject = Arc::new(Plain);
        let object: SharedObject = Arc::new(Plain);
        tracker.inject_for_context(&context, object.clone()).unwrap();
        InjectionModule::remove(tracker.as_ref(), &context).unwrap();
        assert_eq!(*host.removed.lock(), vec![object_id(&object)]);
        assert_eq!(tracker.context_count(), 0);
    }

    #[test]
    fn test_dispose_drops_records_and_ignores_later_calls() {
        let (host, tracker) = setup();
        let context: SharedObject = Arc::new(Plain);
        let object: SharedObject = Arc::new(Plain);
        tracker.inject_for_context(&context, object.clone()).unwrap();
        let handle = tracker.handle_for(&context);
        tracker.dispose();
        tracker.dispose();
        assert!(tracker.is_disposed());
        assert_eq!(tracker.context_count(), 0);
        assert!(host.removed.lock().is_empty());

        tracker.inject_for_context(&context, Arc::new(Plain)).unwrap();
        tracker.remove_from_context(&context, &object).unwrap();
        tracker.clear_context(&context).unwrap();
        assert!(handle.inject(Arc::new(Plain)).unwrap());
        assert_eq!(host.injected.lock().len(), 1);
        assert!(host.removed.lock().is_empty());
        assert_eq!(tracker.context_count(), 0);
    }

    #[test]
    fn test_dropped_host_is_reported() {
        let (host, tracker) = setup();
        drop(host);
        let context: SharedObject = Arc::new(Plain);
        let err = tracker.inject_for_context(&context, Arc::new(Plain)).unwrap_err();
        assert!(matches!(err, DependencyError::HostUnavailable { .. }));
        assert!(tracker.clone_module().is_none());
    }

    #[test]
    fn test_clear_with_dropped_host_keeps_record() {
        let (host, tracker) = setup();
        let context: SharedObject = Arc::new(Plain);
        tracker.inject_for_context(&context, Arc::new(Plain)).unwrap();
        drop(host);

        let err = tracker.clear_context(&context).unwrap_err();
        assert!(matches!(err, DependencyError::HostUnavailable { .. }));
        assert!(tracker.is_tracking(&context));
        assert_eq!(tracker.tracked_objects(&context).len(), 1);
    }
}
