//! 注入方法缓存
//!
//! 按 (具体类型, 命名约定) 缓存过滤后的注入方法列表。缓存由注册表持有，
//! 并与注册表的克隆体共享；约定不同的注册表共用同一缓存时互不干扰。

use di_abstractions::{InjectionMethod, InjectionTarget};
use infrastructure_common::MethodConvention;
use parking_lot::Mutex;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// 注入方法缓存
#[derive(Clone, Default)]
pub struct MethodCache {
    entries: Arc<Mutex<HashMap<(TypeId, String), Arc<[InjectionMethod]>>>>,
}

impl MethodCache {
    /// 创建空缓存
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取目标类型的注入方法，首次访问时发现并缓存
    pub fn methods_for(
        &self,
        target: &dyn InjectionTarget,
        convention: &MethodConvention,
    ) -> Arc<[InjectionMethod]> {
        let target_type = target.target_type();
        let key = (target_type.id(), convention.pattern().to_string());
        if let Some(methods) = self.entries.lock().get(&key) {
            return methods.clone();
        }

        let discovered: Arc<[InjectionMethod]> = target
            .injection_methods()
            .into_iter()
            .filter(|method| convention.matches(method.name()))
            .collect();
        debug!(
            "发现 {} 的注入方法 {} 个 (约定: {})",
            target_type,
            discovered.len(),
            convention.pattern()
        );
        self.entries
            .lock()
            .entry(key)
            .or_insert(discovered)
            .clone()
    }

    /// 已缓存的 (类型, 约定) 条目数量
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// 清空缓存
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// 是否与另一个缓存共享存储
    pub fn shares_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use di_abstractions::ParameterInfo;
    use std::any::Any;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static DISCOVERIES: AtomicUsize = AtomicUsize::new(0);

    struct Widget;

    struct Gadget;

    impl InjectionTarget for Gadget {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn injection_methods(&self) -> Vec<InjectionMethod> {
            vec![
                InjectionMethod::new::<Gadget, _>("inject_a", Vec::new(), |_, _| {}),
                InjectionMethod::new::<Gadget, _>("setup_a", Vec::new(), |_, _| {}),
            ]
        }
    }

    impl InjectionTarget for Widget {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn injection_methods(&self) -> Vec<InjectionMethod> {
            DISCOVERIES.fetch_add(1, Ordering::SeqCst);
            vec![
                InjectionMethod::new::<Widget, _>("inject_parts", Vec::new(), |_, _| {}),
                InjectionMethod::new::<Widget, _>(
                    "update",
                    vec![ParameterInfo::of::<u32>("dt")],
                    |_, _| {},
                ),
            ]
        }
    }

    #[test]
    fn test_discovery_is_cached_per_type() {
        let cache = MethodCache::new();
        let convention = MethodConvention::default();

        let first = cache.methods_for(&Widget, &convention);
        let second = cache.methods_for(&Widget, &convention);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].name(), "inject_parts");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(DISCOVERIES.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);

        let shared = cache.clone();
        assert!(shared.shares_with(&cache));
        shared.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_conventions_sharing_a_cache_keep_their_own_lists() {
        let cache = MethodCache::new();
        let inject = MethodConvention::default();
        let setup = MethodConvention::new("setup*");

        let first = cache.methods_for(&Gadget, &inject);
        let second = cache.methods_for(&Gadget, &setup);
        let names = |methods: &[InjectionMethod]| -> Vec<&'static str> {
            methods.iter().map(|m| m.name()).collect()
        };
        assert_eq!(names(&first), ["inject_a"]);
        assert_eq!(names(&second), ["setup_a"]);
        assert_eq!(cache.len(), 2);
        assert!(Arc::ptr_eq(&first, &cache.methods_for(&Gadget, &inject)));
    }
}
