//! 绑定注册表
//!
//! 以 (类型, 标识符) 为键保存有序的绑定列表，查找分三个阶段：
//! 精确匹配 → 派生类型匹配 → 聚合注册表。

use crate::aggregation::AggregationWalk;
use crate::binding::{Binding, BindingEntry};
use crate::composite::expand_composite;
use crate::method_cache::MethodCache;
use crate::parameters::{construct, resolve_arguments};
use di_abstractions::{
    ComponentResolver, Injectable, InjectionMethod, InjectionModule, InjectionTarget, SharedObject,
};
use infrastructure_common::{
    downcast_instance, validate_identifier, BindingKey, DependencyError, DependencyResult,
    InjectorConfig, Instance, LookupOptions, MethodConvention, TypeKey,
};
use parking_lot::Mutex;
use std::any::Any;
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// 查找命中的位置
enum Found {
    Local(Arc<BindingEntry>),
    Aggregated(Arc<BindingRegistry>, Arc<BindingEntry>),
}

/// 绑定注册表
///
/// 单线程协作式使用：所有调用在调用线程上同步完成，不保证多线程并发修改的语义。
pub struct BindingRegistry {
    name: String,
    bindings: Mutex<Vec<Arc<BindingEntry>>>,
    aggregates: Mutex<Vec<Arc<BindingRegistry>>>,
    methods: MethodCache,
    convention: MethodConvention,
    lookup: LookupOptions,
}

impl BindingRegistry {
    /// 创建新的注册表
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bindings: Mutex::new(Vec::new()),
            aggregates: Mutex::new(Vec::new()),
            methods: MethodCache::new(),
            convention: MethodConvention::default(),
            lookup: LookupOptions::default(),
        }
    }

    /// 按配置创建注册表
    pub fn from_config(config: &InjectorConfig) -> Self {
        Self::new(config.name.clone())
            .with_method_convention(config.method_convention())
            .with_lookup_options(config.lookup)
    }

    /// 设置注入方法命名约定
    pub fn with_method_convention(mut self, convention: MethodConvention) -> Self {
        self.convention = convention;
        self
    }

    /// 设置默认查找选项
    pub fn with_lookup_options(mut self, lookup: LookupOptions) -> Self {
        self.lookup = lookup;
        self
    }

    /// 使用共享的注入方法缓存
    pub fn with_method_cache(mut self, methods: MethodCache) -> Self {
        self.methods = methods;
        self
    }

    /// 注册表名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 默认查找选项
    pub fn lookup_options(&self) -> LookupOptions {
        self.lookup
    }

    /// 注入方法命名约定
    pub fn method_convention(&self) -> &MethodConvention {
        &self.convention
    }

    /// 注入方法缓存
    pub fn method_cache(&self) -> &MethodCache {
        &self.methods
    }

    /// 绑定数量
    pub fn len(&self) -> usize {
        self.bindings.lock().len()
    }

    /// 是否没有任何绑定
    pub fn is_empty(&self) -> bool {
        self.bindings.lock().is_empty()
    }

    /// 按插入顺序列出所有绑定键
    pub fn binding_keys(&self) -> Vec<BindingKey> {
        self.bindings
            .lock()
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }

    fn snapshot(&self) -> Vec<Arc<BindingEntry>> {
        self.bindings.lock().clone()
    }

    // ---- 绑定 ----

    /// 绑定类型，键已存在时返回已有绑定
    pub fn bind<T: ?Sized + Send + Sync + 'static>(
        &self,
        identifier: Option<&str>,
    ) -> DependencyResult<Binding<T>> {
        let key = BindingKey::of::<T>(identifier)?;
        let mut bindings = self.bindings.lock();
        if let Some(existing) = bindings.iter().find(|entry| *entry.key() == key) {
            return Ok(Binding::new(existing.clone()));
        }
        debug!("注册表 {} 新增绑定 {}", self.name, key);
        let entry = Arc::new(BindingEntry::new(key));
        bindings.push(entry.clone());
        Ok(Binding::new(entry))
    }

    /// 解绑类型，释放其缓存实例；返回绑定是否存在
    pub fn unbind<T: ?Sized + 'static>(&self, identifier: Option<&str>) -> DependencyResult<bool> {
        let key = BindingKey::of::<T>(identifier)?;
        Ok(self.unbind_key(&key))
    }

    /// 按绑定键解绑
    pub fn unbind_key(&self, key: &BindingKey) -> bool {
        let removed = {
            let mut bindings = self.bindings.lock();
            bindings
                .iter()
                .position(|entry| entry.key() == key)
                .map(|index| bindings.remove(index))
        };
        match removed {
            Some(entry) => {
                debug!("注册表 {} 解绑 {}", self.name, key);
                entry.provider().dispose();
                true
            }
            None => false,
        }
    }

    // ---- 查找 ----

    fn find_local(
        &self,
        type_key: TypeKey,
        identifier: Option<&str>,
        include_derived_types: bool,
    ) -> Option<Arc<BindingEntry>> {
        let bindings = self.bindings.lock();
        let exact = bindings.iter().find(|entry| {
            entry.declared_type() == type_key && entry.key().identifier_matches(identifier)
        });
        if let Some(entry) = exact {
            return Some(entry.clone());
        }
        if !include_derived_types {
            return None;
        }
        bindings
            .iter()
            .find(|entry| entry.key().identifier_matches(identifier) && entry.exposes(type_key))
            .cloned()
    }

    fn find(&self, type_key: TypeKey, identifier: Option<&str>, options: LookupOptions) -> Option<Found> {
        if let Some(entry) = self.find_local(type_key, identifier, options.include_derived_types) {
            return Some(Found::Local(entry));
        }
        if !options.search_aggregated {
            return None;
        }
        AggregationWalk::new(self).find_map(|registry| {
            registry
                .find_local(type_key, identifier, options.include_derived_types)
                .map(|entry| Found::Aggregated(registry, entry))
        })
    }

    /// 使用默认查找选项获取实例；未命中返回 `Ok(None)`
    pub fn get<T: ?Sized + 'static>(&self, identifier: Option<&str>) -> DependencyResult<Option<Arc<T>>> {
        self.get_with::<T>(identifier, self.lookup)
    }

    /// 使用指定查找选项获取实例
    pub fn get_with<T: ?Sized + 'static>(
        &self,
        identifier: Option<&str>,
        options: LookupOptions,
    ) -> DependencyResult<Option<Arc<T>>> {
        let type_key = TypeKey::of::<T>();
        match self.resolve_erased(type_key, identifier, options)? {
            Some(instance) => downcast_instance::<T>(&instance).map(Some).ok_or_else(|| {
                DependencyError::TypeMismatch {
                    expected: type_key.name().to_string(),
                    actual: "<erased>".to_string(),
                }
            }),
            None => Ok(None),
        }
    }

    /// 使用默认查找选项检查是否存在绑定，不触发解析
    pub fn contains<T: ?Sized + 'static>(&self, identifier: Option<&str>) -> bool {
        self.contains_with::<T>(identifier, self.lookup)
    }

    /// 使用指定查找选项检查是否存在绑定
    pub fn contains_with<T: ?Sized + 'static>(&self, identifier: Option<&str>, options: LookupOptions) -> bool {
        self.can_resolve(TypeKey::of::<T>(), identifier, options)
    }

    /// 解析本地所有匹配类型的绑定
    ///
    /// 基于调用时的绑定快照，解析过程中新增的绑定不参与本次遍历。
    pub fn get_all<T: ?Sized + 'static>(&self, include_derived_types: bool) -> DependencyResult<Vec<Arc<T>>> {
        let type_key = TypeKey::of::<T>();
        let mut results = Vec::new();
        for entry in self.snapshot() {
            let matches = if include_derived_types {
                entry.exposes(type_key)
            } else {
                entry.declared_type() == type_key
            };
            if !matches {
                continue;
            }
            if let Some(instance) = entry.resolve_as(type_key, self)? {
                if let Some(value) = downcast_instance::<T>(&instance) {
                    results.push(value);
                }
            }
        }
        Ok(results)
    }

    /// 解析快照中的全部绑定，返回得到实例的绑定数量
    pub fn resolve_all(&self) -> DependencyResult<usize> {
        let mut resolved = 0;
        for entry in self.snapshot() {
            if entry.provider().resolve(self)?.is_some() {
                resolved += 1;
            }
        }
        debug!("注册表 {} 解析全部绑定: {} 个实例", self.name, resolved);
        Ok(resolved)
    }

    // ---- 构造与注入 ----

    /// 使用指定索引的构造函数创建实例，结果不会注册到注册表
    pub fn instantiate<C: Injectable>(&self, constructor_index: usize) -> DependencyResult<C> {
        construct::<C>(self, constructor_index)
    }

    /// 对目标执行方法注入；复合对象先展开为组成对象
    pub fn inject(&self, target: &SharedObject) -> DependencyResult<()> {
        for object in expand_composite(target) {
            self.inject_methods(object.as_ref())?;
        }
        Ok(())
    }

    fn inject_methods(&self, target: &dyn InjectionTarget) -> DependencyResult<()> {
        let methods = self.methods.methods_for(target, &self.convention);
        for method in methods.iter() {
            trace!("注册表 {} 调用注入方法 {}::{}", self.name, target.target_type(), method.name());
            self.invoke_method(method, target)?;
        }
        Ok(())
    }

    /// 解析方法参数并调用，返回方法结果
    pub fn invoke_method(
        &self,
        method: &InjectionMethod,
        target: &dyn InjectionTarget,
    ) -> DependencyResult<Option<Instance>> {
        let owner = format!("{}::{}", target.target_type(), method.name());
        let arguments = resolve_arguments(self, method.parameters(), &owner)?;
        method.invoke(target.as_any(), &arguments)
    }

    // ---- 聚合 ----

    /// 聚合另一个注册表，最近聚合的排在最前
    pub fn aggregate(&self, other: Arc<BindingRegistry>) {
        let mut aggregates = self.aggregates.lock();
        aggregates.retain(|existing| !Arc::ptr_eq(existing, &other));
        debug!("注册表 {} 聚合 {}", self.name, other.name);
        aggregates.insert(0, other);
    }

    /// 取消聚合；返回之前是否已聚合
    pub fn deaggregate(&self, other: &Arc<BindingRegistry>) -> bool {
        let mut aggregates = self.aggregates.lock();
        let before = aggregates.len();
        aggregates.retain(|existing| !Arc::ptr_eq(existing, other));
        let removed = aggregates.len() != before;
        if removed {
            debug!("注册表 {} 取消聚合 {}", self.name, other.name);
        }
        removed
    }

    /// 当前聚合的注册表（按查找顺序）
    pub fn aggregates(&self) -> Vec<Arc<BindingRegistry>> {
        self.aggregates.lock().clone()
    }

    // ---- 生命周期 ----

    /// 释放全部绑定并清空注册表；可重复调用
    pub fn dispose(&self) {
        let bindings = std::mem::take(&mut *self.bindings.lock());
        self.aggregates.lock().clear();
        if bindings.is_empty() {
            return;
        }
        debug!("注册表 {} 释放 {} 个绑定", self.name, bindings.len());
        for entry in bindings {
            entry.provider().dispose();
        }
    }

    /// 状态描述
    pub fn describe(&self) -> String {
        let bindings = self.snapshot();
        let aggregates = self.aggregates();
        let mut out = format!(
            "BindingRegistry \"{}\": {} 个绑定, {} 个聚合",
            self.name,
            bindings.len(),
            aggregates.len()
        );
        for entry in &bindings {
            let _ = write!(out, "\n  - {}", entry.provider().describe());
            let supertypes = entry.supertypes();
            if !supertypes.is_empty() {
                let names: Vec<String> = supertypes.iter().map(ToString::to_string).collect();
                let _ = write!(out, " 超类型: {}", names.join(", "));
            }
        }
        for registry in &aggregates {
            let _ = write!(out, "\n  聚合: {}", registry.name);
        }
        out
    }
}

impl Clone for BindingRegistry {
    /// 克隆每个绑定（保留已缓存的单例）并沿用相同的聚合引用
    ///
    /// 用于创建继承父级的子作用域，之后在任一方上的绑定修改互不影响。
    fn clone(&self) -> Self {
        let bindings = self
            .snapshot()
            .iter()
            .map(|entry| Arc::new(BindingEntry::clone(entry)))
            .collect();
        Self {
            name: self.name.clone(),
            bindings: Mutex::new(bindings),
            aggregates: Mutex::new(self.aggregates()),
            methods: self.methods.clone(),
            convention: self.convention.clone(),
            lookup: self.lookup,
        }
    }
}

impl std::fmt::Debug for BindingRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.describe())
    }
}

impl ComponentResolver for BindingRegistry {
    fn resolve_erased(
        &self,
        type_key: TypeKey,
        identifier: Option<&str>,
        options: LookupOptions,
    ) -> DependencyResult<Option<Instance>> {
        validate_identifier(type_key, identifier)?;
        match self.find(type_key, identifier, options) {
            Some(Found::Local(entry)) => entry.resolve_as(type_key, self),
            Some(Found::Aggregated(owner, entry)) => {
                trace!("注册表 {} 在聚合注册表 {} 中命中 {}", self.name, owner.name, entry.key());
                entry.resolve_as(type_key, owner.as_ref())
            }
            None => {
                trace!("注册表 {} 未找到 {}", self.name, type_key);
                Ok(None)
            }
        }
    }

    fn can_resolve(&self, type_key: TypeKey, identifier: Option<&str>, options: LookupOptions) -> bool {
        if validate_identifier(type_key, identifier).is_err() {
            warn!("注册表 {} 收到无效标识符查询: {}", self.name, type_key);
            return false;
        }
        self.find(type_key, identifier, options).is_some()
    }

    fn resolver_name(&self) -> &str {
        &self.name
    }
}

impl InjectionModule for BindingRegistry {
    fn module_name(&self) -> &str {
        &self.name
    }

    fn inject(&self, target: &SharedObject) -> DependencyResult<()> {
        BindingRegistry::inject(self, target)
    }

    fn remove(&self, target: &SharedObject) -> DependencyResult<()> {
        trace!("注册表 {} 忽略移除 {}", self.name, target.target_type());
        Ok(())
    }

    fn clone_module(&self) -> Option<Arc<dyn InjectionModule>> {
        Some(Arc::new(self.clone()))
    }

    fn describe(&self) -> String {
        BindingRegistry::describe(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
