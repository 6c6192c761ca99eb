//! 绑定条目与类型化绑定句柄

use crate::parameters::construct;
use crate::provider::{FactoryFn, Provider};
use di_abstractions::{ComponentResolver, Injectable};
use infrastructure_common::{
    downcast_instance, erase, BindingKey, DependencyError, DependencyResult, Disposable,
    DisposeHook, Instance, ProvidedInstance, ResolutionState, TypeKey,
};
use parking_lot::Mutex;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

type UpcastFn = Arc<dyn Fn(&Instance) -> Option<Instance> + Send + Sync>;

/// 超类型表项
#[derive(Clone)]
struct Upcast {
    target: TypeKey,
    cast: UpcastFn,
}

/// 注册表中的绑定条目
pub struct BindingEntry {
    key: BindingKey,
    provider: Provider,
    supertypes: Mutex<Vec<Upcast>>,
}

impl BindingEntry {
    pub(crate) fn new(key: BindingKey) -> Self {
        Self {
            provider: Provider::new(key.clone()),
            key,
            supertypes: Mutex::new(Vec::new()),
        }
    }

    /// 绑定键
    pub fn key(&self) -> &BindingKey {
        &self.key
    }

    /// 提供者
    pub fn provider(&self) -> &Provider {
        &self.provider
    }

    /// 声明类型
    pub fn declared_type(&self) -> TypeKey {
        self.key.type_key
    }

    /// 已登记的超类型
    pub fn supertypes(&self) -> Vec<TypeKey> {
        self.supertypes.lock().iter().map(|u| u.target).collect()
    }

    /// 查询类型是否等于声明类型或为其已登记的超类型
    pub fn exposes(&self, query: TypeKey) -> bool {
        query == self.key.type_key || self.supertypes.lock().iter().any(|u| u.target == query)
    }

    fn add_supertype(&self, target: TypeKey, cast: UpcastFn) {
        let mut supertypes = self.supertypes.lock();
        supertypes.retain(|u| u.target != target);
        supertypes.push(Upcast { target, cast });
    }

    /// 解析并转换为查询类型
    pub(crate) fn resolve_as(
        &self,
        query: TypeKey,
        resolver: &dyn ComponentResolver,
    ) -> DependencyResult<Option<Instance>> {
        match self.provider.resolve(resolver)? {
            Some(provided) => self.cast_to(query, provided.value()).map(Some),
            None => Ok(None),
        }
    }

    fn cast_to(&self, query: TypeKey, value: &Instance) -> DependencyResult<Instance> {
        if query == self.key.type_key {
            return Ok(value.clone());
        }
        let cast = self
            .supertypes
            .lock()
            .iter()
            .find(|u| u.target == query)
            .map(|u| u.cast.clone());
        cast.and_then(|cast| cast(value))
            .ok_or_else(|| DependencyError::TypeMismatch {
                expected: query.name().to_string(),
                actual: self.key.type_key.name().to_string(),
            })
    }
}

impl Clone for BindingEntry {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            provider: self.provider.clone(),
            supertypes: Mutex::new(self.supertypes.lock().clone()),
        }
    }
}

impl fmt::Debug for BindingEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingEntry")
            .field("provider", &self.provider)
            .field("supertypes", &self.supertypes())
            .finish()
    }
}

/// 类型化绑定句柄
///
/// 对同一个键重复调用 `bind` 得到的句柄指向同一个条目，见 [`Binding::same_binding`]。
pub struct Binding<T: ?Sized> {
    entry: Arc<BindingEntry>,
    _marker: PhantomData<fn() -> Arc<T>>,
}

impl<T: ?Sized> Clone for Binding<T> {
    fn clone(&self) -> Self {
        Self {
            entry: self.entry.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: ?Sized + Send + Sync + 'static> Binding<T> {
    pub(crate) fn new(entry: Arc<BindingEntry>) -> Self {
        Self {
            entry,
            _marker: PhantomData,
        }
    }

    /// 绑定键
    pub fn key(&self) -> &BindingKey {
        self.entry.key()
    }

    /// 是否指向同一个绑定条目
    pub fn same_binding(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.entry, &other.entry)
    }

    /// 解析状态
    pub fn state(&self) -> ResolutionState {
        self.entry.provider().state()
    }

    /// 是否已解析
    pub fn is_resolved(&self) -> bool {
        self.entry.provider().is_resolved()
    }

    /// 绑定到固定实例
    pub fn to_instance(&self, instance: Arc<T>) -> &Self {
        self.entry
            .provider()
            .to_instance(ProvidedInstance::new(instance));
        self
    }

    /// 绑定到可释放的固定实例，解绑时调用其 `dispose`
    pub fn to_disposable_instance(&self, instance: Arc<T>) -> &Self
    where
        T: Disposable,
    {
        self.entry
            .provider()
            .to_instance(ProvidedInstance::disposable(instance));
        self
    }

    /// 绑定到组件类型的第一个构造函数
    pub fn to_constructor<C: Injectable>(&self, upcast: fn(Arc<C>) -> Arc<T>, singleton: bool) -> &Self {
        self.to_constructor_at::<C>(0, upcast, singleton)
    }

    /// 绑定到组件类型指定索引的构造函数
    pub fn to_constructor_at<C: Injectable>(
        &self,
        index: usize,
        upcast: fn(Arc<C>) -> Arc<T>,
        singleton: bool,
    ) -> &Self {
        let build: FactoryFn = Arc::new(move |resolver| {
            let component = Arc::new(construct::<C>(resolver, index)?);
            let disposer = component.as_disposable().is_some().then(|| {
                let target = component.clone();
                Arc::new(move || {
                    if let Some(disposable) = target.as_disposable() {
                        disposable.dispose();
                    }
                }) as DisposeHook
            });
            Ok(ProvidedInstance::from_parts(erase(upcast(component)), disposer))
        });
        self.entry
            .provider()
            .to_constructor(TypeKey::of::<C>(), index, build, singleton);
        self
    }

    /// 绑定到自身类型的第一个构造函数
    pub fn to_self(&self, singleton: bool) -> &Self
    where
        T: Injectable,
    {
        self.to_constructor::<T>(|component| component, singleton)
    }

    /// 绑定到工厂函数
    pub fn to_func<F>(&self, factory: F, singleton: bool) -> &Self
    where
        F: Fn(&dyn ComponentResolver) -> DependencyResult<Arc<T>> + Send + Sync + 'static,
    {
        let build: FactoryFn =
            Arc::new(move |resolver| factory(resolver).map(ProvidedInstance::new));
        self.entry.provider().to_func(build, singleton);
        self
    }

    /// 绑定到产出可释放实例的工厂函数
    pub fn to_disposable_func<F>(&self, factory: F, singleton: bool) -> &Self
    where
        T: Disposable,
        F: Fn(&dyn ComponentResolver) -> DependencyResult<Arc<T>> + Send + Sync + 'static,
    {
        let build: FactoryFn =
            Arc::new(move |resolver| factory(resolver).map(ProvidedInstance::disposable));
        self.entry.provider().to_func(build, singleton);
        self
    }

    /// 登记超类型，使按 `S` 查询派生类型时可以命中此绑定
    pub fn as_supertype<S>(&self, upcast: fn(Arc<T>) -> Arc<S>) -> &Self
    where
        S: ?Sized + Send + Sync + 'static,
    {
        let target = TypeKey::of::<S>();
        debug!("绑定 {} 登记超类型 {}", self.entry.key(), target);
        let cast: UpcastFn =
            Arc::new(move |value| downcast_instance::<T>(value).map(|v| erase(upcast(v))));
        self.entry.add_supertype(target, cast);
        self
    }
}

impl<T: ?Sized> fmt::Debug for Binding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Binding").field(&self.entry).finish()
    }
}
