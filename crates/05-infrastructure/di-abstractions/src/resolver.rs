//! 组件解析器抽象接口
//!
//! 提供依赖解析的能力，工厂函数通过它获取自身依赖

use infrastructure_common::{
    downcast_instance, DependencyError, DependencyResult, Instance, LookupOptions, TypeKey,
};
use std::sync::Arc;

/// 组件解析器 trait
///
/// 负责按 (类型, 标识符) 解析组件实例。未命中不是错误，返回 `Ok(None)`。
pub trait ComponentResolver: Send + Sync {
    /// 解析指定类型的组件（类型擦除）
    fn resolve_erased(
        &self,
        type_key: TypeKey,
        identifier: Option<&str>,
        options: LookupOptions,
    ) -> DependencyResult<Option<Instance>>;

    /// 检查是否可以解析指定类型，不触发实例化
    fn can_resolve(&self, type_key: TypeKey, identifier: Option<&str>, options: LookupOptions)
        -> bool;

    /// 解析器名称
    fn resolver_name(&self) -> &str;
}

/// 组件解析器的类型化扩展
pub trait ComponentResolverExt: ComponentResolver {
    /// 解析指定类型的组件
    fn resolve<T: ?Sized + 'static>(&self) -> DependencyResult<Option<Arc<T>>> {
        self.resolve_named::<T>(None)
    }

    /// 解析指定类型与标识符的组件
    fn resolve_named<T: ?Sized + 'static>(
        &self,
        identifier: Option<&str>,
    ) -> DependencyResult<Option<Arc<T>>> {
        let type_key = TypeKey::of::<T>();
        match self.resolve_erased(type_key, identifier, LookupOptions::default())? {
            Some(instance) => downcast_instance::<T>(&instance).map(Some).ok_or_else(|| {
                DependencyError::TypeMismatch {
                    expected: type_key.name().to_string(),
                    actual: "<erased>".to_string(),
                }
            }),
            None => Ok(None),
        }
    }

    /// 解析必需的组件，未命中时返回 [`DependencyError::ComponentNotRegistered`]
    fn require<T: ?Sized + 'static>(&self, identifier: Option<&str>) -> DependencyResult<Arc<T>> {
        self.resolve_named::<T>(identifier)?
            .ok_or_else(|| DependencyError::ComponentNotRegistered {
                type_name: TypeKey::of::<T>().name().to_string(),
                identifier: identifier.map(str::to_string),
            })
    }

    /// 检查是否可以解析指定类型
    fn can_resolve_type<T: ?Sized + 'static>(&self, identifier: Option<&str>) -> bool {
        self.can_resolve(TypeKey::of::<T>(), identifier, LookupOptions::default())
    }
}

impl<R: ComponentResolver + ?Sized> ComponentResolverExt for R {}
